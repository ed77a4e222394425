use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use ulid::Ulid;

use crate::model::Event;

pub type SubscriptionId = Ulid;

/// Error an observer may report. The hub logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverError(pub String);

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ObserverError {}

/// Passive subscriber to booking-state changes. Has no mutation rights
/// over the resource that produced the event.
pub trait Observer: Send + Sync {
    fn notify(&self, resource: &str, event: &Event) -> Result<(), ObserverError>;
}

/// Synchronous, ordered fan-out to observers.
///
/// Delivery is best-effort: an observer returning `Err` or panicking is
/// logged and skipped. Publishing never fails.
#[derive(Default)]
pub struct NotifyHub {
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn Observer>)>>,
}

impl NotifyHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        let id = Ulid::new();
        self.observers.write().push((id, observer));
        id
    }

    /// Returns false if the subscription was not registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Deliver `event` to every observer in subscription order.
    ///
    /// The observer list is copied before delivery, so observers may
    /// subscribe, unsubscribe or call back into the registry.
    pub fn publish(&self, resource: &str, event: &Event) {
        let observers: Vec<Arc<dyn Observer>> = self
            .observers
            .read()
            .iter()
            .map(|(_, o)| o.clone())
            .collect();

        for observer in observers {
            match catch_unwind(AssertUnwindSafe(|| observer.notify(resource, event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(resource, error = %e, "observer failed");
                    metrics::counter!(crate::observability::OBSERVER_FAILURES_TOTAL).increment(1);
                }
                Err(_) => {
                    tracing::warn!(resource, "observer panicked");
                    metrics::counter!(crate::observability::OBSERVER_FAILURES_TOTAL).increment(1);
                }
            }
        }
    }
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn notify(&self, resource: &str, event: &Event) -> Result<(), ObserverError> {
        tracing::info!(target: "slotkeeper::events", "{resource}: {event}");
        Ok(())
    }
}

/// Adapts a closure into an [`Observer`].
pub struct FnObserver<F>(pub F);

impl<F> Observer for FnObserver<F>
where
    F: Fn(&str, &Event) -> Result<(), ObserverError> + Send + Sync,
{
    fn notify(&self, resource: &str, event: &Event) -> Result<(), ObserverError> {
        (self.0)(resource, event)
    }
}
