use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use crate::limits::*;
use crate::model::*;
use crate::observability::{self, outcome_label};

use super::{BookingError, BookingRegistry, ConflictPolicy, Resource, resource_key};

impl BookingRegistry {
    /// Add a resource using the configured policy for its kind.
    pub fn add_resource(&self, name: &str, capacity: u32, kind: ResourceKind) -> Result<(), BookingError> {
        let policy = self.config.policy_for(kind.tag()).build();
        self.add_resource_with_policy(name, capacity, kind, policy)
    }

    pub fn add_resource_with_policy(
        &self,
        name: &str,
        capacity: u32,
        kind: ResourceKind,
        policy: Arc<dyn ConflictPolicy>,
    ) -> Result<(), BookingError> {
        if name.len() > MAX_NAME_LEN {
            return Err(BookingError::LimitExceeded("resource name too long"));
        }

        // The entry holds the shard lock, so check-and-insert is atomic.
        let resource = match self.resources.entry(resource_key(name)) {
            Entry::Occupied(_) => return Err(BookingError::DuplicateResource(name.to_string())),
            Entry::Vacant(slot) => {
                // Not `resources.len()`: it would read-lock the shard held here.
                let admitted = self
                    .resource_count
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                        (n < MAX_RESOURCES).then_some(n + 1)
                    });
                if admitted.is_err() {
                    return Err(BookingError::LimitExceeded("too many resources"));
                }
                let resource = Arc::new(Resource::new(
                    name.to_string(),
                    kind,
                    capacity,
                    policy,
                    self.notify.clone(),
                    self.reservation_index.clone(),
                ));
                slot.insert(resource.clone());
                resource
            }
        };

        info!(resource = name, %kind, capacity, policy = resource.policy_name(), "resource added");
        metrics::gauge!(observability::RESOURCES_ACTIVE).set(self.resource_count.load(Ordering::Acquire) as f64);
        resource.publish(&Event::ResourceAdded { kind, capacity });
        Ok(())
    }

    pub fn book(
        &self,
        name: &str,
        interval: Interval,
        label: impl Into<String>,
        attendees: u32,
    ) -> Result<ReservationId, BookingError> {
        self.book_request(name, BookingRequest::new(interval, label, attendees))
    }

    pub fn book_request(&self, name: &str, request: BookingRequest) -> Result<ReservationId, BookingError> {
        let started = Instant::now();
        let result = self.resolve(name).and_then(|resource| resource.reserve(request));

        metrics::counter!(observability::BOOKINGS_TOTAL, "outcome" => outcome_label(&result)).increment(1);
        metrics::histogram!(observability::BOOK_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        match &result {
            Ok(id) => info!(resource = name, %id, "booking confirmed"),
            Err(e) => debug!(resource = name, error = %e, "booking rejected"),
        }
        result
    }

    pub fn cancel(&self, name: &str, id: ReservationId) -> Result<(), BookingError> {
        self.resolve(name)?.cancel(id)?;
        info!(resource = name, %id, "booking cancelled");
        metrics::counter!(observability::CANCELLATIONS_TOTAL).increment(1);
        Ok(())
    }

    /// Cancel without knowing which resource holds the reservation.
    pub fn cancel_by_id(&self, id: ReservationId) -> Result<String, BookingError> {
        let name = self
            .resource_for_reservation(&id)
            .ok_or(BookingError::NotFound(id))?;
        self.cancel(&name, id)?;
        Ok(name)
    }

    pub fn complete(&self, name: &str, id: ReservationId) -> Result<(), BookingError> {
        self.resolve(name)?.complete(id)?;
        info!(resource = name, %id, "booking completed");
        metrics::counter!(observability::COMPLETIONS_TOTAL).increment(1);
        Ok(())
    }

    pub fn reschedule(&self, name: &str, id: ReservationId, to: Interval) -> Result<(), BookingError> {
        self.resolve(name)?.reschedule(id, to)?;
        info!(resource = name, %id, to = %to, "booking rescheduled");
        Ok(())
    }
}
