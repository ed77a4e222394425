use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::notify::{NotifyHub, Observer, SubscriptionId};

use super::conflict::{ConflictPolicy, check_admission};
use super::{BookingError, resource_key};

/// A bookable, capacity-bounded entity.
///
/// Name, kind, capacity and policy are fixed at creation. The reservation
/// list sits behind a write lock that is held across check-then-insert, so
/// two overlapping requests can never both be admitted.
pub struct Resource {
    name: String,
    kind: ResourceKind,
    capacity: u32,
    policy: Arc<dyn ConflictPolicy>,
    state: RwLock<ResourceState>,
    /// Observers scoped to this resource; notified before `global`.
    observers: NotifyHub,
    global: Arc<NotifyHub>,
    /// Registry-wide reverse index, updated under `state`'s write lock.
    index: Arc<DashMap<ReservationId, String>>,
}

impl Resource {
    pub(super) fn new(
        name: String,
        kind: ResourceKind,
        capacity: u32,
        policy: Arc<dyn ConflictPolicy>,
        global: Arc<NotifyHub>,
        index: Arc<DashMap<ReservationId, String>>,
    ) -> Self {
        Self {
            name,
            kind,
            capacity,
            policy,
            state: RwLock::new(ResourceState::new(kind.default_devices())),
            observers: NotifyHub::new(),
            global,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Must be called with no lock held: observers may call back in.
    pub(super) fn publish(&self, event: &Event) {
        self.observers.publish(&self.name, event);
        self.global.publish(&self.name, event);
    }

    pub(super) fn reserve(&self, request: BookingRequest) -> Result<ReservationId, BookingError> {
        let BookingRequest {
            interval,
            label,
            attendees,
            priority,
        } = request;
        if label.len() > MAX_LABEL_LEN {
            return Err(BookingError::LimitExceeded("label too long"));
        }

        let outcome = {
            let mut guard = self.state.write();
            if guard.reservations.len() >= MAX_RESERVATIONS_PER_RESOURCE {
                return Err(BookingError::LimitExceeded("too many reservations on resource"));
            }
            check_admission(&*self.policy, &guard, self.capacity, &interval, attendees, None).map(|()| {
                let id = Ulid::new();
                guard.insert_reservation(Reservation {
                    id,
                    interval,
                    label: label.clone(),
                    attendees,
                    priority,
                    status: ReservationStatus::Active,
                });
                self.index.insert(id, resource_key(&self.name));
                id
            })
        };

        let event = match &outcome {
            Ok(id) => Event::ReservationConfirmed {
                id: *id,
                interval,
                label,
                attendees,
            },
            Err(e) => Event::ReservationRejected {
                interval,
                label,
                reason: e.to_string(),
            },
        };
        self.publish(&event);
        outcome
    }

    pub(super) fn cancel(&self, id: ReservationId) -> Result<(), BookingError> {
        let label = self.retire(id, ReservationStatus::Cancelled)?;
        self.publish(&Event::ReservationCancelled { id, label });
        Ok(())
    }

    pub(super) fn complete(&self, id: ReservationId) -> Result<(), BookingError> {
        let label = self.retire(id, ReservationStatus::Completed)?;
        self.publish(&Event::ReservationCompleted { id, label });
        Ok(())
    }

    /// ACTIVE -> `status`. Returns the reservation's label.
    fn retire(&self, id: ReservationId, status: ReservationStatus) -> Result<String, BookingError> {
        let mut guard = self.state.write();
        let label = guard
            .retire(id, status)
            .map(|r| r.label.clone())
            .ok_or(BookingError::NotFound(id))?;
        self.index.remove(&id);
        Ok(label)
    }

    /// Move an ACTIVE reservation to `to`. The reservation does not conflict
    /// with itself; on any error nothing changes.
    pub(super) fn reschedule(&self, id: ReservationId, to: Interval) -> Result<(), BookingError> {
        let (label, from) = {
            let mut guard = self.state.write();
            let (from, attendees) = guard
                .active()
                .find(|r| r.id == id)
                .map(|r| (r.interval, r.attendees))
                .ok_or(BookingError::NotFound(id))?;
            check_admission(&*self.policy, &guard, self.capacity, &to, attendees, Some(id))?;

            let Some(mut moved) = guard.remove_reservation(id) else {
                return Err(BookingError::NotFound(id));
            };
            moved.interval = to;
            let label = moved.label.clone();
            guard.insert_reservation(moved);
            (label, from)
        };
        self.publish(&Event::ReservationRescheduled { id, label, from, to });
        Ok(())
    }

    /// ACTIVE reservations ordered by start.
    pub fn list_active(&self) -> Vec<Reservation> {
        self.state.read().active().cloned().collect()
    }

    /// Held reservations plus the retained retired ones, ordered by start.
    pub fn history(&self) -> Vec<Reservation> {
        self.state.read().history()
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        let guard = self.state.read();
        let active: Vec<Reservation> = guard.active().cloned().collect();
        ResourceSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            capacity: self.capacity,
            policy: self.policy.name().to_string(),
            occupied: !active.is_empty(),
            active_count: active.len(),
            cancelled_count: guard.cancelled_total,
            completed_count: guard.completed_total,
            active,
            devices: guard.devices.clone(),
        }
    }

    pub(super) fn with_state_mut<R>(&self, f: impl FnOnce(&mut ResourceState) -> R) -> R {
        f(&mut self.state.write())
    }
}
