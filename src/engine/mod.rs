mod conflict;
mod devices;
mod error;
mod mutations;
mod queries;
mod resource;

pub use conflict::{ConflictPolicy, ExclusiveOccupancyPolicy, OverlapPolicy, PolicyKind};
pub use devices::DeviceCommandOutcome;
pub use error::BookingError;
pub use resource::Resource;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use dashmap::DashMap;

use crate::model::*;
use crate::notify::{NotifyHub, Observer, SubscriptionId};

/// Which built-in conflict policy each resource kind gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub generic_policy: PolicyKind,
    pub room_policy: PolicyKind,
}

impl RegistryConfig {
    pub fn policy_for(&self, tag: KindTag) -> PolicyKind {
        match tag {
            KindTag::Generic => self.generic_policy,
            KindTag::Room => self.room_policy,
        }
    }
}

/// The process-wide catalogue of resources.
///
/// Construct one at startup and pass it to every caller; there is no
/// hidden global. Lookups are case-insensitive.
pub struct BookingRegistry {
    /// Keyed by lowercased name.
    resources: DashMap<String, Arc<Resource>>,
    /// Reverse lookup: active reservation id → resource key. Shared with
    /// every resource, which maintains it under its own write lock.
    reservation_index: Arc<DashMap<ReservationId, String>>,
    /// Admitted resources, counted inside the insert so the cap holds
    /// under concurrent adds.
    resource_count: AtomicUsize,
    notify: Arc<NotifyHub>,
    config: RegistryConfig,
}

impl Default for BookingRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

pub(crate) fn resource_key(name: &str) -> String {
    name.to_lowercase()
}

impl BookingRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            resources: DashMap::new(),
            reservation_index: Arc::new(DashMap::new()),
            resource_count: AtomicUsize::new(0),
            notify: Arc::new(NotifyHub::new()),
            config,
        }
    }

    /// Registry pre-populated with `CR1` (conference room, 10 seats) and
    /// `MR1` (meeting room, 5 seats).
    pub fn seeded(config: RegistryConfig) -> Result<Self, BookingError> {
        let registry = Self::new(config);
        registry.add_resource("CR1", 10, ResourceKind::Room { layout: RoomLayout::Conference })?;
        registry.add_resource("MR1", 5, ResourceKind::Room { layout: RoomLayout::Meeting })?;
        Ok(registry)
    }

    pub fn config(&self) -> RegistryConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Observers notified of every event on every resource.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriptionId {
        self.notify.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notify.unsubscribe(id)
    }

    /// Observer notified only of events on `name`.
    pub fn subscribe_to(&self, name: &str, observer: Arc<dyn Observer>) -> Result<SubscriptionId, BookingError> {
        Ok(self.resolve(name)?.subscribe(observer))
    }

    pub fn get_resource(&self, name: &str) -> Option<Arc<Resource>> {
        self.resources
            .get(&resource_key(name))
            .map(|e| e.value().clone())
    }

    /// Name of the resource holding an active reservation.
    pub fn resource_for_reservation(&self, id: &ReservationId) -> Option<String> {
        let key = self.reservation_index.get(id).map(|e| e.value().clone())?;
        self.resources.get(&key).map(|e| e.value().name().to_string())
    }

    /// Clones the handle out so no map shard stays locked while the
    /// resource is in use.
    pub(super) fn resolve(&self, name: &str) -> Result<Arc<Resource>, BookingError> {
        self.get_resource(name)
            .ok_or_else(|| BookingError::ResourceNotFound(name.to_string()))
    }
}
