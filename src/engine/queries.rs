use std::sync::Arc;

use crate::model::*;

use super::{BookingError, BookingRegistry, Resource};

impl BookingRegistry {
    pub fn resource_status(&self, name: &str) -> Result<ResourceSnapshot, BookingError> {
        Ok(self.resolve(name)?.snapshot())
    }

    pub fn list_active(&self, name: &str) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.resolve(name)?.list_active())
    }

    /// Every resource, ordered by name (case-insensitive).
    pub fn list_all(&self) -> Vec<(String, ResourceSnapshot)> {
        self.sorted_resources()
            .into_iter()
            .map(|resource| (resource.name().to_string(), resource.snapshot()))
            .collect()
    }

    /// Case-insensitive label match among ACTIVE reservations.
    pub fn find_active_by_label(&self, name: &str, label: &str) -> Result<Option<Reservation>, BookingError> {
        let wanted = label.to_lowercase();
        Ok(self
            .resolve(name)?
            .list_active()
            .into_iter()
            .find(|r| r.label.to_lowercase() == wanted))
    }

    /// ACTIVE reservations with `priority` across all resources, ordered by
    /// resource name, then start.
    pub fn list_by_priority(&self, priority: Priority) -> Vec<(String, Reservation)> {
        self.sorted_resources()
            .into_iter()
            .flat_map(|resource| {
                let name = resource.name().to_string();
                resource
                    .list_active()
                    .into_iter()
                    .filter(move |r| r.priority == priority)
                    .map(move |r| (name.clone(), r))
            })
            .collect()
    }

    /// Held reservations plus the retained cancelled and completed ones,
    /// ordered by start.
    pub fn history(&self, name: &str) -> Result<Vec<Reservation>, BookingError> {
        Ok(self.resolve(name)?.history())
    }

    /// Like [`list_by_priority`](Self::list_by_priority), but over
    /// [`history`](Self::history) instead of held reservations only.
    pub fn history_by_priority(&self, priority: Priority) -> Vec<(String, Reservation)> {
        self.sorted_resources()
            .into_iter()
            .flat_map(|resource| {
                let name = resource.name().to_string();
                resource
                    .history()
                    .into_iter()
                    .filter(move |r| r.priority == priority)
                    .map(move |r| (name.clone(), r))
            })
            .collect()
    }

    /// Handles are cloned out before sorting; no shard lock is held while
    /// callers take resource locks.
    fn sorted_resources(&self) -> Vec<Arc<Resource>> {
        let mut entries: Vec<(String, Arc<Resource>)> = self
            .resources
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, resource)| resource).collect()
    }
}
