use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::*;

use super::BookingError;

/// Decides whether a candidate interval may coexist with the ACTIVE
/// reservations already held by a resource.
pub trait ConflictPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// First ACTIVE reservation that blocks `candidate`, skipping `ignore`
    /// (the reservation being moved, when rescheduling).
    fn find_conflict<'a>(
        &self,
        held: &'a ResourceState,
        candidate: &Interval,
        ignore: Option<ReservationId>,
    ) -> Option<&'a Reservation>;
}

/// Half-open interval overlap. Back-to-back reservations coexist.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlapPolicy;

impl ConflictPolicy for OverlapPolicy {
    fn name(&self) -> &'static str {
        "overlap"
    }

    fn find_conflict<'a>(
        &self,
        held: &'a ResourceState,
        candidate: &Interval,
        ignore: Option<ReservationId>,
    ) -> Option<&'a Reservation> {
        held.overlapping(candidate)
            .find(|r| r.is_active() && Some(r.id) != ignore)
    }
}

/// Single booking at a time: any ACTIVE reservation blocks, whatever its time.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExclusiveOccupancyPolicy;

impl ConflictPolicy for ExclusiveOccupancyPolicy {
    fn name(&self) -> &'static str {
        "exclusive"
    }

    fn find_conflict<'a>(
        &self,
        held: &'a ResourceState,
        _candidate: &Interval,
        ignore: Option<ReservationId>,
    ) -> Option<&'a Reservation> {
        held.active().find(|r| Some(r.id) != ignore)
    }
}

/// Built-in policy selector, used by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyKind {
    #[default]
    Overlap,
    ExclusiveOccupancy,
}

impl PolicyKind {
    pub fn build(self) -> Arc<dyn ConflictPolicy> {
        match self {
            PolicyKind::Overlap => Arc::new(OverlapPolicy),
            PolicyKind::ExclusiveOccupancy => Arc::new(ExclusiveOccupancyPolicy),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overlap" => Ok(PolicyKind::Overlap),
            "exclusive" | "exclusive_occupancy" => Ok(PolicyKind::ExclusiveOccupancy),
            other => Err(format!("unknown conflict policy: {other}")),
        }
    }
}

/// Capacity first, then the policy. Pure: the caller holds the write lock
/// and inserts only if this returns `Ok`.
pub(crate) fn check_admission(
    policy: &dyn ConflictPolicy,
    held: &ResourceState,
    capacity: u32,
    candidate: &Interval,
    attendees: u32,
    ignore: Option<ReservationId>,
) -> Result<(), BookingError> {
    if attendees > capacity {
        return Err(BookingError::CapacityExceeded {
            requested: attendees,
            capacity,
        });
    }
    if let Some(blocking) = policy.find_conflict(held, candidate, ignore) {
        return Err(BookingError::ConflictDetected {
            id: blocking.id,
            label: blocking.label.clone(),
        });
    }
    Ok(())
}
