use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::clock::format_hhmm;
use crate::limits::{MAX_RETIRED_PER_RESOURCE, MINUTES_PER_DAY};

/// Minutes since midnight. The only time type.
pub type Minutes = u32;

pub type ReservationId = Ulid;

/// Half-open interval `[start, end)` within a single day.
///
/// Always satisfies `start < end <= MINUTES_PER_DAY`; the only way in is
/// [`Interval::new`] (or deserialization, which goes through it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: Minutes,
    end: Minutes,
}

#[derive(Deserialize)]
struct RawInterval {
    start: Minutes,
    end: Minutes,
}

impl TryFrom<RawInterval> for Interval {
    type Error = InvalidInterval;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Interval::new(raw.start, raw.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidInterval {
    pub start: Minutes,
    pub end: Minutes,
}

impl fmt::Display for InvalidInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start >= self.end {
            write!(f, "interval start {} must be before end {}", self.start, self.end)
        } else {
            write!(f, "interval end {} runs past midnight ({MINUTES_PER_DAY})", self.end)
        }
    }
}

impl std::error::Error for InvalidInterval {}

impl Interval {
    pub fn new(start: Minutes, end: Minutes) -> Result<Self, InvalidInterval> {
        if start >= end || end > MINUTES_PER_DAY {
            return Err(InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Minutes {
        self.start
    }

    pub fn end(&self) -> Minutes {
        self.end
    }

    pub fn duration(&self) -> Minutes {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }

}

/// Half-open overlap test. Back-to-back intervals do not overlap.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && b.start < a.end
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Active,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl fmt::Display for UnknownPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority {:?} (expected high, medium or low)", self.0)
    }
}

impl std::error::Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(UnknownPriority(s.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(s)
    }
}

/// A granted booking. Owned by the resource that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub interval: Interval,
    pub label: String,
    pub attendees: u32,
    pub priority: Priority,
    pub status: ReservationStatus,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Active => "ACTIVE",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

/// Everything needed to ask for a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub interval: Interval,
    pub label: String,
    pub attendees: u32,
    pub priority: Priority,
}

impl BookingRequest {
    pub fn new(interval: Interval, label: impl Into<String>, attendees: u32) -> Self {
        Self {
            interval,
            label: label.into(),
            attendees,
            priority: Priority::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

// ── Resource kinds and devices ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomLayout {
    Conference,
    Meeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Generic,
    Room { layout: RoomLayout },
}

/// Kind discriminant used to pick a conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindTag {
    Generic,
    Room,
}

impl ResourceKind {
    pub fn tag(&self) -> KindTag {
        match self {
            ResourceKind::Generic => KindTag::Generic,
            ResourceKind::Room { .. } => KindTag::Room,
        }
    }

    /// Devices a freshly created resource of this kind comes with (all off).
    pub fn default_devices(&self) -> Vec<Device> {
        let kinds: &[DeviceKind] = match self {
            ResourceKind::Generic => &[],
            ResourceKind::Room { layout: RoomLayout::Conference } => {
                &[DeviceKind::Lights, DeviceKind::AirConditioner, DeviceKind::Projector]
            }
            ResourceKind::Room { layout: RoomLayout::Meeting } => {
                &[DeviceKind::Lights, DeviceKind::AirConditioner, DeviceKind::Whiteboard]
            }
        };
        kinds.iter().map(|&kind| Device { kind, on: false }).collect()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Generic => f.write_str("Generic"),
            ResourceKind::Room { layout: RoomLayout::Conference } => f.write_str("Conference Room"),
            ResourceKind::Room { layout: RoomLayout::Meeting } => f.write_str("Meeting Room"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Lights,
    AirConditioner,
    Projector,
    Whiteboard,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceKind::Lights => "Lights",
            DeviceKind::AirConditioner => "Air Conditioner",
            DeviceKind::Projector => "Projector",
            DeviceKind::Whiteboard => "Whiteboard",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub kind: DeviceKind,
    pub on: bool,
}

// ── Mutable per-resource state ───────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    /// Held reservations, sorted by `interval.start`.
    pub reservations: Vec<Reservation>,
    /// Cancelled and completed reservations, oldest first. Bounded by
    /// `MAX_RETIRED_PER_RESOURCE`; the oldest entry is dropped on overflow.
    pub retired: VecDeque<Reservation>,
    pub cancelled_total: u64,
    pub completed_total: u64,
    pub devices: Vec<Device>,
}

impl ResourceState {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    /// Insert reservation maintaining sort order by interval start.
    pub fn insert_reservation(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .partition_point(|r| r.interval.start <= reservation.interval.start);
        self.reservations.insert(pos, reservation);
    }

    /// Remove reservation by id.
    pub fn remove_reservation(&mut self, id: ReservationId) -> Option<Reservation> {
        let pos = self.reservations.iter().position(|r| r.id == id)?;
        Some(self.reservations.remove(pos))
    }

    /// Move an ACTIVE reservation into the retired log with `status`.
    pub fn retire(&mut self, id: ReservationId, status: ReservationStatus) -> Option<&Reservation> {
        let pos = self.reservations.iter().position(|r| r.id == id && r.is_active())?;
        let mut reservation = self.reservations.remove(pos);
        reservation.status = status;
        match status {
            ReservationStatus::Cancelled => self.cancelled_total += 1,
            ReservationStatus::Completed => self.completed_total += 1,
            ReservationStatus::Active => {}
        }
        if self.retired.len() >= MAX_RETIRED_PER_RESOURCE {
            self.retired.pop_front();
        }
        self.retired.push_back(reservation);
        self.retired.back()
    }

    /// Held and retained retired reservations, ordered by start.
    pub fn history(&self) -> Vec<Reservation> {
        let mut all: Vec<Reservation> = self.reservations.iter().chain(&self.retired).cloned().collect();
        all.sort_by_key(|r| r.interval.start);
        all
    }

    pub fn active(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.iter().filter(|r| r.is_active())
    }

    /// Return reservations (any status) whose interval overlaps `query`.
    /// Uses binary search to skip reservations starting at or after `query.end`.
    pub fn overlapping(&self, query: &Interval) -> impl Iterator<Item = &Reservation> {
        let right_bound = self
            .reservations
            .partition_point(|r| r.interval.start < query.end);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.interval.end > query.start)
    }
}

// ── Notification payloads ────────────────────────────────────────

/// Structured notification published on booking-state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ResourceAdded {
        kind: ResourceKind,
        capacity: u32,
    },
    ReservationConfirmed {
        id: ReservationId,
        interval: Interval,
        label: String,
        attendees: u32,
    },
    ReservationRejected {
        interval: Interval,
        label: String,
        reason: String,
    },
    ReservationRescheduled {
        id: ReservationId,
        label: String,
        from: Interval,
        to: Interval,
    },
    ReservationCancelled {
        id: ReservationId,
        label: String,
    },
    ReservationCompleted {
        id: ReservationId,
        label: String,
    },
    DeviceSwitched {
        device: DeviceKind,
        on: bool,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::ResourceAdded { kind, capacity } => {
                write!(f, "{kind} added with capacity {capacity}")
            }
            Event::ReservationConfirmed { interval, label, attendees, .. } => {
                write!(f, "booked {interval} for {attendees} attendee(s): {label}")
            }
            Event::ReservationRejected { interval, label, reason } => {
                write!(f, "booking {label} at {interval} rejected: {reason}")
            }
            Event::ReservationRescheduled { label, from, to, .. } => {
                write!(f, "{label} moved from {from} to {to}")
            }
            Event::ReservationCancelled { label, .. } => write!(f, "booking cancelled: {label}"),
            Event::ReservationCompleted { label, .. } => write!(f, "completed: {label}"),
            Event::DeviceSwitched { device, on } => {
                write!(f, "{device} turned {}", if *on { "ON" } else { "OFF" })
            }
        }
    }
}

// ── Query result types ───────────────────────────────────────────

/// Read-only copy of a resource, detached from live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSnapshot {
    pub name: String,
    pub kind: ResourceKind,
    pub capacity: u32,
    pub policy: String,
    pub occupied: bool,
    pub active_count: usize,
    pub cancelled_count: u64,
    pub completed_count: u64,
    /// Ordered by interval start.
    pub active: Vec<Reservation>,
    pub devices: Vec<Device>,
}
