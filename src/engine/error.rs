use crate::model::{InvalidInterval, ReservationId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    ResourceNotFound(String),
    DuplicateResource(String),
    CapacityExceeded { requested: u32, capacity: u32 },
    /// Carries the id and label of the held reservation that blocked the request.
    ConflictDetected { id: ReservationId, label: String },
    /// No ACTIVE reservation with this id.
    NotFound(ReservationId),
    InvalidInterval(InvalidInterval),
    NotARoom(String),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::ResourceNotFound(name) => write!(f, "resource not found: {name}"),
            BookingError::DuplicateResource(name) => write!(f, "resource already exists: {name}"),
            BookingError::CapacityExceeded { requested, capacity } => {
                write!(f, "{requested} attendees exceed capacity {capacity}")
            }
            BookingError::ConflictDetected { label, .. } => write!(f, "conflicts with: {label}"),
            BookingError::NotFound(id) => write!(f, "no active reservation: {id}"),
            BookingError::InvalidInterval(e) => write!(f, "invalid interval: {e}"),
            BookingError::NotARoom(name) => write!(f, "{name} is not a room and has no devices"),
            BookingError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<InvalidInterval> for BookingError {
    fn from(e: InvalidInterval) -> Self {
        BookingError::InvalidInterval(e)
    }
}
