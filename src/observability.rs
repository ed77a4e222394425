use crate::engine::BookingError;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: booking attempts. Labels: outcome.
pub const BOOKINGS_TOTAL: &str = "slotkeeper_bookings_total";

/// Histogram: time spent inside a booking call, in seconds.
pub const BOOK_DURATION_SECONDS: &str = "slotkeeper_book_duration_seconds";

/// Counter: successful cancellations.
pub const CANCELLATIONS_TOTAL: &str = "slotkeeper_cancellations_total";

/// Counter: reservations marked completed.
pub const COMPLETIONS_TOTAL: &str = "slotkeeper_completions_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: resources in the registry.
pub const RESOURCES_ACTIVE: &str = "slotkeeper_resources_active";

/// Counter: observer deliveries that returned an error or panicked.
pub const OBSERVER_FAILURES_TOTAL: &str = "slotkeeper_observer_failures_total";

/// Map a booking result to a short label for metrics.
pub fn outcome_label<T>(result: &Result<T, BookingError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(BookingError::ResourceNotFound(_)) => "resource_not_found",
        Err(BookingError::DuplicateResource(_)) => "duplicate_resource",
        Err(BookingError::CapacityExceeded { .. }) => "capacity_exceeded",
        Err(BookingError::ConflictDetected { .. }) => "conflict",
        Err(BookingError::NotFound(_)) => "not_found",
        Err(BookingError::InvalidInterval(_)) => "invalid_interval",
        Err(BookingError::NotARoom(_)) => "not_a_room",
        Err(BookingError::LimitExceeded(_)) => "limit_exceeded",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn labels() {
        assert_eq!(outcome_label(&Ok::<(), BookingError>(())), "ok");
        assert_eq!(
            outcome_label::<()>(&Err(BookingError::ConflictDetected {
                id: Ulid::new(),
                label: "x".into(),
            })),
            "conflict"
        );
        assert_eq!(
            outcome_label::<()>(&Err(BookingError::CapacityExceeded { requested: 12, capacity: 10 })),
            "capacity_exceeded"
        );
    }
}
