use crate::model::Minutes;

/// One day in minutes. Interval ends may equal this (`[23:00, 24:00)`).
pub const MINUTES_PER_DAY: Minutes = 1440;

pub const MAX_NAME_LEN: usize = 64;
pub const MAX_LABEL_LEN: usize = 256;
pub const MAX_RESOURCES: usize = 1024;
/// Held (ACTIVE) reservations only.
pub const MAX_RESERVATIONS_PER_RESOURCE: usize = 10_000;
/// Retired reservations kept for history; older ones are dropped.
pub const MAX_RETIRED_PER_RESOURCE: usize = 1_000;
