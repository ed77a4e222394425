//! `HH:MM` text adapter. The booking core only ever sees [`Interval`]s;
//! everything malformed is rejected here first.

use std::fmt;

use crate::limits::MINUTES_PER_DAY;
use crate::model::{Interval, InvalidInterval, Minutes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    Malformed(String),
    OutOfRange(String),
    ZeroDuration,
    Interval(InvalidInterval),
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::Malformed(s) => write!(f, "malformed time {s:?} (expected HH:MM)"),
            ClockError::OutOfRange(s) => write!(f, "time {s:?} out of range 00:00..23:59"),
            ClockError::ZeroDuration => f.write_str("duration must be positive"),
            ClockError::Interval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ClockError {}

impl From<InvalidInterval> for ClockError {
    fn from(e: InvalidInterval) -> Self {
        ClockError::Interval(e)
    }
}

/// Parse 24-hour `HH:MM` (one- or two-digit hour) into minutes since midnight.
pub fn parse_hhmm(text: &str) -> Result<Minutes, ClockError> {
    let trimmed = text.trim();
    let (h, m) = trimmed
        .split_once(':')
        .ok_or_else(|| ClockError::Malformed(trimmed.to_string()))?;
    let digits = |s: &str, max_len: usize| {
        !s.is_empty() && s.len() <= max_len && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(h, 2) || m.len() != 2 || !digits(m, 2) {
        return Err(ClockError::Malformed(trimmed.to_string()));
    }
    let hours: Minutes = h.parse().map_err(|_| ClockError::Malformed(trimmed.to_string()))?;
    let minutes: Minutes = m.parse().map_err(|_| ClockError::Malformed(trimmed.to_string()))?;
    if hours > 23 || minutes > 59 {
        return Err(ClockError::OutOfRange(trimmed.to_string()));
    }
    Ok(hours * 60 + minutes)
}

/// Format minutes since midnight as `HH:MM`. `1440` renders as `24:00`.
pub fn format_hhmm(t: Minutes) -> String {
    format!("{:02}:{:02}", t / 60, t % 60)
}

/// `[start, start + duration)`; fails if the booking would run past midnight.
pub fn interval_from_hhmm(start: &str, duration: Minutes) -> Result<Interval, ClockError> {
    if duration == 0 {
        return Err(ClockError::ZeroDuration);
    }
    let start = parse_hhmm(start)?;
    let end = start.saturating_add(duration).min(MINUTES_PER_DAY + 1);
    Ok(Interval::new(start, end)?)
}

/// `[start, end)` from two clock readings.
pub fn interval_between(start: &str, end: &str) -> Result<Interval, ClockError> {
    let start = parse_hhmm(start)?;
    let end = parse_hhmm(end)?;
    Ok(Interval::new(start, end)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        assert_eq!(parse_hhmm("00:00"), Ok(0));
        assert_eq!(parse_hhmm("09:30"), Ok(570));
        assert_eq!(parse_hhmm("9:05"), Ok(545));
        assert_eq!(parse_hhmm(" 23:59 "), Ok(1439));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(parse_hhmm("0930"), Err(ClockError::Malformed(_))));
        assert!(matches!(parse_hhmm("9:5"), Err(ClockError::Malformed(_))));
        assert!(matches!(parse_hhmm("ab:cd"), Err(ClockError::Malformed(_))));
        assert!(matches!(parse_hhmm("-1:00"), Err(ClockError::Malformed(_))));
        assert!(matches!(parse_hhmm(""), Err(ClockError::Malformed(_))));
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert!(matches!(parse_hhmm("24:00"), Err(ClockError::OutOfRange(_))));
        assert!(matches!(parse_hhmm("12:60"), Err(ClockError::OutOfRange(_))));
    }

    #[test]
    fn format_pads() {
        assert_eq!(format_hhmm(0), "00:00");
        assert_eq!(format_hhmm(545), "09:05");
        assert_eq!(format_hhmm(1440), "24:00");
    }

    #[test]
    fn interval_from_start_and_duration() {
        let i = interval_from_hhmm("09:00", 60).unwrap();
        assert_eq!((i.start(), i.end()), (540, 600));
        assert_eq!(interval_from_hhmm("23:00", 60).unwrap().end(), 1440);
    }

    #[test]
    fn interval_past_midnight_rejected() {
        assert!(matches!(
            interval_from_hhmm("23:30", 60),
            Err(ClockError::Interval(_))
        ));
        assert!(matches!(
            interval_from_hhmm("23:30", Minutes::MAX),
            Err(ClockError::Interval(_))
        ));
    }

    #[test]
    fn zero_duration_rejected() {
        assert_eq!(interval_from_hhmm("09:00", 0), Err(ClockError::ZeroDuration));
    }

    #[test]
    fn interval_between_clock_readings() {
        assert_eq!(interval_between("09:00", "10:00").unwrap().duration(), 60);
        assert!(interval_between("10:00", "09:00").is_err());
        assert!(interval_between("10:00", "10:00").is_err());
    }
}
