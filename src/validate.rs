//! Field-level validation
//!
//! Pure functions, no I/O. Every failure is `InvalidInput`; nothing is
//! auto-corrected before it reaches the store.

use chrono::{DateTime, Utc};

use crate::db::schemas::{AssignmentStatus, Availability, Event};
use crate::types::{Result, RosterError};

/// Validate an availability window against the invariants: non-empty
/// employee id, non-zero timestamps, end not before start, start not
/// strictly in the past at `now` (the comparison instant is the caller's,
/// not wall-clock time inside this function).
pub fn validate_availability(availability: &Availability, now: DateTime<Utc>) -> Result<()> {
    if availability.employee_id.trim().is_empty() {
        return Err(RosterError::InvalidInput(
            "employee id must not be empty".to_string(),
        ));
    }
    if availability.start.timestamp() == 0 || availability.end.timestamp() == 0 {
        return Err(RosterError::InvalidInput(
            "start and end must be set".to_string(),
        ));
    }
    if availability.end < availability.start {
        return Err(RosterError::InvalidInput(
            "end must not be before start".to_string(),
        ));
    }
    if availability.start < now {
        return Err(RosterError::InvalidInput(
            "start must not be in the past".to_string(),
        ));
    }
    Ok(())
}

/// Parse a duty-assignment status literal; only the two enum literals are
/// accepted.
pub fn parse_assignment_status(literal: &str) -> Result<AssignmentStatus> {
    literal.parse()
}

/// Validate an event before it reaches the store: non-empty id and venue,
/// end not before start.
pub fn validate_event(event: &Event) -> Result<()> {
    if event.id.trim().is_empty() {
        return Err(RosterError::InvalidInput(
            "event id must not be empty".to_string(),
        ));
    }
    if event.venue.trim().is_empty() {
        return Err(RosterError::InvalidInput(
            "venue must not be empty".to_string(),
        ));
    }
    if event.end < event.start {
        return Err(RosterError::InvalidInput(
            "end must not be before start".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::ContactPerson;
    use chrono::{Duration, TimeZone};

    fn window(employee: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Availability {
        Availability::new(employee, start, end)
    }

    #[test]
    fn test_valid_window_accepted() {
        let now = Utc::now();
        let availability = window("e1", now + Duration::hours(1), now + Duration::hours(2));
        assert!(validate_availability(&availability, now).is_ok());
    }

    #[test]
    fn test_empty_employee_rejected() {
        let now = Utc::now();
        let availability = window("", now + Duration::hours(1), now + Duration::hours(2));
        assert!(matches!(
            validate_availability(&availability, now),
            Err(RosterError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let now = Utc::now();
        let availability = window("e1", now + Duration::hours(2), now + Duration::hours(1));
        let err = validate_availability(&availability, now).unwrap_err();
        assert!(err.to_string().contains("before start"));
    }

    #[test]
    fn test_past_start_rejected() {
        let now = Utc::now();
        let availability = window("e1", now - Duration::minutes(5), now + Duration::hours(1));
        let err = validate_availability(&availability, now).unwrap_err();
        assert!(err.to_string().contains("past"));
    }

    #[test]
    fn test_start_exactly_now_accepted() {
        let now = Utc::now();
        let availability = window("e1", now, now + Duration::hours(1));
        assert!(validate_availability(&availability, now).is_ok());
    }

    #[test]
    fn test_zero_timestamp_rejected() {
        let now = Utc::now();
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        let availability = window("e1", epoch, now + Duration::hours(1));
        assert!(matches!(
            validate_availability(&availability, now),
            Err(RosterError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_assignment_status_literals() {
        assert!(parse_assignment_status("Completed").is_ok());
        assert!(parse_assignment_status("Incomplete").is_ok());
        assert!(matches!(
            parse_assignment_status("done"),
            Err(RosterError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_event_ordering_rejected() {
        let now = Utc::now();
        let mut event = Event::new(
            now + Duration::hours(2),
            now + Duration::hours(1),
            "addr",
            "venue",
            "",
            0,
            ContactPerson::default(),
        );
        assert!(validate_event(&event).is_err());

        event.end = event.start + Duration::hours(3);
        assert!(validate_event(&event).is_ok());

        event.venue = String::new();
        assert!(validate_event(&event).is_err());
    }
}
