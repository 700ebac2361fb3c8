//! Roster snapshot and the queries answered from it

use std::collections::HashSet;

use super::{CalendarEvent, RosterItem};
use crate::value_objects::ClassCode;

/// The full ordered set of events from one parse of the feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    events: Vec<CalendarEvent>,
}

impl Roster {
    /// Create a roster from parsed events
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    /// Events in feed order
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the roster holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Every distinct class code referenced by any event
    ///
    /// Order is first occurrence in the feed. The attendee cap does not apply.
    pub fn class_codes(&self) -> Vec<ClassCode> {
        let mut seen = HashSet::new();
        self.events
            .iter()
            .flat_map(CalendarEvent::class_codes)
            .filter(|code| seen.insert(code.clone()))
            .collect()
    }

    /// Roster items for every event whose capped class list contains `code`
    pub fn items_for(&self, code: &ClassCode, max_attendees: usize) -> Vec<RosterItem> {
        self.events
            .iter()
            .filter(|event| event.has_attendee(code))
            .map(|event| RosterItem::from_event(event, max_attendees))
            .filter(|item| item.has_class(code))
            .collect()
    }
}

impl From<Vec<CalendarEvent>> for Roster {
    fn from(events: Vec<CalendarEvent>) -> Self {
        Self::new(events)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Tz;

    use super::*;
    use crate::entities::DEFAULT_MAX_ATTENDEES;

    fn event(summary: &str, attendees: &[&str]) -> CalendarEvent {
        let start = Tz::UTC.with_ymd_and_hms(2024, 1, 8, 8, 30, 0).unwrap();
        let end = Tz::UTC.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap();
        attendees
            .iter()
            .fold(CalendarEvent::new(summary, start, end), |e, a| e.with_attendee(*a))
    }

    #[test]
    fn empty_roster_has_no_codes() {
        let roster = Roster::default();
        assert!(roster.is_empty());
        assert!(roster.class_codes().is_empty());
    }

    #[test]
    fn class_codes_are_deduplicated_in_first_seen_order() {
        let roster = Roster::new(vec![
            event("A", &["Jane Doe", "IC_INF1B", "IC_INF1A"]),
            event("B", &["IC_INF1A", "John Roe", "IC_INF2A"]),
        ]);
        assert_eq!(
            roster.class_codes(),
            vec![
                ClassCode::new("IC_INF1B"),
                ClassCode::new("IC_INF1A"),
                ClassCode::new("IC_INF2A"),
            ]
        );
    }

    #[test]
    fn items_for_returns_every_matching_session() {
        let roster = Roster::new(vec![
            event("Maths", &["Jane Doe", "IC_INF1A"]),
            event("Physics", &["John Roe", "IC_INF1B"]),
            event("Maths", &["Jane Doe", "IC_INF1A"]),
        ]);
        let items = roster.items_for(&ClassCode::new("IC_INF1A"), DEFAULT_MAX_ATTENDEES);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.subject == "Maths"));
    }

    #[test]
    fn items_for_unknown_code_is_empty() {
        let roster = Roster::new(vec![event("Maths", &["IC_INF1A"])]);
        assert!(roster
            .items_for(&ClassCode::new("IC_NOPE"), DEFAULT_MAX_ATTENDEES)
            .is_empty());
    }

    #[test]
    fn items_for_does_not_match_teacher_names() {
        let roster = Roster::new(vec![event("Maths", &["Jane Doe"])]);
        assert!(roster
            .items_for(&ClassCode::new("Jane Doe"), DEFAULT_MAX_ATTENDEES)
            .is_empty());
    }

    #[test]
    fn items_for_skips_events_whose_classes_were_capped() {
        let many: Vec<String> = (0..21).map(|i| format!("IC_{i}")).collect();
        let many: Vec<&str> = many.iter().map(String::as_str).collect();
        let roster = Roster::new(vec![event("Assembly", &many)]);
        assert!(roster
            .items_for(&ClassCode::new("IC_3"), DEFAULT_MAX_ATTENDEES)
            .is_empty());
        // the code is still listed as a class
        assert!(roster.class_codes().contains(&ClassCode::new("IC_3")));
    }

    #[test]
    fn preserves_feed_order() {
        let roster = Roster::from(vec![event("first", &[]), event("second", &[])]);
        assert_eq!(roster.events()[0].summary, "first");
        assert_eq!(roster.len(), 2);
    }
}
