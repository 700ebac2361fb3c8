//! Calendar event parsed from the feed

use chrono::DateTime;
use chrono_tz::Tz;

use crate::value_objects::{Attendee, ClassCode};

/// A single VEVENT from the feed
///
/// Immutable once parsed; a refresh produces an entirely new set of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Event title (SUMMARY), usually the subject being taught
    pub summary: String,
    /// Room or venue (LOCATION)
    pub location: String,
    /// Start time in the event's own zone
    pub start: DateTime<Tz>,
    /// End time in the event's own zone
    pub end: DateTime<Tz>,
    /// Free-text comment (COMMENT)
    pub comment: String,
    /// Attendees in feed order
    pub attendees: Vec<Attendee>,
}

impl CalendarEvent {
    /// Create an event with empty location, comment and attendee list
    pub fn new(summary: impl Into<String>, start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self {
            summary: summary.into(),
            location: String::new(),
            start,
            end,
            comment: String::new(),
            attendees: Vec::new(),
        }
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Add an attendee
    #[must_use]
    pub fn with_attendee(mut self, attendee: impl Into<Attendee>) -> Self {
        self.attendees.push(attendee.into());
        self
    }

    /// Attendees classified as class codes, in feed order
    pub fn class_codes(&self) -> impl Iterator<Item = ClassCode> + '_ {
        self.attendees.iter().filter_map(Attendee::as_class_code)
    }

    /// Whether any attendee is exactly this class code
    pub fn has_attendee(&self, code: &ClassCode) -> bool {
        self.attendees.iter().any(|a| a.matches(code))
    }

    /// Split attendees into teacher names and class codes, preserving order
    pub fn partition_attendees(&self) -> (Vec<String>, Vec<ClassCode>) {
        let mut teachers = Vec::new();
        let mut classes = Vec::new();

        for attendee in &self.attendees {
            match attendee.as_class_code() {
                Some(code) => classes.push(code),
                None => teachers.push(attendee.display_name().to_string()),
            }
        }

        (teachers, classes)
    }
}
