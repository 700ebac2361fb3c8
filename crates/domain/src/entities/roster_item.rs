//! Roster item: the API view of one calendar event

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::CalendarEvent;
use crate::value_objects::ClassCode;

/// Default cap on the teacher and class lists of a single item
pub const DEFAULT_MAX_ATTENDEES: usize = 20;

/// Textual timestamp format used in roster items
///
/// Renders as `2024-01-08 08:30:00 +0100 CET`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z %Z";

/// Format a timestamp for a roster item
pub fn format_timestamp(dt: &DateTime<Tz>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// One scheduled session as seen by a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterItem {
    pub subject: String,
    pub location: String,
    pub teachers: Vec<String>,
    pub classes: Vec<ClassCode>,
    pub start_time: String,
    pub end_time: String,
    pub comment: String,
}

impl RosterItem {
    /// Derive an item from an event
    ///
    /// A teacher or class list longer than `max_attendees` is replaced by an
    /// empty list; the two lists are capped independently.
    pub fn from_event(event: &CalendarEvent, max_attendees: usize) -> Self {
        let (teachers, classes) = event.partition_attendees();

        Self {
            subject: event.summary.clone(),
            location: event.location.clone(),
            teachers: cap(teachers, max_attendees),
            classes: cap(classes, max_attendees),
            start_time: format_timestamp(&event.start),
            end_time: format_timestamp(&event.end),
            comment: event.comment.clone(),
        }
    }

    /// Whether the (capped) class list contains this code
    pub fn has_class(&self, code: &ClassCode) -> bool {
        self.classes.contains(code)
    }
}

fn cap<T>(list: Vec<T>, max: usize) -> Vec<T> {
    if list.len() > max { Vec::new() } else { list }
}
