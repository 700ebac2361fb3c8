//! RRULE expansion for recurring lessons
//!
//! A recurring VEVENT is expanded into one event per occurrence inside a
//! window around the parse time. EXDATEs remove occurrences; the caller drops
//! occurrences replaced by a RECURRENCE-ID override.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use domain::{CalendarEvent, DomainError};
use rrule::{RRuleSet, Tz as RRuleTz};
use tracing::warn;

/// Upper bound on occurrences produced by a single rule
const MAX_OCCURRENCES: u16 = 1000;

/// Span around "now" in which recurring events are expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceWindow {
    /// How far back occurrences are kept
    pub past: Duration,
    /// How far ahead occurrences are generated
    pub future: Duration,
}

impl Default for RecurrenceWindow {
    /// One day back, ninety days ahead
    fn default() -> Self {
        Self {
            past: Duration::days(1),
            future: Duration::days(90),
        }
    }
}

impl RecurrenceWindow {
    pub const fn new(past: Duration, future: Duration) -> Self {
        Self { past, future }
    }

    /// Inclusive bounds of the window relative to `now`
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.past, now + self.future)
    }
}

/// RRULE value and exception dates of one master event
#[derive(Debug, Clone)]
pub(crate) struct RecurrenceRule {
    pub(crate) rrule: String,
    pub(crate) exdates: Vec<DateTime<Tz>>,
}

impl RecurrenceRule {
    /// Occurrences of `master` whose start lies within `[from, until]`
    ///
    /// Every occurrence keeps the master's zone, fields and duration.
    pub(crate) fn expand(
        &self,
        master: &CalendarEvent,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, DomainError> {
        let zone = master.start.timezone();

        let mut lines = vec![
            stamp("DTSTART", &master.start),
            format!("RRULE:{}", self.rrule),
        ];
        lines.extend(
            self.exdates
                .iter()
                .map(|exdate| stamp("EXDATE", &exdate.with_timezone(&zone))),
        );

        let set: RRuleSet = lines
            .join("\n")
            .parse()
            .map_err(|e| DomainError::ValidationError(format!("invalid RRULE: {e}")))?;

        // after/before are exclusive
        let utc: RRuleTz = Utc.into();
        let result = set
            .after((from - Duration::seconds(1)).with_timezone(&utc))
            .before((until + Duration::seconds(1)).with_timezone(&utc))
            .all(MAX_OCCURRENCES);

        if result.limited {
            warn!(
                summary = %master.summary,
                limit = MAX_OCCURRENCES,
                "Recurring event truncated"
            );
        }

        let duration = master.end - master.start;
        Ok(result
            .dates
            .iter()
            .map(|occurrence| {
                let start = occurrence.with_timezone(&zone);
                CalendarEvent {
                    start,
                    end: start + duration,
                    ..master.clone()
                }
            })
            .collect())
    }
}

/// `NAME:...Z` for UTC, `NAME;TZID=<iana>:...` otherwise
fn stamp(name: &str, at: &DateTime<Tz>) -> String {
    if at.timezone() == Tz::UTC {
        format!("{name}:{}", at.format("%Y%m%dT%H%M%SZ"))
    } else {
        format!(
            "{name};TZID={}:{}",
            at.timezone().name(),
            at.format("%Y%m%dT%H%M%S")
        )
    }
}
