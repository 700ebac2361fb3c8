//! ICS parsing
//!
//! Pulls the fields the roster needs out of every VEVENT. TZID parameters go
//! through a [`TimezoneResolver`] so feed-specific zone names map onto IANA
//! zones before any timestamp is interpreted. Recurring events are expanded
//! within a [`RecurrenceWindow`] around the parse time.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use domain::{Attendee, CalendarEvent, DomainError, TimezoneResolver};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::recurrence::{RecurrenceRule, RecurrenceWindow};

/// Whole-document parse failures
///
/// Problems confined to one event are not errors; that event is skipped.
#[derive(Debug, Error)]
pub enum IcsParseError {
    /// The document does not start with a VCALENDAR
    #[error("Not an iCalendar document")]
    NotACalendar,

    /// The document could not be tokenized
    #[error("Invalid iCalendar data: {0}")]
    Syntax(String),
}

/// Occurrence replaced by a RECURRENCE-ID override: UID and original start
type OverrideKey = (String, DateTime<Utc>);

/// Converts iCalendar text into domain events
#[derive(Debug, Clone, Default)]
pub struct IcsParser {
    resolver: TimezoneResolver,
    window: RecurrenceWindow,
}

impl IcsParser {
    /// Create a parser with the built-in timezone aliases and UTC default zone
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with a custom resolver
    pub fn with_resolver(resolver: TimezoneResolver) -> Self {
        Self {
            resolver,
            window: RecurrenceWindow::default(),
        }
    }

    /// Override the recurrence expansion window
    #[must_use]
    pub const fn with_recurrence_window(mut self, window: RecurrenceWindow) -> Self {
        self.window = window;
        self
    }

    pub const fn resolver(&self) -> &TimezoneResolver {
        &self.resolver
    }

    pub const fn recurrence_window(&self) -> RecurrenceWindow {
        self.window
    }

    /// Parse a full feed, expanding recurrences around the current time
    pub fn parse(&self, ics: &str) -> Result<Vec<CalendarEvent>, IcsParseError> {
        self.parse_at(ics, Utc::now())
    }

    /// Parse a full feed with the recurrence window anchored at `now`
    ///
    /// Events come out in document order; the occurrences of a recurring
    /// event take its place, in chronological order.
    pub fn parse_at(
        &self,
        ics: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, IcsParseError> {
        if !starts_with_vcalendar(ics) {
            return Err(IcsParseError::NotACalendar);
        }

        let unfolded = unfold(ics);
        let calendar = read_calendar(&unfolded).map_err(|e| IcsParseError::Syntax(e.to_string()))?;

        let mut vevents = Vec::new();
        collect_vevents(&calendar.components, &mut vevents);

        let overrides = self.overridden_occurrences(&vevents);
        let (from, until) = self.window.bounds(now);

        let mut events = Vec::with_capacity(vevents.len());
        let mut skipped = 0usize;
        for vevent in vevents {
            let event = match self.convert(vevent) {
                Ok(event) => event,
                Err(e) => {
                    warn!(
                        summary = %text_prop(vevent, "SUMMARY"),
                        error = %e,
                        "Skipping event"
                    );
                    skipped += 1;
                    continue;
                },
            };

            let rule = match self.recurrence_rule(vevent) {
                Ok(Some(rule)) => rule,
                Ok(None) => {
                    events.push(event);
                    continue;
                },
                Err(e) => {
                    warn!(summary = %event.summary, error = %e, "Ignoring recurrence");
                    events.push(event);
                    continue;
                },
            };

            match rule.expand(&event, from, until) {
                Ok(occurrences) => {
                    let uid = text_prop(vevent, "UID");
                    events.extend(occurrences.into_iter().filter(|occurrence| {
                        !overrides.contains(&(uid.clone(), occurrence.start.with_timezone(&Utc)))
                    }));
                },
                Err(e) => {
                    warn!(summary = %event.summary, error = %e, "Ignoring recurrence");
                    events.push(event);
                },
            }
        }

        debug!(parsed = events.len(), skipped, "Parsed feed");
        Ok(events)
    }

    fn convert(&self, vevent: &Component<'_>) -> Result<CalendarEvent, DomainError> {
        let start_prop = find_prop(vevent, "DTSTART")
            .ok_or_else(|| DomainError::ValidationError("missing DTSTART".to_string()))?;
        let start = self.event_time(start_prop)?;
        let end = match find_prop(vevent, "DTEND") {
            Some(prop) => self.event_time(prop)?,
            None => start,
        };

        let attendees = props(vevent, "ATTENDEE")
            .map(common_name)
            .map(Attendee::new)
            .collect();

        Ok(CalendarEvent {
            summary: text_prop(vevent, "SUMMARY"),
            location: text_prop(vevent, "LOCATION"),
            start,
            end,
            comment: text_prop(vevent, "COMMENT"),
            attendees,
        })
    }

    /// RRULE and EXDATEs of a master event; overrides are never expanded
    fn recurrence_rule(
        &self,
        vevent: &Component<'_>,
    ) -> Result<Option<RecurrenceRule>, DomainError> {
        if find_prop(vevent, "RECURRENCE-ID").is_some() {
            return Ok(None);
        }
        let Some(rrule) = find_prop(vevent, "RRULE") else {
            return Ok(None);
        };

        let mut exdates = Vec::new();
        for prop in props(vevent, "EXDATE") {
            let tzid = param(prop, "TZID");
            for raw in prop_value(prop).split(',').map(str::trim).filter(|v| !v.is_empty()) {
                exdates.push(self.instant(raw, tzid)?);
            }
        }

        Ok(Some(RecurrenceRule {
            rrule: prop_value(rrule).to_string(),
            exdates,
        }))
    }

    /// UID and original start of every RECURRENCE-ID override
    fn overridden_occurrences(&self, vevents: &[&Component<'_>]) -> HashSet<OverrideKey> {
        vevents
            .iter()
            .filter_map(|vevent| {
                let recurrence_id = find_prop(vevent, "RECURRENCE-ID")?;
                let at = self.event_time(recurrence_id).ok()?;
                Some((text_prop(vevent, "UID"), at.with_timezone(&Utc)))
            })
            .collect()
    }

    fn event_time(&self, prop: &Property<'_>) -> Result<DateTime<Tz>, DomainError> {
        let value = DatePerhapsTime::try_from(prop).map_err(|_| {
            DomainError::InvalidDateTime(format!("{}: {}", prop.name, prop.val))
        })?;

        match value {
            DatePerhapsTime::Date(date) => self
                .resolver
                .localize(self.resolver.default_zone(), date.and_time(NaiveTime::MIN)),
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(utc)) => {
                Ok(utc.with_timezone(&Tz::UTC))
            },
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
                self.resolver.localize(self.resolver.default_zone(), naive)
            },
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                let tz = self.resolver.resolve(&tzid)?;
                self.resolver.localize(tz, date_time)
            },
        }
    }

    /// One DATE or DATE-TIME value of a list property such as EXDATE
    fn instant(&self, raw: &str, tzid: Option<&str>) -> Result<DateTime<Tz>, DomainError> {
        let invalid = || DomainError::InvalidDateTime(format!("EXDATE: {raw}"));

        if let Some(utc) = raw.strip_suffix('Z') {
            let naive = NaiveDateTime::parse_from_str(utc, ICAL_DATE_TIME).map_err(|_| invalid())?;
            return Ok(Tz::UTC.from_utc_datetime(&naive));
        }

        let tz = match tzid {
            Some(tzid) => self.resolver.resolve(tzid)?,
            None => self.resolver.default_zone(),
        };
        let naive = NaiveDateTime::parse_from_str(raw, ICAL_DATE_TIME)
            .or_else(|_| NaiveDate::parse_from_str(raw, ICAL_DATE).map(|d| d.and_time(NaiveTime::MIN)))
            .map_err(|_| invalid())?;
        self.resolver.localize(tz, naive)
    }
}

const ICAL_DATE_TIME: &str = "%Y%m%dT%H%M%S";
const ICAL_DATE: &str = "%Y%m%d";

fn starts_with_vcalendar(ics: &str) -> bool {
    ics.trim_start_matches('\u{feff}')
        .trim_start()
        .get(..15)
        .is_some_and(|head| head.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
}

fn collect_vevents<'c, 'a>(components: &'c [Component<'a>], out: &mut Vec<&'c Component<'a>>) {
    for component in components {
        if name_is(component.name.as_ref(), "VEVENT") {
            out.push(component);
        } else {
            collect_vevents(&component.components, out);
        }
    }
}

/// Property and parameter names are case-insensitive
fn name_is(name: &str, expected: &str) -> bool {
    name.eq_ignore_ascii_case(expected)
}

fn props<'c, 'a>(
    component: &'c Component<'a>,
    name: &'static str,
) -> impl Iterator<Item = &'c Property<'a>> {
    component
        .properties
        .iter()
        .filter(move |p| name_is(p.name.as_ref(), name))
}

fn find_prop<'c, 'a>(component: &'c Component<'a>, name: &'static str) -> Option<&'c Property<'a>> {
    props(component, name).next()
}

fn prop_value<'p>(prop: &'p Property<'_>) -> &'p str {
    prop.val.as_ref()
}

/// Unquoted value of a parameter
fn param<'p>(prop: &'p Property<'_>, key: &str) -> Option<&'p str> {
    prop.params
        .iter()
        .find(|p| name_is(p.key.as_ref(), key))
        .and_then(|p| p.val.as_ref())
        .map(|v| {
            let v: &str = v.as_ref();
            v.trim_matches('"')
        })
}

/// Unescaped text value of a property, empty when absent
fn text_prop(component: &Component<'_>, name: &'static str) -> String {
    find_prop(component, name)
        .map(|p| unescape_text(prop_value(p)))
        .unwrap_or_default()
}

/// CN parameter of an ATTENDEE, empty when absent
fn common_name(prop: &Property<'_>) -> String {
    param(prop, "CN").unwrap_or_default().to_string()
}

/// Undo RFC 5545 TEXT escaping (`\,` `\;` `\n` `\\`)
fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use domain::{ClassCode, format_timestamp};

    use super::*;
    use crate::RecurrenceWindow;

    fn calendar(events: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n{events}END:VCALENDAR\r\n"
        )
    }

    const LESSON: &str = "BEGIN:VEVENT\r\n\
        UID:lesson-1\r\n\
        SUMMARY:Programming\r\n\
        LOCATION:H1.204\r\n\
        COMMENT:Bring laptop\r\n\
        DTSTART;TZID=W. Europe Standard Time:20240108T083000\r\n\
        DTEND;TZID=W. Europe Standard Time:20240108T100000\r\n\
        ATTENDEE;CN=Jane Doe:mailto:jane@example.com\r\n\
        ATTENDEE;CN=IC_INF1A:mailto:inf1a@example.com\r\n\
        ATTENDEE;CN=IC_INF1B:mailto:inf1b@example.com\r\n\
        END:VEVENT\r\n";

    #[test]
    fn parses_lesson_fields() {
        let events = IcsParser::new().parse(&calendar(LESSON)).unwrap();

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.summary, "Programming");
        assert_eq!(event.location, "H1.204");
        assert_eq!(event.comment, "Bring laptop");
        assert_eq!(event.attendees.len(), 3);
        assert!(event.has_attendee(&ClassCode::new("IC_INF1A")));
    }

    #[test]
    fn windows_zone_maps_to_amsterdam() {
        let events = IcsParser::new().parse(&calendar(LESSON)).unwrap();

        let event = &events[0];
        assert_eq!(event.start.timezone(), chrono_tz::Europe::Amsterdam);
        assert_eq!(format_timestamp(&event.start), "2024-01-08 08:30:00 +0100 CET");
        assert_eq!(format_timestamp(&event.end), "2024-01-08 10:00:00 +0100 CET");
    }

    #[test]
    fn utc_and_floating_times() {
        let ics = calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Utc\r\nDTSTART:20240108T083000Z\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nSUMMARY:Floating\r\nDTSTART:20240108T083000\r\nEND:VEVENT\r\n",
        );
        let resolver = TimezoneResolver::new().with_default_zone("Europe/Berlin").unwrap();
        let events = IcsParser::with_resolver(resolver).parse(&ics).unwrap();

        assert_eq!(events[0].start.timezone(), Tz::UTC);
        assert_eq!(events[1].start.timezone(), chrono_tz::Europe::Berlin);
        assert_eq!(format_timestamp(&events[1].start), "2024-01-08 08:30:00 +0100 CET");
    }

    #[test]
    fn missing_dtend_takes_start() {
        let ics = calendar("BEGIN:VEVENT\r\nSUMMARY:Open\r\nDTSTART:20240108T083000Z\r\nEND:VEVENT\r\n");
        let events = IcsParser::new().parse(&ics).unwrap();

        assert_eq!(events[0].start, events[0].end);
    }

    #[test]
    fn all_day_event_starts_at_midnight() {
        let ics = calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Holiday\r\nDTSTART;VALUE=DATE:20240108\r\nEND:VEVENT\r\n",
        );
        let events = IcsParser::new().parse(&ics).unwrap();

        assert_eq!(format_timestamp(&events[0].start), "2024-01-08 00:00:00 +0000 UTC");
    }

    #[test]
    fn events_without_start_or_with_unknown_zone_are_skipped() {
        let ics = calendar(
            "BEGIN:VEVENT\r\nSUMMARY:No start\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nSUMMARY:Mars\r\nDTSTART;TZID=Olympus Mons Time:20240108T083000\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nSUMMARY:Kept\r\nDTSTART:20240108T083000Z\r\nEND:VEVENT\r\n",
        );
        let events = IcsParser::new().parse(&ics).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Kept");
    }

    #[test]
    fn attendee_without_name_is_kept_as_empty() {
        let ics = calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Anon\r\nDTSTART:20240108T083000Z\r\n\
             ATTENDEE:mailto:someone@example.com\r\nEND:VEVENT\r\n",
        );
        let events = IcsParser::new().parse(&ics).unwrap();

        assert_eq!(events[0].attendees, vec![Attendee::new("")]);
        assert!(!events[0].attendees[0].is_class_code());
    }

    #[test]
    fn preserves_feed_order() {
        let ics = calendar(
            "BEGIN:VEVENT\r\nSUMMARY:First\r\nDTSTART:20240109T083000Z\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nSUMMARY:Second\r\nDTSTART:20240108T083000Z\r\nEND:VEVENT\r\n",
        );
        let events = IcsParser::new().parse(&ics).unwrap();

        let summaries: Vec<_> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, ["First", "Second"]);
    }

    #[test]
    fn empty_calendar_is_not_an_error() {
        let events = IcsParser::new().parse(&calendar("")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn html_error_page_is_rejected() {
        let err = IcsParser::new()
            .parse("<html><body>502 Bad Gateway</body></html>")
            .unwrap_err();
        assert!(matches!(err, IcsParseError::NotACalendar));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(IcsParser::new().parse("").is_err());
    }

    #[test]
    fn folded_lines_are_joined() {
        let ics = calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Advanced\r\n  Databases\r\nDTSTART:20240108T083000Z\r\nEND:VEVENT\r\n",
        );
        let events = IcsParser::new().parse(&ics).unwrap();

        assert_eq!(events[0].summary, "Advanced Databases");
    }

    #[test]
    fn lowercase_names_are_recognized() {
        let ics = calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Lower\r\nDTSTART:20240108T083000Z\r\n\
             attendee;cn=IC_LOWER:mailto:lower@example.com\r\n\
             ATTENDEE;Cn=\"Jane Doe\":mailto:jane@example.com\r\nEND:VEVENT\r\n",
        );
        let events = IcsParser::new().parse(&ics).unwrap();

        assert_eq!(
            events[0].attendees,
            vec![Attendee::new("IC_LOWER"), Attendee::new("Jane Doe")]
        );
        assert!(events[0].has_attendee(&ClassCode::new("IC_LOWER")));
    }

    const WEEKLY: &str = "BEGIN:VEVENT\r\n\
        UID:weekly-1\r\n\
        SUMMARY:Programming\r\n\
        DTSTART;TZID=W. Europe Standard Time:20240318T083000\r\n\
        DTEND;TZID=W. Europe Standard Time:20240318T100000\r\n\
        RRULE:FREQ=WEEKLY;COUNT=3\r\n\
        ATTENDEE;CN=IC_INF1A:mailto:inf1a@example.com\r\n\
        END:VEVENT\r\n";

    fn march_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn starts(events: &[CalendarEvent]) -> Vec<String> {
        events.iter().map(|e| format_timestamp(&e.start)).collect()
    }

    #[test]
    fn weekly_rule_yields_one_event_per_session() {
        let events = IcsParser::new().parse_at(&calendar(WEEKLY), march_first()).unwrap();

        assert_eq!(
            starts(&events),
            [
                "2024-03-18 08:30:00 +0100 CET",
                "2024-03-25 08:30:00 +0200 CEST",
                "2024-04-01 08:30:00 +0200 CEST",
            ]
        );
        assert!(events.iter().all(|e| e.has_attendee(&ClassCode::new("IC_INF1A"))));
    }

    #[test]
    fn sessions_outside_window_are_dropped() {
        let window = RecurrenceWindow::new(chrono::Duration::days(1), chrono::Duration::days(20));
        let events = IcsParser::new()
            .with_recurrence_window(window)
            .parse_at(&calendar(WEEKLY), march_first())
            .unwrap();

        assert_eq!(starts(&events), ["2024-03-18 08:30:00 +0100 CET"]);
    }

    #[test]
    fn exdate_and_override_replace_sessions() {
        let ics = calendar(&format!(
            "{}{}",
            WEEKLY.replace(
                "RRULE:FREQ=WEEKLY;COUNT=3\r\n",
                "RRULE:FREQ=WEEKLY;COUNT=3\r\n\
                 EXDATE;TZID=W. Europe Standard Time:20240325T083000\r\n",
            ),
            "BEGIN:VEVENT\r\n\
             UID:weekly-1\r\n\
             RECURRENCE-ID;TZID=W. Europe Standard Time:20240401T083000\r\n\
             SUMMARY:Programming (moved)\r\n\
             DTSTART;TZID=W. Europe Standard Time:20240402T130000\r\n\
             DTEND;TZID=W. Europe Standard Time:20240402T143000\r\n\
             END:VEVENT\r\n",
        ));
        let events = IcsParser::new().parse_at(&ics, march_first()).unwrap();

        let summaries: Vec<_> = events.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, ["Programming", "Programming (moved)"]);
        assert_eq!(
            starts(&events),
            ["2024-03-18 08:30:00 +0100 CET", "2024-04-02 13:00:00 +0200 CEST"]
        );
    }

    #[test]
    fn broken_rule_keeps_the_single_event() {
        let ics = calendar(&WEEKLY.replace("FREQ=WEEKLY;COUNT=3", "FREQ=SOMETIMES"));
        let events = IcsParser::new().parse_at(&ics, march_first()).unwrap();

        assert_eq!(starts(&events), ["2024-03-18 08:30:00 +0100 CET"]);
    }

    #[test]
    fn unescapes_text_values() {
        assert_eq!(unescape_text(r"Room 1\, floor 2\; east"), "Room 1, floor 2; east");
        assert_eq!(unescape_text(r"line\nbreak"), "line\nbreak");
        assert_eq!(unescape_text(r"back\\slash"), r"back\slash");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }
}
