//! Domain entities

mod calendar_event;
mod roster;
mod roster_item;

pub use calendar_event::CalendarEvent;
pub use roster::Roster;
pub use roster_item::{DEFAULT_MAX_ATTENDEES, RosterItem, TIMESTAMP_FORMAT, format_timestamp};
