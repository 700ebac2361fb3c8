//! Calendar parser port

#[cfg(test)]
use mockall::automock;

use domain::CalendarEvent;

use crate::error::ApplicationError;

/// Port for turning iCalendar text into domain events
#[cfg_attr(test, automock)]
pub trait CalendarParserPort: Send + Sync {
    /// Parse every VEVENT in `ics`, preserving feed order
    fn parse(&self, ics: &str) -> Result<Vec<CalendarEvent>, ApplicationError>;
}
