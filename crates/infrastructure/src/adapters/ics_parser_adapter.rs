//! ICS parser adapter - Implements CalendarParserPort using integration_ical

use application::{error::ApplicationError, ports::CalendarParserPort};
use domain::CalendarEvent;
use integration_ical::IcsParser;

/// Parses iCalendar text into domain events
#[derive(Debug, Clone, Default)]
pub struct IcsParserAdapter {
    parser: IcsParser,
}

impl IcsParserAdapter {
    pub const fn new(parser: IcsParser) -> Self {
        Self { parser }
    }
}

impl CalendarParserPort for IcsParserAdapter {
    fn parse(&self, ics: &str) -> Result<Vec<CalendarEvent>, ApplicationError> {
        self.parser
            .parse(ics)
            .map_err(|e| ApplicationError::Parse(e.to_string()))
    }
}
