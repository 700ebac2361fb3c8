//! iCalendar feed integration
//!
//! Downloads the published timetable feed to disk and turns its VEVENTs into
//! domain calendar events, expanding recurring lessons.

pub mod client;
pub mod parser;
pub mod recurrence;

pub use client::{FeedClient, FeedClientConfig, FeedError, HttpFeedClient};
pub use parser::{IcsParseError, IcsParser};
pub use recurrence::RecurrenceWindow;
