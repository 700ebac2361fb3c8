//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod calendar_parser_port;
mod feed_cache_port;
mod feed_fetcher_port;

#[cfg(test)]
pub use calendar_parser_port::MockCalendarParserPort;
pub use calendar_parser_port::CalendarParserPort;
#[cfg(test)]
pub use feed_cache_port::MockFeedCachePort;
pub use feed_cache_port::FeedCachePort;
#[cfg(test)]
pub use feed_fetcher_port::MockFeedFetcherPort;
pub use feed_fetcher_port::FeedFetcherPort;
