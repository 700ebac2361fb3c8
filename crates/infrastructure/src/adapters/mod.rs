//! Adapters implementing the application ports

mod feed_fetcher_adapter;
mod file_cache_adapter;
mod ics_parser_adapter;

pub use feed_fetcher_adapter::FeedFetcherAdapter;
pub use file_cache_adapter::FileCacheAdapter;
pub use ics_parser_adapter::IcsParserAdapter;
