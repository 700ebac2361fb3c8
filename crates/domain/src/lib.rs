//! Domain layer for Rooster
//!
//! Contains the calendar events, attendee classification and roster queries.
//! This layer performs no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
