//! Value Objects - Immutable, identity-less domain primitives

mod attendee;
mod class_code;
mod timezone;

pub use attendee::{Attendee, AttendeeKind, CLASS_CODE_MARKER};
pub use class_code::ClassCode;
pub use timezone::{TimezoneResolver, WINDOWS_TIMEZONE_ALIASES};
