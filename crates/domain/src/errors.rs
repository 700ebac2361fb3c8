//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Timezone name that is neither aliased nor a known IANA identifier
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Date/time value that cannot be placed on the timeline
    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_timezone_error_message() {
        let err = DomainError::UnknownTimezone("Mars/Olympus".to_string());
        assert_eq!(err.to_string(), "Unknown timezone: Mars/Olympus");
    }

    #[test]
    fn invalid_datetime_error_message() {
        let err = DomainError::InvalidDateTime("20240331T023000".to_string());
        assert_eq!(err.to_string(), "Invalid date/time: 20240331T023000");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("empty alias".to_string());
        assert_eq!(err.to_string(), "Validation failed: empty alias");
    }

    #[test]
    fn error_is_debug() {
        let err = DomainError::UnknownTimezone("x".to_string());
        assert!(format!("{err:?}").contains("UnknownTimezone"));
    }
}
