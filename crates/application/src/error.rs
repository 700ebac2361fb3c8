//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// External service error (feed host unreachable, bad status, ...)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Feed content could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_error_is_transparent() {
        let err: ApplicationError = DomainError::UnknownTimezone("X".to_string()).into();
        assert_eq!(err.to_string(), "Unknown timezone: X");
    }

    #[test]
    fn external_service_message() {
        let err = ApplicationError::ExternalService("HTTP 503".to_string());
        assert_eq!(err.to_string(), "External service error: HTTP 503");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ApplicationError = io.into();
        assert!(matches!(err, ApplicationError::Io(msg) if msg.contains("denied")));
    }
}
