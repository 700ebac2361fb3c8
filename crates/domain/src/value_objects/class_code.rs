//! Class code value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// A class (student group) code, e.g. `IC_INF1A`
///
/// Codes are compared verbatim: no trimming, no case folding. A code taken
/// from a request path may not follow the underscore convention, in which case
/// it simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCode(String);

impl ClassCode {
    /// Create a class code
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code, returning the inner string
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ClassCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ClassCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
