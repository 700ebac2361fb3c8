//! Attendee value object
//!
//! The upstream feed carries one display name per attendee and encodes the
//! attendee's role in that name: a name containing an underscore is a class
//! code (`IC_INF1A`), any other name is a teacher (`Jane Doe`).
//!
//! # Examples
//!
//! ```
//! use domain::{Attendee, AttendeeKind};
//!
//! assert_eq!(Attendee::new("IC_INF1A").kind(), AttendeeKind::ClassCode);
//! assert_eq!(Attendee::new("Jane Doe").kind(), AttendeeKind::Teacher);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ClassCode;

/// Character whose presence marks a display name as a class code
pub const CLASS_CODE_MARKER: char = '_';

/// Role of an attendee, derived from its display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeKind {
    /// A class (student group) code such as `IC_INF1A`
    ClassCode,
    /// A teacher's name
    Teacher,
}

/// A calendar attendee, identified only by its display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attendee(String);

impl Attendee {
    /// Create an attendee from its display name
    #[must_use]
    pub fn new(display_name: impl Into<String>) -> Self {
        Self(display_name.into())
    }

    /// The display name as it appeared in the feed
    pub fn display_name(&self) -> &str {
        &self.0
    }

    /// Classify this attendee
    ///
    /// This is the only place the underscore convention is interpreted.
    pub fn kind(&self) -> AttendeeKind {
        if self.0.contains(CLASS_CODE_MARKER) {
            AttendeeKind::ClassCode
        } else {
            AttendeeKind::Teacher
        }
    }

    /// Whether this attendee is a class code
    pub fn is_class_code(&self) -> bool {
        self.kind() == AttendeeKind::ClassCode
    }

    /// The class code carried by this attendee, if it is one
    pub fn as_class_code(&self) -> Option<ClassCode> {
        self.is_class_code().then(|| ClassCode::new(self.0.clone()))
    }

    /// Whether this attendee's display name is exactly the given class code
    pub fn matches(&self, code: &ClassCode) -> bool {
        self.0 == code.as_str()
    }
}

impl fmt::Display for Attendee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Attendee {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Attendee {
    fn from(s: String) -> Self {
        Self(s)
    }
}
