//! Timezone resolution for feed timestamps
//!
//! Calendar feeds exported from Exchange/Outlook name their zones with Windows
//! identifiers (`W. Europe Standard Time`) that the IANA database does not
//! know. [`TimezoneResolver`] remaps those names before falling back to a
//! plain IANA lookup.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::errors::DomainError;

/// Built-in remapping table: feed timezone name to IANA identifier
pub const WINDOWS_TIMEZONE_ALIASES: &[(&str, &str)] =
    &[("W. Europe Standard Time", "Europe/Amsterdam")];

/// Resolves TZID parameters and places naive feed timestamps on the timeline
#[derive(Debug, Clone)]
pub struct TimezoneResolver {
    aliases: HashMap<String, Tz>,
    default_zone: Tz,
}

impl TimezoneResolver {
    /// Create a resolver with the built-in alias table and UTC as default zone
    #[must_use]
    pub fn new() -> Self {
        let aliases = WINDOWS_TIMEZONE_ALIASES
            .iter()
            .filter_map(|(alias, iana)| iana.parse::<Tz>().ok().map(|tz| (alias_key(alias), tz)))
            .collect();

        Self {
            aliases,
            default_zone: Tz::UTC,
        }
    }

    /// Add or replace an alias
    ///
    /// # Errors
    ///
    /// Returns an error if the alias is empty or the target is not an IANA
    /// timezone identifier.
    pub fn with_alias(
        mut self,
        alias: impl Into<String>,
        iana: &str,
    ) -> Result<Self, DomainError> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "timezone alias must not be empty".to_string(),
            ));
        }
        let tz = parse_iana(iana)?;
        self.aliases.insert(alias_key(&alias), tz);
        Ok(self)
    }

    /// Set the zone used for floating (zone-less) timestamps
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not an IANA timezone identifier.
    pub fn with_default_zone(mut self, iana: &str) -> Result<Self, DomainError> {
        self.default_zone = parse_iana(iana)?;
        Ok(self)
    }

    /// Zone used for floating timestamps and all-day dates
    pub const fn default_zone(&self) -> Tz {
        self.default_zone
    }

    /// Resolve a TZID parameter value
    ///
    /// The alias table (matched case-insensitively) wins over the IANA
    /// database.
    pub fn resolve(&self, tzid: &str) -> Result<Tz, DomainError> {
        let name = tzid.trim().trim_matches('"');
        if let Some(tz) = self.aliases.get(&alias_key(name)) {
            return Ok(*tz);
        }
        parse_iana(name)
    }

    /// Interpret a wall-clock time in the given zone
    ///
    /// Ambiguous times (DST fall-back) take the earlier instant; times inside a
    /// DST gap do not exist and are rejected.
    pub fn localize(&self, tz: Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>, DomainError> {
        tz.from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| DomainError::InvalidDateTime(format!("{naive} does not exist in {tz}")))
    }
}

impl Default for TimezoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn alias_key(alias: &str) -> String {
    alias.trim().to_ascii_lowercase()
}

fn parse_iana(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::UnknownTimezone(name.to_string()))
}
