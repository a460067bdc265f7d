//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines [`Timestamp`], the UTC-only, seconds-precision timestamp used
//! on every record the engine writes.
//!
//! ## Why UTC-only
//!
//! Version and approval records form an audit trail that is compared,
//! sorted, and exported as JSON. Local timezone offsets would make two
//! renderings of the same instant unequal as strings, so non-UTC inputs
//! are rejected at construction rather than silently converted on the
//! strict path. Sub-second precision is discarded for the same reason:
//! state exports render timestamps at seconds precision, and an
//! export/import round trip must be lossless.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GrcError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-UTC
///   offsets.
/// - [`Timestamp::parse_lenient()`] — from an ISO8601 string with any
///   offset, converting to UTC. For ingesting external data only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Only the `Z` suffix is accepted. Explicit offsets are rejected,
    /// including `+00:00`, which is semantically UTC but renders
    /// differently.
    ///
    /// # Errors
    ///
    /// Returns [`GrcError::Validation`] if the string is not valid
    /// RFC 3339 or uses a non-`Z` offset.
    pub fn parse(s: &str) -> Result<Self, GrcError> {
        if !s.ends_with('Z') {
            return Err(GrcError::Validation(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| GrcError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse a timestamp from an RFC 3339 string, accepting any offset
    /// and converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, GrcError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| GrcError::Validation(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The calendar date (UTC) of this timestamp.
    ///
    /// Scheduled activation compares this against an entity's start date.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Render as ISO8601 with Z suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision.
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}
