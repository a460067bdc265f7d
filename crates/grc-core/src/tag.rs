//! # Version Tags and Labels
//!
//! Two distinct versioning schemes coexist in the engine and must never be
//! confused:
//!
//! - [`VersionTag`] — the alternating author/reviewer tag stamped on
//!   approval records (`A1`, `R1`, `A2`, ...). Each track counts
//!   independently per entity identifier.
//! - [`VersionLabel`] — the structural `major.minor` label on version
//!   records (`1.0`, `2.0`, `2.1`, ...), assigned when a new entity
//!   version is created and linked into the chain.
//!
//! ## Typed tags
//!
//! Legacy data encodes tags as raw strings (`"u3"`, `"R1"`, even
//! `"u3_update"`), comparable only by slicing off the first character and
//! casting the rest. The typed variants here make increment and comparison
//! total functions; the legacy spellings are accepted on parse only and
//! never produced on output.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GrcError;

// ─── Track ───────────────────────────────────────────────────────────

/// The two independent tag sequences of the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Track {
    /// Submissions by the entity's author.
    Author,
    /// Verdicts by the assigned reviewer.
    Reviewer,
}

impl Track {
    /// Single-letter prefix used in the canonical string form.
    pub fn prefix(&self) -> char {
        match self {
            Self::Author => 'A',
            Self::Reviewer => 'R',
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Author => "author",
            Self::Reviewer => "reviewer",
        };
        f.write_str(s)
    }
}

// ─── VersionTag ──────────────────────────────────────────────────────

/// An approval-record tag: track plus a 1-based sequence number.
///
/// Tags are ordered *within* a track; comparing across tracks yields no
/// ordering (an `A2` is neither before nor after an `R1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionTag {
    /// An author-track tag, rendered `A{n}`.
    Author(u32),
    /// A reviewer-track tag, rendered `R{n}`.
    Reviewer(u32),
}

impl VersionTag {
    /// The first tag of a track (`A1` or `R1`).
    pub fn first(track: Track) -> Self {
        match track {
            Track::Author => Self::Author(1),
            Track::Reviewer => Self::Reviewer(1),
        }
    }

    /// The next tag in the same track.
    pub fn next(&self) -> Self {
        match self {
            Self::Author(n) => Self::Author(n + 1),
            Self::Reviewer(n) => Self::Reviewer(n + 1),
        }
    }

    /// The track this tag belongs to.
    pub fn track(&self) -> Track {
        match self {
            Self::Author(_) => Track::Author,
            Self::Reviewer(_) => Track::Reviewer,
        }
    }

    /// The 1-based sequence number within the track.
    pub fn number(&self) -> u32 {
        match self {
            Self::Author(n) | Self::Reviewer(n) => *n,
        }
    }

    /// Parse a tag from its string form.
    ///
    /// Accepts the canonical `A{n}` / `R{n}` spellings plus the legacy
    /// forms found in migrated data: lowercase prefixes, the historical
    /// `u`/`U` author prefix, and a trailing `_update` suffix bolted onto
    /// resubmissions. The sequence number must be at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`GrcError::Validation`] for an unknown prefix, a
    /// non-numeric remainder, or a zero sequence number.
    pub fn parse(s: &str) -> Result<Self, GrcError> {
        let trimmed = s.trim();
        let body = trimmed.strip_suffix("_update").unwrap_or(trimmed);
        let mut chars = body.chars();
        let prefix = chars
            .next()
            .ok_or_else(|| GrcError::Validation("version tag must not be empty".to_string()))?;
        let rest = chars.as_str();
        let n: u32 = rest.parse().map_err(|_| {
            GrcError::Validation(format!("invalid version tag number in {trimmed:?}"))
        })?;
        if n == 0 {
            return Err(GrcError::Validation(format!(
                "version tag numbers start at 1, got {trimmed:?}"
            )));
        }
        match prefix {
            'A' | 'a' | 'U' | 'u' => Ok(Self::Author(n)),
            'R' | 'r' => Ok(Self::Reviewer(n)),
            _ => Err(GrcError::Validation(format!(
                "unknown version tag prefix in {trimmed:?}"
            ))),
        }
    }
}

impl std::fmt::Display for VersionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.track().prefix(), self.number())
    }
}

impl std::str::FromStr for VersionTag {
    type Err = GrcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialOrd for VersionTag {
    /// Tags compare only within a track; cross-track comparison is `None`.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Author(a), Self::Author(b)) => a.partial_cmp(b),
            (Self::Reviewer(a), Self::Reviewer(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Serialize for VersionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}

// ─── VersionLabel ────────────────────────────────────────────────────

/// The structural `major.minor` label on a version record.
///
/// A major bump (`2.3 → 3.0`) marks a structural revision superseding the
/// whole entity; a minor bump (`2.3 → 2.4`) marks an edit within the same
/// major line. Labels are totally ordered, major first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionLabel {
    /// Major component, starting at 1.
    pub major: u32,
    /// Minor component, starting at 0.
    pub minor: u32,
}

impl VersionLabel {
    /// Create a label from its components.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The label of a root version: `1.0`.
    pub fn initial() -> Self {
        Self { major: 1, minor: 0 }
    }

    /// The label of the next structural revision: major + 1, minor reset.
    pub fn next_major(&self) -> Self {
        Self {
            major: self.major + 1,
            minor: 0,
        }
    }

    /// The label of the next edit in the same major line.
    pub fn next_minor(&self) -> Self {
        Self {
            major: self.major,
            minor: self.minor + 1,
        }
    }

    /// Parse a label from `"major.minor"` or bare `"major"` form.
    ///
    /// # Errors
    ///
    /// Returns [`GrcError::Validation`] on non-numeric components or a
    /// zero major.
    pub fn parse(s: &str) -> Result<Self, GrcError> {
        let trimmed = s.trim();
        let (major_s, minor_s) = match trimmed.split_once('.') {
            Some((maj, min)) => (maj, min),
            None => (trimmed, "0"),
        };
        let major: u32 = major_s.parse().map_err(|_| {
            GrcError::Validation(format!("invalid version label major in {trimmed:?}"))
        })?;
        let minor: u32 = minor_s.parse().map_err(|_| {
            GrcError::Validation(format!("invalid version label minor in {trimmed:?}"))
        })?;
        if major == 0 {
            return Err(GrcError::Validation(format!(
                "version label majors start at 1, got {trimmed:?}"
            )));
        }
        Ok(Self { major, minor })
    }
}

impl std::fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for VersionLabel {
    type Err = GrcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
