/// Classification outcomes for tracked bookmarks
///
/// This module defines every outcome a bookmark can end up with and the
/// family each outcome belongs to.
use crate::ProbeError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Which side of the report an outcome lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Not classified yet
    Pending,

    /// Chapter confirmed present, nothing to report
    Passed,

    /// Reported but never opened
    NoOpen,

    /// Reported and opened in the browser
    ToOpen,
}

/// The tag of a [`Status`], without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum StatusKind {
    // ===== Pending =====
    Untested,

    // ===== Passed =====
    Success,

    // ===== NoOpen =====
    Skipped,
    Unknown,
    BadRequest,
    NotInt,
    HasVol,
    Pattern,

    // ===== ToOpen =====
    Broken,
    Exists,
    Missing,
    PointFive,
    Tiny,
}

impl StatusKind {
    pub const ALL: [StatusKind; 13] = [
        Self::Untested,
        Self::Success,
        Self::Skipped,
        Self::Unknown,
        Self::BadRequest,
        Self::NotInt,
        Self::HasVol,
        Self::Pattern,
        Self::Broken,
        Self::Exists,
        Self::Missing,
        Self::PointFive,
        Self::Tiny,
    ];

    /// ToOpen kinds in the order they are displayed and opened
    pub const OPEN_ORDER: [StatusKind; 5] = [
        Self::Broken,
        Self::Exists,
        Self::Missing,
        Self::PointFive,
        Self::Tiny,
    ];

    /// The family this kind belongs to
    pub fn family(&self) -> Family {
        match self {
            Self::Untested => Family::Pending,
            Self::Success => Family::Passed,
            Self::Skipped
            | Self::Unknown
            | Self::BadRequest
            | Self::NotInt
            | Self::HasVol
            | Self::Pattern => Family::NoOpen,
            Self::Broken | Self::Exists | Self::Missing | Self::PointFive | Self::Tiny => {
                Family::ToOpen
            }
        }
    }

    /// Human-readable explanation of the outcome
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Untested => "This URL was not tested",
            Self::Success => "The chapter exists",
            Self::Skipped => "This domain was skipped",
            Self::Unknown => "This website is for an unknown / unsupported domain.",
            Self::BadRequest => "Request failed",
            Self::NotInt => "The URL's chapter is not an integer.",
            Self::HasVol => "The URL contains 'vol'; this is a bad sign",
            Self::Pattern => "The URL contains a pattern that is dangerous",
            Self::Tiny => "URL failed by default, it is too small",
            Self::Exists => "The URL is valid, but this site seems to be missing other chapters",
            Self::Missing => "Previous and future chapters exist, this one does not.",
            Self::Broken => "This website does not seem to have any chapters of this manga.",
            Self::PointFive => "There exists a .5 release before the current chapter",
        }
    }

    /// Whether each entry of this kind carries its own causal error
    pub fn carries_error(&self) -> bool {
        matches!(self, Self::BadRequest)
    }

    /// True for the malformed-URL subfamily of NoOpen
    pub fn is_malformed_url(&self) -> bool {
        matches!(self, Self::NotInt | Self::HasVol | Self::Pattern)
    }

    /// Short name, e.g. `PointFive`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Untested => "Untested",
            Self::Success => "Success",
            Self::Skipped => "Skipped",
            Self::Unknown => "Unknown",
            Self::BadRequest => "BadRequest",
            Self::NotInt => "NotInt",
            Self::HasVol => "HasVol",
            Self::Pattern => "Pattern",
            Self::Broken => "Broken",
            Self::Exists => "Exists",
            Self::Missing => "Missing",
            Self::PointFive => "PointFive",
            Self::Tiny => "Tiny",
        }
    }

    /// Group heading used in reports
    ///
    /// Kinds whose entries carry their own error print just the name; the rest
    /// print the name followed by the shared reason.
    pub fn heading(&self) -> String {
        if self.carries_error() {
            self.name().to_string()
        } else {
            format!("{}: {}", self.name(), self.reason())
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a kind by name, ignoring case (`broken`, `PointFive`)
impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown outcome '{}'", s))
    }
}

/// The outcome attached to a tracked bookmark
#[derive(Debug, Default)]
pub enum Status {
    #[default]
    Untested,
    Success,
    Skipped,
    Unknown,
    /// Network or HTTP failure once retries ran out
    BadRequest(ProbeError),
    NotInt,
    HasVol,
    Pattern,
    Tiny,
    Exists,
    Missing,
    Broken,
    PointFive,
}

impl Status {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Untested => StatusKind::Untested,
            Self::Success => StatusKind::Success,
            Self::Skipped => StatusKind::Skipped,
            Self::Unknown => StatusKind::Unknown,
            Self::BadRequest(_) => StatusKind::BadRequest,
            Self::NotInt => StatusKind::NotInt,
            Self::HasVol => StatusKind::HasVol,
            Self::Pattern => StatusKind::Pattern,
            Self::Tiny => StatusKind::Tiny,
            Self::Exists => StatusKind::Exists,
            Self::Missing => StatusKind::Missing,
            Self::Broken => StatusKind::Broken,
            Self::PointFive => StatusKind::PointFive,
        }
    }

    pub fn family(&self) -> Family {
        self.kind().family()
    }

    /// The causal error, for the outcomes that carry one
    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            Self::BadRequest(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true once a classification has been recorded
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Untested)
    }

    pub fn should_open(&self) -> bool {
        self.family() == Family::ToOpen
    }
}
