//! Error taxonomy shared by every fail-fast entry point.

use thiserror::Error;

/// Failures raised by key detection, roman-numeral conversion and progression analysis.
///
/// Genre detection never surfaces these; it degrades to [`crate::Genre::Unknown`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Zero chords where at least one is required.
    #[error("progression is empty")]
    EmptyProgression,

    /// A chord symbol the adapter could not parse.
    #[error("invalid chord symbol {0:?}")]
    InvalidChord(String),

    /// A key or root spelling that could not be parsed.
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// A genre name outside the catalog.
    #[error("unknown genre {0:?}")]
    InvalidGenre(String),

    /// Chromatic-distance lookup miss. Unreachable for distances in `0..12`.
    #[error("no scale degree for chromatic distance {0}")]
    UnknownScaleDegree(u8),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
