//! Errors surfaced by the navigation core and by the loaders that feed it.

use std::{borrow::Cow, fmt};

/// Everything a caller of the navigation core can be told about.
///
/// Only [NavError::InvalidRoute] and [NavError::AlreadyStarted] prevent a
/// session from starting. [NavError::CueAssetUnavailable] and
/// [NavError::Sink] are degradations: the update that produced them still
/// completes.
#[derive(Debug, Clone, PartialEq)]
pub enum NavError {
    /// The route handed to a session has fewer than two usable waypoints.
    InvalidRoute(String),

    /// The audio engine could not load the named sound; the cue is skipped.
    CueAssetUnavailable(String),

    /// Average speed was requested before any speed sample was recorded.
    NoSamples,

    /// A command arrived after the session was ended.
    StaleSession,

    /// `start` was issued on a session that is already navigating.
    AlreadyStarted,

    /// The logging sink refused a sample row.
    Sink(String),
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use NavError as NE;
        let msg = match self {
            NE::InvalidRoute(reason) => Cow::from(format!("invalid route: {}", reason)),
            NE::CueAssetUnavailable(name) => {
                Cow::from(format!("cue asset unavailable: {}", name))
            }
            NE::NoSamples => Cow::from("no speed samples recorded"),
            NE::StaleSession => Cow::from("session already ended"),
            NE::AlreadyStarted => Cow::from("session already started"),
            NE::Sink(reason) => Cow::from(format!("sample sink error: {}", reason)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for NavError {}

/// Returned when reading or writing configuration, routes, tracks or
/// recorded samples goes wrong.
#[derive(Debug)]
pub enum FileError {
    /// Returned when io fails when reading or writing files.
    IoError(std::io::Error),

    /// Returned when serialization to RON fails.
    RonError(ron::Error),

    /// Returned when deserialization from RON fails.
    RonSpannedError(ron::de::SpannedError),

    /// Returned when a line of a recorded track cannot be parsed.
    Parse {
        /// 1-based line number in the source text.
        line: usize,
        /// What the parser choked on.
        reason: String,
    },

    /// Returned when a file parses but its contents make no sense.
    Invalid(String),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use FileError as FE;
        let msg = match self {
            FE::IoError(error) => Cow::from(format!("io error: {}", error)),
            FE::RonError(error) => Cow::from(format!("ron error: {}", error)),
            FE::RonSpannedError(error) => Cow::from(format!("ron spanning error: {}", error)),
            FE::Parse { line, reason } => {
                Cow::from(format!("parse error on line {}: {}", line, reason))
            }
            FE::Invalid(reason) => Cow::from(format!("invalid contents: {}", reason)),
        };

        write!(f, "{}", msg)
    }
}

impl std::error::Error for FileError {}

impl From<std::io::Error> for FileError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}

impl From<ron::Error> for FileError {
    fn from(value: ron::Error) -> Self {
        Self::RonError(value)
    }
}

impl From<ron::de::SpannedError> for FileError {
    fn from(value: ron::de::SpannedError) -> Self {
        Self::RonSpannedError(value)
    }
}
