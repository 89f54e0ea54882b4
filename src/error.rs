//! Unified error types for mu-reader
//!
//! Provides a top-level `ReaderError` covering navigation, playback and
//! persistence failures, so `?` works across module boundaries.
//!
//! Expected conditions (an out-of-range navigation target, a section with
//! no media overlay) are modeled as explicit variants rather than panics;
//! presentation code decides how to surface them.

use core::fmt;

/// Top-level error type for mu-reader operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReaderError {
    /// Structure provider failure (package document fetch or resolution)
    Structure(String),
    /// Navigation target is outside the spine
    PositionOutOfRange {
        /// Requested spine position.
        pos: usize,
        /// Total number of spine items available.
        spine_length: usize,
    },
    /// An href could not be resolved to a spine item
    UnknownHref(String),
    /// The current section has no media overlay to play
    OverlayUnsupported {
        /// Spine position of the section without an overlay.
        index: usize,
    },
    /// Persistence backend failure
    Store(String),
    /// Serialization of persisted view properties failed
    Serialize(String),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::Structure(msg) => write!(f, "Structure error: {}", msg),
            ReaderError::PositionOutOfRange { pos, spine_length } => write!(
                f,
                "Spine position {} out of range (spine length: {})",
                pos, spine_length
            ),
            ReaderError::UnknownHref(href) => {
                write!(f, "Href does not resolve to a spine item: {}", href)
            }
            ReaderError::OverlayUnsupported { index } => {
                write!(f, "Section {} has no media overlay", index)
            }
            ReaderError::Store(msg) => write!(f, "Store error: {}", msg),
            ReaderError::Serialize(msg) => write!(f, "Serialize error: {}", msg),
        }
    }
}

impl std::error::Error for ReaderError {}

impl From<serde_json::Error> for ReaderError {
    fn from(err: serde_json::Error) -> Self {
        ReaderError::Serialize(err.to_string())
    }
}
