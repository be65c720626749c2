//! Error types.

use thiserror::Error;

/// A ruby element that could not be split into base text and reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMarkupError {
    #[error("ruby element has no base text before its reading \"{reading}\"")]
    MissingBase { reading: String },
}

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("invalid furigana markup at byte {position}")]
    Markup {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
}

impl TokenizeError {
    /// Byte offset into the markup where parsing stopped.
    pub fn position(&self) -> usize {
        match self {
            Self::Markup { position, .. } => *position,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to decode {what}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
