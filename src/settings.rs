//! Practice settings. Storing them is left to the application.

use crate::{error::DecodeError, furigana::FuriganaMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// How furigana is shown over the sentence before the answer is revealed.
    pub furigana_mode: FuriganaMode,
    /// Whether incomplete syllables are left unconverted while typing.
    pub ime_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            furigana_mode: FuriganaMode::Hover,
            ime_mode: true,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(json).map_err(|source| DecodeError::Json {
            what: "settings",
            source,
        })
    }
}
