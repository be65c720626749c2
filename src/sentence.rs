use crate::{
    error::DecodeError,
    furigana::{FuriganaMode, FuriganaToken},
    tokenizer,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A sentence to practice with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// The sentence in Japanese.
    pub ja: String,
    /// The English translation.
    pub en: String,
    /// The sentence with its furigana as ruby markup.
    #[serde(default, alias = "furiganaHTML", skip_serializing_if = "Option::is_none")]
    pub furigana_annotated: Option<String>,
    /// The sentence already split into tokens. Takes precedence over `furigana_annotated`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furigana_tokens: Option<Vec<FuriganaToken>>,
}

impl Sentence {
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(json).map_err(|source| DecodeError::Json {
            what: "sentence",
            source,
        })
    }

    /// The tokens of the sentence.
    /// Without any furigana the whole sentence is a single plain token.
    pub fn tokens(&self) -> Vec<FuriganaToken> {
        if let Some(tokens) = &self.furigana_tokens {
            return tokens.clone();
        }
        match self.furigana_annotated.as_deref() {
            Some(markup) if !markup.is_empty() => tokenizer::tokenize(markup),
            _ => vec![FuriganaToken::plain(&self.ja)],
        }
    }

    /// Renders the sentence as HTML with its furigana shown according to `mode`.
    pub fn render(&self, mode: FuriganaMode) -> RenderedSentence {
        RenderedSentence {
            tokens: self.tokens(),
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderedSentence {
    pub tokens: Vec<FuriganaToken>,
    pub mode: FuriganaMode,
}

impl Display for RenderedSentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token.ruby(self.mode))?;
        }
        Ok(())
    }
}
