use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One rendering unit of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FuriganaToken {
    /// The kanji (or kanji compound) this token annotates.
    /// None for plain runs of kana, punctuation or other text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kanji: Option<String>,
    /// The reading of the kanji, or the text itself for plain tokens.
    pub furigana: String,
}

impl FuriganaToken {
    pub fn kanji(kanji: impl Into<String>, furigana: impl Into<String>) -> Self {
        Self {
            kanji: Some(kanji.into()),
            furigana: furigana.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kanji: None,
            furigana: text.into(),
        }
    }

    /// The text as written in the sentence.
    pub fn text(&self) -> &str {
        self.kanji.as_deref().unwrap_or(&self.furigana)
    }

    /// Wraps the token for rendering with the given mode.
    pub fn ruby(&self, mode: FuriganaMode) -> RubyToken<'_> {
        RubyToken { token: self, mode }
    }
}

/// Concatenates the readings of the tokens, giving the reading of the whole sentence.
pub fn reading(tokens: &[FuriganaToken]) -> String {
    tokens.iter().map(|t| t.furigana.as_str()).collect()
}

/// Concatenates the written forms of the tokens, giving the original sentence.
pub fn text(tokens: &[FuriganaToken]) -> String {
    tokens.iter().map(FuriganaToken::text).collect()
}

/// When the furigana of a kanji is visible.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FuriganaMode {
    /// Visible while hovered, or after being clicked until clicked again.
    #[default]
    Hover,
    Show,
    Hide,
}

impl FuriganaMode {
    /// The class given to the reading element.
    pub fn class(self) -> &'static str {
        match self {
            Self::Show => "show-furigana",
            Self::Hover | Self::Hide => "hide-furigana",
        }
    }
}

/// A token paired with the mode it should be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RubyToken<'a> {
    pub token: &'a FuriganaToken,
    pub mode: FuriganaMode,
}

/// Prints kanji tokens using HTML ruby tags, plain tokens as escaped text.
impl Display for RubyToken<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.token.kanji {
            Some(kanji) => write_ruby(f, kanji, self.mode, |f| {
                write!(f, "{}", escape(&self.token.furigana))
            }),
            None => write!(f, "{}", escape(&self.token.furigana)),
        }
    }
}

// shared between the plain sentence and the evaluated answer
pub(crate) fn write_ruby(
    f: &mut std::fmt::Formatter<'_>,
    kanji: &str,
    mode: FuriganaMode,
    reading: impl FnOnce(&mut std::fmt::Formatter<'_>) -> std::fmt::Result,
) -> std::fmt::Result {
    write!(f, "<ruby>{}<rp>(</rp>", escape(kanji))?;
    write!(f, "<rt class=\"{}\">", mode.class())?;
    reading(f)?;
    write!(f, "</rt><rp>)</rp></ruby>")?;
    Ok(())
}
