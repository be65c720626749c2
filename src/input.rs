//! Keeps typed answers in kana while they are being typed.

use crate::{settings::Settings, utils};
use wana_kana::ConvertJapanese;

/// Converts typed romaji to kana, leaving an incomplete trailing `n` as it is.
/// Kana and anything that isn't romaji passes through unchanged.
pub fn normalize_kana_input(raw: &str) -> String {
    convert(raw, true)
}

fn convert(raw: &str, ime_mode: bool) -> String {
    let (complete, pending) = if ime_mode {
        split_pending_n(raw)
    } else {
        (raw, "")
    };
    let mut kana = complete.to_kana();
    kana.push_str(pending);
    kana
}

// A trailing n could still become な, にゃ and so on, or ん once the next consonant is typed.
// An n that is the second of a pair already stands for ん.
fn split_pending_n(raw: &str) -> (&str, &str) {
    let body = raw
        .strip_suffix(|c: char| c.eq_ignore_ascii_case(&'y'))
        .unwrap_or(raw);
    let run = body
        .chars()
        .rev()
        .take_while(|c| matches!(c, 'n' | 'N'))
        .count();
    if run % 2 == 1 {
        raw.split_at(body.len() - 1)
    } else {
        (raw, "")
    }
}

/// The current value of an answer field.
///
/// The presentation layer feeds every change to `update` and displays the returned value,
/// so the field never shows raw romaji.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KanaInput {
    value: String,
    ime_mode: bool,
}

impl KanaInput {
    /// Creates an input with the given initial value, converted the same way as any later change.
    pub fn new(initial: &str) -> Self {
        Self::with_settings(initial, &Settings::default())
    }

    pub fn with_settings(initial: &str, settings: &Settings) -> Self {
        Self {
            value: convert(initial, settings.ime_mode),
            ime_mode: settings.ime_mode,
        }
    }

    /// Replaces the value with the converted form of `raw` and returns it.
    pub fn update(&mut self, raw: &str) -> &str {
        let value = convert(raw, self.ime_mode);
        if value != self.value {
            tracing::trace!(raw, value = value.as_str(), "converted input");
            self.value = value;
        }
        &self.value
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// Checks that no romaji is waiting to be converted.
    pub fn is_settled(&self) -> bool {
        !self.value.chars().any(utils::is_romaji)
    }
}

impl Default for KanaInput {
    fn default() -> Self {
        Self::new("")
    }
}
