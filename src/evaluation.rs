//! Evaluates typed answers against the reading of a sentence.
//!
//! The typed answer is marked against the correct reading so that wrong characters can be pointed out,
//! and the correct reading is marked against the typed answer and laid back over the kanji of the sentence
//! so that each kanji shows its reading with the characters the user missed highlighted.

use crate::{
    diff::{diff_chars, DiffKind, DiffSpan},
    furigana::{self, write_ruby, FuriganaMode, FuriganaToken},
};
use quick_xml::escape::escape;
use serde::Serialize;
use std::fmt::Display;

/// How a character of an answer compares to the other answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Correctness {
    /// Part of an answer that matched exactly.
    FullyCorrect,
    /// In both answers.
    Correct,
    /// Typed by the user but not in the correct answer.
    Extra,
    /// In the correct answer but not typed by the user.
    Missing,
}

impl Correctness {
    pub fn class(self) -> &'static str {
        match self {
            Self::FullyCorrect => "fully-correct",
            Self::Correct => "correct",
            Self::Extra => "extra",
            Self::Missing => "missing",
        }
    }
}

/// A piece of the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RenderSpan {
    pub text: String,
    pub correctness: Correctness,
}

/// Correct text is printed as is, everything else is wrapped in a span.
impl Display for RenderSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.correctness {
            Correctness::Correct => write!(f, "{}", escape(&self.text)),
            correctness => write!(
                f,
                "<span class=\"{}\">{}</span>",
                correctness.class(),
                escape(&self.text)
            ),
        }
    }
}

/// A character of the correct reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AlignedCharacter {
    /// Position of the character in the reading, usable as a stable identifier.
    pub index: usize,
    pub ch: char,
    pub correctness: Correctness,
    /// Index of the token the character belongs to.
    pub token: usize,
}

impl Display for AlignedCharacter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = [0; 4];
        write!(
            f,
            "<span class=\"{}\">{}</span>",
            self.correctness.class(),
            escape(&*self.ch.encode_utf8(&mut buf))
        )
    }
}

/// The correct reading of one token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderGroup {
    Kanji {
        kanji: String,
        reading: Vec<AlignedCharacter>,
        mode: FuriganaMode,
    },
    Text {
        text: Vec<AlignedCharacter>,
    },
}

impl RenderGroup {
    fn new(token: &FuriganaToken, characters: Vec<AlignedCharacter>) -> Self {
        match &token.kanji {
            // the furigana is always shown when revealing the answer
            Some(kanji) => Self::Kanji {
                kanji: kanji.clone(),
                reading: characters,
                mode: FuriganaMode::Show,
            },
            None => Self::Text { text: characters },
        }
    }

    pub fn characters(&self) -> &[AlignedCharacter] {
        match self {
            Self::Kanji { reading, .. } => reading,
            Self::Text { text } => text,
        }
    }

    /// The reading of the group without any markings.
    pub fn reading(&self) -> String {
        self.characters().iter().map(|c| c.ch).collect()
    }
}

impl Display for RenderGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kanji {
                kanji,
                reading,
                mode,
            } => write_ruby(f, kanji, *mode, |f| {
                for c in reading {
                    write!(f, "{c}")?;
                }
                Ok(())
            }),
            Self::Text { text } => {
                write!(f, "<span>")?;
                for c in text {
                    write!(f, "{c}")?;
                }
                write!(f, "</span>")
            }
        }
    }
}

/// How close the user's answer was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    FullyCorrect,
    PartiallyCorrect,
    Incorrect,
}

impl Outcome {
    pub fn of(user_answer: &str, system_answer: &str) -> Self {
        Self::from_diff(&diff_chars(system_answer, user_answer))
    }

    fn from_diff(diff: &[DiffSpan]) -> Self {
        if diff.iter().all(|s| s.kind == DiffKind::Equal) {
            Self::FullyCorrect
        } else if diff.iter().any(|s| s.kind == DiffKind::Equal) {
            Self::PartiallyCorrect
        } else {
            Self::Incorrect
        }
    }
}

/// Marks each part of the user's answer as correct or not.
///
/// The result consists of exactly the characters of `user_answer`, in order.
/// Characters of `system_answer` that the user left out are not included.
/// If the answers are identical, everything is marked fully correct.
pub fn mark_user_answer(user_answer: &str, system_answer: &str) -> Vec<RenderSpan> {
    mark_user_diff(diff_chars(system_answer, user_answer))
}

fn mark_user_diff(diff: Vec<DiffSpan>) -> Vec<RenderSpan> {
    let exact = diff.iter().all(|s| s.kind == DiffKind::Equal);
    let mut marked: Vec<RenderSpan> = Vec::with_capacity(diff.len());
    for span in diff {
        let correctness = match span.kind {
            DiffKind::Equal if exact => Correctness::FullyCorrect,
            DiffKind::Equal => Correctness::Correct,
            DiffKind::Inserted => Correctness::Extra,
            DiffKind::Deleted => continue,
        };
        // dropping a deleted span can leave two spans with the same marking next to each other
        match marked.last_mut() {
            Some(last) if last.correctness == correctness => last.text.push_str(&span.text),
            _ => marked.push(RenderSpan {
                text: span.text,
                correctness,
            }),
        }
    }
    marked
}

/// Marks the correct reading against the user's answer, grouped by the tokens it came from.
///
/// Returns one group per token, in order. Characters of the reading the user didn't type are marked missing.
pub fn mark_system_answer(
    user_answer: &str,
    system_answer_tokens: &[FuriganaToken],
) -> Vec<RenderGroup> {
    let system_answer = furigana::reading(system_answer_tokens);
    let diff = diff_chars(user_answer, &system_answer);

    let mut state = AlignState::new(diff, system_answer_tokens);
    let mut groups = Vec::with_capacity(system_answer_tokens.len());
    while !state.is_done() {
        let (next, group) = state.advance();
        groups.extend(group);
        state = next;
    }
    tracing::debug!(
        tokens = system_answer_tokens.len(),
        groups = groups.len(),
        "marked system answer"
    );
    groups
}

/// Everything shown when the answer is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Evaluation {
    pub user: Vec<RenderSpan>,
    pub system: Vec<RenderGroup>,
    pub outcome: Outcome,
}

pub fn evaluate(user_answer: &str, system_answer_tokens: &[FuriganaToken]) -> Evaluation {
    let system_answer = furigana::reading(system_answer_tokens);
    let diff = diff_chars(&system_answer, user_answer);
    let outcome = Outcome::from_diff(&diff);
    tracing::debug!(?outcome, "evaluated answer");
    Evaluation {
        user: mark_user_diff(diff),
        system: mark_system_answer(user_answer, system_answer_tokens),
        outcome,
    }
}

// walks through the characters of the diff and the tokens at the same time,
// collecting the characters of each token into a group
#[derive(Debug, Clone, PartialEq, Eq)]
struct AlignState<'a> {
    // the diff with the characters missing from the tokens' reading left out
    spans: Vec<DiffSpan>,
    tokens: &'a [FuriganaToken],
    span_idx: usize,
    // byte offset into the current span
    span_offset: usize,
    token_idx: usize,
    // byte offset into the current token's furigana
    token_offset: usize,
    char_idx: usize,
    current: Vec<AlignedCharacter>,
}

impl<'a> AlignState<'a> {
    fn new(diff: Vec<DiffSpan>, tokens: &'a [FuriganaToken]) -> Self {
        let spans = diff
            .into_iter()
            .filter(|s| s.kind != DiffKind::Deleted && !s.text.is_empty())
            .collect();
        Self {
            spans,
            tokens,
            span_idx: 0,
            span_offset: 0,
            token_idx: 0,
            token_offset: 0,
            char_idx: 0,
            current: Vec::new(),
        }
    }

    fn is_done(&self) -> bool {
        self.token_idx >= self.tokens.len()
            && self.span_idx >= self.spans.len()
            && self.current.is_empty()
    }

    // either completes a group or consumes a single character
    fn advance(mut self) -> (Self, Option<RenderGroup>) {
        let tokens = self.tokens;
        let token = tokens.get(self.token_idx);

        // token complete, including tokens with no reading at all
        if let Some(token) = token {
            if self.token_offset >= token.furigana.len() {
                let group = self.flush_token(token);
                return (self, Some(group));
            }
        }

        let Some(span) = self.spans.get(self.span_idx) else {
            // out of characters
            return match token {
                Some(token) => {
                    tracing::trace!(token = self.token_idx, "diff ended before the tokens");
                    let group = self.flush_token(token);
                    (self, Some(group))
                }
                None => {
                    let text = std::mem::take(&mut self.current);
                    (self, (!text.is_empty()).then_some(RenderGroup::Text { text }))
                }
            };
        };

        let Some(ch) = span.text[self.span_offset..].chars().next() else {
            // spans are never empty
            self.span_idx += 1;
            self.span_offset = 0;
            return (self, None);
        };
        let correctness = match span.kind {
            DiffKind::Equal => Correctness::Correct,
            DiffKind::Inserted => Correctness::Missing,
            DiffKind::Deleted => Correctness::Extra,
        };
        self.current.push(AlignedCharacter {
            index: self.char_idx,
            ch,
            correctness,
            token: self.token_idx,
        });
        tracing::trace!(%ch, ?correctness, token = self.token_idx, "aligned character");
        self.char_idx += 1;

        self.span_offset += ch.len_utf8();
        if self.span_offset >= span.text.len() {
            self.span_idx += 1;
            self.span_offset = 0;
        }
        match token {
            Some(token) => {
                let token_char = token.furigana[self.token_offset..].chars().next();
                self.token_offset += token_char.map_or(0, char::len_utf8);
            }
            None => tracing::trace!(%ch, "diff continues past the tokens"),
        }
        (self, None)
    }

    fn flush_token(&mut self, token: &FuriganaToken) -> RenderGroup {
        let group = RenderGroup::new(token, std::mem::take(&mut self.current));
        self.token_idx += 1;
        self.token_offset = 0;
        group
    }
}
