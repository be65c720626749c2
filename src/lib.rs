#![doc = include_str!("../README.md")]

pub mod diff;
pub mod error;
mod evaluation;
mod furigana;
mod input;
mod sentence;
mod settings;
mod tokenizer;
mod utils;

pub use self::evaluation::{
    evaluate, mark_system_answer, mark_user_answer, AlignedCharacter, Correctness, Evaluation,
    Outcome, RenderGroup, RenderSpan,
};
pub use self::furigana::{reading, text, FuriganaMode, FuriganaToken, RubyToken};
pub use self::input::{normalize_kana_input, KanaInput};
pub use self::sentence::{RenderedSentence, Sentence};
pub use self::settings::Settings;
pub use self::tokenizer::{tokenize, try_tokenize};
