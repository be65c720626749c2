//! Splits ruby-annotated sentences into furigana tokens.
//!
//! The expected markup is a mix of plain text and ruby elements, where each ruby element contains
//! the base text followed by an `rt` element with its reading. `rp` elements hold fallback
//! parentheses for renderers without ruby support and are skipped:
//! ```text
//! <ruby>猫<rp>(</rp><rt>ねこ</rt><rp>)</rp></ruby>が<ruby>好<rp>(</rp><rt>す</rt><rp>)</rp></ruby>き
//! ```

use crate::{
    error::{MalformedMarkupError, TokenizeError},
    furigana::FuriganaToken,
};
use quick_xml::{events::Event, Reader};
use std::borrow::Cow;

/// Tokenizes the markup, recovering from any errors along the way.
/// A ruby element that can't be split into kanji and reading is emitted without furigana,
/// and if the markup itself is broken, the rest of it is kept as plain text.
pub fn tokenize(markup: &str) -> Vec<FuriganaToken> {
    let (mut tokens, error) = Tokenizer::new(markup).run();
    if let Some(error) = error {
        tracing::warn!("{error}, keeping the rest as plain text");
        if let Some(rest) = markup.get(error.position()..) {
            push_plain(&mut tokens, rest);
        }
    }
    tracing::debug!(tokens = tokens.len(), "tokenized furigana markup");
    tokens
}

/// Tokenizes the markup, failing if it is not well-formed enough to parse.
/// Individual malformed ruby elements are still recovered from the same way as in `tokenize`.
pub fn try_tokenize(markup: &str) -> Result<Vec<FuriganaToken>, TokenizeError> {
    match Tokenizer::new(markup).run() {
        (tokens, None) => Ok(tokens),
        (_, Some(error)) => Err(error),
    }
}

// appends text to the previous token if it is also plain
fn push_plain(tokens: &mut Vec<FuriganaToken>, text: &str) {
    if text.is_empty() {
        return;
    }
    match tokens.last_mut() {
        Some(FuriganaToken {
            kanji: None,
            furigana,
        }) => furigana.push_str(text),
        _ => tokens.push(FuriganaToken::plain(text)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Ruby,
    Rt,
    Rp,
    Other,
}

impl Tag {
    fn from_name(name: &[u8]) -> Self {
        if name.eq_ignore_ascii_case(b"ruby") {
            Self::Ruby
        } else if name.eq_ignore_ascii_case(b"rt") {
            Self::Rt
        } else if name.eq_ignore_ascii_case(b"rp") {
            Self::Rp
        } else {
            Self::Other
        }
    }
}

// the ruby element currently being read
#[derive(Debug, Default)]
struct Ruby {
    base: String,
    // Some while inside an rt element
    reading: Option<String>,
    rp_depth: usize,
    // a reading in this element had no base text
    malformed: bool,
}

impl Ruby {
    fn take_pair(&mut self, reading: String) -> Result<FuriganaToken, MalformedMarkupError> {
        let base = std::mem::take(&mut self.base);
        if base.is_empty() {
            return Err(MalformedMarkupError::MissingBase { reading });
        }
        Ok(FuriganaToken::kanji(base, reading))
    }
}

struct Tokenizer<'a> {
    reader: Reader<&'a [u8]>,
    tokens: Vec<FuriganaToken>,
    plain: String,
    ruby: Option<Ruby>,
}

impl<'a> Tokenizer<'a> {
    fn new(markup: &'a str) -> Self {
        let mut reader = Reader::from_str(markup);
        reader
            .trim_text(false)
            .expand_empty_elements(true)
            .check_end_names(false);
        Self {
            reader,
            tokens: Vec::new(),
            plain: String::new(),
            ruby: None,
        }
    }

    fn run(mut self) -> (Vec<FuriganaToken>, Option<TokenizeError>) {
        let error = loop {
            // the reader has already moved past the `<` of broken markup when it reports the error
            let start = self.reader.buffer_position();
            match self.reader.read_event() {
                Ok(Event::Start(start)) => self.open(Tag::from_name(start.local_name().as_ref())),
                Ok(Event::End(end)) => self.close(Tag::from_name(end.local_name().as_ref())),
                Ok(Event::Text(text)) => {
                    // unknown entities such as &nbsp; are kept as they are
                    let text = text
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text));
                    self.text(&text);
                }
                Ok(Event::CData(cdata)) => {
                    let text: Cow<str> = String::from_utf8_lossy(&cdata);
                    self.text(&text);
                }
                Ok(Event::Eof) => break None,
                // comments, declarations and so on
                Ok(_) => {}
                Err(source) => {
                    break Some(TokenizeError::Markup {
                        position: start,
                        source,
                    })
                }
            }
        };
        self.finish();
        (self.tokens, error)
    }

    fn open(&mut self, tag: Tag) {
        if tag == Tag::Ruby {
            // nested ruby elements are read as part of the outer one
            if self.ruby.is_none() {
                self.flush_plain();
                self.ruby = Some(Ruby::default());
            }
            return;
        }
        if let Some(ruby) = self.ruby.as_mut() {
            match tag {
                Tag::Rt if ruby.rp_depth == 0 && ruby.reading.is_none() => {
                    ruby.reading = Some(String::new());
                }
                Tag::Rp => ruby.rp_depth += 1,
                _ => {}
            }
        }
    }

    fn close(&mut self, tag: Tag) {
        if tag == Tag::Ruby {
            self.close_ruby();
            return;
        }
        let Some(ruby) = self.ruby.as_mut() else {
            return;
        };
        match tag {
            Tag::Rt if ruby.rp_depth == 0 => {
                if let Some(reading) = ruby.reading.take() {
                    match ruby.take_pair(reading) {
                        Ok(token) => self.tokens.push(token),
                        Err(err) => {
                            tracing::warn!("{err}, leaving out the reading");
                            ruby.malformed = true;
                        }
                    }
                }
            }
            Tag::Rp => ruby.rp_depth = ruby.rp_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn close_ruby(&mut self) {
        let Some(mut ruby) = self.ruby.take() else {
            return;
        };
        if let Some(reading) = ruby.reading.take() {
            // unclosed rt
            match ruby.take_pair(reading) {
                Ok(token) => self.tokens.push(token),
                Err(err) => {
                    tracing::warn!("{err}, leaving out the reading");
                    ruby.malformed = true;
                }
            }
        }
        if ruby.malformed || !ruby.base.trim().is_empty() {
            // a kanji without a reading still takes up its place in the sentence
            self.tokens.push(FuriganaToken::kanji(ruby.base, ""));
        } else {
            // whitespace after the last reading
            push_plain(&mut self.tokens, &ruby.base);
        }
    }

    fn text(&mut self, text: &str) {
        match self.ruby.as_mut() {
            None => self.plain.push_str(text),
            Some(ruby) if ruby.rp_depth > 0 => {}
            Some(ruby) => match ruby.reading.as_mut() {
                Some(reading) => reading.push_str(text),
                None => ruby.base.push_str(text),
            },
        }
    }

    fn flush_plain(&mut self) {
        let plain = std::mem::take(&mut self.plain);
        push_plain(&mut self.tokens, &plain);
    }

    fn finish(&mut self) {
        self.close_ruby();
        self.flush_plain();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::furigana;
    use pretty_assertions::assert_eq;

    const SENTENCE: &str = "<ruby>猫<rp>(</rp><rt>ねこ</rt><rp>)</rp></ruby>が<ruby>好<rp>(</rp><rt>す</rt><rp>)</rp></ruby>き。";

    #[test]
    fn tokenizes_sentence() {
        let tokens = tokenize(SENTENCE);
        println!("{tokens:?}");
        assert_eq!(
            tokens,
            vec![
                FuriganaToken::kanji("猫", "ねこ"),
                FuriganaToken::plain("が"),
                FuriganaToken::kanji("好", "す"),
                FuriganaToken::plain("き。"),
            ]
        );
        assert_eq!(furigana::text(&tokens), "猫が好き。");
        assert_eq!(furigana::reading(&tokens), "ねこがすき。");
    }

    #[test]
    fn tokenizes_empty() {
        assert!(tokenize("").is_empty());
        assert!(try_tokenize("").unwrap().is_empty());
    }

    #[test]
    fn tokenizes_plain_text() {
        assert_eq!(tokenize("ねこがすき"), vec![FuriganaToken::plain("ねこがすき")]);
    }

    #[test]
    fn tokenizes_without_rp() {
        let tokens = tokenize("<ruby>今日<rt>きょう</rt></ruby>は");
        assert_eq!(
            tokens,
            vec![
                FuriganaToken::kanji("今日", "きょう"),
                FuriganaToken::plain("は"),
            ]
        );
    }

    #[test]
    fn tokenizes_multiple_pairs_in_one_element() {
        let tokens = tokenize("<ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby>");
        assert_eq!(
            tokens,
            vec![
                FuriganaToken::kanji("漢", "かん"),
                FuriganaToken::kanji("字", "じ"),
            ]
        );
    }

    #[test]
    fn keeps_kanji_without_reading() {
        let tokens = tokenize("<ruby>猫</ruby>が");
        assert_eq!(
            tokens,
            vec![FuriganaToken::kanji("猫", ""), FuriganaToken::plain("が")]
        );
        let tokens = tokenize("<ruby>猫<rt/></ruby>");
        assert_eq!(tokens, vec![FuriganaToken::kanji("猫", "")]);
    }

    #[test]
    fn recovers_from_reading_without_base() {
        let tokens = tokenize("<ruby><rt>ねこ</rt>猫</ruby>が<ruby>犬<rt>いぬ</rt></ruby>");
        println!("{tokens:?}");
        assert_eq!(
            tokens,
            vec![
                FuriganaToken::kanji("猫", ""),
                FuriganaToken::plain("が"),
                FuriganaToken::kanji("犬", "いぬ"),
            ]
        );

        let tokens = tokenize("<ruby><rt>ねこ</rt></ruby>が");
        assert_eq!(
            tokens,
            vec![FuriganaToken::kanji("", ""), FuriganaToken::plain("が")]
        );
    }

    #[test]
    fn ignores_other_tags() {
        let tokens = tokenize("<span><ruby>猫<rt>ねこ</rt></ruby></span>が<b>い</b>る");
        assert_eq!(
            tokens,
            vec![FuriganaToken::kanji("猫", "ねこ"), FuriganaToken::plain("がいる")]
        );
    }

    #[test]
    fn unescapes_entities() {
        let tokens = tokenize("A&amp;B<ruby>猫<rt>ねこ</rt></ruby>");
        assert_eq!(
            tokens,
            vec![
                FuriganaToken::plain("A&B"),
                FuriganaToken::kanji("猫", "ねこ"),
            ]
        );
        assert_eq!(tokenize("&nbsp;"), vec![FuriganaToken::plain("&nbsp;")]);
    }

    #[test]
    fn recovers_from_broken_markup() {
        let markup = "<ruby>猫<rt>ねこ</rt></ruby>が<ruby";
        assert!(try_tokenize(markup).is_err());
        let tokens = tokenize(markup);
        println!("{tokens:?}");
        assert_eq!(
            tokens,
            vec![
                FuriganaToken::kanji("猫", "ねこ"),
                FuriganaToken::plain("が<ruby"),
            ]
        );
        assert_eq!(furigana::text(&tokens), "猫が<ruby");

        let markup = "ね<ruby>猫<rt>ねこ</rt></ruby><!-- こ";
        match try_tokenize(markup) {
            Err(err) => assert_eq!(err.position(), markup.find("<!--").unwrap()),
            Ok(tokens) => panic!("parsed {tokens:?}"),
        }
        assert_eq!(
            tokenize(markup),
            vec![
                FuriganaToken::plain("ね"),
                FuriganaToken::kanji("猫", "ねこ"),
                FuriganaToken::plain("<!-- こ"),
            ]
        );
    }

    #[test]
    fn keeps_whitespace_verbatim() {
        let tokens = tokenize("<ruby> 猫 <rt>ねこ</rt></ruby>が");
        assert_eq!(
            tokens,
            vec![FuriganaToken::kanji(" 猫 ", "ねこ"), FuriganaToken::plain("が")]
        );
        assert_eq!(furigana::text(&tokens), " 猫 が");

        let tokens = tokenize("<ruby>猫<rt>ねこ</rt>\n</ruby>が");
        println!("{tokens:?}");
        assert_eq!(
            tokens,
            vec![FuriganaToken::kanji("猫", "ねこ"), FuriganaToken::plain("\nが")]
        );
    }
}
