//! Evaluates a typed answer against a ruby-annotated sentence and prints the results as HTML.
//! The first argument is either the markup or a sentence as JSON, the second is the answer in romaji or kana.

use ichibun::{KanaInput, Sentence, Settings};

fn main() -> Result<(), ichibun::error::DecodeError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let sentence = args.next().unwrap_or_else(|| {
        "<ruby>猫<rp>(</rp><rt>ねこ</rt><rp>)</rp></ruby>が<ruby>好<rp>(</rp><rt>す</rt><rp>)</rp></ruby>き".to_string()
    });
    let answer = args.next().unwrap_or_else(|| "nekowasuki".to_string());

    let sentence = if sentence.trim_start().starts_with('{') {
        Sentence::from_json(&sentence)?
    } else {
        Sentence {
            ja: ichibun::text(&ichibun::tokenize(&sentence)),
            en: String::new(),
            furigana_annotated: Some(sentence),
            furigana_tokens: None,
        }
    };
    let settings = Settings::default();
    let tokens = sentence.tokens();
    println!("{}", sentence.render(settings.furigana_mode));

    let input = KanaInput::with_settings(&answer, &settings);
    println!("{answer} -> {}", input.value());

    let evaluation = ichibun::evaluate(input.value(), &tokens);
    println!("{:?}", evaluation.outcome);
    for span in &evaluation.user {
        print!("{span}");
    }
    println!();
    for group in &evaluation.system {
        print!("{group}");
    }
    println!();
    if !sentence.en.is_empty() {
        println!("{}", sentence.en);
    }
    Ok(())
}
