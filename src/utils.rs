//! Various utility functions

pub fn is_fullwidth(c: char) -> bool {
    ('Ａ'..='Ｚ').contains(&c) || ('ａ'..='ｚ').contains(&c)
}

// latin letters that may still be converted to kana
pub fn is_romaji(c: char) -> bool {
    c.is_ascii_alphabetic() || is_fullwidth(c)
}
