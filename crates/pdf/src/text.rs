use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 5] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Normalise text decoded from a content stream.
///
/// NFC normalisation, ligature expansion and removal of U+FFFD / NUL.
/// Whitespace is left untouched so chunking sees the same words.
pub fn clean_span_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.nfc() {
        match c {
            '\u{FFFD}' | '\0' => {}
            _ => match LIGATURES.iter().find(|(lig, _)| *lig == c) {
                Some((_, expanded)) => result.push_str(expanded),
                None => result.push(c),
            },
        }
    }
    result
}

/// Drop the `ABCDEF+` subset tag from an embedded font name.
pub fn strip_subset_tag(font_name: &str) -> &str {
    static RE_SUBSET: OnceLock<Regex> = OnceLock::new();
    let re = RE_SUBSET.get_or_init(|| Regex::new(r"^[A-Z]{6}\+").unwrap());
    match re.find(font_name) {
        Some(m) => &font_name[m.end()..],
        None => font_name,
    }
}
