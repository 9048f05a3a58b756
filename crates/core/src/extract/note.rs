//! Order note parsing.
//!
//! Merchants paste customer details into the order note, frequently through
//! tools that mangle Korean text into Windows-1252 mojibake (`고객명` becomes
//! `ê³ ê°ëª…`). Notes are repaired first, then matched against an ordered
//! list of label patterns.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Windows-1252 code points in the 0x80..=0x9F range. Every other byte maps
/// to the Latin-1 code point with the same value.
const CP1252_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Customer name labels, tried in order. The first capture group is the name.
static CUSTOMER_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"고객명:\s*([^\n]+)",
        // 고객 after a UTF-8 -> Windows-1252 round trip
        r"ê³\s*ê°[^:]*:\s*([^\n]+)",
        r"(?i)Customer Name:\s*([^\n]+)",
        r"(?m)\.{3}\s*([^\n]+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static ACCOUNT_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Account Code:\s*(\d+)").expect("Invalid regex"));

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Currency:\s*([A-Za-z]{3})").expect("Invalid regex"));

/// Leftovers of broken quote characters that end up around names.
const STRAY_CHARS: &[char] = &['â', '€', '™', '"', '\u{201C}', '\u{201D}', '\u{2019}'];

fn cp1252_byte(c: char) -> Option<u8> {
    match u32::from(c) {
        code @ (0x00..=0x7F | 0xA0..=0xFF) => u8::try_from(code).ok(),
        // C1 controls survive a Latin-1 decode of the undefined cp1252 slots
        code @ (0x81 | 0x8D | 0x8F | 0x90 | 0x9D) => u8::try_from(code).ok(),
        _ => CP1252_HIGH
            .iter()
            .find(|(_, ch)| *ch == c)
            .map(|(byte, _)| *byte),
    }
}

/// Undo a UTF-8 -> Windows-1252 mis-decode.
///
/// The text is only replaced when every character maps back to a single byte
/// and those bytes form valid UTF-8 that differs from the input. Correct
/// text (ASCII, real Korean, plain Latin-1 accents) is returned unchanged.
#[must_use]
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let Some(bytes) = text.chars().map(cp1252_byte).collect::<Option<Vec<u8>>>() else {
        return Cow::Borrowed(text);
    };

    match String::from_utf8(bytes) {
        Ok(repaired) if repaired != text => Cow::Owned(repaired),
        _ => Cow::Borrowed(text),
    }
}

fn clean_capture(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !STRAY_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Customer name from a note, trying each label pattern in order.
#[must_use]
pub fn customer_name_from_note(note: &str) -> Option<String> {
    let note = repair_mojibake(note);
    CUSTOMER_NAME_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(&note)
            .and_then(|caps| caps.get(1))
            .map(|m| clean_capture(m.as_str()))
            .filter(|name| !name.is_empty())
    })
}

/// Numeric account code following an `Account Code:` label.
#[must_use]
pub fn account_code_from_note(note: &str) -> Option<String> {
    ACCOUNT_CODE_RE
        .captures(note)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Three-letter currency code following a `Currency:` label, uppercased.
#[must_use]
pub fn currency_from_note(note: &str) -> Option<String> {
    CURRENCY_RE
        .captures(note)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}
