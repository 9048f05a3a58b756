//! Style and fabric decoding from SKUs.
//!
//! SKUs are built as `{style}{colour:2}{size}`, where the last two letters of
//! the style are a garment category code. For example `AB24JKBKM` is style
//! `AB24JK` (a jacket), colour `BK`, size `M`.

/// Garment category codes found in the last two characters of a style.
const CATEGORY_CODES: &[(&str, &str)] = &[
    ("VT", "VEST"),
    ("AC", "ACC"),
    ("TS", "T-SHIRTS"),
    ("PT", "PANTS"),
    ("SH", "SHIRTS"),
    ("KN", "KNIT"),
    ("JP", "JUMPER"),
    ("JK", "JACKET"),
    ("CD", "CARDIGAN"),
    ("DN", "DENIM"),
    ("SK", "SKIRT"),
    ("DR", "DRESS"),
    ("SS", "SHOES"),
    ("BG", "BAG"),
    ("TO", "TOP"),
    ("TL", "LONG TEE"),
    ("CT", "COAT"),
];

/// Clothing size suffixes, longest first so `XS` is never read as `S`.
const CLOTHING_SIZES: &[&str] = &["XXXL", "XXXS", "XXL", "XXS", "XL", "XS", "L", "M", "S"];

/// One-size suffix.
const ONE_SIZE: &str = "OS";

const SHOE_SIZE_MIN: u32 = 220;
const SHOE_SIZE_MAX: u32 = 300;
const SHOE_SIZE_STEP: usize = 5;

const COLOUR_CODE_LEN: usize = 2;

/// Byte offset where the last `n` characters of `s` start.
fn last_chars_start(s: &str, n: usize) -> Option<usize> {
    n.checked_sub(1)
        .and_then(|skip| s.char_indices().rev().nth(skip))
        .map(|(i, _)| i)
}

/// Drop the size suffix and the colour code before it.
fn strip_size_and_colour(code: &str, size: &str) -> String {
    let style = code.strip_suffix(size).unwrap_or(code);
    last_chars_start(style, COLOUR_CODE_LEN)
        .and_then(|end| style.get(..end))
        .unwrap_or(style)
        .to_string()
}

fn shoe_size_suffix(code: &str) -> Option<String> {
    (SHOE_SIZE_MIN..=SHOE_SIZE_MAX)
        .step_by(SHOE_SIZE_STEP)
        .map(|size| size.to_string())
        .find(|size| code.ends_with(size.as_str()))
}

/// Derive the style code from a SKU or barcode.
///
/// Rules, first match wins:
/// 1. ends with `OS`: drop it and the colour code
/// 2. ends with a clothing size: drop it and the colour code
/// 3. ends with a shoe size (220 to 300, step 5): drop it and the colour code
/// 4. ends with a digit: drop it and the colour code
/// 5. otherwise the uppercased code is the style
///
/// The colour code (two characters, not bytes) is only dropped when at
/// least two characters remain.
#[must_use]
pub fn style_from_code(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return code;
    }

    if code.ends_with(ONE_SIZE) {
        return strip_size_and_colour(&code, ONE_SIZE);
    }

    if let Some(size) = CLOTHING_SIZES.iter().find(|size| code.ends_with(*size)) {
        return strip_size_and_colour(&code, size);
    }

    if let Some(size) = shoe_size_suffix(&code) {
        return strip_size_and_colour(&code, &size);
    }

    if let Some(digit) = code.chars().next_back().filter(char::is_ascii_digit) {
        return strip_size_and_colour(&code, digit.encode_utf8(&mut [0; 4]));
    }

    code
}

/// Map the category code at the end of a style to its fabric label.
///
/// Returns an empty string for styles shorter than two characters or with an
/// unknown category.
#[must_use]
pub fn fabric_from_style(style: &str) -> String {
    let style = style.trim().to_uppercase();
    let Some(suffix) = last_chars_start(&style, 2).and_then(|start| style.get(start..)) else {
        return String::new();
    };

    CATEGORY_CODES
        .iter()
        .find(|(code, _)| *code == suffix)
        .map(|(_, fabric)| (*fabric).to_string())
        .unwrap_or_default()
}
