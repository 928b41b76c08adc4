//! Phone input mask
//!
//! The phone field keeps at most ten digits and renders them as
//! `(ddd)ddd-dddd`; shorter input renders as the matching prefix of the mask.

/// Digits the field keeps
pub const PHONE_DIGITS: usize = 10;

/// Pattern a fully accepted phone value matches
pub const PHONE_MASK_PATTERN: &str = r"^\(\d{3}\)\d{3}-\d{4}$";

/// Digits of `raw`, truncated to [`PHONE_DIGITS`]
#[must_use]
pub fn phone_digits(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS)
        .collect()
}

/// Render raw input the way the field displays it
#[must_use]
pub fn mask_phone(raw: &str) -> String {
    let digits = phone_digits(raw);
    let n = digits.len();
    match n {
        0 => String::new(),
        1..=3 => format!("({digits}"),
        4..=6 => format!("({}){}", &digits[..3], &digits[3..]),
        _ => format!("({}){}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// Whether `value` is a complete masked number
#[must_use]
pub fn is_complete_mask(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 13
        && bytes[0] == b'('
        && bytes[4] == b')'
        && bytes[8] == b'-'
        && bytes
            .iter()
            .enumerate()
            .filter(|(i, _)| ![0, 4, 8].contains(i))
            .all(|(_, b)| b.is_ascii_digit())
}
