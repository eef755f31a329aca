//! Cleanup of the free-form strings the MND API puts in menu rows.

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no numeric value in {raw:?}")]
pub struct ParseError {
    pub raw: String,
}

/// Removes every parenthesized annotation (nested ones included) and trims.
///
/// `"hello(123(123))(123)"` becomes `"hello"`. A stray `)` is dropped and an
/// unclosed `(` swallows the rest of the string, so the output never holds a
/// parenthesis.
pub fn normalize_name(raw: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Parses the leading decimal number of a calorie string, ignoring any unit
/// suffix such as `kcal`. Thousands separators are accepted only in groups
/// of three (`"1,012kcal"` is 1012). The upstream precision is kept as-is.
pub fn parse_kcal(raw: &str) -> Result<f64, ParseError> {
    lazy_static! {
        static ref KCAL_PREFIX: Regex = Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?").unwrap();
    }

    KCAL_PREFIX
        .find(raw.trim())
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .ok_or_else(|| ParseError {
            raw: raw.to_string(),
        })
}
