//! Keystroke filtering for numeric text fields.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use amount_format::Decimal;

lazy_static! {
    static ref NUMERIC_TEXT: Regex =
        Regex::new(r"^-?[0-9]*\.?[0-9]*([eE][-+]?[0-9]+)?$").expect("static pattern");
}

/// Text that stands in for "no value yet"
pub const PLACEHOLDER_TEXTS: [&str; 4] = ["", "-", ".", ","];

/// Accept or reject an edit of a numeric field.
///
/// Commas become dots. An edit that would leave more than one dot, a minus
/// sign after the first character, or any other non-numeric text is rejected
/// and `current` is returned unchanged.
///
/// # Examples
/// ```
/// use amount_input::sanitize;
///
/// assert_eq!(sanitize("1,5", "1"), "1.5");
/// assert_eq!(sanitize("1.5.", "1.5"), "1.5");
/// assert_eq!(sanitize("12a", "12"), "12");
/// assert_eq!(sanitize("-", ""), "-");
/// ```
pub fn sanitize(next: &str, current: &str) -> String {
    let normalized = next.replace(',', ".");

    if normalized.matches('.').count() > 1 {
        trace!(next, "rejected edit with several decimal points");
        return current.to_string();
    }

    if normalized.find('-').is_some_and(|index| index > 0) {
        trace!(next, "rejected edit with a misplaced minus sign");
        return current.to_string();
    }

    if !NUMERIC_TEXT.is_match(&normalized) {
        trace!(next, "rejected non-numeric edit");
        return current.to_string();
    }

    normalized
}

/// Whether `text` is a placeholder that resolves to no value
pub fn is_incomplete(text: &str) -> bool {
    PLACEHOLDER_TEXTS.contains(&text)
}

/// Read sanitized text as a value, accepting a dangling dot (`"5."` is 5)
pub fn resolve_text(text: &str) -> Option<Decimal> {
    if is_incomplete(text) {
        return None;
    }

    text.parse()
        .or_else(|_| text.trim_end_matches('.').parse())
        .ok()
}

/// Restrict `value` to the optional bounds
pub fn clamp(value: &Decimal, min: Option<&Decimal>, max: Option<&Decimal>) -> Decimal {
    if let Some(min) = min {
        if value < min {
            return min.clone();
        }
    }
    if let Some(max) = max {
        if value > max {
            return max.clone();
        }
    }
    value.clone()
}
