//! # Scale Classification
//!
//! Order-of-magnitude buckets (ones, thousands, millions, billions, trillions)
//! used to abbreviate large amounts.

use crate::Decimal;

/// Suffixes indexed by thousands bucket
pub const SCALE_SUFFIXES: [&str; 5] = ["", "k", "m", "b", "t"];

/// Result of [`log10_exp`]: a thousands exponent, or one of the non-finite cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exponent {
    /// Zero has no magnitude
    NegInfinity,
    Finite(i64),
    /// Either sign of infinity
    Infinity,
    NaN,
}

/// Thousands exponent of a value: `floor(log10(|value|) / 3)`
///
/// # Examples
/// ```
/// use amount_format::{log10_exp, Decimal, Exponent};
///
/// let value: Decimal = "1500000".parse().unwrap();
/// assert_eq!(log10_exp(&value), Exponent::Finite(2));
///
/// let small: Decimal = "0.5".parse().unwrap();
/// assert_eq!(log10_exp(&small), Exponent::Finite(-1));
///
/// assert_eq!(log10_exp(&Decimal::zero()), Exponent::NegInfinity);
/// ```
pub fn log10_exp(value: &Decimal) -> Exponent {
    if value.is_nan() {
        return Exponent::NaN;
    }
    if value.is_infinite() {
        return Exponent::Infinity;
    }

    // Exact floor(log10) from the digit count; no float rounding at 1000, 1e6, ...
    match value.exponent10() {
        Some(exponent) => Exponent::Finite(exponent.div_euclid(3)),
        None => Exponent::NegInfinity,
    }
}

/// Abbreviation suffix for a value, capped at trillions
///
/// # Examples
/// ```
/// use amount_format::{scale_suffix, Decimal};
///
/// let value: Decimal = "-1500".parse().unwrap();
/// assert_eq!(scale_suffix(&value), "k");
/// assert_eq!(scale_suffix(&Decimal::nan()), "");
/// ```
pub fn scale_suffix(value: &Decimal) -> &'static str {
    let index = match log10_exp(value) {
        Exponent::NaN => return "",
        Exponent::NegInfinity => 0,
        Exponent::Infinity => SCALE_SUFFIXES.len() - 1,
        Exponent::Finite(exponent) => exponent.clamp(0, SCALE_SUFFIXES.len() as i64 - 1) as usize,
    };
    SCALE_SUFFIXES[index]
}

/// Divide a value by `1000^bucket` when its bucket is above zero.
///
/// Values below 1000 come back unchanged, never amplified. The divisor uses the
/// full bucket, so `1e15` abbreviates to `1` even though the suffix is capped
/// at `"t"`. Infinite values have no meaningful mantissa and become `NaN`.
///
/// # Examples
/// ```
/// use amount_format::{abbreviate_number, Decimal};
///
/// let value: Decimal = "2500000".parse().unwrap();
/// assert_eq!(abbreviate_number(&value).to_string(), "2.5");
///
/// let small: Decimal = "999.9".parse().unwrap();
/// assert_eq!(abbreviate_number(&small).to_string(), "999.9");
/// ```
pub fn abbreviate_number(value: &Decimal) -> Decimal {
    match log10_exp(value) {
        Exponent::Finite(bucket) if bucket > 0 => value.shift(-(bucket as i32) * 3).normalize(),
        Exponent::Infinity => Decimal::nan(),
        _ => value.clone(),
    }
}
