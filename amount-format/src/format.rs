//! # Numeric Formatting
//!
//! Locale rendering (`en-US`) of decimal amounts with a fixed number of
//! fractional digits, thousands grouping and the edge-case rules that keep the
//! output honest:
//!
//! 1. `NaN` renders as `"NaN"`
//! 2. infinities render as `"∞"` / `"-∞"`
//! 3. zero is always `"0"`, whatever the options
//! 4. magnitudes below `0.00001` render as `"<0.00001"` / `">-0.00001"`
//! 5. everything else is rounded half away from zero to `decimals` places
//! 6. a result that reads as `0`/`1` (`"0.00"`, `"-1.000"`, ...) for a value
//!    that is not exactly that integer is re-rendered with 6 significant digits

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{Decimal, UnitSpec};

/// Fractional digits used when none are requested
pub const DEFAULT_DECIMALS: u32 = 2;

/// Significant digits used when the fixed rendering would mislead
pub const FALLBACK_SIGNIFICANT_DIGITS: u32 = 6;

lazy_static! {
    /// Magnitudes strictly below this are shown as a bound, not digits
    static ref SMALL_VALUE_THRESHOLD: Decimal = Decimal::new(1, 5);
    static ref ZERO_OR_ONE: Regex = Regex::new(r"^-?[01](\.0+)?$").expect("static pattern");
}

/// How trailing fractional zeros are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "camelCase"))]
pub enum TrailingZeroDisplay {
    /// Always show `decimals` fractional digits
    #[default]
    Auto,
    /// Drop the fraction entirely when every fractional digit is zero
    StripIfInteger,
}

/// Caller-supplied replacement for the default number formatter
#[derive(Clone)]
pub struct CustomFormatter(Arc<dyn Fn(&Decimal) -> String + Send + Sync>);

impl CustomFormatter {
    pub fn new(formatter: impl Fn(&Decimal) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(formatter))
    }

    pub fn apply(&self, value: &Decimal) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFormatter(..)")
    }
}

/// Options for [`format_decimal`], [`crate::decompose_number`] and [`crate::format_number`]
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct FormatOptions {
    pub decimals: u32,
    pub abbreviate: bool,
    pub unit: Option<UnitSpec>,
    pub use_grouping: bool,
    pub trailing_zero_display: TrailingZeroDisplay,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub formatter: Option<CustomFormatter>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            abbreviate: false,
            unit: None,
            use_grouping: true,
            trailing_zero_display: TrailingZeroDisplay::Auto,
            formatter: None,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn abbreviate(mut self, abbreviate: bool) -> Self {
        self.abbreviate = abbreviate;
        self
    }

    pub fn unit(mut self, unit: impl Into<UnitSpec>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn use_grouping(mut self, use_grouping: bool) -> Self {
        self.use_grouping = use_grouping;
        self
    }

    pub fn trailing_zero_display(mut self, display: TrailingZeroDisplay) -> Self {
        self.trailing_zero_display = display;
        self
    }

    pub fn formatter(mut self, formatter: impl Fn(&Decimal) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(CustomFormatter::new(formatter));
        self
    }
}

/// Format a decimal for display
///
/// # Examples
/// ```
/// use amount_format::{format_decimal, Decimal, FormatOptions};
///
/// let options = FormatOptions::new();
/// let value: Decimal = "1000.5".parse().unwrap();
/// assert_eq!(format_decimal(&value, &options), "1,000.50");
///
/// // Never a misleading "1.00"
/// let value: Decimal = "1.0001".parse().unwrap();
/// assert_eq!(format_decimal(&value, &options), "1.0001");
///
/// assert_eq!(format_decimal(&Decimal::zero(), &options.decimals(5)), "0");
/// ```
pub fn format_decimal(value: &Decimal, options: &FormatOptions) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_negative() { "-∞" } else { "∞" }.to_string();
    }
    if value.is_zero() {
        return "0".to_string();
    }
    if value.abs() < *SMALL_VALUE_THRESHOLD {
        return if value.is_negative() { ">-0.00001" } else { "<0.00001" }.to_string();
    }

    let formatted = render_fixed(value, options);
    if ZERO_OR_ONE.is_match(&formatted) && !renders_exactly(value, &formatted) {
        return render_significant(value, FALLBACK_SIGNIFICANT_DIGITS, options.use_grouping);
    }

    formatted
}

/// True when `rendered` (an ungrouped plain number) is numerically `value`
fn renders_exactly(value: &Decimal, rendered: &str) -> bool {
    rendered.parse::<Decimal>().is_ok_and(|parsed| &parsed == value)
}

fn render_fixed(value: &Decimal, options: &FormatOptions) -> String {
    let mut rounded = value.round_to(options.decimals);
    if options.trailing_zero_display == TrailingZeroDisplay::StripIfInteger && rounded.is_integer() {
        rounded = rounded.round_to(0);
    }

    assemble(value.is_negative(), &rounded.abs().to_string(), options.use_grouping)
}

fn render_significant(value: &Decimal, digits: u32, use_grouping: bool) -> String {
    let rounded = value.round_significant(digits);
    assemble(value.is_negative(), &rounded.abs().to_string(), use_grouping)
}

/// Join sign, (grouped) integer digits and fraction.
///
/// The sign comes from the unrounded value, so `-0.001` at 2 decimals reads
/// `"-0.00"` before the misleading-zero check.
fn assemble(negative: bool, digits: &str, use_grouping: bool) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if negative {
        out.push('-');
    }

    if use_grouping {
        out.push_str(&group_thousands(int_part));
    } else {
        out.push_str(int_part);
    }

    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }

    out
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
