//! # Unit Decomposition
//!
//! Splits a formatted amount into prefix, main value, scale suffix and unit
//! suffix so views can style each part, and joins them back for plain text.

use tracing::warn;

use crate::{abbreviate_number, format_decimal, scale_suffix, Decimal, FormatOptions};

/// Largest USD magnitude displayed; anything above renders as `"?"`
pub const MAX_USD_VALUE: u64 = 100_000_000_000_000;

/// Placeholder shown instead of an implausible USD value
pub const UNKNOWN_VALUE: &str = "?";

const USD_SYMBOL: &str = "$";

/// Where a unit symbol is placed relative to the number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum UnitPosition {
    Prefix,
    #[default]
    Suffix,
}

/// Unit descriptor: a symbol and its placement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Unit {
    pub symbol: String,
    pub position: UnitPosition,
}

impl Unit {
    pub fn prefix(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            position: UnitPosition::Prefix,
        }
    }

    pub fn suffix(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            position: UnitPosition::Suffix,
        }
    }
}

/// Named unit descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum UnitPreset {
    None,
    Dollar,
    Percentage,
    Multiplier,
}

impl From<UnitPreset> for Unit {
    fn from(preset: UnitPreset) -> Self {
        match preset {
            UnitPreset::None => Unit::default(),
            UnitPreset::Dollar => Unit::prefix("$"),
            UnitPreset::Percentage => Unit::suffix("%"),
            UnitPreset::Multiplier => Unit::suffix("x"),
        }
    }
}

/// A unit given either by preset name or as a literal descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(untagged))]
pub enum UnitSpec {
    Preset(UnitPreset),
    Custom(Unit),
}

impl UnitSpec {
    pub fn resolve(&self) -> Unit {
        match self {
            UnitSpec::Preset(preset) => Unit::from(*preset),
            UnitSpec::Custom(unit) => unit.clone(),
        }
    }
}

impl From<UnitPreset> for UnitSpec {
    fn from(preset: UnitPreset) -> Self {
        UnitSpec::Preset(preset)
    }
}

impl From<Unit> for UnitSpec {
    fn from(unit: Unit) -> Self {
        UnitSpec::Custom(unit)
    }
}

/// A formatted amount split into its display parts
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct DecomposedNumber {
    pub prefix: String,
    pub main_value: String,
    pub suffix: String,
    pub scale_suffix: String,
}

impl DecomposedNumber {
    fn unknown() -> Self {
        Self {
            main_value: UNKNOWN_VALUE.to_string(),
            ..Self::default()
        }
    }

    /// Join the non-empty parts in display order
    pub fn join(&self) -> String {
        [&self.prefix, &self.main_value, &self.scale_suffix, &self.suffix]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect()
    }
}

fn exceeds_usd_limit(value: &Decimal) -> bool {
    value.abs() > Decimal::from(MAX_USD_VALUE)
}

/// Split a value into display parts.
///
/// A `"$"` unit (exactly that symbol) guards against implausible magnitudes:
/// above [`MAX_USD_VALUE`] a warning is logged and the main value is `"?"`.
///
/// # Examples
/// ```
/// use amount_format::{decompose_number, Decimal, FormatOptions, UnitPreset};
///
/// let value: Decimal = "1500000".parse().unwrap();
/// let parts = decompose_number(&value, &FormatOptions::new().abbreviate(true).unit(UnitPreset::Dollar));
/// assert_eq!(parts.prefix, "$");
/// assert_eq!(parts.main_value, "1.50");
/// assert_eq!(parts.scale_suffix, "m");
/// assert_eq!(parts.suffix, "");
/// ```
pub fn decompose_number(value: &Decimal, options: &FormatOptions) -> DecomposedNumber {
    let unit = options.unit.as_ref().map(UnitSpec::resolve).unwrap_or_default();

    if unit.symbol == USD_SYMBOL && exceeds_usd_limit(value) {
        warn!("USD value is too large: {value}");
        return DecomposedNumber::unknown();
    }

    let shown = if options.abbreviate {
        abbreviate_number(value)
    } else {
        value.clone()
    };

    let main_value = match &options.formatter {
        Some(formatter) => formatter.apply(&shown),
        None => format_decimal(&shown, options),
    };

    let scale_suffix = if options.abbreviate { scale_suffix(value) } else { "" };

    let (prefix, suffix) = match unit.position {
        UnitPosition::Prefix => (unit.symbol, String::new()),
        UnitPosition::Suffix => (String::new(), unit.symbol),
    };

    DecomposedNumber {
        prefix,
        main_value,
        suffix,
        scale_suffix: scale_suffix.to_string(),
    }
}

/// Format a value as a single display string
pub fn format_number(value: &Decimal, options: &FormatOptions) -> String {
    decompose_number(value, options).join()
}
