//! # Amount Format Library
//!
//! Arbitrary-precision amount arithmetic and compact, unit-decorated display
//! formatting for token balances, USD values and percentages.
//!
//! ## Key Features
//!
//! - **Exact decimals** backed by `BigInt`, never `f64`
//! - **Abbreviation** into `k`/`m`/`b`/`t` buckets
//! - **No misleading zeros**: `0.001` never renders as `"0.00"` and `1.0001`
//!   never as `"1.00"`
//! - **Units** as prefix (`$1.50k`) or suffix (`12.5%`, `3 ETH`)
//! - **Percentage conversions** that are exact at 100%
//!
//! ## Example
//!
//! ```rust
//! use amount_format::{format_number, Decimal, FormatOptions, UnitPreset};
//!
//! let value: Decimal = "1234567.891".parse().unwrap();
//! let options = FormatOptions::new().abbreviate(true).unit(UnitPreset::Dollar);
//! assert_eq!(format_number(&value, &options), "$1.23m");
//! ```

pub mod decimal;
pub mod format;
pub mod percentage;
pub mod scale;
pub mod units;

pub use decimal::*;
pub use format::*;
pub use percentage::*;
pub use scale::*;
pub use units::*;

use thiserror::Error;

/// Core error type for amount operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Text could not be read as a decimal
    #[error("invalid decimal: {0:?}")]
    InvalidDecimal(String),
    /// Division by zero attempted
    #[error("division by zero")]
    DivisionByZero,
}

/// Result type alias for amount operations
pub type AmountResult<T> = Result<T, AmountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AmountError::DivisionByZero.to_string(), "division by zero");
        assert_eq!(
            AmountError::InvalidDecimal("5.".into()).to_string(),
            "invalid decimal: \"5.\""
        );
    }

    #[test]
    fn test_parse_error_carries_input() {
        let err = "-".parse::<Decimal>().unwrap_err();
        assert_eq!(err, AmountError::InvalidDecimal("-".into()));
    }
}
