use amount_format::Decimal;
use chrono::Duration;

use crate::{ChipSet, InputError, InputResult};

/// Default quiet period before a typed amount is committed
pub const DEFAULT_DEBOUNCE_MS: u64 = 166;

/// Places kept when the slider or a percentage chip picks a partial balance
pub const DEFAULT_BALANCE_DECIMALS: u32 = 4;

/// Configuration for an amount input
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct InputConfig {
    pub debounce_ms: u64,
    /// Lower bound applied on blur
    pub min: Option<Decimal>,
    /// Upper bound applied on blur
    pub max: Option<Decimal>,
    pub chips: ChipSet,
    pub show_slider: bool,
    /// Rounding for partial balances; `None` keeps every digit
    pub balance_decimals: Option<u32>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min: None,
            max: None,
            chips: ChipSet::None,
            show_slider: false,
            balance_decimals: Some(DEFAULT_BALANCE_DECIMALS),
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> InputResult<()> {
        if self.debounce_ms == 0 {
            return Err(InputError::InvalidConfig("debounce_ms must be positive".into()));
        }
        if i64::try_from(self.debounce_ms).is_err() {
            return Err(InputError::InvalidConfig(format!("debounce_ms {} is out of range", self.debounce_ms)));
        }

        for (name, bound) in [("min", &self.min), ("max", &self.max)] {
            if bound.as_ref().is_some_and(|bound| !bound.is_finite()) {
                return Err(InputError::InvalidConfig(format!("{name} must be finite")));
            }
        }

        if let (Some(min), Some(max)) = (&self.min, &self.max) {
            if min > max {
                return Err(InputError::InvalidConfig(format!("min {min} exceeds max {max}")));
            }
        }

        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.debounce_ms).unwrap_or(i64::MAX))
    }
}
