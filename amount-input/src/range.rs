//! Two-handle range input with one debounced `(low, high)` commit.
//!
//! Both handles stay inside `[min, max]` and `low <= high` holds after every
//! edit. The handles are not symmetric: typing a low value above `high` drags
//! `high` up with it, while typing a high value below `low` is rejected.

use amount_format::Decimal;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::sanitize::{clamp, resolve_text, sanitize};
use crate::{Debounced, InputError, InputResult, SharedClock};

#[derive(Debug)]
pub struct RangeInput {
    min: Decimal,
    max: Decimal,
    low_text: String,
    high_text: String,
    range: Debounced<(Decimal, Decimal)>,
}

impl RangeInput {
    pub fn new(
        bounds: (Decimal, Decimal),
        initial: (Decimal, Decimal),
        delay: Duration,
        clock: SharedClock,
        on_change: impl FnMut((Decimal, Decimal)) + Send + 'static,
    ) -> InputResult<Self> {
        let (min, max) = bounds;
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(InputError::InvalidConfig(format!("invalid range bounds [{min}, {max}]")));
        }

        let (low, high) = initial;
        let low = clamp(&low, Some(&min), Some(&max));
        let high = clamp(&high, Some(&min), Some(&max));
        if low > high {
            return Err(InputError::InvalidConfig(format!("low {low} exceeds high {high}")));
        }

        Ok(Self {
            low_text: low.to_string(),
            high_text: high.to_string(),
            range: Debounced::new((low, high), delay, clock, on_change),
            min,
            max,
        })
    }

    pub fn low(&self) -> &Decimal {
        &self.range.value().0
    }

    pub fn high(&self) -> &Decimal {
        &self.range.value().1
    }

    pub fn low_text(&self) -> &str {
        &self.low_text
    }

    pub fn high_text(&self) -> &str {
        &self.high_text
    }

    pub fn bounds(&self) -> (&Decimal, &Decimal) {
        (&self.min, &self.max)
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.range.deadline()
    }

    /// Edit the low handle's text; a low above `high` raises `high` to match
    pub fn type_low(&mut self, text: &str) {
        self.low_text = sanitize(text, &self.low_text);
        let Ok(low) = self.low_text.parse::<Decimal>() else {
            self.range.cancel();
            return;
        };

        let low = self.clamp(&low);
        let mut high = self.high().clone();
        if low > high {
            high = low.clone();
            self.high_text = high.to_string();
        }
        self.range.set_value((low, high));
    }

    /// Edit the high handle's text. A high below `low` is rejected and the
    /// handle keeps its value and text; returns whether the edit was taken.
    pub fn type_high(&mut self, text: &str) -> bool {
        let sanitized = sanitize(text, &self.high_text);
        let Ok(high) = sanitized.parse::<Decimal>() else {
            self.high_text = sanitized;
            self.range.cancel();
            return true;
        };

        let high = self.clamp(&high);
        if &high < self.low() {
            debug!(high = %high, low = %self.low(), "rejected high handle below low handle");
            return false;
        }

        self.high_text = sanitized;
        let low = self.low().clone();
        self.range.set_value((low, high));
        true
    }

    /// Move both handles with the slider
    pub fn drag(&mut self, low: &Decimal, high: &Decimal) {
        let (low, high) = (self.clamp(low), self.clamp(high));
        let (low, high) = if low > high { (high, low) } else { (low, high) };

        self.low_text = low.to_string();
        self.high_text = high.to_string();
        self.range.set_value((low, high));
    }

    pub fn release(&mut self) {
        self.range.commit_now(None);
    }

    /// Rewrite both texts from the handle values and commit
    pub fn blur(&mut self) {
        let (mut low, mut high) = self.range.value().clone();

        // Pending text such as "15." still counts once editing ends.
        if let Some(typed) = resolve_text(&self.low_text) {
            low = self.clamp(&typed);
            if low > high {
                high = low.clone();
            }
        }
        if let Some(typed) = resolve_text(&self.high_text) {
            let typed = self.clamp(&typed);
            if typed >= low {
                high = typed;
            }
        }

        self.low_text = low.to_string();
        self.high_text = high.to_string();
        self.range.commit_now(Some((low, high)));
    }

    pub fn poll(&mut self) -> bool {
        self.range.poll()
    }

    fn clamp(&self, value: &Decimal) -> Decimal {
        clamp(value, Some(&self.min), Some(&self.max))
    }
}
