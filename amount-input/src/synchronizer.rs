//! # Amount Input Synchronizer
//!
//! State behind a large token-amount field: the raw text the user typed, the
//! parsed amount, its percentage of a maximum balance (for the slider), preset
//! chips, and the debounced delivery of the settled amount to `on_change`.
//!
//! ## Phases
//!
//! - `Empty`: no text and no value
//! - `Editing`: placeholder text such as `"5."` or `"-"`; nothing pending
//! - `Pending`: a parsed amount is waiting for the quiet period to pass
//! - `Committed`: the pending commit fired or was forced
//!
//! Keystrokes and slider drags debounce; slider release, blur and chips
//! commit immediately. Clearing the field emits `None` right away so callers
//! stop showing results for an amount that is no longer there.

use amount_format::{format_number, to_balance_rounded, to_percentage, Decimal, FormatOptions, UnitPreset};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::sanitize::{clamp, resolve_text, sanitize};
use crate::{Chip, Debounced, InputConfig, InputResult, SharedClock};

/// Slider bounds, in percent
const MIN_PERCENTAGE: u32 = 0;
const MAX_PERCENTAGE: u32 = 100;

/// Observable state of the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum InputPhase {
    Empty,
    Editing,
    Pending,
    Committed,
}

/// Formatted values for rendering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InputDisplay {
    pub amount: Option<String>,
    pub max: Option<String>,
    pub notional: Option<String>,
}

/// Point-in-time copy of the field state
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "camelCase"))]
pub struct InputSnapshot {
    pub raw_text: String,
    pub value: Option<Decimal>,
    pub percentage: Option<Decimal>,
    pub max_balance: Option<Decimal>,
    pub phase: InputPhase,
    pub deadline: Option<DateTime<Utc>>,
    pub show_slider: bool,
    pub chip_labels: Vec<String>,
}

/// Synchronizes typed text, slider percentage and chips into one amount
#[derive(Debug)]
pub struct AmountInput {
    config: InputConfig,
    chips: Vec<Chip>,
    raw_text: String,
    percentage: Option<Decimal>,
    max_balance: Option<Decimal>,
    notional: Option<Decimal>,
    phase: InputPhase,
    balance: Debounced<Option<Decimal>>,
}

impl AmountInput {
    /// Create an input seeded with `initial` (which is not emitted)
    pub fn new(
        config: InputConfig,
        initial: Option<Decimal>,
        clock: SharedClock,
        on_change: impl FnMut(Option<Decimal>) + Send + 'static,
    ) -> InputResult<Self> {
        config.validate()?;

        let raw_text = initial.as_ref().map(Decimal::to_string).unwrap_or_default();
        let phase = if initial.is_some() {
            InputPhase::Committed
        } else {
            InputPhase::Empty
        };

        Ok(Self {
            chips: config.chips.chips(),
            balance: Debounced::new(initial, config.debounce(), clock, on_change),
            config,
            raw_text,
            percentage: None,
            max_balance: None,
            notional: None,
            phase,
        })
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The most recent parsed amount, committed or not
    pub fn value(&self) -> Option<&Decimal> {
        self.balance.value().as_ref()
    }

    pub fn percentage(&self) -> Option<&Decimal> {
        self.percentage.as_ref()
    }

    pub fn max_balance(&self) -> Option<&Decimal> {
        self.max_balance.as_ref()
    }

    pub fn phase(&self) -> InputPhase {
        self.phase
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// The slider only makes sense against a known maximum
    pub fn show_slider(&self) -> bool {
        self.config.show_slider && self.max_balance.is_some()
    }

    /// When the pending commit fires, if one is armed
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.balance.deadline()
    }

    /// Handle an edit of the text field
    pub fn type_text(&mut self, text: &str) {
        self.raw_text = sanitize(text, &self.raw_text);

        if self.raw_text.is_empty() {
            // Immediate, but only a valid -> empty transition reaches on_change.
            self.percentage = None;
            self.commit_now(Some(None));
            return;
        }

        match self.raw_text.parse::<Decimal>() {
            Ok(value) => {
                self.percentage = self.derive_percentage(Some(&value));
                self.balance.set_value(Some(value));
                self.phase = InputPhase::Pending;
            }
            Err(_) => {
                // Keep the last amount while the user is mid-edit ("5.", "-").
                self.balance.cancel();
                self.phase = InputPhase::Editing;
            }
        }
    }

    /// Move the slider to `percentage` of the maximum balance
    pub fn drag_slider(&mut self, percentage: &Decimal) {
        let percentage = clamp(
            percentage,
            Some(&Decimal::from(MIN_PERCENTAGE)),
            Some(&Decimal::from(MAX_PERCENTAGE)),
        );

        let balance = self
            .max_balance
            .as_ref()
            .map(|max| to_balance_rounded(max, &percentage, self.config.balance_decimals));
        self.percentage = Some(percentage);

        if let Some(balance) = balance {
            self.raw_text = balance.to_string();
            self.balance.set_value(Some(balance));
            self.phase = InputPhase::Pending;
        }
    }

    pub fn release_slider(&mut self) {
        self.commit_now(None);
    }

    /// Finish editing: resolve placeholders, clamp to the configured bounds
    /// and commit.
    pub fn blur(&mut self) {
        let resolved = resolve_text(&self.raw_text)
            .map(|value| clamp(&value, self.config.min.as_ref(), self.config.max.as_ref()));

        self.raw_text = resolved.as_ref().map(Decimal::to_string).unwrap_or_default();
        self.percentage = self.derive_percentage(resolved.as_ref());
        self.commit_now(Some(resolved));
    }

    /// Apply the chip at `index`; false when there is no such chip or no maximum
    pub fn click_chip(&mut self, index: usize) -> bool {
        let Some(balance) = self
            .chips
            .get(index)
            .and_then(|chip| chip.balance(self.max_balance.as_ref(), self.config.balance_decimals))
        else {
            return false;
        };

        self.apply_now(balance);
        true
    }

    /// Use the whole maximum balance; false without one
    pub fn click_max(&mut self) -> bool {
        let Some(max) = self.max_balance.clone() else {
            return false;
        };

        self.apply_now(max);
        true
    }

    /// Update the maximum balance and re-derive the percentage. Never emits.
    pub fn set_max_balance(&mut self, max: Option<Decimal>) {
        if max == self.max_balance {
            return;
        }

        debug!(
            from = ?self.max_balance.as_ref().map(Decimal::to_string),
            to = ?max.as_ref().map(Decimal::to_string),
            "max balance changed"
        );
        self.max_balance = max;
        self.percentage = self.derive_percentage(self.balance.value().as_ref());
    }

    /// Replace the amount from outside (controlled use) without emitting
    pub fn set_external_balance(&mut self, value: Option<Decimal>) {
        self.raw_text = value.as_ref().map(Decimal::to_string).unwrap_or_default();
        self.percentage = self.derive_percentage(value.as_ref());
        self.phase = if value.is_some() {
            InputPhase::Committed
        } else {
            InputPhase::Empty
        };
        self.balance.reset(value);
    }

    /// USD value of the current amount, shown next to it
    pub fn set_notional_value(&mut self, notional: Option<Decimal>) {
        self.notional = notional;
    }

    /// Clear text and percentage; the `None` is debounced like any edit
    pub fn reset(&mut self) {
        self.raw_text.clear();
        self.percentage = None;
        self.balance.set_value(None);
        self.phase = InputPhase::Pending;
    }

    /// Fire the pending commit if it is due. Returns whether `on_change` ran.
    pub fn poll(&mut self) -> bool {
        let was_pending = self.balance.is_pending();
        let delivered = self.balance.poll();
        if was_pending && !self.balance.is_pending() {
            self.settle();
        }
        delivered
    }

    pub fn display(&self, options: &FormatOptions) -> InputDisplay {
        let notional_options = FormatOptions::new().unit(UnitPreset::Dollar);

        InputDisplay {
            amount: self.value().map(|value| format_number(value, options)),
            max: self.max_balance.as_ref().map(|max| format_number(max, options)),
            notional: self
                .notional
                .as_ref()
                .map(|notional| format_number(notional, &notional_options)),
        }
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            raw_text: self.raw_text.clone(),
            value: self.value().cloned(),
            percentage: self.percentage.clone(),
            max_balance: self.max_balance.clone(),
            phase: self.phase,
            deadline: self.deadline(),
            show_slider: self.show_slider(),
            chip_labels: self.chips.iter().map(|chip| chip.label.clone()).collect(),
        }
    }

    fn apply_now(&mut self, balance: Decimal) {
        self.raw_text = balance.to_string();
        self.percentage = self.derive_percentage(Some(&balance));
        self.commit_now(Some(Some(balance)));
    }

    fn commit_now(&mut self, next: Option<Option<Decimal>>) {
        self.balance.commit_now(next);
        self.settle();
    }

    fn settle(&mut self) {
        self.phase = if self.balance.value().is_some() {
            InputPhase::Committed
        } else {
            InputPhase::Empty
        };
    }

    fn derive_percentage(&self, value: Option<&Decimal>) -> Option<Decimal> {
        to_percentage(value?, self.max_balance.as_ref())
    }
}

impl Drop for AmountInput {
    fn drop(&mut self) {
        if self.balance.is_pending() {
            debug!("discarding pending commit");
            self.balance.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Duration;
    use tracing_test::traced_test;

    use super::*;
    use crate::{ChipPreset, ManualClock};

    type Emitted = Arc<Mutex<Vec<Option<Decimal>>>>;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn input_with(config: InputConfig, initial: Option<Decimal>) -> (AmountInput, ManualClock, Emitted) {
        let clock = ManualClock::default();
        let emitted: Emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = emitted.clone();
        let input = AmountInput::new(config, initial, Arc::new(clock.clone()), move |value| {
            sink.lock().unwrap().push(value);
        })
        .unwrap();
        (input, clock, emitted)
    }

    fn input() -> (AmountInput, ManualClock, Emitted) {
        input_with(InputConfig::default(), None)
    }

    fn settle(input: &mut AmountInput, clock: &ManualClock) -> bool {
        clock.advance(Duration::milliseconds(200));
        input.poll()
    }

    #[test]
    fn test_typing_burst_emits_last_value_once() {
        let (mut input, clock, emitted) = input();

        for text in ["1", "12", "123"] {
            input.type_text(text);
            clock.advance(Duration::milliseconds(50));
            assert!(!input.poll());
        }
        assert_eq!(input.phase(), InputPhase::Pending);
        assert_eq!(input.value(), Some(&d("123")));

        assert!(settle(&mut input, &clock));
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("123"))]);
        assert_eq!(input.phase(), InputPhase::Committed);
    }

    #[test]
    fn test_equivalent_retype_emits_nothing() {
        let (mut input, clock, emitted) = input();

        input.type_text("5");
        settle(&mut input, &clock);
        input.type_text("5.");
        assert_eq!(input.phase(), InputPhase::Editing);
        input.type_text("5.0");
        assert_eq!(input.raw_text(), "5.0");
        assert!(!settle(&mut input, &clock));

        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("5"))]);
    }

    #[test]
    fn test_incomplete_text_cancels_pending_commit() {
        let (mut input, clock, emitted) = input();

        input.type_text("-");
        assert_eq!(input.phase(), InputPhase::Editing);
        input.type_text("-3");
        input.type_text("-3.");
        assert!(input.deadline().is_none());
        assert!(!settle(&mut input, &clock));

        assert!(emitted.lock().unwrap().is_empty());
        assert_eq!(input.value(), Some(&d("-3")));
    }

    #[test]
    fn test_clearing_emits_none_immediately() {
        let (mut input, clock, emitted) = input();
        input.set_max_balance(Some(d("10")));

        input.type_text("5");
        settle(&mut input, &clock);
        assert_eq!(input.percentage(), Some(&d("50")));

        input.type_text("");
        assert_eq!(input.phase(), InputPhase::Empty);
        assert_eq!(input.percentage(), None);
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("5")), None]);

        // Typing the same amount again is a real change after the clear.
        input.type_text("5");
        assert!(settle(&mut input, &clock));
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("5")), None, Some(d("5"))]);
    }

    #[test]
    fn test_cleared_amount_is_gone_everywhere() {
        let (mut input, clock, emitted) = input();

        input.type_text("5");
        settle(&mut input, &clock);
        input.type_text("");
        assert_eq!(input.value(), None);
        assert_eq!(input.snapshot().value, None);
        assert_eq!(input.display(&FormatOptions::new()).amount, None);

        input.set_max_balance(Some(d("20")));
        assert_eq!(input.percentage(), None);
        assert_eq!(input.value(), None);

        input.release_slider();
        input.blur();
        assert!(!settle(&mut input, &clock));
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("5")), None]);
        assert_eq!(input.phase(), InputPhase::Empty);
    }

    #[test]
    fn test_rejected_text_on_empty_field_emits_nothing() {
        let (mut input, clock, emitted) = input();

        input.type_text("a");
        input.type_text("b");
        input.type_text("");
        assert_eq!(input.raw_text(), "");
        assert!(!settle(&mut input, &clock));
        assert!(emitted.lock().unwrap().is_empty());
        assert_eq!(input.phase(), InputPhase::Empty);
    }

    #[test]
    fn test_rejected_keystrokes_keep_text() {
        let (mut input, _, _) = input();

        input.type_text("1.5");
        input.type_text("1.5.");
        input.type_text("1.5x");
        assert_eq!(input.raw_text(), "1.5");

        input.type_text("2,5");
        assert_eq!(input.raw_text(), "2.5");
        assert_eq!(input.value(), Some(&d("2.5")));
    }

    #[test]
    fn test_percentage_follows_typed_amount() {
        let (mut input, _, _) = input();

        input.type_text("1");
        assert_eq!(input.percentage(), None);

        input.set_max_balance(Some(d("3")));
        assert_eq!(input.percentage(), Some(&d("33.33")));

        input.type_text("2");
        assert_eq!(input.percentage().map(Decimal::to_string), Some("66.67".to_string()));
    }

    #[test]
    fn test_slider_drag_debounces_and_release_commits() {
        let (mut input, clock, emitted) = input();
        input.set_max_balance(Some(d("200")));

        input.drag_slider(&d("10"));
        input.drag_slider(&d("25"));
        assert_eq!(input.raw_text(), "50");
        assert_eq!(input.percentage(), Some(&d("25")));
        assert!(emitted.lock().unwrap().is_empty());

        input.release_slider();
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("50"))]);
        assert_eq!(input.phase(), InputPhase::Committed);

        assert!(!settle(&mut input, &clock));
        assert_eq!(emitted.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_slider_is_clamped_and_exact_at_full() {
        let (mut input, _, _) = input();
        input.set_max_balance(Some(d("1.500000")));

        input.drag_slider(&d("150"));
        assert_eq!(input.percentage(), Some(&d("100")));
        assert_eq!(input.raw_text(), "1.500000");

        input.drag_slider(&d("-5"));
        assert_eq!(input.percentage(), Some(&d("0")));
        assert_eq!(input.raw_text(), "0");
    }

    #[test]
    fn test_slider_rounds_partial_balance() {
        let (mut input, _, emitted) = input();
        input.set_max_balance(Some(d("1.00009")));

        input.drag_slider(&d("33"));
        assert_eq!(input.raw_text(), "0.33");

        // Rounded up past the maximum, so the maximum itself is used.
        input.drag_slider(&d("99.999"));
        assert_eq!(input.raw_text(), "1.00009");
        input.release_slider();
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("1.00009"))]);

        let config = InputConfig {
            balance_decimals: None,
            ..InputConfig::default()
        };
        let (mut input, _, _) = input_with(config, None);
        input.set_max_balance(Some(d("1.00009")));
        input.drag_slider(&d("33"));
        assert_eq!(input.raw_text(), "0.3300297");
    }

    #[test]
    fn test_slider_without_max_only_moves_percentage() {
        let (mut input, _, _) = input();

        input.drag_slider(&d("40"));
        assert_eq!(input.percentage(), Some(&d("40")));
        assert_eq!(input.raw_text(), "");
        assert!(input.deadline().is_none());
    }

    #[test]
    fn test_max_change_never_emits() {
        let (mut input, clock, emitted) = input();

        input.type_text("5");
        settle(&mut input, &clock);
        emitted.lock().unwrap().clear();

        input.set_max_balance(Some(d("20")));
        assert_eq!(input.percentage(), Some(&d("25")));
        input.set_max_balance(Some(d("20.00")));
        input.set_max_balance(Some(d("10")));
        assert_eq!(input.percentage(), Some(&d("50")));
        input.set_max_balance(None);
        assert_eq!(input.percentage(), None);

        settle(&mut input, &clock);
        assert!(emitted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_blur_clamps_and_emits() {
        let config = InputConfig {
            min: Some(d("1")),
            max: Some(d("10")),
            ..InputConfig::default()
        };
        let (mut input, _, emitted) = input_with(config, None);

        input.type_text("25");
        input.blur();
        assert_eq!(input.raw_text(), "10");
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("10"))]);
        assert!(input.deadline().is_none());

        input.type_text("0.5");
        input.blur();
        assert_eq!(input.raw_text(), "1");
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("10")), Some(d("1"))]);
    }

    #[test]
    fn test_blur_resolves_placeholders() {
        let (mut input, clock, emitted) = input();

        input.type_text("4");
        settle(&mut input, &clock);
        input.type_text("4.");
        input.blur();
        assert_eq!(input.raw_text(), "4");
        assert_eq!(emitted.lock().unwrap().len(), 1);

        let (mut input, _, emitted) = input_with(InputConfig::default(), Some(d("7")));
        input.type_text("");
        input.type_text("-");
        input.blur();
        assert_eq!(input.raw_text(), "");
        assert_eq!(input.phase(), InputPhase::Empty);
        assert_eq!(*emitted.lock().unwrap(), vec![None]);
    }

    #[test]
    fn test_chips_commit_immediately() {
        let config = InputConfig {
            chips: ChipPreset::Range.into(),
            ..InputConfig::default()
        };
        let (mut input, _, emitted) = input_with(config, None);

        assert!(!input.click_chip(1));
        input.set_max_balance(Some(d("80")));

        assert!(input.click_chip(1));
        assert_eq!(input.raw_text(), "40");
        assert_eq!(input.percentage(), Some(&d("50")));
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("40"))]);

        assert!(input.click_chip(3));
        assert_eq!(input.raw_text(), "80");
        assert!(!input.click_chip(4));
        assert_eq!(emitted.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_click_max_uses_balance_verbatim() {
        let (mut input, _, emitted) = input();
        assert!(!input.click_max());

        input.set_max_balance(Some(d("12.340000")));
        assert!(input.click_max());
        assert_eq!(input.raw_text(), "12.340000");
        assert_eq!(input.percentage(), Some(&d("100")));
        assert_eq!(*emitted.lock().unwrap(), vec![Some(d("12.34"))]);
    }

    #[test]
    fn test_external_balance_is_silent() {
        let (mut input, clock, emitted) = input();

        input.type_text("3");
        input.set_external_balance(Some(d("9")));
        assert_eq!(input.raw_text(), "9");
        assert!(!settle(&mut input, &clock));

        input.type_text("9.0");
        assert!(!settle(&mut input, &clock));
        assert!(emitted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_initial_value_is_not_emitted() {
        let (mut input, clock, emitted) = input_with(InputConfig::default(), Some(d("2.50")));
        assert_eq!(input.raw_text(), "2.50");
        assert_eq!(input.phase(), InputPhase::Committed);

        input.type_text("2.5");
        assert!(!settle(&mut input, &clock));
        assert!(emitted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reset_debounces_none() {
        let (mut input, clock, emitted) = input_with(InputConfig::default(), Some(d("1")));
        input.set_max_balance(Some(d("4")));

        input.reset();
        assert_eq!(input.raw_text(), "");
        assert_eq!(input.percentage(), None);
        assert!(emitted.lock().unwrap().is_empty());

        assert!(settle(&mut input, &clock));
        assert_eq!(*emitted.lock().unwrap(), vec![None]);
        assert_eq!(input.phase(), InputPhase::Empty);
    }

    #[test]
    fn test_display() {
        let (mut input, _, _) = input_with(InputConfig::default(), Some(d("1234.5")));
        input.set_max_balance(Some(d("2500000")));
        input.set_notional_value(Some(d("1500000")));

        let display = input.display(&FormatOptions::new().abbreviate(true));
        assert_eq!(display.amount.as_deref(), Some("1.23k"));
        assert_eq!(display.max.as_deref(), Some("2.50m"));
        assert_eq!(display.notional.as_deref(), Some("$1,500,000.00"));
    }

    #[test]
    fn test_show_slider_needs_max() {
        let config = InputConfig {
            show_slider: true,
            ..InputConfig::default()
        };
        let (mut input, _, _) = input_with(config, None);
        assert!(!input.show_slider());
        input.set_max_balance(Some(d("1")));
        assert!(input.show_slider());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = InputConfig {
            debounce_ms: 0,
            ..InputConfig::default()
        };
        let result = AmountInput::new(config, None, Arc::new(ManualClock::default()), |_| {});
        assert!(result.is_err());
    }

    #[traced_test]
    #[test]
    fn test_drop_discards_pending_commit() {
        let (mut input, clock, emitted) = input();
        input.type_text("8");
        drop(input);

        clock.advance(Duration::milliseconds(500));
        assert!(emitted.lock().unwrap().is_empty());
        assert!(logs_contain("discarding pending commit"));
    }

    #[test]
    fn test_snapshot() {
        let config = InputConfig {
            chips: ChipPreset::Max.into(),
            ..InputConfig::default()
        };
        let (mut input, _, _) = input_with(config, None);
        input.type_text("1");

        let snapshot = input.snapshot();
        assert_eq!(snapshot.raw_text, "1");
        assert_eq!(snapshot.value, Some(d("1")));
        assert_eq!(snapshot.phase, InputPhase::Pending);
        assert!(snapshot.deadline.is_some());
        assert_eq!(snapshot.chip_labels, vec!["Max".to_string()]);
    }
}
