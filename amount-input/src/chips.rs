//! Preset chips: one-click shortcuts such as "Max" or "50%".

use amount_format::{to_balance_rounded, Decimal};

/// What a chip selects
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", content = "percent", rename_all = "lowercase")
)]
pub enum ChipAction {
    /// The whole maximum balance
    Max,
    /// A share of the maximum balance, in percent
    Percent(Decimal),
}

/// A labelled shortcut
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chip {
    pub label: String,
    pub action: ChipAction,
}

impl Chip {
    pub fn max() -> Self {
        Self {
            label: "Max".to_string(),
            action: ChipAction::Max,
        }
    }

    pub fn percent(percent: u32) -> Self {
        Self {
            label: format!("{percent}%"),
            action: ChipAction::Percent(Decimal::from(percent)),
        }
    }

    /// Amount this chip selects; `None` without a maximum balance.
    ///
    /// A partial share is rounded to `balance_decimals` places when given.
    pub fn balance(&self, max: Option<&Decimal>, balance_decimals: Option<u32>) -> Option<Decimal> {
        let max = max?;
        Some(match &self.action {
            ChipAction::Max => max.clone(),
            ChipAction::Percent(percent) => to_balance_rounded(max, percent, balance_decimals),
        })
    }
}

/// Built-in chip sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum ChipPreset {
    /// A single "Max" chip
    Max,
    /// 25%, 50%, 75% and 100%
    Range,
}

impl ChipPreset {
    pub fn chips(self) -> Vec<Chip> {
        match self {
            ChipPreset::Max => vec![Chip::max()],
            ChipPreset::Range => [25, 50, 75, 100].into_iter().map(Chip::percent).collect(),
        }
    }
}

/// Chips shown next to an input, by preset name or listed explicitly
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(untagged))]
pub enum ChipSet {
    #[default]
    None,
    Preset(ChipPreset),
    Custom(Vec<Chip>),
}

impl ChipSet {
    pub fn chips(&self) -> Vec<Chip> {
        match self {
            ChipSet::None => Vec::new(),
            ChipSet::Preset(preset) => preset.chips(),
            ChipSet::Custom(chips) => chips.clone(),
        }
    }
}

impl From<ChipPreset> for ChipSet {
    fn from(preset: ChipPreset) -> Self {
        ChipSet::Preset(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_presets() {
        let max = ChipPreset::Max.chips();
        assert_eq!(max.len(), 1);
        assert_eq!(max[0].label, "Max");

        let labels: Vec<_> = ChipPreset::Range.chips().into_iter().map(|chip| chip.label).collect();
        assert_eq!(labels, vec!["25%", "50%", "75%", "100%"]);

        assert!(ChipSet::None.chips().is_empty());
    }

    #[test]
    fn test_chip_balance() {
        let max = d("8.000");
        assert_eq!(Chip::max().balance(Some(&max), Some(4)).unwrap().to_string(), "8.000");
        assert_eq!(Chip::percent(25).balance(Some(&max), Some(4)), Some(d("2")));
        assert_eq!(Chip::percent(100).balance(Some(&max), Some(4)).unwrap().to_string(), "8.000");
        assert_eq!(Chip::percent(50).balance(None, Some(4)), None);
        assert_eq!(Chip::max().balance(None, None), None);
    }

    #[test]
    fn test_chip_balance_rounding() {
        let max = d("0.123456");
        assert_eq!(Chip::percent(75).balance(Some(&max), Some(4)).unwrap().to_string(), "0.0926");
        assert_eq!(Chip::percent(75).balance(Some(&max), None).unwrap().to_string(), "0.092592");

        // Rounding up never selects more than the maximum.
        let max = d("1.00009");
        let chip = Chip {
            label: "99.999%".to_string(),
            action: ChipAction::Percent(d("99.999")),
        };
        assert_eq!(chip.balance(Some(&max), Some(4)), Some(max.clone()));
        assert_eq!(Chip::max().balance(Some(&max), Some(0)).unwrap().to_string(), "1.00009");
    }
}
