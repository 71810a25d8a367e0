//! Conversions between an amount and its percentage of a maximum balance.

use crate::{Decimal, DIVISION_PLACES};

/// Places kept in a derived percentage
pub const PERCENTAGE_PLACES: u32 = 2;

/// Amount that is `percentage`% of `max`
///
/// Exactly 100% returns `max` itself, so "use full balance" never loses or
/// reformats a digit.
///
/// # Examples
/// ```
/// use amount_format::{to_balance, Decimal};
///
/// let max: Decimal = "1.234500".parse().unwrap();
/// assert_eq!(to_balance(&max, &Decimal::from(100)).to_string(), "1.234500");
/// assert_eq!(to_balance(&max, &Decimal::from(50)).to_string(), "0.61725");
/// ```
pub fn to_balance(max: &Decimal, percentage: &Decimal) -> Decimal {
    if *percentage == Decimal::from(100) {
        return max.clone();
    }

    max.times(percentage).shift(-2).normalize()
}

/// Like [`to_balance`], with a partial share rounded to `places` and never above `max`
///
/// # Examples
/// ```
/// use amount_format::{to_balance_rounded, Decimal};
///
/// let max: Decimal = "1.00009".parse().unwrap();
/// let share: Decimal = "99.999".parse().unwrap();
/// assert_eq!(to_balance_rounded(&max, &share, Some(4)).to_string(), "1.00009");
/// assert_eq!(to_balance_rounded(&max, &Decimal::from(50), Some(4)).to_string(), "0.5");
/// ```
pub fn to_balance_rounded(max: &Decimal, percentage: &Decimal, places: Option<u32>) -> Decimal {
    let balance = to_balance(max, percentage);
    let Some(places) = places else {
        return balance;
    };
    if *percentage == Decimal::from(100) {
        return balance;
    }

    let rounded = balance.round_to(places).normalize();
    if rounded > *max {
        max.clone()
    } else {
        rounded
    }
}

/// Share of `max` that `balance` represents, in percent with at most 2 places
///
/// `None` when there is no maximum or it is zero.
///
/// # Examples
/// ```
/// use amount_format::{to_percentage, Decimal};
///
/// let max: Decimal = "3".parse().unwrap();
/// let balance: Decimal = "1".parse().unwrap();
/// assert_eq!(to_percentage(&balance, Some(&max)).unwrap().to_string(), "33.33");
/// assert!(to_percentage(&balance, None).is_none());
/// ```
pub fn to_percentage(balance: &Decimal, max: Option<&Decimal>) -> Option<Decimal> {
    let max = max?;
    if max.is_zero() {
        return None;
    }

    let ratio = balance
        .times(&Decimal::from(100))
        .checked_div(max, DIVISION_PLACES)
        .ok()?;
    if !ratio.is_finite() {
        return None;
    }

    Some(ratio.round_to(PERCENTAGE_PLACES).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_full_balance_is_verbatim() {
        let max = d("1000.000000000000000001");
        assert_eq!(to_balance(&max, &d("100")).to_string(), max.to_string());
        assert_eq!(to_balance(&max, &d("100.00")).to_string(), max.to_string());
    }

    #[test]
    fn test_partial_balances_are_exact() {
        assert_eq!(to_balance(&d("200"), &d("25")).to_string(), "50");
        assert_eq!(to_balance(&d("0.3"), &d("33.33")).to_string(), "0.09999");
        assert_eq!(to_balance(&d("10"), &d("0")).to_string(), "0");
        assert_eq!(
            to_balance(&d("1.000000000000000001"), &d("50")).to_string(),
            "0.5000000000000000005"
        );
    }

    #[test]
    fn test_rounded_balance() {
        let max = d("1.123456789012345678");
        assert_eq!(to_balance_rounded(&max, &d("33"), Some(4)).to_string(), "0.3707");
        assert_eq!(
            to_balance_rounded(&max, &d("33"), None).to_string(),
            "0.37074074037407407374"
        );
        assert_eq!(to_balance_rounded(&max, &d("100"), Some(4)).to_string(), max.to_string());
        assert_eq!(to_balance_rounded(&d("0.00004"), &d("10"), Some(4)).to_string(), "0");
    }

    #[test]
    fn test_rounded_balance_never_exceeds_max() {
        // 1.0000799991 rounds up to 1.0001, past the maximum itself.
        let max = d("1.00009");
        assert_eq!(to_balance_rounded(&max, &d("99.999"), Some(4)), max);
        assert_eq!(to_balance_rounded(&max, &d("99.999"), Some(6)).to_string(), "1.00008");
    }

    #[test]
    fn test_to_percentage() {
        assert_eq!(to_percentage(&d("50"), Some(&d("200"))), Some(d("25")));
        assert_eq!(to_percentage(&d("200"), Some(&d("200"))).unwrap().to_string(), "100");
        assert_eq!(to_percentage(&d("2"), Some(&d("3"))).unwrap().to_string(), "66.67");
        assert_eq!(to_percentage(&d("0"), Some(&d("3"))).unwrap().to_string(), "0");
        assert_eq!(to_percentage(&d("0.5"), Some(&d("1"))).unwrap().to_string(), "50");
    }

    #[test]
    fn test_to_percentage_without_usable_max() {
        assert_eq!(to_percentage(&d("5"), None), None);
        assert_eq!(to_percentage(&d("5"), Some(&d("0"))), None);
        assert_eq!(to_percentage(&d("5"), Some(&d("0.000"))), None);
        assert_eq!(to_percentage(&d("5"), Some(&Decimal::nan())), None);
    }

    #[test]
    fn test_over_max_is_not_clamped() {
        assert_eq!(to_percentage(&d("300"), Some(&d("200"))).unwrap().to_string(), "150");
    }

    #[test]
    fn test_round_trip_stays_within_a_hundredth() {
        let tolerance = d("0.01");
        for max in ["1", "3", "1234.5678", "0.000123", "1000000000000000000.5"] {
            let max = d(max);
            for step in 0..=400 {
                let p = Decimal::new(step * 25, 2);
                let back = to_percentage(&to_balance(&max, &p), Some(&max)).unwrap();
                assert!((back.minus(&p)).abs() <= tolerance, "max={max} p={p} back={back}");
            }
            assert_eq!(to_percentage(&to_balance(&max, &d("100")), Some(&max)), Some(d("100")));
        }
    }
}
