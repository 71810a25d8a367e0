//! # Decimal Values
//!
//! Arbitrary-precision decimal amounts backed by a `BigInt` mantissa and a
//! non-negative scale. Amounts never pass through `f64`, so `0.1 + 0.2` is
//! exactly `0.3` and an 18-decimal token balance keeps every digit.
//!
//! The non-finite values `NaN`, `Infinity` and `-Infinity` are representable so
//! that display code stays total: formatting never has to fail.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::{AmountError, AmountResult};

/// Largest exponent accepted when parsing `1e5`-style input.
const MAX_PARSE_EXPONENT: i64 = 4096;

/// Decimal places carried by [`Decimal::checked_div`] callers that want
/// "enough" precision before a final rounding step.
pub const DIVISION_PLACES: u32 = 20;

/// Arbitrary-precision decimal value
#[derive(Debug, Clone)]
pub struct Decimal {
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    /// value = mantissa / 10^scale
    Finite { mantissa: BigInt, scale: u32 },
    NaN,
    Infinite { negative: bool },
}

fn pow10(exponent: u32) -> BigInt {
    BigInt::from(10u8).pow(exponent)
}

/// Integer division of `numerator / denominator` rounding half away from zero.
fn div_round_half_away(numerator: &BigInt, denominator: &BigInt) -> BigInt {
    let (quotient, remainder) = (numerator.abs() / denominator.abs(), numerator.abs() % denominator.abs());
    let quotient = if remainder * 2 >= denominator.abs() {
        quotient + 1
    } else {
        quotient
    };

    if numerator.is_negative() != denominator.is_negative() {
        -quotient
    } else {
        quotient
    }
}

impl Decimal {
    /// Create a finite decimal equal to `mantissa / 10^scale`
    ///
    /// # Examples
    /// ```
    /// use amount_format::Decimal;
    ///
    /// let value = Decimal::new(12345, 2);
    /// assert_eq!(value.to_string(), "123.45");
    /// ```
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            repr: Repr::Finite {
                mantissa: mantissa.into(),
                scale,
            },
        }
    }

    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    pub fn nan() -> Self {
        Self { repr: Repr::NaN }
    }

    pub fn infinity() -> Self {
        Self {
            repr: Repr::Infinite { negative: false },
        }
    }

    pub fn neg_infinity() -> Self {
        Self {
            repr: Repr::Infinite { negative: true },
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.repr, Repr::NaN)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::Infinite { .. })
    }

    pub fn is_finite(&self) -> bool {
        matches!(self.repr, Repr::Finite { .. })
    }

    /// True only for a finite value numerically equal to zero
    pub fn is_zero(&self) -> bool {
        matches!(&self.repr, Repr::Finite { mantissa, .. } if mantissa.is_zero())
    }

    /// True for values strictly below zero, including `-Infinity`
    pub fn is_negative(&self) -> bool {
        match &self.repr {
            Repr::Finite { mantissa, .. } => mantissa.is_negative(),
            Repr::Infinite { negative } => *negative,
            Repr::NaN => false,
        }
    }

    /// Number of digits after the decimal point (0 for non-finite values)
    pub fn scale(&self) -> u32 {
        match &self.repr {
            Repr::Finite { scale, .. } => *scale,
            _ => 0,
        }
    }

    /// True when the value is finite and has no fractional part
    pub fn is_integer(&self) -> bool {
        match &self.repr {
            Repr::Finite { mantissa, scale } => (mantissa % pow10(*scale)).is_zero(),
            _ => false,
        }
    }

    /// `floor(log10(|self|))` for finite, non-zero values
    ///
    /// # Examples
    /// ```
    /// use amount_format::Decimal;
    ///
    /// let value: Decimal = "1234.5".parse().unwrap();
    /// assert_eq!(value.exponent10(), Some(3));
    ///
    /// let small: Decimal = "0.00042".parse().unwrap();
    /// assert_eq!(small.exponent10(), Some(-4));
    /// ```
    pub fn exponent10(&self) -> Option<i64> {
        match &self.repr {
            Repr::Finite { mantissa, scale } if !mantissa.is_zero() => {
                let digits = mantissa.abs().to_string().len() as i64;
                Some(digits - 1 - i64::from(*scale))
            }
            _ => None,
        }
    }

    pub fn abs(&self) -> Self {
        match &self.repr {
            Repr::Finite { mantissa, scale } => Self::new(mantissa.abs(), *scale),
            Repr::Infinite { .. } => Self::infinity(),
            Repr::NaN => Self::nan(),
        }
    }

    /// Remove trailing fractional zeros: `"1.500"` becomes `"1.5"`, `"2.00"` becomes `"2"`
    pub fn normalize(&self) -> Self {
        let Repr::Finite { mantissa, scale } = &self.repr else {
            return self.clone();
        };

        let ten = BigInt::from(10u8);
        let mut mantissa = mantissa.clone();
        let mut scale = *scale;
        while scale > 0 && (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            scale -= 1;
        }

        Self::new(mantissa, scale)
    }

    /// Multiply by `10^exponent` without any rounding
    ///
    /// # Examples
    /// ```
    /// use amount_format::Decimal;
    ///
    /// let value: Decimal = "1234.5".parse().unwrap();
    /// assert_eq!(value.shift(-3).to_string(), "1.2345");
    /// assert_eq!(value.shift(2).to_string(), "123450");
    /// ```
    pub fn shift(&self, exponent: i32) -> Self {
        let Repr::Finite { mantissa, scale } = &self.repr else {
            return self.clone();
        };

        if exponent < 0 {
            return Self::new(mantissa.clone(), scale + exponent.unsigned_abs());
        }

        let exponent = exponent.unsigned_abs();
        if *scale >= exponent {
            Self::new(mantissa.clone(), scale - exponent)
        } else {
            Self::new(mantissa * pow10(exponent - scale), 0)
        }
    }

    /// Round half away from zero to exactly `places` decimal places.
    ///
    /// The result always carries `places` digits after the point, padding with
    /// zeros when the value had fewer.
    ///
    /// # Examples
    /// ```
    /// use amount_format::Decimal;
    ///
    /// let value: Decimal = "2.345".parse().unwrap();
    /// assert_eq!(value.round_to(2).to_string(), "2.35");
    /// assert_eq!(value.round_to(5).to_string(), "2.34500");
    ///
    /// let negative: Decimal = "-2.345".parse().unwrap();
    /// assert_eq!(negative.round_to(2).to_string(), "-2.35");
    /// ```
    pub fn round_to(&self, places: u32) -> Self {
        let Repr::Finite { mantissa, scale } = &self.repr else {
            return self.clone();
        };

        if *scale <= places {
            return Self::new(mantissa * pow10(places - scale), places);
        }

        let rounded = div_round_half_away(mantissa, &pow10(scale - places));
        Self::new(rounded, places)
    }

    /// Round to at most `digits` significant digits and drop trailing zeros
    ///
    /// # Examples
    /// ```
    /// use amount_format::Decimal;
    ///
    /// let value: Decimal = "0.000123456789".parse().unwrap();
    /// assert_eq!(value.round_significant(6).to_string(), "0.000123457");
    ///
    /// let large: Decimal = "123456789".parse().unwrap();
    /// assert_eq!(large.round_significant(3).to_string(), "123000000");
    /// ```
    pub fn round_significant(&self, digits: u32) -> Self {
        let Some(exponent) = self.exponent10() else {
            return self.normalize();
        };

        let places = i64::from(digits) - 1 - exponent;
        if places >= 0 {
            return self.round_to(places as u32).normalize();
        }

        // Too many integer digits: round at a power of ten above the unit.
        let shift = places as i32;
        self.shift(shift).round_to(0).shift(-shift).normalize()
    }

    /// Render with exactly `places` decimals (half away from zero)
    pub fn to_fixed(&self, places: u32) -> String {
        self.round_to(places).to_string()
    }

    pub fn plus(&self, other: &Self) -> Self {
        match (&self.repr, &other.repr) {
            (Repr::NaN, _) | (_, Repr::NaN) => Self::nan(),
            (Repr::Infinite { negative: a }, Repr::Infinite { negative: b }) => {
                if a == b {
                    self.clone()
                } else {
                    Self::nan()
                }
            }
            (Repr::Infinite { .. }, _) => self.clone(),
            (_, Repr::Infinite { .. }) => other.clone(),
            (
                Repr::Finite { mantissa: a, scale: sa },
                Repr::Finite { mantissa: b, scale: sb },
            ) => {
                let scale = (*sa).max(*sb);
                let a = a * pow10(scale - sa);
                let b = b * pow10(scale - sb);
                Self::new(a + b, scale)
            }
        }
    }

    pub fn minus(&self, other: &Self) -> Self {
        self.plus(&other.negated())
    }

    pub fn times(&self, other: &Self) -> Self {
        match (&self.repr, &other.repr) {
            (Repr::NaN, _) | (_, Repr::NaN) => Self::nan(),
            (Repr::Infinite { .. }, _) | (_, Repr::Infinite { .. }) => {
                if self.is_zero() || other.is_zero() {
                    Self::nan()
                } else if self.is_negative() != other.is_negative() {
                    Self::neg_infinity()
                } else {
                    Self::infinity()
                }
            }
            (
                Repr::Finite { mantissa: a, scale: sa },
                Repr::Finite { mantissa: b, scale: sb },
            ) => Self::new(a * b, sa + sb),
        }
    }

    /// Divide, rounding the quotient half away from zero at `places` decimals
    ///
    /// # Examples
    /// ```
    /// use amount_format::Decimal;
    ///
    /// let one = Decimal::from(1);
    /// let three = Decimal::from(3);
    /// assert_eq!(one.checked_div(&three, 4).unwrap().to_string(), "0.3333");
    /// assert!(one.checked_div(&Decimal::zero(), 4).is_err());
    /// ```
    pub fn checked_div(&self, other: &Self, places: u32) -> AmountResult<Self> {
        match (&self.repr, &other.repr) {
            (Repr::NaN, _) | (_, Repr::NaN) => Ok(Self::nan()),
            (Repr::Infinite { .. }, Repr::Infinite { .. }) => Ok(Self::nan()),
            (Repr::Infinite { .. }, _) if other.is_zero() => Err(AmountError::DivisionByZero),
            (Repr::Infinite { .. }, _) => Ok(if self.is_negative() != other.is_negative() {
                Self::neg_infinity()
            } else {
                Self::infinity()
            }),
            (_, Repr::Infinite { .. }) => Ok(Self::new(0, places)),
            (
                Repr::Finite { mantissa: a, scale: sa },
                Repr::Finite { mantissa: b, scale: sb },
            ) => {
                if b.is_zero() {
                    return Err(AmountError::DivisionByZero);
                }

                // a/b = (ma * 10^sb) / (mb * 10^sa), scaled up by 10^places
                let numerator = a * pow10(sb + places);
                let denominator = b * pow10(*sa);
                Ok(Self::new(div_round_half_away(&numerator, &denominator), places))
            }
        }
    }

    pub fn negated(&self) -> Self {
        match &self.repr {
            Repr::Finite { mantissa, scale } => Self::new(-mantissa, *scale),
            Repr::Infinite { negative } => Self {
                repr: Repr::Infinite { negative: !negative },
            },
            Repr::NaN => Self::nan(),
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Decimal {
    type Err = AmountError;

    /// Parse a plain decimal string (`"-12.5"`, `".5"`, `"1e18"`).
    ///
    /// Incomplete input such as `"5."`, `"-"` or `""` is rejected.
    fn from_str(s: &str) -> AmountResult<Self> {
        match s {
            "NaN" => return Ok(Self::nan()),
            "Infinity" | "+Infinity" | "∞" => return Ok(Self::infinity()),
            "-Infinity" | "-∞" => return Ok(Self::neg_infinity()),
            _ => {}
        }

        let invalid = || AmountError::InvalidDecimal(s.to_string());

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (number, exponent) = match body.find(|c| c == 'e' || c == 'E') {
            Some(index) => (&body[..index], Some(&body[index + 1..])),
            None => (body, None),
        };

        let (int_part, frac_part) = match number.split_once('.') {
            Some((int_part, frac_part)) => {
                if frac_part.is_empty() {
                    return Err(invalid());
                }
                (int_part, frac_part)
            }
            None => (number, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let exponent: i64 = match exponent {
            Some(text) => text.parse().map_err(|_| invalid())?,
            None => 0,
        };
        if exponent.abs() > MAX_PARSE_EXPONENT {
            return Err(invalid());
        }

        let digits = format!("{int_part}{frac_part}");
        let mut mantissa = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        if negative {
            mantissa = -mantissa;
        }

        let scale = frac_part.len() as i64 - exponent;
        if scale < 0 {
            Ok(Self::new(mantissa * pow10(scale.unsigned_abs() as u32), 0))
        } else {
            Ok(Self::new(mantissa, scale as u32))
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mantissa, scale) = match &self.repr {
            Repr::NaN => return write!(f, "NaN"),
            Repr::Infinite { negative: false } => return write!(f, "Infinity"),
            Repr::Infinite { negative: true } => return write!(f, "-Infinity"),
            Repr::Finite { mantissa, scale } => (mantissa, *scale as usize),
        };

        let sign = if mantissa.is_negative() { "-" } else { "" };
        let digits = mantissa.abs().to_string();
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }

        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.repr, &other.repr) {
            (Repr::NaN, _) | (_, Repr::NaN) => None,
            (Repr::Infinite { negative: a }, Repr::Infinite { negative: b }) => Some(b.cmp(a)),
            (Repr::Infinite { negative }, _) => Some(if *negative { Ordering::Less } else { Ordering::Greater }),
            (_, Repr::Infinite { negative }) => Some(if *negative { Ordering::Greater } else { Ordering::Less }),
            (
                Repr::Finite { mantissa: a, scale: sa },
                Repr::Finite { mantissa: b, scale: sb },
            ) => {
                let scale = (*sa).max(*sb);
                let a = a * pow10(scale - sa);
                let b = b * pow10(scale - sb);
                Some(a.cmp(&b))
            }
        }
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Self::new(value, 0)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self::new(value, 0)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Self::new(value, 0)
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        self.plus(rhs)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        self.plus(&rhs)
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        self.minus(rhs)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        self.minus(&rhs)
    }
}

impl Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        self.times(rhs)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        self.times(&rhs)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        self.negated()
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        self.negated()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Decimal;

    impl Serialize for Decimal {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Decimal;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a decimal string or number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Decimal, E> {
            value.parse().map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Decimal, E> {
            Ok(Decimal::from(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Decimal, E> {
            Ok(Decimal::from(value))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Decimal, E> {
            if value.is_nan() {
                Ok(Decimal::nan())
            } else if value.is_infinite() {
                Ok(if value < 0.0 { Decimal::neg_infinity() } else { Decimal::infinity() })
            } else {
                value.to_string().parse().map_err(E::custom)
            }
        }
    }

    impl<'de> Deserialize<'de> for Decimal {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
            deserializer.deserialize_any(DecimalVisitor)
        }
    }
}
