//! # Exact Decimals
//!
//! JSON numbers reach this crate as `serde_json::Number`, which stores
//! fractional values as `f64`. Deriving the number of decimal places of
//! `multipleOf: 0.1` from the binary mantissa would give 55 digits;
//! deriving it from the shortest round-trip rendering (`"0.1"`) gives 1.
//! Every decimal in the compiler is therefore parsed from that rendering
//! into an exact `(mantissa, scale)` pair, with value `mantissa / 10^scale`.
//!
//! ## Rule
//!
//! - Accepted syntax: `[-]digits[.digits][(e|E)[+|-]digits]`.
//! - Trailing fractional zeros are dropped: `0.010` has scale 2.
//! - The scale is capped at [`MAX_SCALE`]; the mantissa is an `i128`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::error::DecimalError;

/// Largest number of fractional digits a `Decimal` may carry.
pub const MAX_SCALE: u32 = 30;

/// An exact base-10 number `mantissa / 10^scale` in normalized form.
///
/// Normalization (no trailing zeros in the fractional part, `0` has scale
/// 0) makes the derived `PartialEq` and `Hash` value-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

impl Decimal {
    /// The value zero.
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Build a decimal from an integer.
    pub fn from_i128(value: i128) -> Self {
        Self {
            mantissa: value,
            scale: 0,
        }
    }

    /// Build `mantissa / 10^scale`, normalizing trailing zeros.
    ///
    /// # Errors
    ///
    /// `DecimalError::Overflow` if the normalized scale exceeds [`MAX_SCALE`].
    pub fn new(mantissa: i128, scale: u32) -> Result<Self, DecimalError> {
        let (mantissa, scale) = normalize(mantissa, i64::from(scale));
        if scale > i64::from(MAX_SCALE) {
            return Err(DecimalError::Overflow(format!("{mantissa}e-{scale}")));
        }
        Ok(Self {
            mantissa,
            scale: scale as u32,
        })
    }

    /// Parse a decimal literal.
    pub fn parse(input: &str) -> Result<Self, DecimalError> {
        let invalid = || DecimalError::Invalid(input.to_string());
        let overflow = || DecimalError::Overflow(input.to_string());

        let text = input.trim();
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (number, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => {
                let exp = rest[i + 1..].parse::<i64>().map_err(|_| invalid())?;
                (&rest[..i], exp)
            }
            None => (rest, 0),
        };
        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let mut mantissa: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let digit = c.to_digit(10).ok_or_else(invalid)?;
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit)))
                .ok_or_else(overflow)?;
        }

        let mut scale = (frac_part.len() as i64)
            .checked_sub(exponent)
            .ok_or_else(overflow)?;
        if scale < 0 {
            let shift = u32::try_from(-scale).map_err(|_| overflow())?;
            mantissa = pow10(shift)
                .and_then(|p| mantissa.checked_mul(p))
                .ok_or_else(overflow)?;
            scale = 0;
        }
        if negative {
            mantissa = -mantissa;
        }

        let (mantissa, scale) = normalize(mantissa, scale);
        if scale > i64::from(MAX_SCALE) {
            return Err(overflow());
        }
        Ok(Self {
            mantissa,
            scale: scale as u32,
        })
    }

    /// Parse the shortest round-trip rendering of a JSON number.
    pub fn from_json_number(number: &Number) -> Result<Self, DecimalError> {
        Self::parse(&number.to_string())
    }

    /// The unscaled integer.
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Number of significant fractional digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa > 0
    }

    pub fn is_integral(&self) -> bool {
        self.scale == 0
    }

    /// The integer value, if there is no fractional part.
    pub fn to_i128(&self) -> Option<i128> {
        self.is_integral().then_some(self.mantissa)
    }

    /// Exact subtraction.
    pub fn checked_sub(&self, other: &Decimal) -> Result<Decimal, DecimalError> {
        let scale = self.scale.max(other.scale);
        let overflow = || DecimalError::Overflow(format!("{self} - {other}"));
        let lhs = pow10(scale - self.scale)
            .and_then(|p| self.mantissa.checked_mul(p))
            .ok_or_else(overflow)?;
        let rhs = pow10(scale - other.scale)
            .and_then(|p| other.mantissa.checked_mul(p))
            .ok_or_else(overflow)?;
        let diff = lhs.checked_sub(rhs).ok_or_else(overflow)?;
        Decimal::new(diff, scale)
    }

    /// `self * 10^places` as an integer.
    ///
    /// # Errors
    ///
    /// `DecimalError::NotIntegral` if `self` has more than `places`
    /// fractional digits; `DecimalError::Overflow` if the product does not
    /// fit an `i128`.
    pub fn scaled_integer(&self, places: u32) -> Result<i128, DecimalError> {
        if self.scale > places {
            return Err(DecimalError::NotIntegral {
                value: self.to_string(),
                places,
            });
        }
        pow10(places - self.scale)
            .and_then(|p| self.mantissa.checked_mul(p))
            .ok_or_else(|| DecimalError::Overflow(format!("{self}e{places}")))
    }

    /// Inverse of [`Decimal::scaled_integer`].
    pub fn from_scaled(value: i128, places: u32) -> Result<Decimal, DecimalError> {
        Decimal::new(value, places)
    }

    /// Exact addition.
    pub fn checked_add(&self, other: &Decimal) -> Result<Decimal, DecimalError> {
        let negated = Decimal::new(
            other
                .mantissa
                .checked_neg()
                .ok_or_else(|| DecimalError::Overflow(other.to_string()))?,
            other.scale,
        )?;
        self.checked_sub(&negated)
    }

    /// Render as a JSON number. Integral values within `i64` stay integers;
    /// everything else goes through the closest `f64`.
    pub fn to_json_number(&self) -> Option<Number> {
        if let Some(i) = self.to_i128().and_then(|i| i64::try_from(i).ok()) {
            return Some(Number::from(i));
        }
        self.to_string()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
    }
}

fn normalize(mut mantissa: i128, mut scale: i64) -> (i128, i64) {
    if mantissa == 0 {
        return (0, 0);
    }
    while scale > 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    (mantissa, scale)
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        if self.mantissa < 0 {
            f.write_str("-")?;
        }
        write!(f, "{int_part}.{frac_part}")
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::parse(s)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Decimal::parse(&s).map_err(serde::de::Error::custom),
            Value::Number(n) => Decimal::from_json_number(&n).map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "expected a decimal string or number, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    fn number_scale(v: Value) -> u32 {
        match v {
            Value::Number(n) => Decimal::from_json_number(&n).unwrap().scale(),
            other => panic!("not a number: {other}"),
        }
    }

    #[test]
    fn test_decimal_places_from_json_numbers() {
        assert_eq!(number_scale(json!(1)), 0);
        assert_eq!(number_scale(json!(0.5)), 1);
        assert_eq!(number_scale(json!(0.01)), 2);
        assert_eq!(number_scale(json!(0.001)), 3);
        assert_eq!(number_scale(json!(1e-7)), 7);
        assert_eq!(number_scale(json!(2.0)), 0);
    }

    #[test]
    fn test_float_noise_is_kept_as_written() {
        // 0.1 + 0.2 has no shorter round-trip rendering than 17 digits.
        assert_eq!(number_scale(json!(0.1 + 0.2)), 17);
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(dec("-180"), Decimal::from_i128(-180));
        assert_eq!(dec("0.010"), dec("0.01"));
        assert_eq!(dec("1.5e2"), Decimal::from_i128(150));
        assert_eq!(dec("25E-3"), dec("0.025"));
        assert_eq!(dec(".5"), dec("0.5"));
        assert_eq!(dec("-0"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "-", ".", "1.2.3", "abc", "1e", "--1", "1_000"] {
            assert!(
                matches!(Decimal::parse(bad), Err(DecimalError::Invalid(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "9".repeat(60);
        assert!(matches!(
            Decimal::parse(&huge),
            Err(DecimalError::Overflow(_))
        ));
        assert!(matches!(
            Decimal::parse("1e-40"),
            Err(DecimalError::Overflow(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(dec("-180.250").to_string(), "-180.25");
        assert_eq!(dec("0.001").to_string(), "0.001");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("42").to_string(), "42");
    }

    #[test]
    fn test_checked_sub_shift_by_minimum() {
        // longitude 12.345 with minimum -180 shifts to 192.345
        let shifted = dec("12.345").checked_sub(&dec("-180")).unwrap();
        assert_eq!(shifted, dec("192.345"));
        assert_eq!(shifted.scaled_integer(3).unwrap(), 192_345);
    }

    #[test]
    fn test_scaled_integer_rejects_extra_digits() {
        let err = dec("1.2345").scaled_integer(3).unwrap_err();
        assert_eq!(
            err,
            DecimalError::NotIntegral {
                value: "1.2345".into(),
                places: 3
            }
        );
        assert_eq!(dec("1.2").scaled_integer(3).unwrap(), 1200);
    }

    #[test]
    fn test_from_scaled_round_trip() {
        let v = Decimal::from_scaled(192_345, 3).unwrap();
        assert_eq!(v.checked_add(&dec("-180")).unwrap(), dec("12.345"));
    }

    #[test]
    fn test_serde_as_string() {
        let v = dec("-180.5");
        assert_eq!(serde_json::to_value(v).unwrap(), json!("-180.5"));
        let back: Decimal = serde_json::from_value(json!("-180.5")).unwrap();
        assert_eq!(back, v);
        let from_number: Decimal = serde_json::from_value(json!(-180.5)).unwrap();
        assert_eq!(from_number, v);
    }

    #[test]
    fn test_to_json_number() {
        assert_eq!(dec("-200").to_json_number(), Some(Number::from(-200)));
        assert_eq!(
            dec("0.25").to_json_number().map(|n| n.to_string()),
            Some("0.25".to_string())
        );
    }
}
