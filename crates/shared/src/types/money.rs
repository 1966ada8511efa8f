//! Fixed-point money and quantity types.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are integers: [`Cents`] holds 1/100 units, [`Scaled5`] holds
//! 1/100000 units for quantities and rates. `rust_decimal` is only used to
//! render the human-readable NUMERIC copies stored next to the integers.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Largest absolute money amount accepted, in cents (`10^14 - 0.01` units).
pub const MAX_CENTS: i64 = 9_999_999_999_999_999;

/// Largest scaled quantity accepted (`10^10 - 0.00001` units).
pub const MAX_QUANTITY: i64 = 999_999_999_999_999;

/// Largest scaled rate accepted (`10^13 - 0.00001` units).
pub const MAX_RATE: i64 = 999_999_999_999_999_999;

/// Divisor that turns `quantity * rate` (scale 10^10) into cents.
const LINE_TOTAL_DIVISOR: i128 = 100_000_000;

/// Errors raised while parsing or combining amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Input was empty after trimming.
    #[error("amount is empty")]
    Empty,

    /// Input is not a plain decimal number.
    #[error("amount {0:?} is not a decimal number")]
    NotNumeric(String),

    /// Input has more fractional digits than the target scale.
    #[error("amount {input:?} has more than {max} fractional digits")]
    TooPrecise {
        /// The rejected input.
        input: String,
        /// Fractional digits allowed at this scale.
        max: u32,
    },

    /// Value does not fit the accepted range.
    #[error("amount {0:?} is out of range")]
    OutOfRange(String),

    /// A negative value where only non-negative ones make sense.
    #[error("amount must not be negative")]
    Negative,
}

/// Number of fractional digits an amount is scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    digits: u32,
}

impl Scale {
    /// Two decimals: money.
    pub const CENTS: Self = Self { digits: 2 };
    /// Five decimals: quantities and rates.
    pub const FIVE: Self = Self { digits: 5 };

    /// Fractional digits.
    #[must_use]
    pub const fn digits(self) -> u32 {
        self.digits
    }

    /// `10^digits`.
    #[must_use]
    pub const fn factor(self) -> i64 {
        10_i64.pow(self.digits)
    }
}

/// Parses a decimal string into an integer scaled by `scale`.
///
/// Leading and trailing whitespace is ignored and `,` thousands separators
/// are stripped. A single leading `+` or `-` is accepted. Inputs with more
/// fractional digits than the scale allows are rejected, never rounded.
pub fn parse_amount(input: &str, scale: Scale) -> Result<i64, MoneyError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(MoneyError::Empty);
    }

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
    {
        return Err(MoneyError::NotNumeric(input.to_string()));
    }

    let max = scale.digits();
    let frac_len = u32::try_from(frac_part.len()).unwrap_or(u32::MAX);
    if frac_len > max {
        return Err(MoneyError::TooPrecise {
            input: input.to_string(),
            max,
        });
    }

    let out_of_range = || MoneyError::OutOfRange(input.to_string());
    let accumulate = |digits: &str| -> Result<i64, MoneyError> {
        digits.bytes().try_fold(0_i64, |acc, b| {
            acc.checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(b - b'0')))
                .ok_or_else(out_of_range)
        })
    };

    let whole = accumulate(int_part)?;
    let frac = accumulate(frac_part)?
        .checked_mul(10_i64.pow(max - frac_len))
        .ok_or_else(out_of_range)?;
    let value = whole
        .checked_mul(scale.factor())
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(out_of_range)?;

    Ok(if negative { -value } else { value })
}

/// Renders cents with exactly two fractional digits, e.g. `-12.05`.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Renders a 5-decimal scaled value with trailing zeros trimmed, e.g. `1.5`.
#[must_use]
pub fn format_scaled5(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let factor = Scale::FIVE.factor().unsigned_abs();
    let (whole, frac) = (abs / factor, abs % factor);
    if frac == 0 {
        return format!("{sign}{whole}");
    }
    let frac = format!("{frac:05}");
    format!("{sign}{whole}.{}", frac.trim_end_matches('0'))
}

/// Computes `quantity * rate` in cents.
///
/// The product is taken in 128-bit arithmetic and rounded half away from
/// zero. Negative results and results above [`MAX_CENTS`] are rejected.
pub fn line_total_cents(quantity: Scaled5, rate: Scaled5) -> Result<Cents, MoneyError> {
    let product = i128::from(quantity.get()) * i128::from(rate.get());
    if product < 0 {
        return Err(MoneyError::Negative);
    }
    let rounded = (product + LINE_TOTAL_DIVISOR / 2) / LINE_TOTAL_DIVISOR;
    let cents = i64::try_from(rounded)
        .ok()
        .filter(|c| *c <= MAX_CENTS)
        .ok_or_else(|| {
            MoneyError::OutOfRange(format!(
                "{} x {}",
                format_scaled5(quantity.get()),
                format_scaled5(rate.get())
            ))
        })?;
    Ok(Cents(cents))
}

// ============================================================================
// Cents
// ============================================================================

/// A money amount in integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cents(i64);

impl Cents {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw cent count.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw cent count.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parses a two-decimal amount such as `"1,234.50"`.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let raw = parse_amount(input, Scale::CENTS)?;
        if raw.unsigned_abs() > MAX_CENTS.unsigned_abs() {
            return Err(MoneyError::OutOfRange(input.to_string()));
        }
        Ok(Self(raw))
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Addition that reports overflow instead of wrapping.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Addition whose result must stay within [`MAX_CENTS`] either side of zero.
    pub fn bounded_add(self, other: Self) -> Result<Self, MoneyError> {
        self.checked_add(other)
            .filter(|sum| sum.0.unsigned_abs() <= MAX_CENTS.unsigned_abs())
            .ok_or_else(|| MoneyError::OutOfRange(format!("{self} + {other}")))
    }

    /// Decimal rendering with scale 2, used for NUMERIC columns.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_cents(self.0))
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Cents {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Cents {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Cents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_cents(self.0))
    }
}

impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Scaled5
// ============================================================================

/// A quantity or rate scaled by `10^5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Scaled5(i64);

impl Scaled5 {
    /// Exactly one unit.
    pub const ONE: Self = Self(100_000);

    /// Wraps a raw scaled value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw scaled value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parses a quantity, bounded by [`MAX_QUANTITY`].
    pub fn parse_quantity(input: &str) -> Result<Self, MoneyError> {
        Self::parse_bounded(input, MAX_QUANTITY)
    }

    /// Parses a rate, bounded by [`MAX_RATE`].
    pub fn parse_rate(input: &str) -> Result<Self, MoneyError> {
        Self::parse_bounded(input, MAX_RATE)
    }

    fn parse_bounded(input: &str, max: i64) -> Result<Self, MoneyError> {
        let raw = parse_amount(input, Scale::FIVE)?;
        if raw.unsigned_abs() > max.unsigned_abs() {
            return Err(MoneyError::OutOfRange(input.to_string()));
        }
        Ok(Self(raw))
    }
}

impl fmt::Display for Scaled5 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_scaled5(self.0))
    }
}

impl Serialize for Scaled5 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_scaled5(self.0))
    }
}

impl<'de> Deserialize<'de> for Scaled5 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_rate(&raw).map_err(serde::de::Error::custom)
    }
}

/// Deserializes a [`Scaled5`] quantity, bounded by [`MAX_QUANTITY`].
///
/// Plain `Deserialize` only enforces the wider rate bound. Quantity fields
/// opt in with `#[serde(deserialize_with = "deserialize_quantity")]`.
pub fn deserialize_quantity<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Scaled5, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Scaled5::parse_quantity(&raw).map_err(serde::de::Error::custom)
}
