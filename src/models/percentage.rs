//! Percentage type for percentage-based splits
//!
//! Stored as hundredths of a percent (`33.33%` is `3333`) so that sums and
//! share computations stay exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

use super::money::Money;

/// A percentage with two fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(i64);

impl Percentage {
    /// 0%
    pub const ZERO: Self = Self(0);

    /// 100%
    pub const HUNDRED: Self = Self(10_000);

    /// Create a percentage from hundredths of a percent (unchecked)
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Create a percentage from a whole number of percent
    pub const fn from_whole(percent: i64) -> Self {
        Self(percent * 100)
    }

    /// Hundredths of a percent
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whether this is a legal share, i.e. within `[0, 100]`
    pub const fn is_valid_share(&self) -> bool {
        self.0 >= 0 && self.0 <= Self::HUNDRED.0
    }

    /// This percentage of `amount`, rounded half-up to the cent
    ///
    /// Only meaningful for non-negative amounts and shares.
    pub fn share_of(&self, amount: Money) -> Money {
        let scaled = amount.cents() as i128 * self.0 as i128;
        let denom = Self::HUNDRED.0 as i128;
        let rounded = (scaled + denom / 2).div_euclid(denom);
        Money::from_cents(rounded as i64)
    }

    /// Parse a percentage like "50", "33.33" or "12.5%"
    ///
    /// The value must lie in `[0, 100]` and carry at most two decimals.
    pub fn parse(s: &str) -> Result<Self, PercentageParseError> {
        let trimmed = s.trim();
        let body = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let invalid = || PercentageParseError::InvalidFormat(trimmed.to_string());

        let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty()
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(PercentageParseError::TooPrecise(trimmed.to_string()));
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let value = Self(
            whole
                .checked_mul(100)
                .and_then(|w| w.checked_add(frac))
                .ok_or_else(invalid)?,
        );
        if !value.is_valid_share() {
            return Err(PercentageParseError::OutOfRange(trimmed.to_string()));
        }
        Ok(value)
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        if abs % 100 == 0 {
            write!(f, "{}{}%", sign, abs / 100)
        } else {
            write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
        }
    }
}

impl std::str::FromStr for Percentage {
    type Err = PercentageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Percentage {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl std::iter::Sum for Percentage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, p| acc + p)
    }
}

/// Error type for percentage parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PercentageParseError {
    InvalidFormat(String),
    TooPrecise(String),
    OutOfRange(String),
}

impl fmt::Display for PercentageParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(s) => write!(f, "Invalid percentage: {}", s),
            Self::TooPrecise(s) => write!(f, "Percentage has more than two decimal places: {}", s),
            Self::OutOfRange(s) => write!(f, "Percentage must be between 0 and 100: {}", s),
        }
    }
}

impl std::error::Error for PercentageParseError {}
