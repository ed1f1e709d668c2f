use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-point decimal price with 8 decimal places.
///
/// All engine arithmetic happens on the raw `i64` value (widened to `i128`
/// where products are involved), so repeated aggregation cycles never
/// accumulate binary-float rounding error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(i64);

impl Price {
    pub const DECIMALS: u32 = 8;
    const MULTIPLIER: i64 = 100_000_000; // 10^8

    pub fn from_raw(value: i64) -> Self {
        Price(value)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }

    /// Lossy constructor for providers that serve prices as JSON numbers.
    /// Rounds to the nearest representable 8-decimal value.
    pub fn from_f64(value: f64) -> Self {
        Price((value * Self::MULTIPLIER as f64).round() as i64)
    }

    pub fn zero() -> Self {
        Price(0)
    }

    /// Round half-away-from-zero to `dp` decimal places (capped at 8).
    pub fn round_dp(&self, dp: u32) -> Self {
        let dp = dp.min(Self::DECIMALS);
        let factor = 10i64.pow(Self::DECIMALS - dp);
        if factor == 1 {
            return *self;
        }
        let q = if self.0 >= 0 {
            (self.0 + factor / 2) / factor
        } else {
            (self.0 - factor / 2) / factor
        };
        Price(q * factor)
    }
}

impl FromStr for Price {
    type Err = Error;

    /// Exact decimal-string parse. Digits beyond the eighth fractional
    /// place are truncated.
    fn from_str(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(Error::InvalidPrice(s.to_string()));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::InvalidPrice(s.to_string()));
        }

        let int: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| Error::InvalidPrice(s.to_string()))?
        };
        let mut frac_digits: String = frac_part.chars().take(Self::DECIMALS as usize).collect();
        while frac_digits.len() < Self::DECIMALS as usize {
            frac_digits.push('0');
        }
        let frac: i64 = frac_digits
            .parse()
            .map_err(|_| Error::InvalidPrice(s.to_string()))?;

        let raw = int
            .checked_mul(Self::MULTIPLIER)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| Error::InvalidPrice(s.to_string()))?;
        Ok(Price(if negative { -raw } else { raw }))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let int = abs / Self::MULTIPLIER as u64;
        let frac = abs % Self::MULTIPLIER as u64;
        if frac == 0 {
            write!(f, "{sign}{int}")
        } else {
            let padded = format!("{frac:08}");
            write!(f, "{sign}{int}.{}", padded.trim_end_matches('0'))
        }
    }
}
