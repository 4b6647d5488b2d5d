//! Fixed-point scalar used by every filter in the crate
//!
//! Values are `i128` integers scaled by [`SCALE`] (18 decimal places), so the
//! recursions stay deterministic and never touch native floating point.
//! Products and quotients are formed at 256-bit width before rescaling, and
//! every rescale rounds toward zero.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Fixed-point scale factor (1.0 == 10^18)
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// Number of fractional decimal digits carried by [`Fixed`]
pub const DECIMALS: usize = 18;

/// Scaled-integer real number
///
/// # Examples
///
/// ```
/// use oracle_filters::numeric::{Fixed, SCALE};
///
/// let quarter: Fixed = "0.25".parse().unwrap();
/// assert_eq!(quarter.raw(), SCALE / 4);
///
/// let x = Fixed::from_int(3).checked_mul(quarter).unwrap();
/// assert_eq!(x.to_string(), "0.75");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(i128);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);

    /// Wrap an already-scaled integer
    #[inline(always)]
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// Whole number, scaled. Every `i64` fits.
    #[inline(always)]
    pub const fn from_int(value: i64) -> Self {
        Self(value as i128 * SCALE)
    }

    /// `numerator / denominator` as a fixed-point value
    #[inline]
    pub fn from_ratio(numerator: i64, denominator: i64) -> Result<Self> {
        Self::from_int(numerator).checked_div(Self::from_int(denominator))
    }

    /// Underlying scaled integer
    #[inline(always)]
    pub const fn raw(self) -> i128 {
        self.0
    }

    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Lossy conversion, for logs and diagnostics only
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    #[inline]
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(FilterError::overflow("add"))
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(FilterError::overflow("sub"))
    }

    /// `self * rhs`, rescaled by [`SCALE`]
    #[inline]
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        mul_div(self.0, rhs.0, SCALE, "mul").map(Self)
    }

    /// `self / rhs`, rescaled by [`SCALE`]
    #[inline]
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.0 == 0 {
            return Err(FilterError::DivisionByZero);
        }
        mul_div(self.0, SCALE, rhs.0, "div").map(Self)
    }
}

/// `a * b / d` with a 256-bit intermediate, truncated toward zero
///
/// Fails if the quotient does not fit back into `i128`. `d` must be non-zero.
fn mul_div(a: i128, b: i128, d: i128, op: &'static str) -> Result<i128> {
    let negative = (a < 0) ^ (b < 0) ^ (d < 0);

    let product = U256::from(a.unsigned_abs()) * U256::from(b.unsigned_abs());
    let quotient = product / U256::from(d.unsigned_abs());

    if quotient > U256::from(i128::MAX as u128) {
        return Err(FilterError::overflow(op));
    }

    let magnitude = quotient.as_u128() as i128;
    Ok(if negative { -magnitude } else { magnitude })
}

// ============================================================================
// Decimal text
// ============================================================================

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let scale = SCALE as u128;
        let whole = magnitude / scale;
        let frac = magnitude % scale;

        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}", whole)?;

        if frac != 0 {
            let digits = format!("{:0width$}", frac, width = DECIMALS);
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl FromStr for Fixed {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FilterError::InvalidLiteral(s.to_string());
        let text = s.trim();

        let (negative, unsigned) = match text.as_bytes().first() {
            Some(&b'-') => (true, &text[1..]),
            Some(&b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (whole, frac) = match unsigned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (unsigned, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(invalid());
        }

        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| FilterError::overflow("parse"))?
        };
        let frac_value: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS);
            padded.parse().map_err(|_| invalid())?
        };

        let magnitude = whole_value
            .checked_mul(SCALE as u128)
            .and_then(|v| v.checked_add(frac_value))
            .filter(|v| *v <= i128::MAX as u128)
            .ok_or(FilterError::overflow("parse"))? as i128;

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl PartialEq<i128> for Fixed {
    fn eq(&self, other: &i128) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<i128> for Fixed {
    fn partial_cmp(&self, other: &i128) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}
