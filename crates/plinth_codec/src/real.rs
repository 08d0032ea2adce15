//! Fixed-point decimals.

use std::fmt;
use std::str::FromStr;

use crate::config::REAL_PRECISION;

/// A decimal with [`REAL_PRECISION`] fractional digits, stored as its
/// scaled integer.
///
/// The scaled integer is exactly what goes on the wire, so decoding and
/// re-encoding a `Real` never loses digits. `f64` is only a convenience
/// view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Real {
    scaled: i128,
}

/// Error returned when parsing a [`Real`] from decimal text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not a decimal with at most {} fractional digits", REAL_PRECISION)]
pub struct ParseRealError {
    /// The rejected input.
    pub input: String,
}

impl Real {
    /// `10^REAL_PRECISION`.
    pub const SCALE: i128 = 10_i128.pow(REAL_PRECISION);

    /// Wraps an already scaled integer.
    pub fn from_scaled(scaled: i128) -> Self {
        Self { scaled }
    }

    /// Returns the scaled integer.
    pub fn scaled(self) -> i128 {
        self.scaled
    }

    /// Converts a whole number, or `None` on overflow.
    pub fn from_int(n: i128) -> Option<Self> {
        n.checked_mul(Self::SCALE).map(Self::from_scaled)
    }

    /// Rounds a float to the nearest representable value, or `None` when it
    /// is not finite or out of range.
    pub fn from_f64(x: f64) -> Option<Self> {
        let scaled = (x * Self::SCALE as f64).round();
        if !scaled.is_finite() || scaled.abs() >= i128::MAX as f64 {
            return None;
        }
        Some(Self::from_scaled(scaled as i128))
    }

    /// Nearest `f64`. Lossy above 2^53 scaled units.
    pub fn to_f64(self) -> f64 {
        self.scaled as f64 / Self::SCALE as f64
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.scaled < 0 { "-" } else { "" };
        let abs = self.scaled.unsigned_abs();
        let scale = Self::SCALE.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / scale,
            abs % scale,
            width = REAL_PRECISION as usize
        )
    }
}

impl FromStr for Real {
    type Err = ParseRealError;

    /// Parses `[-]digits[.digits]` exactly.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRealError {
            input: s.to_string(),
        };
        let text = s.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty()
            || !all_digits(whole)
            || !all_digits(frac)
            || frac.len() > REAL_PRECISION as usize
        {
            return Err(err());
        }
        let whole: i128 = whole.parse().map_err(|_| err())?;
        let frac_scaled: i128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = REAL_PRECISION as usize);
            padded.parse().map_err(|_| err())?
        };
        let whole = whole.checked_mul(Self::SCALE);
        let scaled = if negative {
            whole
                .and_then(i128::checked_neg)
                .and_then(|w| w.checked_sub(frac_scaled))
        } else {
            whole.and_then(|w| w.checked_add(frac_scaled))
        };
        scaled.map(Self::from_scaled).ok_or_else(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_a_million() {
        assert_eq!(Real::SCALE, 1_000_000);
        assert_eq!(Real::from_int(3), Some(Real::from_scaled(3_000_000)));
        assert_eq!(Real::from_int(i128::MAX), None);
    }

    #[test]
    fn f64_view_rounds_to_micro_units() {
        assert_eq!(Real::from_f64(1.5), Some(Real::from_scaled(1_500_000)));
        assert_eq!(Real::from_f64(0.0000004), Some(Real::from_scaled(0)));
        assert_eq!(Real::from_scaled(250_000).to_f64(), 0.25);
        assert_eq!(Real::from_f64(f64::NAN), None);
        assert_eq!(Real::from_f64(f64::INFINITY), None);
    }

    #[test]
    fn display_is_exact() {
        assert_eq!(Real::from_scaled(1_500_000).to_string(), "1.500000");
        assert_eq!(Real::from_scaled(-1).to_string(), "-0.000001");
        assert_eq!(
            Real::from_scaled(9_007_199_254_740_993).to_string(),
            "9007199254.740993"
        );
    }

    #[test]
    fn parse_is_exact() {
        assert_eq!("1.25".parse::<Real>().unwrap(), Real::from_scaled(1_250_000));
        assert_eq!("-0.000001".parse::<Real>().unwrap(), Real::from_scaled(-1));
        assert_eq!(" 42 ".parse::<Real>().unwrap(), Real::from_scaled(42_000_000));
        assert_eq!(
            "9007199254.740993".parse::<Real>().unwrap(),
            Real::from_scaled(9_007_199_254_740_993)
        );
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for bad in ["", ".5", "1.2345678", "1e3", "--1", "1.2.3", "abc"] {
            assert!(bad.parse::<Real>().is_err(), "{bad}");
        }
    }

    #[test]
    fn display_parse_agree() {
        for r in [-123_456_789, i128::MIN, i128::MAX].map(Real::from_scaled) {
            assert_eq!(r.to_string().parse::<Real>().unwrap(), r);
        }
    }
}
