//! Peso amounts.
//!
//! Every price and spend accumulator in Pharma Direct is Philippine pesos,
//! so rather than a generic multi-currency type there is a single [`Peso`]
//! wrapper with en-PH display formatting.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of Philippine pesos.
///
/// Wraps [`rust_decimal::Decimal`] for exact arithmetic. Serialized as a
/// JSON number so document payloads stay compatible with what other
/// clients of the profile store read and write.
///
/// Display formats the way the storefront shows prices:
///
/// ```
/// use pharma_direct_core::Peso;
/// use rust_decimal::Decimal;
///
/// let total = Peso::new(Decimal::new(123_456, 2));
/// assert_eq!(total.to_string(), "₱1,234.56");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Peso(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Peso {
    /// Zero pesos.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl Add for Peso {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Peso {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Peso {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Peso {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Peso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let formatted = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}\u{20b1}{}.{frac_part}", group_thousands(int_part))
    }
}

/// Insert comma separators into a plain digit string ("1234567" -> "1,234,567").
fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn peso(mantissa: i64, scale: u32) -> Peso {
        Peso::new(Decimal::new(mantissa, scale))
    }

    #[test]
    fn formats_with_symbol_and_grouping() {
        assert_eq!(peso(123_456, 2).to_string(), "\u{20b1}1,234.56");
        assert_eq!(peso(12_345_678_90, 2).to_string(), "\u{20b1}12,345,678.90");
    }

    #[test]
    fn formats_zero_and_small_amounts() {
        assert_eq!(Peso::ZERO.to_string(), "\u{20b1}0.00");
        assert_eq!(peso(5, 0).to_string(), "\u{20b1}5.00");
        assert_eq!(peso(995, 2).to_string(), "\u{20b1}9.95");
    }

    #[test]
    fn formats_negative_amounts() {
        assert_eq!(peso(-50, 0).to_string(), "-\u{20b1}50.00");
    }

    #[test]
    fn rounds_to_centavos() {
        assert_eq!(peso(12_345, 3).to_string(), "\u{20b1}12.34");
        assert_eq!(peso(12_356, 3).to_string(), "\u{20b1}12.36");
    }

    #[test]
    fn accumulates() {
        let mut total = Peso::ZERO;
        total += peso(120_50, 2);
        total += peso(79_50, 2);
        assert_eq!(total, peso(200_00, 2));
        assert_eq!([peso(1, 0), peso(2, 0)].into_iter().sum::<Peso>(), peso(3, 0));
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_string(&peso(120_50, 2)).unwrap();
        assert_eq!(json, "120.5");

        let parsed: Peso = serde_json::from_str("120.5").unwrap();
        assert_eq!(parsed, peso(120_50, 2));

        let zero: Peso = serde_json::from_str("0").unwrap();
        assert!(zero.is_zero());
    }
}
