//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as JSON numbers and are held as [`Decimal`] so that
//! cart totals never accumulate floating point drift. Formatting follows the
//! conventions of each currency's home locale (`R$ 1.234,56` for BRL,
//! `$1,234.56` for USD).

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display, rounded half away from zero to two places.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        let digits = format!("{:.2}", rounded.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let (thousands, decimal) = self.currency_code.separators();
        let grouped = group_thousands(whole, thousands);
        let sign = if negative { "-" } else { "" };

        format!(
            "{sign}{}{grouped}{decimal}{cents}",
            self.currency_code.prefix()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Symbol placed before the amount, including any separating space.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::BRL => "R$ ",
            Self::USD => "$",
            Self::EUR => "€ ",
            Self::GBP => "£",
        }
    }

    /// Thousands and decimal separators.
    const fn separators(self) -> (char, char) {
        match self {
            Self::BRL | Self::EUR => ('.', ','),
            Self::USD | Self::GBP => (',', '.'),
        }
    }

    /// The three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a currency code is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Self::BRL),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn brl(cents: i64) -> Price {
        Price::new(Decimal::new(cents, 2), CurrencyCode::BRL)
    }

    #[test]
    fn test_brl_uses_comma_decimal_and_dot_thousands() {
        assert_eq!(brl(123_456).display(), "R$ 1.234,56");
        assert_eq!(brl(1000).display(), "R$ 10,00");
        assert_eq!(brl(0).display(), "R$ 0,00");
    }

    #[test]
    fn test_usd_formatting() {
        let price = Price::new(Decimal::new(123_456_789, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$1,234,567.89");
    }

    #[test]
    fn test_pads_whole_amounts() {
        let price = Price::new(Decimal::from(55), CurrencyCode::GBP);
        assert_eq!(price.display(), "£55.00");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let price = Price::new(Decimal::new(10_005, 3), CurrencyCode::USD);
        assert_eq!(price.display(), "$10.01");
    }

    #[test]
    fn test_negative_amounts_keep_sign_before_symbol() {
        assert_eq!(brl(-250).display(), "-R$ 2,50");
    }

    #[test]
    fn test_currency_from_str_is_case_insensitive() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert_eq!(" usd ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("JPY".parse::<CurrencyCode>().is_err());
    }
}
