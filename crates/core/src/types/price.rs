//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are displayed the way the storefront renders them: US dollars in
//! the `es-ES` locale, e.g. `1.234,50 US$` for five-digit amounts and above.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
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

    /// Format for display (e.g., "19,99 US$").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}\u{a0}{}",
            format_amount(self.amount),
            self.currency_code.symbol()
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol as rendered by the `es-ES` locale.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "US$",
            Self::EUR => "€",
        }
    }
}

/// Format a dollar amount for display.
///
/// ```
/// use rust_decimal::Decimal;
/// use tienda_core::format_price;
///
/// assert_eq!(format_price(Decimal::new(1999, 2)), "19,99\u{a0}US$");
/// ```
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::USD).display()
}

/// Render an amount with two decimals, `,` as decimal separator and `.`
/// grouping. `es-ES` only groups integer parts of five digits or more.
fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let grouped = if int_part.len() >= 5 {
        let digits: Vec<char> = int_part.chars().collect();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push('.');
            }
            out.push(*digit);
        }
        out
    } else {
        int_part.to_string()
    };

    format!("{}{grouped},{frac_part}", if negative { "-" } else { "" })
}
