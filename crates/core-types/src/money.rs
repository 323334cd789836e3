//! Conversions between dollar amounts and the integer cents stored in the database.
//!
//! Every amount crosses this boundary exactly once per direction: user input is
//! multiplied by 100 on the way in, stored cents are divided by 100 (or formatted)
//! on the way out.

use crate::error::CoreError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Converts a dollar amount into whole cents, rounding half away from zero.
///
/// Fails if the result does not fit the `INT` column that stores it.
pub fn dollars_to_cents(amount: Decimal) -> Result<i32, CoreError> {
    amount
        .checked_mul(dec!(100))
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i32())
        .ok_or_else(|| CoreError::Calculation(format!("{amount} dollars does not fit in cents")))
}

/// Converts stored cents back into dollars. Exact for any `i64`.
pub fn cents_to_dollars(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Formats cents as US dollars, e.g. `123456` becomes `"$1,234.56"`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();
    let fraction = abs % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{fraction:02}")
}
