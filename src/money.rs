//! Fixed-point helpers for monetary amounts.
//!
//! Amounts are [Decimal]s in memory and decimal text in the database, so no
//! value ever passes through floating point.

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::Error;

/// The number of decimal places money is rounded to.
pub const CENTS_SCALE: u32 = 2;

/// Round `amount` to the nearest cent, with halves rounded away from zero.
///
/// The result always has exactly two decimal places, e.g. `12` becomes `12.00`.
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CENTS_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CENTS_SCALE);
    rounded
}

/// The error for a calculation whose result does not fit in a [Decimal].
pub fn too_large(what: &str) -> Error {
    Error::InvalidInput(format!("{what} is too large to calculate"))
}

/// Add up `amounts`, failing instead of overflowing.
///
/// # Errors
/// Returns an [Error::InvalidInput] naming `what` if the total does not fit.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>, what: &str) -> Result<Decimal, Error> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or_else(|| too_large(what))
}

/// Subtract `right` from `left`, failing instead of overflowing.
///
/// # Errors
/// Returns an [Error::InvalidInput] naming `what` if the difference does not fit.
pub fn checked_difference(left: Decimal, right: Decimal, what: &str) -> Result<Decimal, Error> {
    left.checked_sub(right).ok_or_else(|| too_large(what))
}

/// Read the decimal text in column `index` of `row`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Check that a monetary amount is strictly positive.
///
/// # Errors
/// Returns an [Error::InvalidInput] naming `field` if `amount <= 0`.
pub fn require_positive(amount: Decimal, field: &str) -> Result<Decimal, Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidInput(format!(
            "{field} must be greater than zero, got {amount}"
        )));
    }

    Ok(amount)
}

/// Check that an amount or rate is not negative.
///
/// # Errors
/// Returns an [Error::InvalidInput] naming `field` if `amount < 0`.
pub fn require_non_negative(amount: Decimal, field: &str) -> Result<Decimal, Error> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidInput(format!(
            "{field} cannot be negative, got {amount}"
        )));
    }

    Ok(amount)
}

/// Check that a required text field is not blank and return it trimmed.
///
/// # Errors
/// Returns an [Error::InvalidInput] naming `field` if `text` is empty or whitespace.
pub fn require_text(text: &str, field: &str) -> Result<String, Error> {
    let text = text.trim();

    if text.is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }

    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        money::{
            checked_difference, checked_sum, get_decimal, require_non_negative, require_positive,
            require_text, round_cents,
        },
    };

    #[test]
    fn round_cents_rounds_half_up() {
        assert_eq!(round_cents(dec!(1.005)), dec!(1.01));
        assert_eq!(round_cents(dec!(1.004)), dec!(1.00));
        assert_eq!(round_cents(dec!(1119.99999999)), dec!(1120.00));
    }

    #[test]
    fn round_cents_pads_to_two_places() {
        assert_eq!(round_cents(dec!(12)).to_string(), "12.00");
        assert_eq!(round_cents(dec!(0.5)).to_string(), "0.50");
    }

    #[test]
    fn decimal_text_round_trips_through_sqlite() {
        let connection = Connection::open_in_memory().unwrap();

        let got = connection
            .query_row("SELECT ?1", ["1234.56"], |row| get_decimal(row, 0))
            .unwrap();

        assert_eq!(got, dec!(1234.56));
    }

    #[test]
    fn malformed_decimal_text_is_a_conversion_error() {
        let connection = Connection::open_in_memory().unwrap();

        let got = connection.query_row("SELECT 'twelve'", [], |row| get_decimal(row, 0));

        assert!(matches!(
            got,
            Err(rusqlite::Error::FromSqlConversionFailure(0, _, _))
        ));
    }

    #[test]
    fn zero_is_not_positive() {
        assert!(matches!(
            require_positive(dec!(0), "amount"),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(require_positive(dec!(0.01), "amount"), Ok(dec!(0.01)));
    }

    #[test]
    fn zero_is_non_negative() {
        assert_eq!(require_non_negative(dec!(0), "rate"), Ok(dec!(0)));
        assert!(matches!(
            require_non_negative(dec!(-0.5), "rate"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(
            require_text(" \t", "name"),
            Err(Error::InvalidInput("name is required".to_owned()))
        );
        assert_eq!(require_text("  Ana ", "name"), Ok("Ana".to_owned()));
    }

    #[test]
    fn checked_sum_adds_amounts() {
        assert_eq!(
            checked_sum([dec!(1.10), dec!(2.20), dec!(-0.30)], "total"),
            Ok(dec!(3.00))
        );
        assert_eq!(checked_sum([], "total"), Ok(Decimal::ZERO));
    }

    #[test]
    fn checked_sum_rejects_overflow() {
        assert_eq!(
            checked_sum([Decimal::MAX, dec!(1)], "total income"),
            Err(Error::InvalidInput(
                "total income is too large to calculate".to_owned()
            ))
        );
    }

    #[test]
    fn checked_difference_rejects_overflow() {
        assert_eq!(checked_difference(dec!(5), dec!(7.5), "balance"), Ok(dec!(-2.5)));
        assert!(matches!(
            checked_difference(Decimal::MIN, dec!(1), "balance"),
            Err(Error::InvalidInput(_))
        ));
    }
}
