//! Interest accrual and outstanding balance for formal loans.
//!
//! Interest accrues daily at `annual rate / 100 / 365`, either simply on the
//! principal or compounded once per day.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    money::{checked_difference, checked_sum, require_non_negative, round_cents},
};

/// The number of days in a year used for daily interest rates.
pub const DAYS_PER_YEAR: u32 = 365;

const PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// How interest accrues on a loan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestType {
    /// Interest accrues on the principal only.
    #[default]
    Simple,
    /// Interest accrues on the principal plus previously accrued interest,
    /// compounded daily.
    Compound,
}

impl InterestType {
    /// The name stored in the database and used in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Compound => "compound",
        }
    }
}

/// The terms of a loan needed to compute what is owed on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    /// The amount originally lent.
    pub principal: Decimal,
    /// The annual interest rate as a percentage, e.g. `12` for 12%.
    pub annual_rate_percent: Decimal,
    /// Whether interest is simple or compounded daily.
    pub interest_type: InterestType,
    /// The day the loan was made.
    pub start_date: Date,
}

/// The outstanding balance of a loan on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanBalance {
    /// The principal of the loan.
    pub original_amount: Decimal,
    /// Principal plus accrued interest, rounded to the cent.
    pub total_owed: Decimal,
    /// The sum of all payments made.
    pub total_paid: Decimal,
    /// `total_owed - total_paid`. Negative when the loan has been overpaid.
    pub balance: Decimal,
    /// Whole days between the start of the loan and the as-of date.
    pub days_elapsed: u32,
}

/// Count the whole days from `start` to `end`, clamped to zero when `end` is
/// before `start`.
pub fn days_between(start: Date, end: Date) -> u32 {
    let days = (end - start).whole_days().max(0);

    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Compute principal plus the interest accrued over `days_elapsed` days.
///
/// The result is not rounded.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `principal` or `annual_rate_percent` is
/// negative, or if the amount owed is too large to represent.
pub fn compute_owed(
    principal: Decimal,
    annual_rate_percent: Decimal,
    interest_type: InterestType,
    days_elapsed: u32,
) -> Result<Decimal, Error> {
    require_non_negative(principal, "principal")?;
    require_non_negative(annual_rate_percent, "interest rate")?;

    if days_elapsed == 0 {
        return Ok(principal);
    }

    let daily_rate = annual_rate_percent / PERCENT / Decimal::from(DAYS_PER_YEAR);

    let growth = match interest_type {
        InterestType::Simple => daily_rate
            .checked_mul(Decimal::from(days_elapsed))
            .and_then(|interest| interest.checked_add(Decimal::ONE)),
        InterestType::Compound => (Decimal::ONE + daily_rate).checked_powu(u64::from(days_elapsed)),
    };

    growth
        .and_then(|growth| principal.checked_mul(growth))
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "the amount owed on {principal} at {annual_rate_percent}% over {days_elapsed} days is too large"
            ))
        })
}

/// Compute the balance of a loan on `as_of` given the payments made so far.
///
/// The amount owed is rounded to the cent before payments are subtracted,
/// so `balance == total_owed - total_paid` holds exactly.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `as_of` is before the start of the
/// loan, or if the terms are invalid (see [compute_owed]).
pub fn compute_balance(
    terms: &LoanTerms,
    payments: &[Decimal],
    as_of: Date,
) -> Result<LoanBalance, Error> {
    if as_of < terms.start_date {
        return Err(Error::InvalidInput(format!(
            "the balance date {as_of} is before the loan start date {}",
            terms.start_date
        )));
    }

    let days_elapsed = days_between(terms.start_date, as_of);
    let total_owed = round_cents(compute_owed(
        terms.principal,
        terms.annual_rate_percent,
        terms.interest_type,
        days_elapsed,
    )?);
    let total_paid = checked_sum(payments.iter().copied(), "total paid")?;

    Ok(LoanBalance {
        original_amount: terms.principal,
        total_owed,
        total_paid,
        balance: checked_difference(total_owed, total_paid, "loan balance")?,
        days_elapsed,
    })
}

#[cfg(test)]
mod compute_owed_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        loan::interest::{InterestType, compute_owed},
        money::round_cents,
    };

    #[test]
    fn no_time_elapsed_owes_principal() {
        for interest_type in [InterestType::Simple, InterestType::Compound] {
            for (principal, rate) in [(dec!(1000), dec!(12)), (dec!(0), dec!(5)), (dec!(42.5), dec!(0))] {
                let owed = compute_owed(principal, rate, interest_type, 0).unwrap();

                assert_eq!(owed, principal, "{interest_type:?} {principal} at {rate}%");
            }
        }
    }

    #[test]
    fn simple_interest_over_a_year() {
        let owed = compute_owed(dec!(1000), dec!(12), InterestType::Simple, 365).unwrap();

        assert_eq!(round_cents(owed), dec!(1120.00));
    }

    #[test]
    fn compound_interest_over_a_year() {
        let owed = compute_owed(dec!(1000), dec!(12), InterestType::Compound, 365).unwrap();

        // 1000 * (1 + 0.12 / 365) ^ 365
        assert_eq!(round_cents(owed), dec!(1127.47));
    }

    #[test]
    fn compound_exceeds_simple_after_the_first_day() {
        for days in [2, 30, 365, 3650] {
            for rate in [dec!(0.5), dec!(12), dec!(36)] {
                let simple = compute_owed(dec!(500), rate, InterestType::Simple, days).unwrap();
                let compound = compute_owed(dec!(500), rate, InterestType::Compound, days).unwrap();

                assert!(
                    compound > simple,
                    "want compound > simple for {days} days at {rate}%, got {compound} <= {simple}"
                );
            }
        }
    }

    #[test]
    fn compound_equals_simple_for_a_single_day() {
        let simple = compute_owed(dec!(500), dec!(12), InterestType::Simple, 1).unwrap();
        let compound = compute_owed(dec!(500), dec!(12), InterestType::Compound, 1).unwrap();

        assert_eq!(simple, compound);
    }

    #[test]
    fn zero_rate_never_accrues() {
        let owed = compute_owed(dec!(250), Decimal::ZERO, InterestType::Compound, 900).unwrap();

        assert_eq!(owed, dec!(250));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let result = compute_owed(dec!(1000), dec!(-5), InterestType::Simple, 10);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn negative_principal_is_rejected() {
        let result = compute_owed(dec!(-1), dec!(5), InterestType::Compound, 10);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
