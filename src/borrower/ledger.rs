//! Interest and running totals for informal loans to borrowers.
//!
//! Each amount given accrues simple interest on its own from the day it was
//! given. Amounts received back do not reduce the interest on earlier entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    borrower::core::LoanTransaction,
    loan::{DAYS_PER_YEAR, days_between},
    money::{checked_difference, require_non_negative, round_cents, too_large},
};

/// The direction money moved between the user and a borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanTransactionKind {
    /// Money lent to the borrower.
    Given,
    /// Money paid back by the borrower.
    Received,
}

impl LoanTransactionKind {
    /// The name stored in the database and used in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Given => "given",
            Self::Received => "received",
        }
    }

    /// The description used when none is given.
    pub fn default_description(self) -> &'static str {
        match self {
            Self::Given => "Money Given",
            Self::Received => "Money Received",
        }
    }
}

/// Totals over one borrower's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowerSummary {
    /// The sum of all amounts given.
    pub total_lent: Decimal,
    /// The sum of all amounts received.
    pub total_received: Decimal,
    /// `total_lent - total_received`, not including interest.
    pub outstanding: Decimal,
    /// The sum of the interest earned on each amount given, each rounded to the cent.
    pub total_interest: Decimal,
}

/// Totals across every borrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    /// The sum of all amounts given.
    pub total_lent: Decimal,
    /// The sum of every borrower's outstanding amount.
    pub total_outstanding: Decimal,
    /// The sum of every borrower's interest.
    pub total_interest: Decimal,
    /// The number of borrowers that still owe money.
    pub active_borrowers: usize,
}

/// The simple interest earned on `amount` given on `date` up to `as_of`,
/// rounded to the cent.
///
/// Dates after `as_of` earn no interest.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `annual_rate_percent` is negative or
/// the interest is too large to represent.
pub fn interest_earned(
    amount: Decimal,
    annual_rate_percent: Decimal,
    date: Date,
    as_of: Date,
) -> Result<Decimal, Error> {
    require_non_negative(annual_rate_percent, "interest rate")?;

    let days_elapsed = Decimal::from(days_between(date, as_of));

    amount
        .checked_mul(annual_rate_percent)
        .and_then(|interest| interest.checked_mul(days_elapsed))
        .and_then(|interest| interest.checked_div(Decimal::ONE_HUNDRED))
        .and_then(|interest| interest.checked_div(Decimal::from(DAYS_PER_YEAR)))
        .map(round_cents)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "the interest on {amount} at {annual_rate_percent}% since {date} is too large"
            ))
        })
}

/// The interest earned by `transaction` as of `as_of`, or `None` for money received.
///
/// # Errors
/// See [interest_earned].
pub fn transaction_interest(
    transaction: &LoanTransaction,
    as_of: Date,
) -> Result<Option<Decimal>, Error> {
    match transaction.kind {
        LoanTransactionKind::Given => interest_earned(
            transaction.amount,
            transaction.interest_rate,
            transaction.transaction_date,
            as_of,
        )
        .map(Some),
        LoanTransactionKind::Received => Ok(None),
    }
}

/// Totals over a borrower's loan transactions as of `as_of`.
///
/// # Errors
/// See [interest_earned].
pub fn summarize_borrower(
    transactions: &[LoanTransaction],
    as_of: Date,
) -> Result<BorrowerSummary, Error> {
    let mut total_lent = Decimal::ZERO;
    let mut total_received = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;

    for transaction in transactions {
        match transaction.kind {
            LoanTransactionKind::Given => add_to(&mut total_lent, transaction.amount, "total lent")?,
            LoanTransactionKind::Received => {
                add_to(&mut total_received, transaction.amount, "total received")?
            }
        }

        if let Some(interest) = transaction_interest(transaction, as_of)? {
            add_to(&mut total_interest, interest, "total interest")?;
        }
    }

    Ok(BorrowerSummary {
        total_lent,
        total_received,
        outstanding: checked_difference(total_lent, total_received, "outstanding amount")?,
        total_interest,
    })
}

/// Totals across the summaries of every borrower.
///
/// # Errors
/// Returns an [Error::InvalidInput] if a total is too large to represent.
pub fn summarize_all<'a>(
    summaries: impl IntoIterator<Item = &'a BorrowerSummary>,
) -> Result<LoanSummary, Error> {
    let mut totals = LoanSummary {
        total_lent: Decimal::ZERO,
        total_outstanding: Decimal::ZERO,
        total_interest: Decimal::ZERO,
        active_borrowers: 0,
    };

    for summary in summaries {
        add_to(&mut totals.total_lent, summary.total_lent, "total lent")?;
        add_to(
            &mut totals.total_outstanding,
            summary.outstanding,
            "total outstanding",
        )?;
        add_to(
            &mut totals.total_interest,
            summary.total_interest,
            "total interest",
        )?;
        if summary.outstanding > Decimal::ZERO {
            totals.active_borrowers += 1;
        }
    }

    Ok(totals)
}

fn add_to(total: &mut Decimal, amount: Decimal, what: &str) -> Result<(), Error> {
    *total = total.checked_add(amount).ok_or_else(|| too_large(what))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, Duration, OffsetDateTime, macros::date};

    use crate::{
        Error,
        borrower::{
            core::LoanTransaction,
            ledger::{
                BorrowerSummary, LoanTransactionKind, interest_earned, summarize_all,
                summarize_borrower, transaction_interest,
            },
        },
    };

    fn create_test_entry(
        kind: LoanTransactionKind,
        amount: Decimal,
        interest_rate: Decimal,
        transaction_date: Date,
    ) -> LoanTransaction {
        LoanTransaction {
            id: 0,
            borrower_id: 1,
            borrower_name: None,
            kind,
            amount,
            interest_rate,
            transaction_date,
            due_date: None,
            description: None,
            interest_earned: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: None,
        }
    }

    #[test]
    fn a_year_at_ten_percent_earns_a_tenth() {
        let as_of = date!(2025 - 01 - 01);
        let given = create_test_entry(
            LoanTransactionKind::Given,
            dec!(1000),
            dec!(10),
            as_of - Duration::days(365),
        );

        let summary = summarize_borrower(&[given], as_of).unwrap();

        assert_eq!(
            summary,
            BorrowerSummary {
                total_lent: dec!(1000),
                total_received: dec!(0),
                outstanding: dec!(1000),
                total_interest: dec!(100.00),
            }
        );
    }

    #[test]
    fn interest_is_rounded_to_the_cent() {
        // 1000 * 5% * 10 / 365 = 1.36986...
        let interest = interest_earned(
            dec!(1000),
            dec!(5),
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 11),
        )
        .unwrap();

        assert_eq!(interest, dec!(1.37));
        assert_eq!(interest.to_string(), "1.37");
    }

    #[test]
    fn future_dates_earn_no_interest() {
        let interest = interest_earned(
            dec!(1000),
            dec!(10),
            date!(2024 - 06 - 01),
            date!(2024 - 05 - 01),
        )
        .unwrap();

        assert_eq!(interest, Decimal::ZERO);
    }

    #[test]
    fn negative_rate_is_rejected() {
        let result = interest_earned(
            dec!(1000),
            dec!(-1),
            date!(2024 - 01 - 01),
            date!(2024 - 06 - 01),
        );

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn received_entries_have_no_interest() {
        let received = create_test_entry(
            LoanTransactionKind::Received,
            dec!(200),
            dec!(10),
            date!(2024 - 01 - 01),
        );

        assert_eq!(
            transaction_interest(&received, date!(2025 - 01 - 01)),
            Ok(None)
        );
    }

    #[test]
    fn totals_are_rounded_per_entry_then_summed() {
        let as_of = date!(2024 - 01 - 11);
        // Each entry earns 1.36986... which rounds to 1.37.
        let entries = [
            create_test_entry(
                LoanTransactionKind::Given,
                dec!(1000),
                dec!(5),
                date!(2024 - 01 - 01),
            ),
            create_test_entry(
                LoanTransactionKind::Given,
                dec!(1000),
                dec!(5),
                date!(2024 - 01 - 01),
            ),
            create_test_entry(
                LoanTransactionKind::Received,
                dec!(400),
                dec!(0),
                date!(2024 - 01 - 05),
            ),
        ];

        let summary = summarize_borrower(&entries, as_of).unwrap();

        assert_eq!(summary.total_interest, dec!(2.74));
        assert_eq!(summary.total_lent, dec!(2000));
        assert_eq!(summary.total_received, dec!(400));
        assert_eq!(summary.outstanding, dec!(1600));
    }

    #[test]
    fn empty_history_owes_nothing() {
        let summary = summarize_borrower(&[], date!(2024 - 01 - 11)).unwrap();

        assert_eq!(summary.outstanding, summary.total_lent - summary.total_received);
        assert_eq!(summary.outstanding, Decimal::ZERO);
        assert_eq!(summary.total_interest, Decimal::ZERO);
    }

    #[test]
    fn overpaid_borrower_has_negative_outstanding() {
        let entries = [
            create_test_entry(
                LoanTransactionKind::Given,
                dec!(100),
                dec!(0),
                date!(2024 - 01 - 01),
            ),
            create_test_entry(
                LoanTransactionKind::Received,
                dec!(150),
                dec!(0),
                date!(2024 - 02 - 01),
            ),
        ];

        let summary = summarize_borrower(&entries, date!(2024 - 03 - 01)).unwrap();

        assert_eq!(summary.outstanding, dec!(-50));
    }

    #[test]
    fn loan_summary_counts_borrowers_who_owe_money() {
        let summaries = [
            BorrowerSummary {
                total_lent: dec!(1000),
                total_received: dec!(250),
                outstanding: dec!(750),
                total_interest: dec!(12.50),
            },
            BorrowerSummary {
                total_lent: dec!(300),
                total_received: dec!(300),
                outstanding: dec!(0),
                total_interest: dec!(4.10),
            },
        ];

        let summary = summarize_all(&summaries).unwrap();

        assert_eq!(summary.total_lent, dec!(1300));
        assert_eq!(summary.total_outstanding, dec!(750));
        assert_eq!(summary.total_interest, dec!(16.60));
        assert_eq!(summary.active_borrowers, 1);
    }

    #[test]
    fn loan_summary_rejects_totals_too_large_to_represent() {
        let huge = BorrowerSummary {
            total_lent: Decimal::MAX,
            total_received: Decimal::ZERO,
            outstanding: Decimal::MAX,
            total_interest: Decimal::ZERO,
        };

        let summary = summarize_all(&[huge, huge]);

        assert_eq!(
            summary,
            Err(Error::InvalidInput(
                "total lent is too large to calculate".to_owned()
            ))
        );
    }

    #[test]
    fn borrower_summary_rejects_totals_too_large_to_represent() {
        let entries = [
            create_test_entry(
                LoanTransactionKind::Given,
                Decimal::MAX,
                dec!(0),
                date!(2024 - 01 - 01),
            ),
            create_test_entry(
                LoanTransactionKind::Given,
                dec!(1),
                dec!(0),
                date!(2024 - 01 - 02),
            ),
        ];

        let summary = summarize_borrower(&entries, date!(2024 - 03 - 01));

        assert!(matches!(summary, Err(Error::InvalidInput(_))));
    }
}
