//! Transaction data aggregation for the dashboard and budget views.
//!
//! Every function here is pure: it takes the already-fetched records and the
//! current local date, so the results only depend on the arguments.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error,
    budget::{Budget, BudgetStatus},
    calendar::{DateRange, month_bounds, shift_month},
    money::{checked_difference, checked_sum, round_cents, too_large},
    transaction::{Transaction, TransactionKind},
};

/// Spending above this percentage of a budget is a warning.
const WARNING_PERCENTAGE: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Income and expenses within a single calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// Total income.
    pub income: Decimal,
    /// Total expenses.
    pub expenses: Decimal,
}

/// The numbers shown on the dashboard overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// All income minus all expenses.
    pub total_balance: Decimal,
    /// Income in the current month.
    pub monthly_income: Decimal,
    /// Expenses in the current month.
    pub monthly_expenses: Decimal,
    /// The share of this month's income that was not spent, as a percentage.
    pub savings_rate: Decimal,
    /// All income ever recorded.
    pub total_income: Decimal,
    /// All expenses ever recorded.
    pub total_expenses: Decimal,
}

/// Income, expenses and net income for one month of a spending trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// The month as `YYYY-MM`.
    pub month: String,
    /// Total income.
    pub income: Decimal,
    /// Total expenses.
    pub expenses: Decimal,
    /// `income - expenses`.
    pub net: Decimal,
}

/// The total spent in a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    /// The category name.
    pub category: String,
    /// The sum of expenses in the category.
    pub total: Decimal,
}

/// How close spending is to a budget's limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// At most 80% spent.
    Good,
    /// More than 80% and at most 100% spent.
    Warning,
    /// More than 100% spent.
    Over,
}

impl ProgressStatus {
    fn from_percentage(percentage: Decimal) -> Self {
        if percentage > Decimal::ONE_HUNDRED {
            Self::Over
        } else if percentage > WARNING_PERCENTAGE {
            Self::Warning
        } else {
            Self::Good
        }
    }
}

/// Spending against one budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    /// The name of the budget's category.
    pub category: String,
    /// Expenses in the category within the budget's dates.
    pub spent: Decimal,
    /// The budget's spending limit.
    pub budget: Decimal,
    /// `spent / budget * 100`, rounded to two decimal places.
    pub percentage: Decimal,
    /// Derived from the rounded percentage.
    pub status: ProgressStatus,
}

/// Sums income and expenses separately.
fn summarize<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<MonthlySummary, Error> {
    let mut summary = MonthlySummary {
        income: Decimal::ZERO,
        expenses: Decimal::ZERO,
    };

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => {
                summary.income = summary
                    .income
                    .checked_add(transaction.amount)
                    .ok_or_else(|| too_large("total income"))?;
            }
            TransactionKind::Expense => {
                summary.expenses = summary
                    .expenses
                    .checked_add(transaction.amount)
                    .ok_or_else(|| too_large("total expenses"))?;
            }
        }
    }

    Ok(summary)
}

/// `part / whole * 100`, rounded to two decimal places.
fn percentage_of(part: Decimal, whole: Decimal, what: &str) -> Result<Decimal, Error> {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(round_cents)
        .ok_or_else(|| too_large(what))
}

/// Income and expenses for `month` of `year`.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `year` is outside the range of supported
/// dates or a total is too large to represent.
pub fn monthly_summary(
    transactions: &[Transaction],
    year: i32,
    month: Month,
) -> Result<MonthlySummary, Error> {
    let range = month_bounds(year, month)?;

    summarize(
        transactions
            .iter()
            .filter(|transaction| range.contains(transaction.transaction_date)),
    )
}

/// Totals across all transactions plus this month's income, expenses and savings rate.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `today` is outside the range of supported
/// dates or a total is too large to represent.
pub fn dashboard_summary(
    transactions: &[Transaction],
    today: Date,
) -> Result<DashboardSummary, Error> {
    let all_time = summarize(transactions)?;
    let this_month = monthly_summary(transactions, today.year(), today.month())?;

    let savings_rate = if this_month.income > Decimal::ZERO {
        let saved = checked_difference(this_month.income, this_month.expenses, "monthly savings")?;
        percentage_of(saved, this_month.income, "savings rate")?
    } else {
        round_cents(Decimal::ZERO)
    };

    Ok(DashboardSummary {
        total_balance: checked_difference(all_time.income, all_time.expenses, "total balance")?,
        monthly_income: this_month.income,
        monthly_expenses: this_month.expenses,
        savings_rate,
        total_income: all_time.income,
        total_expenses: all_time.expenses,
    })
}

/// Income, expenses and net income for each of the `months_back` months
/// ending with the current month, oldest first.
///
/// Months without transactions are included with zero totals.
///
/// # Errors
/// Returns an [Error::InvalidInput] if a month is outside the range of supported
/// dates or a total is too large to represent.
pub fn spending_trend(
    transactions: &[Transaction],
    months_back: u32,
    today: Date,
) -> Result<Vec<TrendPoint>, Error> {
    let months_back = i32::try_from(months_back)
        .map_err(|_| Error::InvalidInput(format!("cannot look back {months_back} months")))?;

    (0..months_back)
        .rev()
        .map(|offset| {
            let (year, month) = shift_month(today.year(), today.month(), -offset);
            let summary = monthly_summary(transactions, year, month)?;

            Ok(TrendPoint {
                month: format!("{year:04}-{:02}", u8::from(month)),
                income: summary.income,
                expenses: summary.expenses,
                net: checked_difference(summary.income, summary.expenses, "net income")?,
            })
        })
        .collect()
}

/// Expenses in `month` of `year` grouped by category, largest total first.
///
/// Categories with equal totals are ordered by name.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `year` is outside the range of supported
/// dates or a category total is too large to represent.
pub fn category_spending(
    transactions: &[Transaction],
    year: i32,
    month: Month,
) -> Result<Vec<CategorySpending>, Error> {
    let range = month_bounds(year, month)?;
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();

    for transaction in transactions.iter().filter(|transaction| {
        transaction.kind == TransactionKind::Expense && range.contains(transaction.transaction_date)
    }) {
        let total = totals
            .entry(transaction.category.as_str())
            .or_insert(Decimal::ZERO);
        *total = total
            .checked_add(transaction.amount)
            .ok_or_else(|| too_large("category spending"))?;
    }

    let mut spending: Vec<CategorySpending> = totals
        .into_iter()
        .map(|(category, total)| CategorySpending {
            category: category.to_owned(),
            total,
        })
        .collect();
    // Stable sort keeps the alphabetical order from the map for equal totals.
    spending.sort_by(|a, b| b.total.cmp(&a.total));

    Ok(spending)
}

/// The sum of expenses in `category` dated inside `window`.
///
/// # Errors
/// Returns an [Error::InvalidInput] if the sum is too large to represent.
pub fn spent_in_window(
    transactions: &[Transaction],
    category: &str,
    window: DateRange,
) -> Result<Decimal, Error> {
    checked_sum(
        transactions
            .iter()
            .filter(|transaction| {
                transaction.kind == TransactionKind::Expense
                    && transaction.category == category
                    && window.contains(transaction.transaction_date)
            })
            .map(|transaction| transaction.amount),
        "budget spending",
    )
}

/// Spending against every active budget whose dates overlap the current month.
///
/// # Errors
/// Returns an [Error::InvalidInput] if one of those budgets has an amount of
/// zero or less, if its percentage is too large to represent, or if `today` is
/// outside the range of supported dates.
pub fn budget_progress(
    budgets: &[Budget],
    transactions: &[Transaction],
    today: Date,
) -> Result<Vec<BudgetProgress>, Error> {
    let this_month = month_bounds(today.year(), today.month())?;

    budgets
        .iter()
        .filter(|budget| {
            budget.status == BudgetStatus::Active && budget.window().overlaps(&this_month)
        })
        .map(|budget| {
            if budget.amount <= Decimal::ZERO {
                return Err(Error::InvalidInput(format!(
                    "budget \"{}\" must have an amount greater than zero, got {}",
                    budget.name, budget.amount
                )));
            }

            let category = budget.category_name.as_deref().unwrap_or_default();
            let spent = spent_in_window(transactions, category, budget.window())?;
            let percentage = percentage_of(spent, budget.amount, "budget percentage")?;

            Ok(BudgetProgress {
                category: category.to_owned(),
                spent,
                budget: budget.amount,
                percentage,
                status: ProgressStatus::from_percentage(percentage),
            })
        })
        .collect()
}
