//! Defines the budget model and its database queries.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{
    Error,
    calendar::{DateRange, end_of_month, shift_month},
    database_id::{BudgetId, CategoryId},
    money::{get_decimal, require_positive, require_text},
};

// ============================================================================
// MODELS
// ============================================================================

/// How often a budget repeats.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Seven days.
    Weekly,
    /// A calendar month.
    #[default]
    Monthly,
    /// Three calendar months.
    Quarterly,
    /// Twelve calendar months.
    Yearly,
}

impl BudgetPeriod {
    fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

/// Whether a budget is being tracked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Counted towards budget progress.
    #[default]
    Active,
    /// Temporarily not tracked.
    Paused,
    /// Finished and no longer tracked.
    Completed,
}

impl BudgetStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }
}

/// A spending limit for a category over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category whose expenses count against the budget.
    pub category_id: CategoryId,
    /// The name of the category, used to match transactions.
    pub category_name: Option<String>,
    /// The display name of the budget.
    pub name: String,
    /// The spending limit.
    pub amount: Decimal,
    /// How often the budget repeats.
    pub period: BudgetPeriod,
    /// The first day of the budget.
    pub start_date: Date,
    /// The last day of the budget.
    pub end_date: Date,
    /// Whether the budget is being tracked.
    pub status: BudgetStatus,
    /// Free text notes.
    pub notes: Option<String>,
    /// When the budget was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the budget was last edited, if ever.
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    /// Expenses in the category between the start and end dates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spent: Option<Decimal>,
    /// `amount - spent`, negative when overspent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Decimal>,
}

impl Budget {
    /// The days covered by the budget.
    pub fn window(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// The data for creating or editing a budget.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BudgetForm {
    pub category_id: CategoryId,
    pub name: String,
    /// Must be greater than zero.
    pub amount: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
    pub start_date: Date,
    /// Derived from `period` when not given, see [derive_end_date].
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub status: BudgetStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The fields of a [BudgetForm] that are normalised by validation.
struct ValidBudget {
    name: String,
    end_date: Date,
}

impl BudgetForm {
    fn validate(&self) -> Result<ValidBudget, Error> {
        let name = require_text(&self.name, "budget name")?;
        require_positive(self.amount, "budget amount")?;

        let end_date = match self.end_date {
            Some(end_date) => end_date,
            None => derive_end_date(self.period, self.start_date)?,
        };

        if end_date <= self.start_date {
            return Err(Error::InvalidInput(format!(
                "the budget end date {end_date} must be after the start date {}",
                self.start_date
            )));
        }

        Ok(ValidBudget { name, end_date })
    }
}

/// The default last day of a budget starting on `start_date`.
///
/// - weekly: six days after the start,
/// - monthly: the last day of the start month,
/// - quarterly: the last day of the second month after the start month,
/// - yearly: the last day of the month before the start month, one year later.
///
/// # Errors
/// Returns an [Error::InvalidInput] if the end date would be outside the range of supported dates.
pub fn derive_end_date(period: BudgetPeriod, start_date: Date) -> Result<Date, Error> {
    let (year, month) = (start_date.year(), start_date.month());

    match period {
        BudgetPeriod::Weekly => start_date.checked_add(Duration::days(6)).ok_or_else(|| {
            Error::InvalidInput(format!("{start_date} is too late for a weekly budget"))
        }),
        BudgetPeriod::Monthly => end_of_month(year, month),
        BudgetPeriod::Quarterly => {
            let (year, month) = shift_month(year, month, 2);
            end_of_month(year, month)
        }
        BudgetPeriod::Yearly => {
            let (year, month) = shift_month(year, month, 11);
            end_of_month(year, month)
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_BUDGET: &str = "SELECT b.id, b.category_id, c.name, b.name, b.amount, b.period, b.start_date,
        b.end_date, b.status, b.notes, b.created_at, b.updated_at
    FROM budget b LEFT JOIN category c ON c.id = b.category_id";

/// Create a new budget in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the name is blank, the amount is not positive,
///   or the end date is not after the start date,
/// - [Error::InvalidCategory] if `category_id` does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(form: &BudgetForm, connection: &Connection) -> Result<Budget, Error> {
    let budget = form.validate()?;

    let id: BudgetId = connection
        .query_row(
            "INSERT INTO budget (category_id, name, amount, period, start_date, end_date, status, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id",
            (
                form.category_id,
                &budget.name,
                form.amount.to_string(),
                form.period,
                form.start_date,
                budget.end_date,
                form.status,
                &form.notes,
                OffsetDateTime::now_utc(),
            ),
            |row| row.get(0),
        )
        .map_err(|error| map_category_error(error, form.category_id))?;

    get_budget(id, connection)
}

/// Retrieve a budget by its `id`, including its category's name.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(id: BudgetId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(&format!("{SELECT_BUDGET} WHERE b.id = :id"))?
        .query_row(&[(":id", &id)], map_budget_row)
        .map_err(Error::from)
}

/// Retrieve all budgets, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_budgets(connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!("{SELECT_BUDGET} ORDER BY b.created_at DESC, b.id DESC"))?
        .query_map([], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Replace the details of the budget `id` and stamp its `updated_at` time.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] or [Error::InvalidCategory] as for [create_budget],
/// - [Error::UpdateMissingBudget] if `id` does not refer to a budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    form: &BudgetForm,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget = form.validate()?;

    let rows_affected = connection
        .execute(
            "UPDATE budget
             SET category_id = ?1, name = ?2, amount = ?3, period = ?4, start_date = ?5,
                 end_date = ?6, status = ?7, notes = ?8, updated_at = ?9
             WHERE id = ?10",
            (
                form.category_id,
                &budget.name,
                form.amount.to_string(),
                form.period,
                form.start_date,
                budget.end_date,
                form.status,
                &form.notes,
                OffsetDateTime::now_utc(),
                id,
            ),
        )
        .map_err(|error| map_category_error(error, form.category_id))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    get_budget(id, connection)
}

/// Delete the budget `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a budget,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(id: BudgetId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM budget WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount TEXT NOT NULL,
            period TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'quarterly', 'yearly')),
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'paused', 'completed')),
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_category_error(error: rusqlite::Error, category_id: CategoryId) -> Error {
    match error {
        // Code 787 occurs when a FOREIGN KEY constraint failed.
        rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
            Error::InvalidCategory(category_id)
        }
        error => error.into(),
    }
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        category_name: row.get(2)?,
        name: row.get(3)?,
        amount: get_decimal(row, 4)?,
        period: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        status: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        spent: None,
        remaining: None,
    })
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(FromSqlError::Other(
                format!("unknown budget period \"{other}\"").into(),
            )),
        }
    }
}

impl ToSql for BudgetStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for BudgetStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            other => Err(FromSqlError::Other(
                format!("unknown budget status \"{other}\"").into(),
            )),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod derive_end_date_tests {
    use time::macros::date;

    use crate::budget::core::{BudgetPeriod, derive_end_date};

    #[test]
    fn weekly_ends_six_days_later() {
        assert_eq!(
            derive_end_date(BudgetPeriod::Weekly, date!(2024 - 12 - 28)),
            Ok(date!(2025 - 01 - 03))
        );
    }

    #[test]
    fn monthly_ends_on_last_day_of_start_month() {
        assert_eq!(
            derive_end_date(BudgetPeriod::Monthly, date!(2024 - 02 - 10)),
            Ok(date!(2024 - 02 - 29))
        );
    }

    #[test]
    fn quarterly_ends_two_months_after_start_month() {
        assert_eq!(
            derive_end_date(BudgetPeriod::Quarterly, date!(2024 - 01 - 15)),
            Ok(date!(2024 - 03 - 31))
        );
        assert_eq!(
            derive_end_date(BudgetPeriod::Quarterly, date!(2024 - 11 - 01)),
            Ok(date!(2025 - 01 - 31))
        );
    }

    #[test]
    fn yearly_ends_on_month_before_start_month_next_year() {
        assert_eq!(
            derive_end_date(BudgetPeriod::Yearly, date!(2024 - 03 - 15)),
            Ok(date!(2025 - 02 - 28))
        );
        assert_eq!(
            derive_end_date(BudgetPeriod::Yearly, date!(2024 - 01 - 01)),
            Ok(date!(2024 - 12 - 31))
        );
    }
}
