//! Defines the borrower and loan transaction models and their database queries.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    borrower::ledger::LoanTransactionKind,
    database_id::{BorrowerId, DatabaseId},
    money::{get_decimal, require_non_negative, require_positive, require_text},
};

// ============================================================================
// MODELS
// ============================================================================

/// Someone the user lends money to informally, without a formal [crate::loan] agreement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Borrower {
    /// The ID of the borrower.
    pub id: BorrowerId,
    /// The borrower's name.
    pub name: String,
    /// How to reach the borrower, e.g. a phone number.
    pub contact: Option<String>,
    /// Free text notes.
    pub notes: Option<String>,
    /// When the borrower was added.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the borrower was last edited, if ever.
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// The data for creating or editing a borrower.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BorrowerForm {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Money given to or received from a borrower.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanTransaction {
    /// The ID of the loan transaction.
    pub id: DatabaseId,
    /// The borrower the money moved between.
    pub borrower_id: BorrowerId,
    /// The borrower's name, filled in when listed.
    pub borrower_name: Option<String>,
    /// Whether the money was given or received.
    #[serde(rename = "type")]
    pub kind: LoanTransactionKind,
    /// The amount of money.
    pub amount: Decimal,
    /// The annual interest rate as a percentage, only used for money given.
    pub interest_rate: Decimal,
    /// The day the money moved.
    pub transaction_date: Date,
    /// When money given should be paid back by.
    pub due_date: Option<Date>,
    /// What the money was for.
    pub description: Option<String>,
    /// Interest earned so far on money given, filled in when listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_earned: Option<Decimal>,
    /// When the loan transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the loan transaction was last edited, if ever.
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

/// The data for recording a loan transaction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoanTransactionForm {
    pub borrower_id: BorrowerId,
    #[serde(rename = "type")]
    pub kind: LoanTransactionKind,
    /// Must be greater than zero.
    pub amount: Decimal,
    /// Defaults to zero, must not be negative.
    #[serde(default)]
    pub interest_rate: Decimal,
    #[serde(alias = "transaction_date")]
    pub date: Date,
    #[serde(default)]
    pub due_date: Option<Date>,
    /// Defaults to "Money Given" or "Money Received" when blank.
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// BORROWER DATABASE FUNCTIONS
// ============================================================================

/// Create a new borrower in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the name is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_borrower(form: &BorrowerForm, connection: &Connection) -> Result<Borrower, Error> {
    let name = require_text(&form.name, "borrower name")?;

    let borrower = connection
        .prepare(
            "INSERT INTO borrower (name, contact, notes, created_at) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, contact, notes, created_at, updated_at",
        )?
        .query_row(
            (name, &form.contact, &form.notes, OffsetDateTime::now_utc()),
            map_borrower_row,
        )?;

    Ok(borrower)
}

/// Retrieve a borrower by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid borrower,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_borrower(id: BorrowerId, connection: &Connection) -> Result<Borrower, Error> {
    connection
        .prepare(
            "SELECT id, name, contact, notes, created_at, updated_at FROM borrower WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_borrower_row)
        .map_err(Error::from)
}

/// Retrieve all borrowers ordered by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_borrowers(connection: &Connection) -> Result<Vec<Borrower>, Error> {
    connection
        .prepare(
            "SELECT id, name, contact, notes, created_at, updated_at FROM borrower ORDER BY name ASC, id ASC",
        )?
        .query_map([], map_borrower_row)?
        .map(|maybe_borrower| maybe_borrower.map_err(Error::from))
        .collect()
}

/// Replace the details of the borrower `id` and stamp its `updated_at` time.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the name is blank,
/// - [Error::UpdateMissingBorrower] if `id` does not refer to a borrower,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_borrower(
    id: BorrowerId,
    form: &BorrowerForm,
    connection: &Connection,
) -> Result<Borrower, Error> {
    let name = require_text(&form.name, "borrower name")?;

    connection
        .prepare(
            "UPDATE borrower SET name = ?1, contact = ?2, notes = ?3, updated_at = ?4 WHERE id = ?5
             RETURNING id, name, contact, notes, created_at, updated_at",
        )?
        .query_row(
            (name, &form.contact, &form.notes, OffsetDateTime::now_utc(), id),
            map_borrower_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingBorrower,
            error => error.into(),
        })
}

/// Delete the borrower `id` along with their loan transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBorrower] if `id` does not refer to a borrower,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_borrower(id: BorrowerId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM borrower WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBorrower);
    }

    Ok(())
}

// ============================================================================
// LOAN TRANSACTION DATABASE FUNCTIONS
// ============================================================================

const SELECT_LOAN_TRANSACTION: &str = "SELECT t.id, t.borrower_id, b.name, t.type, t.amount, t.interest_rate,
        t.transaction_date, t.due_date, t.description, t.created_at, t.updated_at
    FROM loan_transaction t INNER JOIN borrower b ON b.id = t.borrower_id";

/// Record money given to or received from a borrower.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the amount is not positive or the rate is negative,
/// - [Error::InvalidBorrower] if `borrower_id` does not refer to a real borrower,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_loan_transaction(
    form: &LoanTransactionForm,
    connection: &Connection,
) -> Result<LoanTransaction, Error> {
    require_positive(form.amount, "loan transaction amount")?;
    require_non_negative(form.interest_rate, "interest rate")?;

    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .unwrap_or(form.kind.default_description());

    let id: DatabaseId = connection
        .query_row(
            "INSERT INTO loan_transaction (borrower_id, type, amount, interest_rate, transaction_date, due_date, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id",
            (
                form.borrower_id,
                form.kind,
                form.amount.to_string(),
                form.interest_rate.to_string(),
                form.date,
                form.due_date,
                description,
                OffsetDateTime::now_utc(),
            ),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidBorrower(form.borrower_id)
            }
            error => error.into(),
        })?;

    connection
        .prepare(&format!("{SELECT_LOAN_TRANSACTION} WHERE t.id = :id"))?
        .query_row(&[(":id", &id)], map_loan_transaction_row)
        .map_err(Error::from)
}

/// Retrieve every loan transaction, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_loan_transactions(connection: &Connection) -> Result<Vec<LoanTransaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_LOAN_TRANSACTION} ORDER BY t.transaction_date DESC, t.id DESC"
        ))?
        .query_map([], map_loan_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve a borrower's loan transactions, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_loan_transactions(
    borrower_id: BorrowerId,
    connection: &Connection,
) -> Result<Vec<LoanTransaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_LOAN_TRANSACTION} WHERE t.borrower_id = :borrower_id
             ORDER BY t.transaction_date DESC, t.id DESC"
        ))?
        .query_map(&[(":borrower_id", &borrower_id)], map_loan_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete the loan transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingLoanTransaction] if `id` does not refer to a loan transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_loan_transaction(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM loan_transaction WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingLoanTransaction);
    }

    Ok(())
}

/// Create the borrower and loan transaction tables in the database.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_borrower_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS borrower (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            contact TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS loan_transaction (
            id INTEGER PRIMARY KEY,
            borrower_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('given', 'received')),
            amount TEXT NOT NULL,
            interest_rate TEXT NOT NULL DEFAULT '0',
            transaction_date TEXT NOT NULL,
            due_date TEXT,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT,
            FOREIGN KEY(borrower_id) REFERENCES borrower(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_loan_transaction_borrower_id ON loan_transaction(borrower_id)",
        (),
    )?;

    Ok(())
}

fn map_borrower_row(row: &Row) -> Result<Borrower, rusqlite::Error> {
    Ok(Borrower {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get(2)?,
        notes: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_loan_transaction_row(row: &Row) -> Result<LoanTransaction, rusqlite::Error> {
    Ok(LoanTransaction {
        id: row.get(0)?,
        borrower_id: row.get(1)?,
        borrower_name: row.get(2)?,
        kind: row.get(3)?,
        amount: get_decimal(row, 4)?,
        interest_rate: get_decimal(row, 5)?,
        transaction_date: row.get(6)?,
        due_date: row.get(7)?,
        description: row.get(8)?,
        interest_earned: None,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl ToSql for LoanTransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for LoanTransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "given" => Ok(Self::Given),
            "received" => Ok(Self::Received),
            other => Err(FromSqlError::Other(
                format!("unknown loan transaction type \"{other}\"").into(),
            )),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
