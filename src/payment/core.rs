//! Defines the payment model and its database queries.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{DatabaseId, LoanId},
    money::{get_decimal, require_positive},
};

/// A repayment towards a loan.
///
/// Payments reduce the balance owed and do not earn interest themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    /// The ID of the payment.
    pub id: DatabaseId,
    /// The loan the payment was made against.
    pub loan_id: LoanId,
    /// The amount repaid.
    pub amount: Decimal,
    /// The day the payment was made.
    pub payment_date: Date,
    /// How the payment was made, e.g. "cash" or "bank transfer".
    pub payment_method: Option<String>,
    /// Free text notes.
    pub notes: Option<String>,
    /// When the payment was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data for recording a payment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentForm {
    /// The loan the payment was made against.
    pub loan_id: LoanId,
    /// The amount repaid, must be greater than zero.
    pub amount: Decimal,
    /// The day the payment was made.
    pub payment_date: Date,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Record a payment against a loan.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the amount is not positive,
/// - [Error::InvalidLoan] if `loan_id` does not refer to a real loan,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_payment(form: &PaymentForm, connection: &Connection) -> Result<Payment, Error> {
    require_positive(form.amount, "payment amount")?;

    connection
        .prepare(
            "INSERT INTO payment (loan_id, amount, payment_date, payment_method, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, loan_id, amount, payment_date, payment_method, notes, created_at",
        )?
        .query_row(
            (
                form.loan_id,
                form.amount.to_string(),
                form.payment_date,
                &form.payment_method,
                &form.notes,
                OffsetDateTime::now_utc(),
            ),
            map_payment_row,
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidLoan(form.loan_id)
            }
            error => error.into(),
        })
}

/// Get the payments made against a loan, most recent payment date first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_payments_for_loan(
    loan_id: LoanId,
    connection: &Connection,
) -> Result<Vec<Payment>, Error> {
    connection
        .prepare(
            "SELECT id, loan_id, amount, payment_date, payment_method, notes, created_at
             FROM payment WHERE loan_id = :loan_id
             ORDER BY payment_date DESC, id DESC",
        )?
        .query_map(&[(":loan_id", &loan_id)], map_payment_row)?
        .map(|maybe_payment| maybe_payment.map_err(Error::from))
        .collect()
}

/// Create the payment table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS payment (
            id INTEGER PRIMARY KEY,
            loan_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            payment_date TEXT NOT NULL,
            payment_method TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(loan_id) REFERENCES loan(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // Balances look up every payment for a loan.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_payment_loan_id ON payment(loan_id)",
        (),
    )?;

    Ok(())
}

fn map_payment_row(row: &Row) -> Result<Payment, rusqlite::Error> {
    Ok(Payment {
        id: row.get(0)?,
        loan_id: row.get(1)?,
        amount: get_decimal(row, 2)?,
        payment_date: row.get(3)?,
        payment_method: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
    })
}
