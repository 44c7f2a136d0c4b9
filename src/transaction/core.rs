//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::TransactionId,
    money::{get_decimal, require_positive, require_text},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The name stored in the database and used in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money, always positive. [Transaction::kind] gives the direction.
    pub amount: Decimal,
    /// The name of the category, e.g. "Groceries".
    pub category: String,
    /// What the transaction was for.
    pub description: Option<String>,
    /// How the money was paid or received, e.g. "card".
    pub payment_method: Option<String>,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last edited, if ever.
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

#[cfg(test)]
impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionForm] for discoverability.
    pub fn build(
        kind: TransactionKind,
        amount: Decimal,
        category: &str,
        transaction_date: Date,
    ) -> TransactionForm {
        TransactionForm {
            kind,
            amount,
            category: category.to_owned(),
            description: None,
            payment_method: None,
            transaction_date,
        }
    }
}

/// The data for creating or editing a [Transaction].
///
/// Deserialized from request bodies.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionForm {
    /// Whether money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money, must be greater than zero.
    pub amount: Decimal,
    /// The name of the category, must not be blank.
    pub category: String,
    /// What the transaction was for.
    #[serde(default)]
    pub description: Option<String>,
    /// How the money was paid or received.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// When the transaction happened.
    pub transaction_date: Date,
}

#[cfg(test)]
impl TransactionForm {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Set the payment method for the transaction.
    pub fn payment_method(mut self, payment_method: &str) -> Self {
        self.payment_method = Some(payment_method.to_owned());
        self
    }
}

impl TransactionForm {
    /// Check the amount and category, returning the trimmed category name.
    fn validate(&self) -> Result<String, Error> {
        require_positive(self.amount, "transaction amount")?;
        require_text(&self.category, "category")
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION_COLUMNS: &str = "id, type, amount, category, description, payment_method, transaction_date, created_at, updated_at";

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the amount is not positive or the category is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    form: TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = form.validate()?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (type, amount, category, description, payment_method, transaction_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {SELECT_TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                form.kind,
                form.amount.to_string(),
                category,
                form.description,
                form.payment_method,
                form.transaction_date,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve all transactions, the most recent transaction date first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_TRANSACTION_COLUMNS} FROM \"transaction\"
             ORDER BY transaction_date DESC, id DESC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Replace the details of the transaction `id` and stamp its `updated_at` time.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the amount is not positive or the category is blank,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    form: TransactionForm,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = form.validate()?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET type = ?1, amount = ?2, category = ?3, description = ?4,
                 payment_method = ?5, transaction_date = ?6, updated_at = ?7
             WHERE id = ?8
             RETURNING {SELECT_TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                form.kind,
                form.amount.to_string(),
                category,
                form.description,
                form.payment_method,
                form.transaction_date,
                OffsetDateTime::now_utc(),
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT,
                payment_method TEXT,
                transaction_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT
                )",
        (),
    )?;

    // Used by the dashboard and budget queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_category ON \"transaction\"(transaction_date, category);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of `SELECT_TRANSACTION_COLUMNS`.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: row.get(1)?,
        amount: get_decimal(row, 2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        payment_method: row.get(5)?,
        transaction_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type \"{other}\"").into(),
            )),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        test_utils::get_test_connection,
        transaction::core::{
            Transaction, TransactionKind, create_transaction, delete_transaction,
            get_all_transactions, update_transaction,
        },
    };

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                dec!(12.30),
                " Groceries ",
                date!(2025 - 10 - 05),
            )
            .description("Weekly shop")
            .payment_method("card"),
            &conn,
        )
        .expect("Could not create transaction");

        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.amount, dec!(12.30));
        assert_eq!(transaction.category, "Groceries");
        assert_eq!(transaction.description.as_deref(), Some("Weekly shop"));
        assert_eq!(transaction.payment_method.as_deref(), Some("card"));
        assert_eq!(transaction.updated_at, None);
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();

        for amount in [dec!(0), dec!(-4.50)] {
            let result = create_transaction(
                Transaction::build(TransactionKind::Income, amount, "Salary", date!(2025 - 10 - 05)),
                &conn,
            );

            assert!(matches!(result, Err(Error::InvalidInput(_))), "{amount}");
        }
    }

    #[test]
    fn create_fails_on_blank_category() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(TransactionKind::Income, dec!(10), "  ", date!(2025 - 10 - 05)),
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::InvalidInput("category is required".to_owned()))
        );
    }

    #[test]
    fn transactions_are_listed_most_recent_first() {
        let conn = get_test_connection();
        for transaction_date in [
            date!(2025 - 01 - 15),
            date!(2025 - 03 - 01),
            date!(2025 - 02 - 10),
        ] {
            create_transaction(
                Transaction::build(TransactionKind::Expense, dec!(1), "Fuel", transaction_date),
                &conn,
            )
            .unwrap();
        }

        let dates: Vec<_> = get_all_transactions(&conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.transaction_date)
            .collect();

        assert_eq!(
            dates,
            [
                date!(2025 - 03 - 01),
                date!(2025 - 02 - 10),
                date!(2025 - 01 - 15)
            ]
        );
    }

    #[test]
    fn update_replaces_fields_and_stamps_time() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(TransactionKind::Expense, dec!(20), "Fuel", date!(2025 - 01 - 15)),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            created.id,
            Transaction::build(TransactionKind::Income, dec!(99.99), "Refund", date!(2025 - 01 - 16)),
            &conn,
        )
        .expect("Could not update transaction");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.kind, TransactionKind::Income);
        assert_eq!(updated.amount, dec!(99.99));
        assert_eq!(updated.category, "Refund");
        assert_eq!(updated.transaction_date, date!(2025 - 01 - 16));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn update_missing_transaction_fails() {
        let conn = get_test_connection();

        let result = update_transaction(
            42,
            Transaction::build(TransactionKind::Income, dec!(1), "Salary", date!(2025 - 01 - 16)),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let created = create_transaction(
            Transaction::build(TransactionKind::Expense, dec!(20), "Fuel", date!(2025 - 01 - 15)),
            &conn,
        )
        .unwrap();

        delete_transaction(created.id, &conn).expect("Could not delete transaction");

        assert_eq!(get_all_transactions(&conn), Ok(Vec::new()));
        assert_eq!(
            delete_transaction(created.id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }
}
