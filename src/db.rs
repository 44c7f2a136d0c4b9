//! Sets up the application's SQLite database.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, borrower::create_borrower_tables, budget::create_budget_table,
    category::create_category_table, contact::create_contact_table, loan::create_loan_table,
    payment::create_payment_table, transaction::create_transaction_table,
};

/// Create the tables for all domain models if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection`, since deleting a
/// borrower or a loan relies on cascading deletes.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_contact_table(&transaction)?;
    create_loan_table(&transaction)?;
    create_payment_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_borrower_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Lock the shared database connection for the duration of a request.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if the lock has been poisoned.
pub fn acquire_connection(
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}
