//! Route handlers for the transaction API.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::{CreatedId, Deleted, TransactionId},
    db::acquire_connection,
    transaction::core::{
        Transaction, TransactionForm, create_transaction, delete_transaction,
        get_all_transactions, update_transaction,
    },
};

/// The state needed to get, create, edit or delete transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all transactions, most recent first.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))
        .map(Json)
}

/// A route handler for creating a transaction, responds with the new transaction's ID.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let transaction = create_transaction(form, &connection)?;
    tracing::debug!("Created transaction {}", transaction.id);

    Ok(Json(CreatedId { id: transaction.id }))
}

/// A route handler for editing a transaction, responds with the updated transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    update_transaction(transaction_id, form, &connection).map(Json)
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Deleted>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    delete_transaction(transaction_id, &connection)?;
    tracing::debug!("Deleted transaction {transaction_id}");

    Ok(Json(Deleted { success: true }))
}
