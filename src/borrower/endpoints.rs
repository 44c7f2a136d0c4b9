//! Route handlers for borrowers, their loan transactions and the loan summary.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    AppState, Error,
    borrower::{
        core::{
            Borrower, BorrowerForm, LoanTransaction, LoanTransactionForm, create_borrower,
            create_loan_transaction, delete_borrower, delete_loan_transaction,
            get_all_borrowers, get_all_loan_transactions, get_borrower, get_loan_transactions,
            update_borrower,
        },
        ledger::{
            BorrowerSummary, LoanSummary, summarize_all, summarize_borrower, transaction_interest,
        },
    },
    database_id::{BorrowerId, CreatedId, DatabaseId, Deleted},
    db::acquire_connection,
    timezone::get_local_date,
};

/// The state needed to manage borrowers.
#[derive(Debug, Clone)]
pub struct BorrowerState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing borrowers.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BorrowerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A borrower along with their totals and loan transactions.
#[derive(Debug, Serialize)]
pub struct BorrowerOverview {
    #[serde(flatten)]
    borrower: Borrower,
    #[serde(flatten)]
    summary: BorrowerSummary,
    transactions: Vec<LoanTransaction>,
}

/// Fill in the interest each loan transaction has earned as of `today`.
fn with_interest(
    transactions: Vec<LoanTransaction>,
    today: Date,
) -> Result<Vec<LoanTransaction>, Error> {
    transactions
        .into_iter()
        .map(|transaction| -> Result<LoanTransaction, Error> {
            Ok(LoanTransaction {
                interest_earned: transaction_interest(&transaction, today)?,
                ..transaction
            })
        })
        .collect()
}

/// Group every loan transaction by its borrower, keeping the most recent first.
fn group_by_borrower(
    connection: &Connection,
) -> Result<HashMap<BorrowerId, Vec<LoanTransaction>>, Error> {
    let mut groups: HashMap<BorrowerId, Vec<LoanTransaction>> = HashMap::new();

    for transaction in get_all_loan_transactions(connection)? {
        groups
            .entry(transaction.borrower_id)
            .or_default()
            .push(transaction);
    }

    Ok(groups)
}

/// A route handler for listing borrowers by name with their totals and loan transactions.
pub async fn get_borrowers_endpoint(
    State(state): State<BorrowerState>,
) -> Result<Json<Vec<BorrowerOverview>>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let (borrowers, mut groups) = {
        let connection = acquire_connection(&state.db_connection)?;

        let borrowers = get_all_borrowers(&connection)
            .inspect_err(|error| tracing::error!("could not get borrowers: {error}"))?;
        let groups = group_by_borrower(&connection)
            .inspect_err(|error| tracing::error!("could not get loan transactions: {error}"))?;

        (borrowers, groups)
    };

    borrowers
        .into_iter()
        .map(|borrower| -> Result<BorrowerOverview, Error> {
            let transactions = groups.remove(&borrower.id).unwrap_or_default();
            let summary = summarize_borrower(&transactions, today)?;

            Ok(BorrowerOverview {
                borrower,
                summary,
                transactions: with_interest(transactions, today)?,
            })
        })
        .collect::<Result<_, Error>>()
        .map(Json)
}

/// A route handler for creating a borrower, responds with the new borrower's ID.
pub async fn create_borrower_endpoint(
    State(state): State<BorrowerState>,
    Json(form): Json<BorrowerForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let borrower = create_borrower(&form, &connection)?;
    tracing::debug!("Created borrower {}", borrower.id);

    Ok(Json(CreatedId { id: borrower.id }))
}

/// A route handler for editing a borrower, responds with the updated borrower.
pub async fn update_borrower_endpoint(
    State(state): State<BorrowerState>,
    Path(borrower_id): Path<BorrowerId>,
    Json(form): Json<BorrowerForm>,
) -> Result<Json<Borrower>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    update_borrower(borrower_id, &form, &connection).map(Json)
}

/// A route handler for deleting a borrower and their loan transactions.
pub async fn delete_borrower_endpoint(
    State(state): State<BorrowerState>,
    Path(borrower_id): Path<BorrowerId>,
) -> Result<Json<Deleted>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    delete_borrower(borrower_id, &connection)?;
    tracing::debug!("Deleted borrower {borrower_id}");

    Ok(Json(Deleted { success: true }))
}

/// A route handler for a borrower's loan transactions, most recent first.
pub async fn get_borrower_transactions_endpoint(
    State(state): State<BorrowerState>,
    Path(borrower_id): Path<BorrowerId>,
) -> Result<Json<Vec<LoanTransaction>>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let transactions = {
        let connection = acquire_connection(&state.db_connection)?;

        get_borrower(borrower_id, &connection)?;
        get_loan_transactions(borrower_id, &connection)?
    };

    with_interest(transactions, today).map(Json)
}

/// A route handler for recording a loan transaction, responds with its ID.
pub async fn create_loan_transaction_endpoint(
    State(state): State<BorrowerState>,
    Json(form): Json<LoanTransactionForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let transaction = create_loan_transaction(&form, &connection)?;
    tracing::debug!(
        "Created loan transaction {} for borrower {}",
        transaction.id,
        transaction.borrower_id
    );

    Ok(Json(CreatedId { id: transaction.id }))
}

/// A route handler for deleting a loan transaction.
pub async fn delete_loan_transaction_endpoint(
    State(state): State<BorrowerState>,
    Path(loan_transaction_id): Path<DatabaseId>,
) -> Result<Json<Deleted>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    delete_loan_transaction(loan_transaction_id, &connection)?;
    tracing::debug!("Deleted loan transaction {loan_transaction_id}");

    Ok(Json(Deleted { success: true }))
}

/// A route handler for the totals across every borrower.
pub async fn get_loan_summary_endpoint(
    State(state): State<BorrowerState>,
) -> Result<Json<LoanSummary>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let groups = {
        let connection = acquire_connection(&state.db_connection)?;
        group_by_borrower(&connection)?
    };

    let summaries = groups
        .values()
        .map(|transactions| summarize_borrower(transactions, today))
        .collect::<Result<Vec<_>, Error>>()?;

    summarize_all(&summaries).map(Json)
}
