//! Route handlers for listing loans, creating loans and computing balances.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    AppState, Error,
    database_id::{CreatedId, LoanId},
    db::acquire_connection,
    loan::{
        core::{Loan, LoanForm, create_loan, get_all_loans, get_loan},
        interest::{LoanBalance, compute_balance},
    },
    payment::get_payments_for_loan,
    timezone::get_local_date,
};

/// The state needed to manage loans.
#[derive(Debug, Clone)]
pub struct LoanState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing loans.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoanState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all loans, newest first.
pub async fn get_loans_endpoint(State(state): State<LoanState>) -> Result<Json<Vec<Loan>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_all_loans(&connection)
        .inspect_err(|error| tracing::error!("could not get loans: {error}"))
        .map(Json)
}

/// A route handler for creating a loan, responds with the new loan's ID.
pub async fn create_loan_endpoint(
    State(state): State<LoanState>,
    Json(form): Json<LoanForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let loan = create_loan(&form, &connection)?;
    tracing::debug!("Created loan {} for contact {}", loan.id, loan.contact_id);

    Ok(Json(CreatedId { id: loan.id }))
}

/// A route handler for the balance of a loan as of today in the local timezone.
pub async fn get_loan_balance_endpoint(
    State(state): State<LoanState>,
    Path(loan_id): Path<LoanId>,
) -> Result<Json<LoanBalance>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let (loan, payments) = {
        let connection = acquire_connection(&state.db_connection)?;

        (
            get_loan(loan_id, &connection)?,
            get_payments_for_loan(loan_id, &connection)?,
        )
    };
    let payments: Vec<Decimal> = payments.into_iter().map(|payment| payment.amount).collect();

    compute_balance(&loan.terms(), &payments, today).map(Json)
}
