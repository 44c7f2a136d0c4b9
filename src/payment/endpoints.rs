//! Route handlers for listing and recording loan payments.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::{CreatedId, LoanId},
    db::acquire_connection,
    payment::core::{Payment, PaymentForm, create_payment, get_payments_for_loan},
};

/// The state needed to get or record payments.
#[derive(Debug, Clone)]
pub struct PaymentState {
    /// The database connection for managing payments.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the payments made against a loan.
pub async fn get_loan_payments_endpoint(
    State(state): State<PaymentState>,
    Path(loan_id): Path<LoanId>,
) -> Result<Json<Vec<Payment>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_payments_for_loan(loan_id, &connection)
        .inspect_err(|error| tracing::error!("could not get payments for loan {loan_id}: {error}"))
        .map(Json)
}

/// A route handler for recording a payment, responds with the new payment's ID.
pub async fn create_payment_endpoint(
    State(state): State<PaymentState>,
    Json(form): Json<PaymentForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let payment = create_payment(&form, &connection)?;
    tracing::debug!("Recorded payment {} for loan {}", payment.id, payment.loan_id);

    Ok(Json(CreatedId { id: payment.id }))
}
