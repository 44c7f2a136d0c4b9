//! Pocket Ledger is a web service for tracking personal finances and informal
//! loans between friends and family.
//!
//! This library provides a JSON REST API over a SQLite database: CRUD for
//! contacts, loans, payments, transactions, categories, budgets and
//! borrowers, plus derived views such as loan balances, borrower summaries,
//! monthly summaries, spending trends and budget progress.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod borrower;
mod budget;
mod calendar;
mod category;
mod contact;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod export;
mod health;
mod loan;
mod logging;
mod money;
mod not_found;
mod payment;
mod routing;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;

use crate::database_id::DatabaseId;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The caller supplied a value outside of the documented input domain,
    /// e.g., a negative interest rate or a budget amount of zero.
    ///
    /// The string describes which input was rejected and is safe to show to
    /// the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The contact ID used to create a loan did not match a valid contact.
    #[error("the contact ID {0} does not refer to a valid contact")]
    InvalidContact(DatabaseId),

    /// The loan ID used to create a payment did not match a valid loan.
    #[error("the loan ID {0} does not refer to a valid loan")]
    InvalidLoan(DatabaseId),

    /// The category ID used to create a budget did not match a valid category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(DatabaseId),

    /// The borrower ID used to create a loan transaction did not match a valid borrower.
    #[error("the borrower ID {0} does not refer to a valid borrower")]
    InvalidBorrower(DatabaseId),

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a borrower that does not exist
    #[error("tried to update a borrower that is not in the database")]
    UpdateMissingBorrower,

    /// Tried to delete a borrower that does not exist
    #[error("tried to delete a borrower that is not in the database")]
    DeleteMissingBorrower,

    /// Tried to delete a loan transaction that does not exist
    #[error("tried to delete a loan transaction that is not in the database")]
    DeleteMissingLoanTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The transactions could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_)
            | Error::InvalidContact(_)
            | Error::InvalidLoan(_)
            | Error::InvalidCategory(_)
            | Error::InvalidBorrower(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget
            | Error::UpdateMissingBorrower
            | Error::DeleteMissingBorrower
            | Error::DeleteMissingLoanTransaction => StatusCode::NOT_FOUND,
            Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::CsvError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            // Any other server errors are not intended to be shown to the client.
            error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
