//! Download all transactions as a CSV file.

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    db::acquire_connection,
    transaction::{Transaction, TransactionState, get_all_transactions},
};

/// The name the browser saves the export as.
const EXPORT_FILE_NAME: &str = "transactions.csv";

const CSV_HEADER: [&str; 6] = [
    "date",
    "type",
    "category",
    "description",
    "amount",
    "payment_method",
];

/// Write `transactions` as CSV text with a header row.
///
/// # Errors
/// Returns an [Error::CsvError] if a record cannot be written.
pub fn write_transactions_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.transaction_date.to_string().as_str(),
                transaction.kind.as_str(),
                transaction.category.as_str(),
                transaction.description.as_deref().unwrap_or_default(),
                transaction.amount.to_string().as_str(),
                transaction.payment_method.as_deref().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

fn csv_error(error: csv::Error) -> Error {
    Error::CsvError(error.to_string())
}

/// A route handler that responds with every transaction as a CSV attachment, most recent first.
pub async fn export_transactions_endpoint(
    State(state): State<TransactionState>,
) -> Result<Response, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions for export: {error}"))?;
    let body = write_transactions_csv(&transactions)?;
    tracing::debug!("Exported {} transactions", transactions.len());

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}
