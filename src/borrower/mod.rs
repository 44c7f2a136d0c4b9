//! Informal loans to friends and family, tracked as a ledger of money given and received.

mod core;
mod endpoints;
mod ledger;

pub use core::create_borrower_tables;
pub use endpoints::{
    create_borrower_endpoint, create_loan_transaction_endpoint, delete_borrower_endpoint,
    delete_loan_transaction_endpoint, get_borrower_transactions_endpoint, get_borrowers_endpoint,
    get_loan_summary_endpoint, update_borrower_endpoint,
};
