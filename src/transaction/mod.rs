//! Income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionForm` for creating or editing transactions
//! - Database functions for storing, querying, and managing transactions
//! - Route handlers for the transaction API

mod core;
mod endpoints;

pub use core::{Transaction, TransactionKind, create_transaction_table, get_all_transactions};
pub use endpoints::{
    TransactionState, create_transaction_endpoint, delete_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};

#[cfg(test)]
pub use core::create_transaction;
