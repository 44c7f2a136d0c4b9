//! Repayments made against formal loans.

mod core;
mod endpoints;

pub use core::{create_payment_table, get_payments_for_loan};
pub use endpoints::{create_payment_endpoint, get_loan_payments_endpoint};
