//! Formal loans made to contacts and the interest they accrue.

mod core;
mod endpoints;
mod interest;

pub use core::create_loan_table;
pub use endpoints::{create_loan_endpoint, get_loan_balance_endpoint, get_loans_endpoint};
pub use interest::{DAYS_PER_YEAR, days_between};

#[cfg(test)]
pub use core::{LoanForm, create_loan};
