//! Spending limits for categories over a date range.

mod core;
mod endpoints;

pub use core::{Budget, BudgetStatus, create_budget_table};
pub use endpoints::{
    create_budget_endpoint, delete_budget_endpoint, get_budget_progress_endpoint,
    get_budgets_endpoint, update_budget_endpoint,
};

#[cfg(test)]
pub use core::BudgetPeriod;
