//! Dashboard module
//!
//! Provides summaries of income and expenses: overview totals, single-month
//! summaries, spending trends, spending by category and budget progress.

mod aggregation;
mod handlers;

pub use aggregation::{BudgetProgress, budget_progress, spent_in_window};
pub use handlers::{
    get_category_spending_endpoint, get_dashboard_summary_endpoint, get_monthly_summary_endpoint,
    get_spending_trend_endpoint,
};
