//! The API endpoints URIs.
//!
//! Endpoints that take a parameter use axum's `{name}` path syntax, e.g., '/api/loans/{loan_id}/balance'.

/// The route for checking that the server can reach its database.
pub const HEALTH: &str = "/api/test";

/// The route to list and create contacts.
pub const CONTACTS: &str = "/api/contacts";

/// The route to list and create loans.
pub const LOANS: &str = "/api/loans";
/// The route for the outstanding balance of a loan.
pub const LOAN_BALANCE: &str = "/api/loans/{loan_id}/balance";

/// The route to create payments.
pub const PAYMENTS: &str = "/api/payments";
/// The route to list the payments made on a loan.
pub const LOAN_PAYMENTS: &str = "/api/payments/{loan_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to download all transactions as a CSV file.
pub const TRANSACTIONS_EXPORT: &str = "/api/transactions/export";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to update or delete a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route for how much of each current budget has been spent.
pub const BUDGET_PROGRESS: &str = "/api/budgets/progress";

/// The route to list and create borrowers.
pub const BORROWERS: &str = "/api/borrowers";
/// The route to update or delete a single borrower.
pub const BORROWER: &str = "/api/borrowers/{borrower_id}";
/// The route to list a borrower's loan transactions.
pub const BORROWER_TRANSACTIONS: &str = "/api/borrowers/{borrower_id}/transactions";
/// The route to create loan transactions.
pub const LOAN_TRANSACTIONS: &str = "/api/loan-transactions";
/// The route to delete a single loan transaction.
pub const LOAN_TRANSACTION: &str = "/api/loan-transactions/{loan_transaction_id}";
/// The route for totals across all borrowers.
pub const LOAN_SUMMARY: &str = "/api/loan-summary";

/// The route for the dashboard overview cards.
pub const DASHBOARD_SUMMARY: &str = "/api/dashboard/summary";
/// The route for income and expenses in a single month.
pub const DASHBOARD_MONTHLY_SUMMARY: &str = "/api/dashboard/monthly-summary";
/// The route for income, expenses and net income over the trailing months.
pub const DASHBOARD_SPENDING_TREND: &str = "/api/dashboard/spending-trend";
/// The route for expenses grouped by category in a single month.
pub const DASHBOARD_CATEGORY_SPENDING: &str = "/api/dashboard/category-spending";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/loans/{loan_id}/balance', '{loan_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let Some(param_length) = endpoint_path[param_start..].find('}') else {
        return endpoint_path.to_string();
    };
    let param_end = param_start + param_length;

    let is_valid_param = endpoint_path[param_start + 1..param_end]
        .chars()
        .all(|c| c.is_ascii_lowercase() || c == '_');

    if param_end == param_start + 1 || !is_valid_param {
        return endpoint_path.to_string();
    }

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end + 1..]
    )
}

#[cfg(test)]
mod format_endpoint_tests {
    use crate::endpoints::format_endpoint;

    #[test]
    fn replaces_parameter_at_end() {
        assert_eq!(format_endpoint("/api/transactions/{transaction_id}", 42), "/api/transactions/42");
    }

    #[test]
    fn replaces_parameter_in_middle() {
        assert_eq!(format_endpoint("/api/loans/{loan_id}/balance", 7), "/api/loans/7/balance");
    }

    #[test]
    fn returns_path_without_parameter_unchanged() {
        assert_eq!(format_endpoint("/api/loans", 1), "/api/loans");
    }

    #[test]
    fn ignores_malformed_parameter() {
        assert_eq!(format_endpoint("/api/loans/{Loan-ID}", 1), "/api/loans/{Loan-ID}");
        assert_eq!(format_endpoint("/api/loans/{}", 1), "/api/loans/{}");
        assert_eq!(format_endpoint("/api/loans/{loan_id", 1), "/api/loans/{loan_id");
    }
}
