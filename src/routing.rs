//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    borrower::{
        create_borrower_endpoint, create_loan_transaction_endpoint, delete_borrower_endpoint,
        delete_loan_transaction_endpoint, get_borrower_transactions_endpoint,
        get_borrowers_endpoint, get_loan_summary_endpoint, update_borrower_endpoint,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_progress_endpoint,
        get_budgets_endpoint, update_budget_endpoint,
    },
    category::{create_category_endpoint, get_categories_endpoint},
    contact::{create_contact_endpoint, get_contacts_endpoint},
    dashboard::{
        get_category_spending_endpoint, get_dashboard_summary_endpoint,
        get_monthly_summary_endpoint, get_spending_trend_endpoint,
    },
    endpoints,
    export::export_transactions_endpoint,
    health::get_health_endpoint,
    loan::{create_loan_endpoint, get_loan_balance_endpoint, get_loans_endpoint},
    not_found::get_404_not_found,
    payment::{create_payment_endpoint, get_loan_payments_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let loan_routes: Router<AppState> = Router::new()
        .route(
            endpoints::CONTACTS,
            get(get_contacts_endpoint).post(create_contact_endpoint),
        )
        .route(
            endpoints::LOANS,
            get(get_loans_endpoint).post(create_loan_endpoint),
        )
        .route(endpoints::LOAN_BALANCE, get(get_loan_balance_endpoint))
        .route(endpoints::PAYMENTS, post(create_payment_endpoint))
        .route(endpoints::LOAN_PAYMENTS, get(get_loan_payments_endpoint));

    let finance_routes: Router<AppState> = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_EXPORT,
            get(export_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(
            endpoints::BUDGET_PROGRESS,
            get(get_budget_progress_endpoint),
        )
        .route(
            endpoints::BUDGET,
            put(update_budget_endpoint).delete(delete_budget_endpoint),
        );

    let borrower_routes: Router<AppState> = Router::new()
        .route(
            endpoints::BORROWERS,
            get(get_borrowers_endpoint).post(create_borrower_endpoint),
        )
        .route(
            endpoints::BORROWER,
            put(update_borrower_endpoint).delete(delete_borrower_endpoint),
        )
        .route(
            endpoints::BORROWER_TRANSACTIONS,
            get(get_borrower_transactions_endpoint),
        )
        .route(
            endpoints::LOAN_TRANSACTIONS,
            post(create_loan_transaction_endpoint),
        )
        .route(
            endpoints::LOAN_TRANSACTION,
            delete(delete_loan_transaction_endpoint),
        )
        .route(endpoints::LOAN_SUMMARY, get(get_loan_summary_endpoint));

    let dashboard_routes: Router<AppState> = Router::new()
        .route(
            endpoints::DASHBOARD_SUMMARY,
            get(get_dashboard_summary_endpoint),
        )
        .route(
            endpoints::DASHBOARD_MONTHLY_SUMMARY,
            get(get_monthly_summary_endpoint),
        )
        .route(
            endpoints::DASHBOARD_SPENDING_TREND,
            get(get_spending_trend_endpoint),
        )
        .route(
            endpoints::DASHBOARD_CATEGORY_SPENDING,
            get(get_category_spending_endpoint),
        );

    Router::new()
        .route(endpoints::HEALTH, get(get_health_endpoint))
        .merge(loan_routes)
        .merge(finance_routes)
        .merge(borrower_routes)
        .merge(dashboard_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
