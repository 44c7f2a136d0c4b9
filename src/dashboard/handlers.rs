//! Dashboard HTTP handlers.
//!
//! Each handler fetches every transaction, then hands them to the pure
//! functions in [super::aggregation] along with today's local date.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error,
    dashboard::aggregation::{
        CategorySpending, DashboardSummary, MonthlySummary, TrendPoint, category_spending,
        dashboard_summary, monthly_summary, spending_trend,
    },
    db::acquire_connection,
    timezone::get_local_date,
    transaction::{Transaction, get_all_transactions},
};

/// The number of months in a spending trend when none is given.
const DEFAULT_TREND_MONTHS: u32 = 6;

/// The longest spending trend that can be requested, ten years.
const MAX_TREND_MONTHS: u32 = 120;

/// The state needed for the dashboard endpoints.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters selecting a calendar month, defaulting to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// The year, e.g. 2024.
    pub year: Option<i32>,
    /// The month number, 1 to 12.
    pub month: Option<u8>,
}

impl MonthQuery {
    fn resolve(&self, today: Date) -> Result<(i32, Month), Error> {
        let year = self.year.unwrap_or(today.year());
        let month = match self.month {
            Some(month) => Month::try_from(month).map_err(|_| {
                Error::InvalidInput(format!("month must be between 1 and 12, got {month}"))
            })?,
            None => today.month(),
        };

        Ok((year, month))
    }
}

/// Query parameters for the spending trend.
#[derive(Debug, Default, Deserialize)]
pub struct TrendQuery {
    /// How many months to include, defaults to six.
    pub months: Option<u32>,
}

/// Fetch today's date and all transactions.
fn load_transactions(state: &DashboardState) -> Result<(Date, Vec<Transaction>), Error> {
    let today = get_local_date(&state.local_timezone)?;
    let connection = acquire_connection(&state.db_connection)?;

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok((today, transactions))
}

/// A route handler for the overview totals and this month's savings rate.
pub async fn get_dashboard_summary_endpoint(
    State(state): State<DashboardState>,
) -> Result<Json<DashboardSummary>, Error> {
    let (today, transactions) = load_transactions(&state)?;

    dashboard_summary(&transactions, today).map(Json)
}

/// A route handler for income and expenses in one month.
pub async fn get_monthly_summary_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlySummary>, Error> {
    let (today, transactions) = load_transactions(&state)?;
    let (year, month) = query.resolve(today)?;

    monthly_summary(&transactions, year, month).map(Json)
}

/// A route handler for income, expenses and net income over the trailing months.
pub async fn get_spending_trend_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<TrendQuery>,
) -> Result<Json<Vec<TrendPoint>>, Error> {
    let months = query.months.unwrap_or(DEFAULT_TREND_MONTHS);
    if !(1..=MAX_TREND_MONTHS).contains(&months) {
        return Err(Error::InvalidInput(format!(
            "months must be between 1 and {MAX_TREND_MONTHS}, got {months}"
        )));
    }

    let (today, transactions) = load_transactions(&state)?;

    spending_trend(&transactions, months, today).map(Json)
}

/// A route handler for expenses grouped by category in one month.
pub async fn get_category_spending_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<CategorySpending>>, Error> {
    let (today, transactions) = load_transactions(&state)?;
    let (year, month) = query.resolve(today)?;

    category_spending(&transactions, year, month).map(Json)
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use time::OffsetDateTime;

    use crate::{endpoints, test_utils::get_test_server};

    async fn add_transaction(server: &TestServer, kind: &str, amount: &str, category: &str, date: &str) {
        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": kind,
                "amount": amount,
                "category": category,
                "transaction_date": date,
            }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn summary_of_empty_database_is_zero() {
        let server = get_test_server();

        let summary = server.get(endpoints::DASHBOARD_SUMMARY).await.json::<Value>();

        assert_eq!(summary["totalBalance"], "0");
        assert_eq!(summary["savingsRate"], "0.00");
    }

    #[tokio::test]
    async fn summary_counts_current_month() {
        let server = get_test_server();
        let today = OffsetDateTime::now_utc().date().to_string();
        add_transaction(&server, "income", "1000", "Salary", &today).await;
        add_transaction(&server, "expense", "250", "Rent", &today).await;
        add_transaction(&server, "expense", "50", "Rent", "2001-01-01").await;

        let summary = server.get(endpoints::DASHBOARD_SUMMARY).await.json::<Value>();

        assert_eq!(summary["monthlyIncome"], "1000");
        assert_eq!(summary["monthlyExpenses"], "250");
        assert_eq!(summary["totalExpenses"], "300");
        assert_eq!(summary["totalBalance"], "700");
        assert_eq!(summary["savingsRate"], "75.00");
    }

    #[tokio::test]
    async fn summary_too_large_to_calculate_is_bad_request() {
        let server = get_test_server();
        let today = OffsetDateTime::now_utc().date().to_string();
        add_transaction(&server, "income", "50000000000000000000000000000", "Salary", &today).await;
        add_transaction(&server, "income", "50000000000000000000000000000", "Salary", &today).await;

        let response = server.get(endpoints::DASHBOARD_SUMMARY).await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "invalid input: total income is too large to calculate" })
        );
        server.get(endpoints::TRANSACTIONS).await.assert_status_ok();
    }

    #[tokio::test]
    async fn monthly_summary_for_requested_month() {
        let server = get_test_server();
        add_transaction(&server, "income", "3000", "Salary", "2024-03-15").await;
        add_transaction(&server, "expense", "500", "Rent", "2024-03-20").await;
        add_transaction(&server, "expense", "99", "Rent", "2024-02-01").await;

        server
            .get(endpoints::DASHBOARD_MONTHLY_SUMMARY)
            .add_query_param("year", 2024)
            .add_query_param("month", 3)
            .await
            .assert_json(&json!({ "income": "3000", "expenses": "500" }));
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let server = get_test_server();

        server
            .get(endpoints::DASHBOARD_CATEGORY_SPENDING)
            .add_query_param("year", 2024)
            .add_query_param("month", 13)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn spending_trend_defaults_to_six_months() {
        let server = get_test_server();

        let trend = server.get(endpoints::DASHBOARD_SPENDING_TREND).await.json::<Value>();

        assert_eq!(trend.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn spending_trend_rejects_out_of_range_months() {
        let server = get_test_server();

        for months in [0, 121] {
            server
                .get(endpoints::DASHBOARD_SPENDING_TREND)
                .add_query_param("months", months)
                .await
                .assert_status_bad_request();
        }
    }

    #[tokio::test]
    async fn category_spending_for_requested_month() {
        let server = get_test_server();
        add_transaction(&server, "expense", "20", "Food", "2024-05-01").await;
        add_transaction(&server, "expense", "30", "Food", "2024-05-02").await;
        add_transaction(&server, "expense", "10", "Gas", "2024-05-03").await;

        server
            .get(endpoints::DASHBOARD_CATEGORY_SPENDING)
            .add_query_param("year", 2024)
            .add_query_param("month", 5)
            .await
            .assert_json(&json!([
                { "category": "Food", "total": "50" },
                { "category": "Gas", "total": "10" },
            ]));
    }
}
