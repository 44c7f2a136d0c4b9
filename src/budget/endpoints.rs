//! Route handlers for the budget API.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::core::{
        Budget, BudgetForm, create_budget, delete_budget, get_all_budgets, update_budget,
    },
    dashboard::{BudgetProgress, budget_progress, spent_in_window},
    database_id::{BudgetId, CreatedId, Deleted},
    db::acquire_connection,
    money::checked_difference,
    timezone::get_local_date,
    transaction::get_all_transactions,
};

/// The state needed to manage budgets.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing budgets with how much of each has been spent.
pub async fn get_budgets_endpoint(
    State(state): State<BudgetState>,
) -> Result<Json<Vec<Budget>>, Error> {
    let (budgets, transactions) = {
        let connection = acquire_connection(&state.db_connection)?;

        let budgets = get_all_budgets(&connection)
            .inspect_err(|error| tracing::error!("could not get budgets: {error}"))?;
        let transactions = get_all_transactions(&connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

        (budgets, transactions)
    };

    let budgets = budgets
        .into_iter()
        .map(|budget| -> Result<Budget, Error> {
            let category = budget.category_name.as_deref().unwrap_or_default();
            let spent = spent_in_window(&transactions, category, budget.window())?;
            let remaining = checked_difference(budget.amount, spent, "remaining budget")?;

            Ok(Budget {
                spent: Some(spent),
                remaining: Some(remaining),
                ..budget
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(Json(budgets))
}

/// A route handler for creating a budget, responds with the new budget's ID.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Json(form): Json<BudgetForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let budget = create_budget(&form, &connection)?;
    tracing::debug!("Created budget {} ending {}", budget.id, budget.end_date);

    Ok(Json(CreatedId { id: budget.id }))
}

/// A route handler for editing a budget, responds with the updated budget.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
    Json(form): Json<BudgetForm>,
) -> Result<Json<Budget>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    update_budget(budget_id, &form, &connection).map(Json)
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<Deleted>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    delete_budget(budget_id, &connection)?;
    tracing::debug!("Deleted budget {budget_id}");

    Ok(Json(Deleted { success: true }))
}

/// A route handler for spending against the budgets that cover the current month.
pub async fn get_budget_progress_endpoint(
    State(state): State<BudgetState>,
) -> Result<Json<Vec<BudgetProgress>>, Error> {
    let today = get_local_date(&state.local_timezone)?;
    let (budgets, transactions) = {
        let connection = acquire_connection(&state.db_connection)?;

        (
            get_all_budgets(&connection)?,
            get_all_transactions(&connection)?,
        )
    };

    budget_progress(&budgets, &transactions, today).map(Json)
}
