//! Route handlers for listing and creating categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::core::{Category, CategoryForm, create_category, get_all_categories},
    database_id::CreatedId,
    db::acquire_connection,
};

/// The state needed to get or create categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all categories ordered by name.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))
        .map(Json)
}

/// A route handler for creating a category, responds with the new category's ID.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let category = create_category(&form, &connection)?;
    tracing::debug!("Created category {} \"{}\"", category.id, category.name);

    Ok(Json(CreatedId { id: category.id }))
}
