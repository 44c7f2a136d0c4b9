//! A route for checking that the server can reach its database.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{AppState, db::acquire_connection};

const DATABASE_NAME: &str = "sqlite";

/// The state needed to check the database.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// The database connection to check.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HealthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The result of a database check.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthStatus {
    /// The database answered a query.
    Success {
        database: &'static str,
        connection: &'static str,
    },
    /// The database could not be queried.
    Error {
        database: &'static str,
        error: String,
    },
}

/// Run a trivial query against the contact table.
pub fn check_database(connection: &Connection) -> HealthStatus {
    match connection.query_row("SELECT COUNT(*) FROM contact", [], |row| row.get::<_, i64>(0)) {
        Ok(_) => HealthStatus::Success {
            database: DATABASE_NAME,
            connection: "working",
        },
        Err(error) => {
            tracing::error!("database health check failed: {error}");
            HealthStatus::Error {
                database: DATABASE_NAME,
                error: error.to_string(),
            }
        }
    }
}

/// A route handler that reports whether the database is reachable.
///
/// Always responds with 200 OK, the body says whether the check passed.
pub async fn get_health_endpoint(State(state): State<HealthState>) -> Json<HealthStatus> {
    match acquire_connection(&state.db_connection) {
        Ok(connection) => Json(check_database(&connection)),
        Err(error) => Json(HealthStatus::Error {
            database: DATABASE_NAME,
            error: error.to_string(),
        }),
    }
}
