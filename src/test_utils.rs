//! Shared helpers for tests.

#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{AppState, build_router, db::initialize};

/// The timezone used by test servers.
pub(crate) const TEST_TIMEZONE: &str = "Etc/UTC";

/// Get an in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    initialize(&connection).unwrap();
    connection
}

/// Get a test server for the full app backed by an empty in-memory database.
pub(crate) fn get_test_server() -> TestServer {
    let connection = Connection::open_in_memory().unwrap();
    let state = AppState::new(connection, TEST_TIMEZONE).expect("Could not create app state");

    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}
