//! Route handlers for listing and creating contacts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    contact::core::{Contact, ContactForm, create_contact, get_all_contacts},
    database_id::CreatedId,
    db::acquire_connection,
};

/// The state needed to get or create contacts.
#[derive(Debug, Clone)]
pub struct ContactState {
    /// The database connection for managing contacts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ContactState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all contacts ordered by name.
pub async fn get_contacts_endpoint(
    State(state): State<ContactState>,
) -> Result<Json<Vec<Contact>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_all_contacts(&connection)
        .inspect_err(|error| tracing::error!("could not get contacts: {error}"))
        .map(Json)
}

/// A route handler for creating a contact, responds with the new contact's ID.
pub async fn create_contact_endpoint(
    State(state): State<ContactState>,
    Json(form): Json<ContactForm>,
) -> Result<Json<CreatedId>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let contact = create_contact(&form, &connection)?;
    tracing::debug!("Created contact {}", contact.id);

    Ok(Json(CreatedId { id: contact.id }))
}
