//! Defines the contact model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::ContactId, money::require_text};

/// A person that money can be lent to through a formal loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    /// The ID of the contact.
    pub id: ContactId,
    /// The contact's full name.
    pub name: String,
    /// An optional phone number.
    pub phone: Option<String>,
    /// An optional email address.
    pub email: Option<String>,
    /// An optional postal address.
    pub address: Option<String>,
    /// When the contact was added.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data for creating a contact.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContactForm {
    /// The contact's full name, must not be blank.
    pub name: String,
    /// An optional phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// An optional email address.
    #[serde(default)]
    pub email: Option<String>,
    /// An optional postal address.
    #[serde(default)]
    pub address: Option<String>,
}

/// Create a contact in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the name is blank,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_contact(form: &ContactForm, connection: &Connection) -> Result<Contact, Error> {
    let name = require_text(&form.name, "contact name")?;

    let contact = connection
        .prepare(
            "INSERT INTO contact (name, phone, email, address, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, phone, email, address, created_at",
        )?
        .query_row(
            (
                name,
                &form.phone,
                &form.email,
                &form.address,
                OffsetDateTime::now_utc(),
            ),
            map_contact_row,
        )?;

    Ok(contact)
}

/// Retrieve all contacts ordered alphabetically by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_contacts(connection: &Connection) -> Result<Vec<Contact>, Error> {
    connection
        .prepare(
            "SELECT id, name, phone, email, address, created_at FROM contact ORDER BY name ASC",
        )?
        .query_map([], map_contact_row)?
        .map(|maybe_contact| maybe_contact.map_err(Error::from))
        .collect()
}

/// Create the contact table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_contact_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS contact (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            address TEXT,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_contact_row(row: &Row) -> Result<Contact, rusqlite::Error> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        created_at: row.get(5)?,
    })
}
