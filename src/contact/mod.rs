//! Contacts, the people formal loans are made to.

mod core;
mod endpoints;

pub use core::create_contact_table;
pub use endpoints::{create_contact_endpoint, get_contacts_endpoint};

#[cfg(test)]
pub use core::{ContactForm, create_contact};
