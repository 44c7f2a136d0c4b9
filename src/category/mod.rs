//! Categories for grouping transactions and budgets.

mod core;
mod endpoints;

pub use core::create_category_table;
pub use endpoints::{create_category_endpoint, get_categories_endpoint};

#[cfg(test)]
pub use core::{CategoryForm, create_category};
