//! Defines the category model and its database queries.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::CategoryId,
    money::{get_decimal, require_non_negative, require_text},
};

/// Whether a category is for money earned or money spent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// A category for income, e.g. "Salary".
    Income,
    /// A category for expenses, e.g. "Groceries".
    #[default]
    Expense,
}

impl CategoryType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// A named grouping of transactions, e.g. "Groceries".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name, matched against [crate::transaction::Transaction::category].
    pub name: String,
    /// An optional icon, e.g. an emoji.
    pub icon: Option<String>,
    /// An optional display colour, e.g. "#ff8800".
    pub color: Option<String>,
    /// A soft spending limit, zero when not set.
    pub budget_limit: Decimal,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub kind: CategoryType,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data for creating a category.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Defaults to zero.
    #[serde(default)]
    pub budget_limit: Decimal,
    /// Defaults to [CategoryType::Expense].
    #[serde(rename = "type", default)]
    pub kind: CategoryType,
}

/// Create a new category in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the name is blank or the budget limit is negative,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(form: &CategoryForm, connection: &Connection) -> Result<Category, Error> {
    let name = require_text(&form.name, "category name")?;
    require_non_negative(form.budget_limit, "budget limit")?;

    let category = connection
        .prepare(
            "INSERT INTO category (name, icon, color, budget_limit, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, name, icon, color, budget_limit, type, created_at",
        )?
        .query_row(
            (
                name,
                &form.icon,
                &form.color,
                form.budget_limit.to_string(),
                form.kind,
                OffsetDateTime::now_utc(),
            ),
            map_category_row,
        )?;

    Ok(category)
}

/// Retrieve all categories ordered by name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, icon, color, budget_limit, type, created_at
             FROM category ORDER BY name ASC",
        )?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Create the category table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            icon TEXT,
            color TEXT,
            budget_limit TEXT NOT NULL DEFAULT '0',
            type TEXT NOT NULL DEFAULT 'expense' CHECK (type IN ('income', 'expense')),
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        color: row.get(3)?,
        budget_limit: get_decimal(row, 4)?,
        kind: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown category type \"{other}\"").into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        category::core::{CategoryForm, CategoryType, create_category, get_all_categories},
        test_utils::get_test_connection,
    };

    fn form(name: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_owned(),
            icon: None,
            color: None,
            budget_limit: Default::default(),
            kind: Default::default(),
        }
    }

    #[test]
    fn create_category_applies_defaults() {
        let connection = get_test_connection();

        let category = create_category(&form("Groceries"), &connection).unwrap();

        assert_eq!(category.name, "Groceries");
        assert_eq!(category.budget_limit, dec!(0));
        assert_eq!(category.kind, CategoryType::Expense);
    }

    #[test]
    fn create_category_keeps_given_fields() {
        let connection = get_test_connection();
        let form = CategoryForm {
            icon: Some("💼".to_owned()),
            color: Some("#00aa55".to_owned()),
            budget_limit: dec!(250),
            kind: CategoryType::Income,
            ..form("Salary")
        };

        let category = create_category(&form, &connection).unwrap();

        assert_eq!(category.icon.as_deref(), Some("💼"));
        assert_eq!(category.color.as_deref(), Some("#00aa55"));
        assert_eq!(category.budget_limit, dec!(250));
        assert_eq!(category.kind, CategoryType::Income);
    }

    #[test]
    fn create_category_fails_on_blank_name() {
        let connection = get_test_connection();

        let result = create_category(&form(""), &connection);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn categories_are_listed_by_name() {
        let connection = get_test_connection();
        for name in ["Transport", "Entertainment", "Groceries"] {
            create_category(&form(name), &connection).unwrap();
        }

        let names: Vec<String> = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();

        assert_eq!(names, ["Entertainment", "Groceries", "Transport"]);
    }
}
