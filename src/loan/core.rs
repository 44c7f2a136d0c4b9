//! Defines the loan model and its database queries.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{ContactId, LoanId},
    loan::interest::{InterestType, LoanTerms},
    money::{get_decimal, require_non_negative, require_positive},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a loan is still being repaid.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// The loan is still being repaid.
    #[default]
    Active,
    /// The loan has been repaid in full.
    Paid,
    /// The borrower has stopped repaying the loan.
    Defaulted,
}

impl LoanStatus {
    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paid => "paid",
            Self::Defaulted => "defaulted",
        }
    }
}

/// Money lent to a contact with agreed interest terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loan {
    /// The ID of the loan.
    pub id: LoanId,
    /// The contact the money was lent to.
    pub contact_id: ContactId,
    /// The name of the contact, filled in when loans are listed.
    pub contact_name: Option<String>,
    /// The principal.
    pub amount: Decimal,
    /// The annual interest rate as a percentage.
    pub interest_rate: Decimal,
    /// Whether interest is simple or compounded daily.
    pub interest_type: InterestType,
    /// The day the money was lent.
    pub start_date: Date,
    /// When the loan should be repaid by, if agreed.
    pub due_date: Option<Date>,
    /// Whether the loan is still being repaid.
    pub status: LoanStatus,
    /// Free text notes.
    pub notes: Option<String>,
    /// When the loan was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Loan {
    /// The terms needed to compute interest on this loan.
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.amount,
            annual_rate_percent: self.interest_rate,
            interest_type: self.interest_type,
            start_date: self.start_date,
        }
    }
}

/// The data for creating a loan.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoanForm {
    /// The contact the money was lent to.
    pub contact_id: ContactId,
    /// The principal, must be greater than zero.
    pub amount: Decimal,
    /// The annual interest rate as a percentage, must not be negative.
    #[serde(default)]
    pub interest_rate: Decimal,
    /// Defaults to simple interest.
    #[serde(default)]
    pub interest_type: InterestType,
    /// The day the money was lent.
    pub start_date: Date,
    /// When the loan should be repaid by.
    #[serde(default)]
    pub due_date: Option<Date>,
    /// Free text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new active loan in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidInput] if the amount is not positive or the rate is negative,
/// - [Error::InvalidContact] if `contact_id` does not refer to a real contact,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_loan(form: &LoanForm, connection: &Connection) -> Result<Loan, Error> {
    require_positive(form.amount, "loan amount")?;
    require_non_negative(form.interest_rate, "interest rate")?;

    connection
        .prepare(
            "INSERT INTO loan (contact_id, amount, interest_rate, interest_type, start_date, due_date, status, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, contact_id, NULL, amount, interest_rate, interest_type, start_date, due_date, status, notes, created_at",
        )?
        .query_row(
            (
                form.contact_id,
                form.amount.to_string(),
                form.interest_rate.to_string(),
                form.interest_type,
                form.start_date,
                form.due_date,
                LoanStatus::Active,
                &form.notes,
                OffsetDateTime::now_utc(),
            ),
            map_loan_row,
        )
        .map_err(|error| match error {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::InvalidContact(form.contact_id)
            }
            error => error.into(),
        })
}

/// Retrieve a loan by its `id`, including the contact's name.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid loan,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_loan(id: LoanId, connection: &Connection) -> Result<Loan, Error> {
    connection
        .prepare(
            "SELECT l.id, l.contact_id, c.name, l.amount, l.interest_rate, l.interest_type,
                    l.start_date, l.due_date, l.status, l.notes, l.created_at
             FROM loan l LEFT JOIN contact c ON c.id = l.contact_id
             WHERE l.id = :id",
        )?
        .query_row(&[(":id", &id)], map_loan_row)
        .map_err(Error::from)
}

/// Retrieve all loans, newest first, including each contact's name.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_loans(connection: &Connection) -> Result<Vec<Loan>, Error> {
    connection
        .prepare(
            "SELECT l.id, l.contact_id, c.name, l.amount, l.interest_rate, l.interest_type,
                    l.start_date, l.due_date, l.status, l.notes, l.created_at
             FROM loan l LEFT JOIN contact c ON c.id = l.contact_id
             ORDER BY l.created_at DESC, l.id DESC",
        )?
        .query_map([], map_loan_row)?
        .map(|maybe_loan| maybe_loan.map_err(Error::from))
        .collect()
}

/// Create the loan table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_loan_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS loan (
            id INTEGER PRIMARY KEY,
            contact_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            interest_rate TEXT NOT NULL,
            interest_type TEXT NOT NULL CHECK (interest_type IN ('simple', 'compound')),
            start_date TEXT NOT NULL,
            due_date TEXT,
            status TEXT NOT NULL CHECK (status IN ('active', 'paid', 'defaulted')),
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(contact_id) REFERENCES contact(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Loan].
///
/// The third column is the contact's name, which may be `NULL`.
fn map_loan_row(row: &Row) -> Result<Loan, rusqlite::Error> {
    Ok(Loan {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        contact_name: row.get(2)?,
        amount: get_decimal(row, 3)?,
        interest_rate: get_decimal(row, 4)?,
        interest_type: row.get(5)?,
        start_date: row.get(6)?,
        due_date: row.get(7)?,
        status: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
    })
}

impl ToSql for InterestType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for InterestType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "simple" => Ok(Self::Simple),
            "compound" => Ok(Self::Compound),
            other => Err(FromSqlError::Other(
                format!("unknown interest type \"{other}\"").into(),
            )),
        }
    }
}

impl ToSql for LoanStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for LoanStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "active" => Ok(Self::Active),
            "paid" => Ok(Self::Paid),
            "defaulted" => Ok(Self::Defaulted),
            other => Err(FromSqlError::Other(
                format!("unknown loan status \"{other}\"").into(),
            )),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        contact::{ContactForm, create_contact},
        loan::{
            core::{LoanForm, LoanStatus, create_loan, get_all_loans, get_loan},
            interest::InterestType,
        },
        test_utils::get_test_connection,
    };

    fn create_test_contact(name: &str, connection: &Connection) -> i64 {
        create_contact(
            &ContactForm {
                name: name.to_owned(),
                phone: None,
                email: None,
                address: None,
            },
            connection,
        )
        .expect("Could not create test contact")
        .id
    }

    fn loan_form(contact_id: i64) -> LoanForm {
        LoanForm {
            contact_id,
            amount: dec!(1000),
            interest_rate: dec!(12),
            interest_type: InterestType::Compound,
            start_date: date!(2024 - 01 - 01),
            due_date: Some(date!(2025 - 01 - 01)),
            notes: Some("Car repairs".to_owned()),
        }
    }

    #[test]
    fn create_loan_succeeds() {
        let connection = get_test_connection();
        let contact_id = create_test_contact("Ana", &connection);

        let loan = create_loan(&loan_form(contact_id), &connection).expect("Could not create loan");

        assert!(loan.id > 0);
        assert_eq!(loan.amount, dec!(1000));
        assert_eq!(loan.interest_rate, dec!(12));
        assert_eq!(loan.interest_type, InterestType::Compound);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.due_date, Some(date!(2025 - 01 - 01)));
    }

    #[test]
    fn create_loan_fails_on_invalid_contact() {
        let connection = get_test_connection();

        let result = create_loan(&loan_form(42), &connection);

        assert_eq!(result, Err(Error::InvalidContact(42)));
    }

    #[test]
    fn create_loan_fails_on_zero_amount() {
        let connection = get_test_connection();
        let contact_id = create_test_contact("Ana", &connection);
        let form = LoanForm {
            amount: dec!(0),
            ..loan_form(contact_id)
        };

        let result = create_loan(&form, &connection);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn create_loan_fails_on_negative_rate() {
        let connection = get_test_connection();
        let contact_id = create_test_contact("Ana", &connection);
        let form = LoanForm {
            interest_rate: dec!(-1),
            ..loan_form(contact_id)
        };

        let result = create_loan(&form, &connection);

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn get_loan_includes_contact_name() {
        let connection = get_test_connection();
        let contact_id = create_test_contact("Ana", &connection);
        let created = create_loan(&loan_form(contact_id), &connection).unwrap();

        let loan = get_loan(created.id, &connection).unwrap();

        assert_eq!(loan.contact_name.as_deref(), Some("Ana"));
        assert_eq!(loan.amount, created.amount);
    }

    #[test]
    fn get_missing_loan_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_loan(1337, &connection), Err(Error::NotFound));
    }

    #[test]
    fn loans_are_listed_newest_first() {
        let connection = get_test_connection();
        let contact_id = create_test_contact("Ana", &connection);
        let first = create_loan(&loan_form(contact_id), &connection).unwrap();
        let second = create_loan(&loan_form(contact_id), &connection).unwrap();

        let ids: Vec<i64> = get_all_loans(&connection)
            .unwrap()
            .into_iter()
            .map(|loan| loan.id)
            .collect();

        assert_eq!(ids, [second.id, first.id]);
    }
}
