//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// Database identifier for a contact.
pub type ContactId = DatabaseId;
/// Database identifier for a loan.
pub type LoanId = DatabaseId;
/// Database identifier for an income or expense transaction.
pub type TransactionId = DatabaseId;
/// Database identifier for a category.
pub type CategoryId = DatabaseId;
/// Database identifier for a budget.
pub type BudgetId = DatabaseId;
/// Database identifier for a borrower.
pub type BorrowerId = DatabaseId;

/// The response body for a newly created record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreatedId {
    /// The ID of the new record.
    pub id: DatabaseId,
}

/// The response body for a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Deleted {
    /// Always `true`, failed deletes respond with an error instead.
    pub success: bool,
}
