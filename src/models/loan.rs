//! Loan (borrowing transaction) model and related types

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::catalog::{AuthorRef, BookRef, BorrowerRef, CategoryRef};
use crate::error::AppResult;

/// Layout of every timestamp exchanged as text (no timezone)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp with [`TIMESTAMP_FORMAT`]
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse text in [`TIMESTAMP_FORMAT`]; malformed input is a parse failure
pub fn parse_timestamp(text: &str) -> AppResult<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)?)
}

/// Loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Borrowed,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrowed" => Ok(LoanStatus::Borrowed),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// Stored as plain text
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<Postgres>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Loan row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub borrower_id: i32,
    pub book_id: i32,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }
}

/// Loan with borrower and book (author, category) attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub borrower: BorrowerRef,
    pub book: BookRef,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: LoanStatus,
}

impl From<Loan> for LoanDetails {
    /// Reference shells only; nothing is looked up in the catalog
    fn from(loan: Loan) -> Self {
        LoanDetails {
            id: loan.id,
            borrower: BorrowerRef::shell(loan.borrower_id),
            book: BookRef::shell(loan.book_id),
            borrowed_at: loan.borrowed_at,
            due_date: loan.due_date,
            returned_at: loan.returned_at,
            status: loan.status,
        }
    }
}

/// Flat row for a loan joined with the catalog
#[derive(Debug, Clone, FromRow)]
pub struct LoanDetailsRow {
    pub id: i32,
    pub borrower_id: i32,
    pub book_id: i32,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: LoanStatus,
    pub borrower_name: Option<String>,
    pub borrower_email: Option<String>,
    pub book_title: Option<String>,
    pub book_publication_year: Option<i32>,
    pub book_description: Option<String>,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
    pub author_bio: Option<String>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub category_description: Option<String>,
}

impl From<LoanDetailsRow> for LoanDetails {
    fn from(row: LoanDetailsRow) -> Self {
        LoanDetails {
            id: row.id,
            borrower: BorrowerRef {
                id: row.borrower_id,
                name: row.borrower_name,
                email: row.borrower_email,
            },
            book: BookRef {
                id: row.book_id,
                title: row.book_title,
                publication_year: row.book_publication_year,
                description: row.book_description,
                author: row.author_id.map(|id| AuthorRef {
                    id,
                    name: row.author_name,
                    bio: row.author_bio,
                }),
                category: row.category_id.map(|id| CategoryRef {
                    id,
                    name: row.category_name,
                    description: row.category_description,
                }),
            },
            borrowed_at: row.borrowed_at,
            due_date: row.due_date,
            returned_at: row.returned_at,
            status: row.status,
        }
    }
}

/// Loan to insert, built by the workflow
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub borrower_id: i32,
    pub book_id: i32,
    pub borrowed_at: String,
    pub due_date: String,
}

/// Create loan request (the borrower is the caller)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub book_id: i32,
    /// Due date, `YYYY-MM-DD HH:MM:SS` expected; stored as given
    pub due_date: String,
}

/// Raw field overwrite (administrative override).
///
/// Does not touch stock and does not record a return event.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct UpdateLoan {
    pub book_id: i32,
    pub borrower_id: i32,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: LoanStatus,
}

impl UpdateLoan {
    /// Empty `returned_at` text is stored as absent
    pub fn normalized_returned_at(&self) -> Option<&str> {
        self.returned_at.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Change only the due date
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PatchDueDate {
    /// Stored as given
    pub due_date: String,
}

/// Close a loan administratively, reconciling stock
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ForceClose {
    /// Defaults to now
    pub returned_at: Option<String>,
}
