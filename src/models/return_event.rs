//! Return events: append-only audit log of closed loans

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const MSG_RETURNED: &str = "Book returned successfully";
pub const MSG_NOT_FOUND: &str = "Transaction not found";
pub const MSG_ALREADY_RETURNED: &str = "Book already returned";

/// Return event row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnEvent {
    pub id: i32,
    pub borrowing_transaction_id: i32,
    #[schema(value_type = String, example = "2024-06-01T10:00:00")]
    pub returned_at: NaiveDateTime,
}

/// Return request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReturnBook {
    pub transaction_id: i32,
    /// `YYYY-MM-DD HH:MM:SS`
    pub returned_at: String,
}

/// Outcome of a return attempt.
///
/// "Not found" and "already returned" are reported here, not as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReturnBookResponse {
    pub success: bool,
    pub message: String,
}

impl ReturnBookResponse {
    pub fn returned() -> Self {
        Self::new(true, MSG_RETURNED)
    }

    pub fn not_found() -> Self {
        Self::new(false, MSG_NOT_FOUND)
    }

    pub fn already_returned() -> Self {
        Self::new(false, MSG_ALREADY_RETURNED)
    }

    fn new(success: bool, message: &str) -> Self {
        Self {
            success,
            message: message.to_string(),
        }
    }
}

/// What the store reports after trying to close a loan
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    Closed { loan: super::loan::Loan, event: ReturnEvent },
    NotFound,
    AlreadyReturned,
}
