//! Return log repository

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgConnection, Pool, Postgres};

use super::ReturnStore;
use crate::{
    error::AppResult,
    models::{
        loan::{Loan, LoanStatus},
        return_event::{CloseOutcome, ReturnEvent},
    },
};

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReturnStore for ReturnsRepository {
    async fn record_return(&self, loan_id: i32, returned_at: &str, at: NaiveDateTime) -> AppResult<CloseOutcome> {
        let mut tx = self.pool.begin().await?;

        let outcome = close_loan(&mut *tx, loan_id, returned_at, at).await?;
        if matches!(outcome, CloseOutcome::Closed { .. }) {
            tx.commit().await?;
        }

        Ok(outcome)
    }

    async fn list_for_loan(&self, loan_id: i32) -> AppResult<Vec<ReturnEvent>> {
        let events = sqlx::query_as::<_, ReturnEvent>(
            r#"
            SELECT id, borrowing_transaction_id, returned_at
            FROM returning_transactions
            WHERE borrowing_transaction_id = $1
            ORDER BY id
            "#,
        )
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}

/// Mark a loan returned and append its return event.
///
/// The update only matches a loan with no `returned_at`, so of two racing
/// closes exactly one wins and the other sees `AlreadyReturned`.
pub(crate) async fn close_loan(
    conn: &mut PgConnection,
    loan_id: i32,
    returned_at: &str,
    at: NaiveDateTime,
) -> AppResult<CloseOutcome> {
    let loan = sqlx::query_as::<_, Loan>(
        r#"
        UPDATE borrowing_transactions
        SET returned_at = $2, status = $3
        WHERE id = $1 AND returned_at IS NULL
        RETURNING *
        "#,
    )
    .bind(loan_id)
    .bind(returned_at)
    .bind(LoanStatus::Returned)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(loan) = loan else {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrowing_transactions WHERE id = $1)",
        )
        .bind(loan_id)
        .fetch_one(&mut *conn)
        .await?;

        return Ok(if exists {
            CloseOutcome::AlreadyReturned
        } else {
            CloseOutcome::NotFound
        });
    };

    let event = sqlx::query_as::<_, ReturnEvent>(
        r#"
        INSERT INTO returning_transactions (borrowing_transaction_id, returned_at)
        VALUES ($1, $2)
        RETURNING id, borrowing_transaction_id, returned_at
        "#,
    )
    .bind(loan.id)
    .bind(at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(CloseOutcome::Closed { loan, event })
}
