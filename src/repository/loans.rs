//! Loans repository for database operations

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};

use super::{map_missing_reference, returns, stock, LoanStore};
use crate::{
    error::AppResult,
    models::{
        loan::{Loan, LoanDetails, LoanDetailsRow, LoanStatus, NewLoan, UpdateLoan},
        return_event::CloseOutcome,
    },
};

/// Loan joined with borrower, book, author and category
const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.borrower_id, l.book_id, l.borrowed_at, l.due_date,
           l.returned_at, l.status,
           br.name AS borrower_name, br.email AS borrower_email,
           b.title AS book_title, b.publication_year AS book_publication_year,
           b.description AS book_description,
           a.id AS author_id, a.name AS author_name, a.bio AS author_bio,
           c.id AS category_id, c.name AS category_name,
           c.description AS category_description
    FROM borrowing_transactions l
    LEFT JOIN borrowers br ON br.id = l.borrower_id
    LEFT JOIN books b ON b.id = l.book_id
    LEFT JOIN authors a ON a.id = b.author_id
    LEFT JOIN categories c ON c.id = b.category_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStore for LoansRepository {
    async fn create_with_stock(&self, loan: &NewLoan) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO borrowing_transactions (borrower_id, book_id, borrowed_at, due_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(loan.borrower_id)
        .bind(loan.book_id)
        .bind(&loan.borrowed_at)
        .bind(&loan.due_date)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_missing_reference)?;

        // Dropping `tx` on error rolls the insert back
        stock::decrement_if_positive(&mut *tx, created.book_id).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM borrowing_transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    async fn find(&self, id: i32, owner: Option<i32>) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT * FROM borrowing_transactions
            WHERE id = $1 AND ($2::int IS NULL OR borrower_id = $2)
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn find_details(&self, id: i32, owner: Option<i32>) -> AppResult<Option<LoanDetails>> {
        let query = format!(
            "{} WHERE l.id = $1 AND ($2::int IS NULL OR l.borrower_id = $2)",
            DETAILS_SELECT
        );

        let row = sqlx::query_as::<_, LoanDetailsRow>(&query)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(LoanDetails::from))
    }

    async fn list_details(&self, owner: Option<i32>) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            "{} WHERE ($1::int IS NULL OR l.borrower_id = $1) ORDER BY l.id",
            DETAILS_SELECT
        );

        let rows = sqlx::query_as::<_, LoanDetailsRow>(&query)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(LoanDetails::from).collect())
    }

    async fn overwrite(&self, id: i32, owner: Option<i32>, fields: &UpdateLoan) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE borrowing_transactions
            SET book_id = $3, borrower_id = $4, due_date = $5, returned_at = $6, status = $7
            WHERE id = $1 AND ($2::int IS NULL OR borrower_id = $2)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(fields.book_id)
        .bind(fields.borrower_id)
        .bind(&fields.due_date)
        .bind(fields.normalized_returned_at())
        .bind(fields.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_missing_reference)?;
        Ok(loan)
    }

    async fn set_due_date(&self, id: i32, due_date: &str) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE borrowing_transactions SET due_date = $2
            WHERE id = $1 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(due_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    async fn force_close(&self, id: i32, returned_at: &str, at: NaiveDateTime) -> AppResult<CloseOutcome> {
        let mut tx = self.pool.begin().await?;

        let outcome = returns::close_loan(&mut *tx, id, returned_at, at).await?;
        if let CloseOutcome::Closed { loan, .. } = &outcome {
            stock::increment(&mut *tx, loan.book_id).await?;
            tx.commit().await?;
        }

        Ok(outcome)
    }
}
