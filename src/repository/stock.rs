//! Stock ledger repository.
//!
//! The decrement/increment helpers take a connection so they can only be
//! used inside the caller's transaction. Concurrent decrements on the same
//! book serialize on the row lock taken by `SELECT ... FOR UPDATE`.

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres};

use super::StockStore;
use crate::{
    error::{AppError, AppResult},
    models::stock::BookStock,
};

#[derive(Clone)]
pub struct StockRepository {
    pool: Pool<Postgres>,
}

impl StockRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockStore for StockRepository {
    async fn fetch(&self, book_id: i32) -> AppResult<Option<BookStock>> {
        let stock = sqlx::query_as::<_, BookStock>(
            "SELECT id, book_id, total_stock FROM book_stocks WHERE book_id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stock)
    }

    async fn set_total(&self, book_id: i32, total_stock: i32) -> AppResult<Option<BookStock>> {
        let stock = sqlx::query_as::<_, BookStock>(
            r#"
            UPDATE book_stocks SET total_stock = $2
            WHERE book_id = $1
            RETURNING id, book_id, total_stock
            "#,
        )
        .bind(book_id)
        .bind(total_stock)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stock)
    }
}

/// Lock the book's stock row and take one copy off it.
///
/// Fails with `NotFound` when the book has no stock row and with
/// `InvalidState` when no copy is left; the caller must then roll back.
pub(crate) async fn decrement_if_positive(conn: &mut PgConnection, book_id: i32) -> AppResult<BookStock> {
    let stock = sqlx::query_as::<_, BookStock>(
        "SELECT id, book_id, total_stock FROM book_stocks WHERE book_id = $1 FOR UPDATE",
    )
    .bind(book_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Stock for book {} not found", book_id)))?;

    if stock.total_stock <= 0 {
        return Err(AppError::InvalidState("insufficient book stock".to_string()));
    }

    let updated = sqlx::query_as::<_, BookStock>(
        r#"
        UPDATE book_stocks SET total_stock = total_stock - 1
        WHERE id = $1
        RETURNING id, book_id, total_stock
        "#,
    )
    .bind(stock.id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(updated)
}

/// Put one copy back
pub(crate) async fn increment(conn: &mut PgConnection, book_id: i32) -> AppResult<BookStock> {
    sqlx::query_as::<_, BookStock>(
        r#"
        UPDATE book_stocks SET total_stock = total_stock + 1
        WHERE book_id = $1
        RETURNING id, book_id, total_stock
        "#,
    )
    .bind(book_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Stock for book {} not found", book_id)))
}
