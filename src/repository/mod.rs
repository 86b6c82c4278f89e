//! Repository layer for database operations.
//!
//! Services talk to the store through the traits below; the Postgres
//! repositories implement them. Every method that writes more than one row
//! runs in a single database transaction.

pub mod catalog;
pub mod loans;
pub mod returns;
pub mod stock;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::BookRef,
        loan::{Loan, LoanDetails, NewLoan, UpdateLoan},
        return_event::{CloseOutcome, ReturnEvent},
        stock::BookStock,
    },
};

/// Loan persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Insert the loan and take one copy off the book's stock, atomically
    async fn create_with_stock(&self, loan: &NewLoan) -> AppResult<Loan>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Loan>>;

    /// Loan visible under `owner` (`None` = unrestricted)
    async fn find(&self, id: i32, owner: Option<i32>) -> AppResult<Option<Loan>>;

    async fn find_details(&self, id: i32, owner: Option<i32>) -> AppResult<Option<LoanDetails>>;

    async fn list_details(&self, owner: Option<i32>) -> AppResult<Vec<LoanDetails>>;

    /// Raw overwrite of every mutable field
    async fn overwrite(&self, id: i32, owner: Option<i32>, fields: &UpdateLoan) -> AppResult<Option<Loan>>;

    /// Set the due date of a loan that is still out; `None` if absent or returned
    async fn set_due_date(&self, id: i32, due_date: &str) -> AppResult<Option<Loan>>;

    /// Close the loan, record the return event and put the copy back in stock
    async fn force_close(&self, id: i32, returned_at: &str, at: NaiveDateTime) -> AppResult<CloseOutcome>;
}

/// Return log persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReturnStore: Send + Sync {
    /// Mark the loan returned and append the event, atomically
    async fn record_return(&self, loan_id: i32, returned_at: &str, at: NaiveDateTime) -> AppResult<CloseOutcome>;

    async fn list_for_loan(&self, loan_id: i32) -> AppResult<Vec<ReturnEvent>>;
}

/// Stock ledger persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockStore: Send + Sync {
    async fn fetch(&self, book_id: i32) -> AppResult<Option<BookStock>>;

    async fn set_total(&self, book_id: i32, total_stock: i32) -> AppResult<Option<BookStock>>;
}

/// Read-only catalog lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_book(&self, book_id: i32) -> AppResult<Option<BookRef>>;
}

/// Store liveness
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub loans: loans::LoansRepository,
    pub returns: returns::ReturnsRepository,
    pub stock: stock::StockRepository,
    pub catalog: catalog::CatalogRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            loans: loans::LoansRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            stock: stock::StockRepository::new(pool.clone()),
            catalog: catalog::CatalogRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl HealthStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Foreign-key violations mean a referenced book or borrower does not exist
pub(crate) fn map_missing_reference(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
            AppError::NotFound("Referenced book or borrower not found".to_string())
        }
        _ => AppError::Database(e),
    }
}
