//! Stock ledger service: lookups and administrative overwrite

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        stock::{BookStock, BookStockDetails, UpdateBookStock},
        user::CallerContext,
    },
    repository::{CatalogStore, StockStore},
};

#[derive(Clone)]
pub struct StockService {
    stock: Arc<dyn StockStore>,
    catalog: Arc<dyn CatalogStore>,
}

impl StockService {
    pub fn new(stock: Arc<dyn StockStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { stock, catalog }
    }

    /// Stock of a book with the book, its author and category attached
    pub async fn get_stock(&self, book_id: i32) -> AppResult<BookStockDetails> {
        let stock = self
            .stock
            .fetch(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Stock for book {} not found", book_id)))?;

        let book = self
            .catalog
            .get_book(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", book_id)))?;

        Ok(BookStockDetails::new(stock, book))
    }

    /// Overwrite the available copy count (admin only)
    pub async fn update_stock(&self, caller: &CallerContext, book_id: i32, request: UpdateBookStock) -> AppResult<BookStock> {
        caller.require_admin()?;
        request.validate()?;

        let stock = self
            .stock
            .set_total(book_id, request.total_stock)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Stock for book {} not found", book_id)))?;

        tracing::info!(book_id, total_stock = stock.total_stock, caller_id = caller.caller_id, "Stock updated");
        Ok(stock)
    }
}
