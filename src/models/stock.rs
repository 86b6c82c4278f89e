//! Book stock (available copies per book)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::catalog::BookRef;

/// Stock row, one per book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookStock {
    pub id: i32,
    pub book_id: i32,
    /// Copies currently available, never negative
    pub total_stock: i32,
}

/// Stock with the book expanded from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookStockDetails {
    pub id: i32,
    pub total_stock: i32,
    pub book: BookRef,
}

impl BookStockDetails {
    pub fn new(stock: BookStock, book: BookRef) -> Self {
        Self {
            id: stock.id,
            total_stock: stock.total_stock,
            book,
        }
    }
}

/// Administrative stock overwrite
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBookStock {
    #[validate(range(min = 0, message = "total_stock must not be negative"))]
    pub total_stock: i32,
}
