//! Read-only lookups into the catalog relations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::CatalogStore;
use crate::{
    error::AppResult,
    models::catalog::{BookRef, BookRow},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn get_book(&self, book_id: i32) -> AppResult<Option<BookRef>> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT b.id, b.title, b.publication_year, b.description,
                   a.id AS author_id, a.name AS author_name, a.bio AS author_bio,
                   c.id AS category_id, c.name AS category_name,
                   c.description AS category_description
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            LEFT JOIN categories c ON c.id = b.category_id
            WHERE b.id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BookRef::from))
    }
}
