//! Shared fixtures

use std::sync::atomic::{AtomicU64, Ordering};

use lending_server::{
    models::user::CallerContext,
    repository::Repository,
    services::Services,
};
use sqlx::{postgres::PgPoolOptions, PgPool};

static SEQ: AtomicU64 = AtomicU64::new(0);

/// Process-unique number for ISBNs and emails
fn unique() -> u64 {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
    (nanos + SEQ.fetch_add(1, Ordering::SeqCst)) % 10_000_000_000_000
}

pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub struct Env {
    pub pool: PgPool,
    pub repository: Repository,
    pub services: Services,
}

pub async fn env() -> Env {
    let pool = pool().await;
    let repository = Repository::new(pool.clone());
    let services = Services::new(repository.clone());
    Env { pool, repository, services }
}

pub async fn insert_borrower(pool: &PgPool) -> CallerContext {
    let n = unique();
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO borrowers (name, email) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("Reader {}", n))
    .bind(format!("reader-{}@example.org", n))
    .fetch_one(pool)
    .await
    .expect("insert borrower");

    CallerContext::borrower(id)
}

/// Book with author, category and, when `stock` is given, a stock row
pub async fn insert_book(pool: &PgPool, stock: Option<i32>) -> i32 {
    let author_id: i32 = sqlx::query_scalar(
        "INSERT INTO authors (name, bio) VALUES ('Ursula K. Le Guin', 'Novelist') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("insert author");

    let category_id: i32 = sqlx::query_scalar(
        "INSERT INTO categories (name, description) VALUES ('Fiction', 'Novels') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("insert category");

    let book_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO books (title, author_id, category_id, isbn, publication_year, description)
        VALUES ('The Dispossessed', $1, $2, $3, 1974, 'An ambiguous utopia')
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(category_id)
    .bind(format!("{:013}", unique()))
    .fetch_one(pool)
    .await
    .expect("insert book");

    if let Some(total) = stock {
        sqlx::query("INSERT INTO book_stocks (book_id, total_stock) VALUES ($1, $2)")
            .bind(book_id)
            .bind(total)
            .execute(pool)
            .await
            .expect("insert stock");
    }

    book_id
}

pub async fn stock_of(pool: &PgPool, book_id: i32) -> i32 {
    sqlx::query_scalar("SELECT total_stock FROM book_stocks WHERE book_id = $1")
        .bind(book_id)
        .fetch_one(pool)
        .await
        .expect("read stock")
}

pub async fn loans_for_book(pool: &PgPool, book_id: i32) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM borrowing_transactions WHERE book_id = $1")
        .bind(book_id)
        .fetch_one(pool)
        .await
        .expect("count loans")
}
