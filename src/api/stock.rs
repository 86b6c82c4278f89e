//! Book stock endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::stock::{BookStock, BookStockDetails, UpdateBookStock},
    AppState,
};

use super::AuthenticatedUser;

/// Get the available copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/stock",
    tag = "stock",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Stock with book details", body = BookStockDetails),
        (status = 404, description = "Book or stock not found")
    )
)]
pub async fn get_stock(
    State(state): State<AppState>,
    AuthenticatedUser(_caller): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BookStockDetails>> {
    let stock = state.services.stock.get_stock(book_id).await?;
    Ok(Json(stock))
}

/// Overwrite the available copies of a book (admin only)
#[utoipa::path(
    put,
    path = "/books/{id}/stock",
    tag = "stock",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBookStock,
    responses(
        (status = 200, description = "Stock updated", body = BookStock),
        (status = 400, description = "Negative stock"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Stock not found")
    )
)]
pub async fn update_stock(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<UpdateBookStock>,
) -> AppResult<Json<BookStock>> {
    let stock = state.services.stock.update_stock(&caller, book_id, request).await?;
    Ok(Json(stock))
}
