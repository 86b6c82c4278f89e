//! Return endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::return_event::{ReturnBook, ReturnBookResponse, ReturnEvent},
    AppState,
};

use super::AuthenticatedUser;

/// Return a borrowed book
///
/// A bearer token is accepted but not required. "Not found" and "already
/// returned" are reported in the body with `success = false`.
#[utoipa::path(
    post,
    path = "/returns",
    tag = "returns",
    request_body = ReturnBook,
    responses(
        (status = 200, description = "Return outcome", body = ReturnBookResponse),
        (status = 400, description = "Malformed returned_at")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    caller: Option<AuthenticatedUser>,
    Json(request): Json<ReturnBook>,
) -> AppResult<Json<ReturnBookResponse>> {
    let caller = caller.map(|AuthenticatedUser(c)| c);
    let response = state.services.returns.return_book(caller, request).await?;
    Ok(Json(response))
}

/// List the return events of a loan
#[utoipa::path(
    get,
    path = "/loans/{id}/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Return events", body = Vec<ReturnEvent>),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn list_returns(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<ReturnEvent>>> {
    let events = state.services.returns.list_events(&caller, id).await?;
    Ok(Json(events))
}
