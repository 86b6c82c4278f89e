//! Loan endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, ForceClose, Loan, LoanDetails, PatchDueDate, UpdateLoan},
    AppState,
};

use super::AuthenticatedUser;

/// List loans visible to the caller
///
/// Admins see every loan, borrowers only their own. Ordered by loan id.
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible loans", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_loans(&caller).await?;
    Ok(Json(loans))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book or stock not found"),
        (status = 409, description = "Insufficient stock")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state.services.loans.create_loan(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Get loan details
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_loan(&caller, id).await?;
    Ok(Json(loan))
}

/// Overwrite loan fields
///
/// Administrative override: does not change stock nor record a return.
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn update_loan(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(fields): Json<UpdateLoan>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.update_loan(&caller, id, fields).await?;
    Ok(Json(loan))
}

/// Change the due date of an open loan
#[utoipa::path(
    put,
    path = "/loans/{id}/due-date",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = PatchDueDate,
    responses(
        (status = 200, description = "Due date changed", body = Loan),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn patch_due_date(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<PatchDueDate>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.patch_due_date(&caller, id, request).await?;
    Ok(Json(loan))
}

/// Close a loan and put the copy back in stock (admin only)
#[utoipa::path(
    post,
    path = "/loans/{id}/force-close",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body(content = ForceClose, description = "Return timestamp, defaults to now"),
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 400, description = "Malformed timestamp"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn force_close(
    State(state): State<AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
    request: Option<Json<ForceClose>>,
) -> AppResult<Json<Loan>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let loan = state.services.loans.force_close(&caller, id, request).await?;
    Ok(Json(loan))
}
