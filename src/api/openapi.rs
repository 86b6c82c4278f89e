//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, loans, returns, stock};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lending API",
        version = "0.3.0",
        description = "Library lending server: borrowing, returns and stock"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::list_loans,
        loans::create_loan,
        loans::get_loan,
        loans::update_loan,
        loans::patch_due_date,
        loans::force_close,
        // Returns
        returns::return_book,
        returns::list_returns,
        // Stock
        stock::get_stock,
        stock::update_stock,
    ),
    components(
        schemas(
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            crate::models::loan::CreateLoan,
            crate::models::loan::UpdateLoan,
            crate::models::loan::PatchDueDate,
            crate::models::loan::ForceClose,
            // Catalog references
            crate::models::catalog::BookRef,
            crate::models::catalog::AuthorRef,
            crate::models::catalog::CategoryRef,
            crate::models::catalog::BorrowerRef,
            // Returns
            crate::models::return_event::ReturnBook,
            crate::models::return_event::ReturnBookResponse,
            crate::models::return_event::ReturnEvent,
            // Stock
            crate::models::stock::BookStock,
            crate::models::stock::BookStockDetails,
            crate::models::stock::UpdateBookStock,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Borrowing lifecycle"),
        (name = "returns", description = "Returns and the return log"),
        (name = "stock", description = "Available copies per book")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
