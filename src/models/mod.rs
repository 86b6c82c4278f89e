//! Data models for the lending server

pub mod catalog;
pub mod loan;
pub mod return_event;
pub mod stock;
pub mod user;

// Re-export commonly used types
pub use catalog::{AuthorRef, BookRef, BorrowerRef, CategoryRef};
pub use loan::{Loan, LoanDetails, LoanStatus};
pub use return_event::{ReturnBookResponse, ReturnEvent};
pub use stock::BookStock;
pub use user::{CallerContext, Role, UserClaims};
