//! Return path: closes a loan and records its return event

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::parse_timestamp,
        return_event::{CloseOutcome, ReturnBook, ReturnBookResponse, ReturnEvent},
        user::CallerContext,
    },
    repository::{LoanStore, ReturnStore},
};

#[derive(Clone)]
pub struct ReturnsService {
    loans: Arc<dyn LoanStore>,
    returns: Arc<dyn ReturnStore>,
}

impl ReturnsService {
    pub fn new(loans: Arc<dyn LoanStore>, returns: Arc<dyn ReturnStore>) -> Self {
        Self { loans, returns }
    }

    /// Return a borrowed book.
    ///
    /// Not gated by role or ownership: anyone holding the transaction id may
    /// return it. `caller` is only logged. Stock is left untouched.
    pub async fn return_book(&self, caller: Option<CallerContext>, request: ReturnBook) -> AppResult<ReturnBookResponse> {
        let Some(loan) = self.loans.get_by_id(request.transaction_id).await? else {
            return Ok(ReturnBookResponse::not_found());
        };

        if loan.is_returned() {
            return Ok(ReturnBookResponse::already_returned());
        }

        let at = parse_timestamp(&request.returned_at)?;

        let response = match self.returns.record_return(loan.id, &request.returned_at, at).await? {
            CloseOutcome::Closed { event, .. } => {
                tracing::info!(
                    loan_id = loan.id,
                    event_id = event.id,
                    caller_id = caller.map(|c| c.caller_id),
                    "Book returned"
                );
                ReturnBookResponse::returned()
            }
            // Lost a race against another return of the same loan
            CloseOutcome::AlreadyReturned => ReturnBookResponse::already_returned(),
            CloseOutcome::NotFound => ReturnBookResponse::not_found(),
        };

        Ok(response)
    }

    /// Return events of a loan visible to the caller
    pub async fn list_events(&self, caller: &CallerContext, loan_id: i32) -> AppResult<Vec<ReturnEvent>> {
        self.loans
            .find(loan_id, caller.loan_owner_filter())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found or does not belong to user", loan_id)))?;

        self.returns.list_for_loan(loan_id).await
    }
}
