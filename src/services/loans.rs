//! Loan workflow: borrowing, visibility-scoped reads and administrative edits

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{
            format_timestamp, parse_timestamp, CreateLoan, ForceClose, Loan, LoanDetails, NewLoan,
            PatchDueDate, UpdateLoan,
        },
        return_event::CloseOutcome,
        user::CallerContext,
    },
    repository::LoanStore,
};

/// Returned for absent loans and for loans owned by someone else alike
fn loan_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Transaction {} not found or does not belong to user", id))
}

#[derive(Clone)]
pub struct LoansService {
    loans: Arc<dyn LoanStore>,
}

impl LoansService {
    pub fn new(loans: Arc<dyn LoanStore>) -> Self {
        Self { loans }
    }

    /// Borrow a copy of a book on behalf of the caller.
    ///
    /// The loan insert and the stock decrement commit together or not at all.
    /// The result carries identifier-only borrower/book references.
    pub async fn create_loan(&self, caller: &CallerContext, request: CreateLoan) -> AppResult<LoanDetails> {
        let new_loan = NewLoan {
            borrower_id: caller.caller_id,
            book_id: request.book_id,
            borrowed_at: format_timestamp(Utc::now().naive_utc()),
            due_date: request.due_date,
        };

        match self.loans.create_with_stock(&new_loan).await {
            Ok(loan) => {
                tracing::info!(
                    loan_id = loan.id,
                    book_id = loan.book_id,
                    borrower_id = loan.borrower_id,
                    "Loan created"
                );
                Ok(loan.into())
            }
            Err(e) => {
                if matches!(e, AppError::InvalidState(_) | AppError::NotFound(_)) {
                    tracing::warn!(book_id = new_loan.book_id, borrower_id = caller.caller_id, "Loan refused: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Get one loan with catalog references expanded
    pub async fn get_loan(&self, caller: &CallerContext, id: i32) -> AppResult<LoanDetails> {
        self.loans
            .find_details(id, caller.loan_owner_filter())
            .await?
            .ok_or_else(|| loan_not_found(id))
    }

    /// Loans visible to the caller, ordered by loan id
    pub async fn list_loans(&self, caller: &CallerContext) -> AppResult<Vec<LoanDetails>> {
        self.loans.list_details(caller.loan_owner_filter()).await
    }

    /// Raw overwrite of a loan's fields.
    ///
    /// Neither stock nor the return log is touched, so setting `status` to
    /// returned here does not put a copy back. Use [`Self::force_close`] for that.
    pub async fn update_loan(&self, caller: &CallerContext, id: i32, fields: UpdateLoan) -> AppResult<Loan> {
        let loan = self
            .loans
            .overwrite(id, caller.loan_owner_filter(), &fields)
            .await?
            .ok_or_else(|| loan_not_found(id))?;

        tracing::info!(loan_id = id, caller_id = caller.caller_id, status = %loan.status, "Loan overwritten");
        Ok(loan)
    }

    /// Change only the due date of a loan that is still out
    pub async fn patch_due_date(&self, caller: &CallerContext, id: i32, request: PatchDueDate) -> AppResult<Loan> {
        let loan = self
            .loans
            .find(id, caller.loan_owner_filter())
            .await?
            .ok_or_else(|| loan_not_found(id))?;

        if loan.is_returned() {
            return Err(AppError::InvalidState("Cannot change the due date of a returned loan".to_string()));
        }

        self.loans
            .set_due_date(loan.id, &request.due_date)
            .await?
            .ok_or_else(|| AppError::InvalidState("Cannot change the due date of a returned loan".to_string()))
    }

    /// Close a loan administratively: mark it returned, log the return and
    /// put the copy back in stock, in one transaction.
    pub async fn force_close(&self, caller: &CallerContext, id: i32, request: ForceClose) -> AppResult<Loan> {
        caller.require_admin()?;

        let returned_at = request
            .returned_at
            .unwrap_or_else(|| format_timestamp(Utc::now().naive_utc()));
        let at = parse_timestamp(&returned_at)?;

        match self.loans.force_close(id, &returned_at, at).await? {
            CloseOutcome::Closed { loan, event } => {
                tracing::info!(loan_id = loan.id, event_id = event.id, book_id = loan.book_id, "Loan force-closed");
                Ok(loan)
            }
            CloseOutcome::NotFound => Err(loan_not_found(id)),
            CloseOutcome::AlreadyReturned => Err(AppError::InvalidState("Book already returned".to_string())),
        }
    }
}
