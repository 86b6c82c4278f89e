//! Return recording

use lending_server::{
    error::{AppError, ErrorCode},
    models::{
        loan::{CreateLoan, LoanStatus, PatchDueDate},
        return_event::{ReturnBook, MSG_ALREADY_RETURNED, MSG_NOT_FOUND, MSG_RETURNED},
        user::CallerContext,
    },
    repository::LoanStore,
};

use crate::common::{env, insert_book, insert_borrower, stock_of};

fn return_of(transaction_id: i32, returned_at: &str) -> ReturnBook {
    ReturnBook {
        transaction_id,
        returned_at: returned_at.to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn borrow_extend_return() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(3)).await;
    let admin = CallerContext::admin(1);

    let loan = env
        .services
        .loans
        .create_loan(
            &caller,
            CreateLoan { book_id, due_date: "2024-06-15 00:00:00".to_string() },
        )
        .await
        .unwrap();
    assert_eq!(stock_of(&env.pool, book_id).await, 2);

    env.services
        .loans
        .patch_due_date(&admin, loan.id, PatchDueDate { due_date: "2024-06-30 00:00:00".to_string() })
        .await
        .unwrap();

    let response = env
        .services
        .returns
        .return_book(Some(caller), return_of(loan.id, "2024-06-01 10:00:00"))
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(response.message, MSG_RETURNED);

    let stored = env.repository.loans.get_by_id(loan.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Returned);
    assert_eq!(stored.returned_at.as_deref(), Some("2024-06-01 10:00:00"));
    assert_eq!(stored.due_date, "2024-06-30 00:00:00");

    let events = env.services.returns.list_events(&caller, loan.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].returned_at.to_string(), "2024-06-01 10:00:00");

    // plain returns leave the ledger alone
    assert_eq!(stock_of(&env.pool, book_id).await, 2);
}

#[tokio::test]
#[ignore]
async fn second_return_is_refused() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(1)).await;

    let loan = env
        .services
        .loans
        .create_loan(&caller, CreateLoan { book_id, due_date: "2030-01-01 00:00:00".to_string() })
        .await
        .unwrap();

    let first = env
        .services
        .returns
        .return_book(None, return_of(loan.id, "2024-06-01 10:00:00"))
        .await
        .unwrap();
    assert!(first.success);

    let second = env
        .services
        .returns
        .return_book(None, return_of(loan.id, "2024-06-02 10:00:00"))
        .await
        .unwrap();
    assert!(!second.success);
    assert_eq!(second.message, MSG_ALREADY_RETURNED);

    let events = env.services.returns.list_events(&caller, loan.id).await.unwrap();
    assert_eq!(events.len(), 1);

    let stored = env.repository.loans.get_by_id(loan.id).await.unwrap().unwrap();
    assert_eq!(stored.returned_at.as_deref(), Some("2024-06-01 10:00:00"));
}

#[tokio::test]
#[ignore]
async fn unknown_loan_is_a_soft_failure() {
    let env = env().await;

    let response = env
        .services
        .returns
        .return_book(None, return_of(i32::MAX, "2024-06-01 10:00:00"))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.message, MSG_NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn malformed_timestamp_changes_nothing() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(1)).await;

    let loan = env
        .services
        .loans
        .create_loan(&caller, CreateLoan { book_id, due_date: "2030-01-01 00:00:00".to_string() })
        .await
        .unwrap();

    let err = env
        .services
        .returns
        .return_book(None, return_of(loan.id, "yesterday"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
    assert!(matches!(err.code(), ErrorCode::ParseFailure));

    let stored = env.repository.loans.get_by_id(loan.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Borrowed);
    assert!(stored.returned_at.is_none());
    assert!(env.services.returns.list_events(&caller, loan.id).await.unwrap().is_empty());
}
