//! Loan creation and stock consistency

use lending_server::{
    error::AppError,
    models::{
        loan::{CreateLoan, ForceClose, LoanStatus, PatchDueDate, UpdateLoan},
        user::CallerContext,
    },
    repository::{LoanStore, ReturnStore},
};
use tokio::task::JoinSet;

use crate::common::{env, insert_book, insert_borrower, loans_for_book, stock_of};

fn request(book_id: i32) -> CreateLoan {
    CreateLoan {
        book_id,
        due_date: "2030-01-15 00:00:00".to_string(),
    }
}

#[tokio::test]
#[ignore]
async fn loan_takes_one_copy() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(3)).await;

    let loan = env.services.loans.create_loan(&caller, request(book_id)).await.unwrap();

    assert_eq!(loan.status, LoanStatus::Borrowed);
    assert_eq!(loan.borrower.id, caller.caller_id);
    assert_eq!(loan.book.title.as_deref(), Some("The Dispossessed"));
    assert!(loan.returned_at.is_none());
    assert_eq!(stock_of(&env.pool, book_id).await, 2);
    assert_eq!(loans_for_book(&env.pool, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn empty_stock_refuses_without_writing() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(0)).await;

    let err = env.services.loans.create_loan(&caller, request(book_id)).await.unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(stock_of(&env.pool, book_id).await, 0);
    assert_eq!(loans_for_book(&env.pool, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn missing_stock_row_refuses_without_writing() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, None).await;

    let err = env.services.loans.create_loan(&caller, request(book_id)).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(loans_for_book(&env.pool, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn unknown_book_is_not_found() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;

    let err = env.services.loans.create_loan(&caller, request(i32::MAX)).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore]
async fn concurrent_loans_never_oversell() {
    let env = env().await;
    let book_id = insert_book(&env.pool, Some(1)).await;

    let mut callers = Vec::new();
    for _ in 0..10 {
        callers.push(insert_borrower(&env.pool).await);
    }

    let mut tasks = JoinSet::new();
    for caller in callers {
        let services = env.services.clone();
        tasks.spawn(async move { services.loans.create_loan(&caller, request(book_id)).await });
    }

    let mut created = 0;
    let mut refused = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::InvalidState(_)) => refused += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(refused, 9);
    assert_eq!(stock_of(&env.pool, book_id).await, 0);
    assert_eq!(loans_for_book(&env.pool, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn borrowers_only_see_their_own_loans() {
    let env = env().await;
    let alice = insert_borrower(&env.pool).await;
    let bob = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(5)).await;

    let alices = env.services.loans.create_loan(&alice, request(book_id)).await.unwrap();
    let bobs = env.services.loans.create_loan(&bob, request(book_id)).await.unwrap();

    let visible = env.services.loans.list_loans(&alice).await.unwrap();
    assert!(visible.iter().all(|l| l.borrower.id == alice.caller_id));
    assert!(visible.iter().any(|l| l.id == alices.id));

    let err = env.services.loans.get_loan(&alice, bobs.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let admin = CallerContext::admin(1);
    let all = env.services.loans.list_loans(&admin).await.unwrap();
    assert!(all.iter().any(|l| l.id == alices.id));
    assert!(all.iter().any(|l| l.id == bobs.id));
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
#[ignore]
async fn due_date_patch_on_open_loan_only() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(2)).await;
    let admin = CallerContext::admin(1);

    let loan = env.services.loans.create_loan(&caller, request(book_id)).await.unwrap();

    let patched = env
        .services
        .loans
        .patch_due_date(&admin, loan.id, PatchDueDate { due_date: "2030-02-01 00:00:00".to_string() })
        .await
        .unwrap();
    assert_eq!(patched.due_date, "2030-02-01 00:00:00");

    env.services
        .loans
        .force_close(&admin, loan.id, ForceClose::default())
        .await
        .unwrap();

    let err = env
        .services
        .loans
        .patch_due_date(&admin, loan.id, PatchDueDate { due_date: "2030-03-01 00:00:00".to_string() })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
#[ignore]
async fn force_close_puts_copy_back() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(1)).await;
    let admin = CallerContext::admin(1);

    let loan = env.services.loans.create_loan(&caller, request(book_id)).await.unwrap();
    assert_eq!(stock_of(&env.pool, book_id).await, 0);

    let closed = env
        .services
        .loans
        .force_close(
            &admin,
            loan.id,
            ForceClose { returned_at: Some("2024-06-01 10:00:00".to_string()) },
        )
        .await
        .unwrap();

    assert_eq!(closed.status, LoanStatus::Returned);
    assert_eq!(closed.returned_at.as_deref(), Some("2024-06-01 10:00:00"));
    assert_eq!(stock_of(&env.pool, book_id).await, 1);

    let events = env.services.returns.list_events(&admin, loan.id).await.unwrap();
    assert_eq!(events.len(), 1);

    let err = env
        .services
        .loans
        .force_close(&admin, loan.id, ForceClose::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(stock_of(&env.pool, book_id).await, 1);
}

#[tokio::test]
#[ignore]
async fn raw_overwrite_leaves_ledger_and_log_alone() {
    let env = env().await;
    let caller = insert_borrower(&env.pool).await;
    let book_id = insert_book(&env.pool, Some(2)).await;
    let admin = CallerContext::admin(1);

    let loan = env.services.loans.create_loan(&caller, request(book_id)).await.unwrap();
    assert_eq!(stock_of(&env.pool, book_id).await, 1);

    let fields = UpdateLoan {
        book_id,
        borrower_id: caller.caller_id,
        due_date: "2031-01-01 00:00:00".to_string(),
        returned_at: Some("   ".to_string()),
        status: LoanStatus::Returned,
    };
    let updated = env.services.loans.update_loan(&admin, loan.id, fields).await.unwrap();
    assert_eq!(updated.status, LoanStatus::Returned);
    assert_eq!(updated.due_date, "2031-01-01 00:00:00");

    let stored = env.repository.loans.get_by_id(loan.id).await.unwrap().unwrap();
    assert!(stored.returned_at.is_none());
    assert_eq!(stored.status, LoanStatus::Returned);

    assert_eq!(stock_of(&env.pool, book_id).await, 1);
    assert!(env.repository.returns.list_for_loan(loan.id).await.unwrap().is_empty());
}
