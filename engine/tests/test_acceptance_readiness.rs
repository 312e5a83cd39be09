//! Acceptance readiness: a loan leaves Accepted only when biller,
//! lender, and borrower accounts all exist and are verified.

use loan_lifecycle_rs::lifecycle::LoanLifecycle;
use loan_lifecycle_rs::manager::AdvanceOutcome;
use loan_lifecycle_rs::models::{
    AccountState, Biller, Loan, LoanState, PaymentAccount,
};
use loan_lifecycle_rs::store::{InMemoryLoanStore, RecordingNotifier};

fn verified() -> PaymentAccount {
    PaymentAccount::new(AccountState::Verified)
}

fn advance(loan: Loan) -> (AdvanceOutcome, LoanState) {
    let id = loan.id();
    let store = InMemoryLoanStore::new();
    store.insert(loan);
    let lifecycle = LoanLifecycle::new(store, RecordingNotifier::new());
    let outcome = lifecycle.advance_loan(id, None).unwrap();
    let state = lifecycle.store().get(id).unwrap().state();
    (outcome, state)
}

#[test]
fn test_fully_connected_loan_starts_funding() {
    let loan = Loan::new(LoanState::Accepted, 3)
        .with_lender(verified())
        .with_borrower(verified())
        .with_biller(Biller::new(verified()));
    let (outcome, state) = advance(loan);

    assert!(outcome.changed());
    assert_eq!(state, LoanState::Funding);
}

#[test]
fn test_missing_biller_stays_accepted() {
    let loan = Loan::new(LoanState::Accepted, 3)
        .with_lender(verified())
        .with_borrower(verified());
    let (outcome, state) = advance(loan);

    assert!(!outcome.changed());
    assert_eq!(state, LoanState::Accepted);
}

#[test]
fn test_missing_borrower_account_stays_accepted() {
    let loan = Loan::new(LoanState::Accepted, 3)
        .with_lender(verified())
        .with_biller(Biller::new(verified()));
    let (outcome, state) = advance(loan);

    assert!(!outcome.changed());
    assert_eq!(state, LoanState::Accepted);
}

#[test]
fn test_biller_without_account_stays_accepted() {
    let loan = Loan::new(LoanState::Accepted, 3)
        .with_lender(verified())
        .with_borrower(verified())
        .with_biller(Biller::without_account());
    let (outcome, state) = advance(loan);

    assert!(!outcome.changed());
    assert_eq!(state, LoanState::Accepted);
}

#[test]
fn test_pending_borrower_account_stays_accepted() {
    // Loan{state=Accepted} with borrower account state=Pending
    let loan = Loan::new(LoanState::Accepted, 3)
        .with_lender(verified())
        .with_borrower(PaymentAccount::new(AccountState::Pending))
        .with_biller(Biller::new(verified()));
    let (outcome, state) = advance(loan);

    assert!(matches!(outcome, AdvanceOutcome::Unchanged { .. }));
    assert!(!outcome.changed());
    assert_eq!(state, LoanState::Accepted);
}

#[test]
fn test_suspended_lender_account_stays_accepted() {
    let loan = Loan::new(LoanState::Accepted, 3)
        .with_lender(PaymentAccount::new(AccountState::Suspended))
        .with_borrower(verified())
        .with_biller(Biller::new(verified()));
    let (outcome, state) = advance(loan);

    assert!(!outcome.changed());
    assert_eq!(state, LoanState::Accepted);
}

#[test]
fn test_unverified_biller_account_stays_accepted() {
    let loan = Loan::new(LoanState::Accepted, 3)
        .with_lender(verified())
        .with_borrower(verified())
        .with_biller(Biller::new(PaymentAccount::new(AccountState::Pending)));
    let (outcome, state) = advance(loan);

    assert!(!outcome.changed());
    assert_eq!(state, LoanState::Accepted);
}
