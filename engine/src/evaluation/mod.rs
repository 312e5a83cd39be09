//! Payment evaluation helpers.
//!
//! Pure predicates over an already-loaded loan. Every function follows the
//! same contract: missing data (no payments loaded, no account relation)
//! yields `false` or `None`, never an error. The engine treats "cannot
//! tell yet" the same as "condition not met" and re-evaluates on the next
//! advance call.

pub mod strategy;

pub use strategy::{strategy_for, PaymentEvaluationStrategy};

use crate::models::{Loan, LoanPayment, PaymentState, PaymentType};

/// Select the governing payment of `payment_type` for state evaluation.
///
/// When several payments of the same type exist (e.g. a retried funding
/// transfer), only the newest one is authoritative: latest `created_at`
/// by default, or highest `payment_number` when `by_order` is set. Older
/// records of the same type are never consulted again.
///
/// # Example
/// ```
/// use loan_lifecycle_rs::evaluation::governing_payment;
/// use loan_lifecycle_rs::models::{Loan, LoanPayment, LoanState, PaymentType};
///
/// let loan = Loan::new(LoanState::Repaying, 3);
/// let loan = loan
///     .clone()
///     .with_payment(LoanPayment::new(loan.id(), PaymentType::Repayment, 1))
///     .with_payment(LoanPayment::new(loan.id(), PaymentType::Repayment, 2));
///
/// let governing = governing_payment(&loan, PaymentType::Repayment, true).unwrap();
/// assert_eq!(governing.payment_number(), 2);
/// ```
pub fn governing_payment(
    loan: &Loan,
    payment_type: PaymentType,
    by_order: bool,
) -> Option<&LoanPayment> {
    let mut typed = loan
        .payments()
        .iter()
        .filter(|p| p.payment_type() == payment_type);

    let first = typed.next()?;
    let governing = typed.fold(first, |governing, candidate| {
        let newer = if by_order {
            candidate.payment_number() > governing.payment_number()
        } else {
            candidate.created_at() > governing.created_at()
        };
        if newer {
            candidate
        } else {
            governing
        }
    });
    Some(governing)
}

/// Whether the governing payment of `payment_type` completed.
pub fn is_payment_completed(loan: &Loan, payment_type: PaymentType) -> bool {
    governing_payment(loan, payment_type, false)
        .map(|p| p.state() == PaymentState::Completed)
        .unwrap_or(false)
}

/// Whether the governing payment of `payment_type` failed.
pub fn is_payment_failed(loan: &Loan, payment_type: PaymentType) -> bool {
    governing_payment(loan, payment_type, false)
        .map(|p| p.state() == PaymentState::Failed)
        .unwrap_or(false)
}

/// Whether the governing payment of `payment_type` is still pending.
pub fn is_payment_pending(loan: &Loan, payment_type: PaymentType) -> bool {
    governing_payment(loan, payment_type, false)
        .map(|p| p.state() == PaymentState::Pending)
        .unwrap_or(false)
}

/// Whether the highest-numbered payment of `payment_type` is the loan's
/// final expected installment.
///
/// Uses order-based selection: the installment schedule, not the retry
/// history, decides which payment is last.
pub fn is_last_payment(loan: &Loan, payment_type: PaymentType) -> bool {
    governing_payment(loan, payment_type, true)
        .map(|p| p.payment_number() == loan.payments_count())
        .unwrap_or(false)
}

/// Whether the loan has biller, lender, and borrower accounts connected,
/// all referenced IDs present, and all three accounts verified.
///
/// This is the readiness gate for leaving `Accepted` and for stage
/// handovers (`Funded` -> `Disbursing`, `Disbursed` -> `Repaying`).
pub fn has_valid_accounts_connected(loan: &Loan) -> bool {
    let Some(biller) = loan.biller() else {
        return false;
    };
    let (Some(lender_account), Some(borrower_account), Some(biller_account)) = (
        loan.lender_account(),
        loan.borrower_account(),
        biller.payment_account(),
    ) else {
        return false;
    };

    let ids_present = loan.biller_id().is_some()
        && loan.lender_id().is_some()
        && loan.borrower_id().is_some()
        && biller.payment_account_id().is_some()
        && loan.lender_account_id().is_some()
        && loan.borrower_account_id().is_some();
    if !ids_present {
        return false;
    }

    lender_account.is_verified() && borrower_account.is_verified() && biller_account.is_verified()
}
