//! Payment evaluation strategies, one per lifecycle segment.
//!
//! Each strategy answers the same four questions about a loan: should the
//! segment complete, pause, resume, or fall back. The decision tables in
//! `manager::tables` are written purely in terms of these predicates, so
//! segment-specific rules (like the repayment final-installment check)
//! live here and nowhere else.

use crate::evaluation::{
    is_last_payment, is_payment_completed, is_payment_failed, is_payment_pending,
};
use crate::models::{Loan, LoanState, PaymentType};
use crate::rules::UnsupportedStateError;

/// Uniform four-predicate contract evaluated over an already-loaded loan.
///
/// Implementations are pure: no I/O, no side effects, and absence of data
/// always yields `false`.
pub trait PaymentEvaluationStrategy: Send + Sync {
    /// Payment type this strategy evaluates.
    fn payment_type(&self) -> PaymentType;

    /// Whether the segment's governing payment completed (for repayment:
    /// completed *and* final installment).
    fn should_complete(&self, loan: &Loan) -> bool;

    /// Whether the segment should pause (governing payment failed).
    fn should_pause(&self, loan: &Loan) -> bool;

    /// Whether a paused segment should resume (governing payment pending).
    fn should_resume(&self, loan: &Loan) -> bool;

    /// Segment-specific escape hatch (write-off, forced closure).
    /// No segment defines one yet.
    fn should_fallback(&self, _loan: &Loan) -> bool {
        false
    }
}

/// Strategy for the `Accepted` state: no payments exist yet, so every
/// predicate is false. Acceptance readiness is checked directly by the
/// `AccountsReady` guard instead.
pub struct AcceptedStrategy;

impl PaymentEvaluationStrategy for AcceptedStrategy {
    fn payment_type(&self) -> PaymentType {
        PaymentType::Funding
    }

    fn should_complete(&self, _loan: &Loan) -> bool {
        false
    }

    fn should_pause(&self, _loan: &Loan) -> bool {
        false
    }

    fn should_resume(&self, _loan: &Loan) -> bool {
        false
    }
}

/// Strategy for the funding segment (Funding, FundingPaused, Funded).
pub struct FundingStrategy;

impl PaymentEvaluationStrategy for FundingStrategy {
    fn payment_type(&self) -> PaymentType {
        PaymentType::Funding
    }

    fn should_complete(&self, loan: &Loan) -> bool {
        is_payment_completed(loan, PaymentType::Funding)
    }

    fn should_pause(&self, loan: &Loan) -> bool {
        is_payment_failed(loan, PaymentType::Funding)
    }

    fn should_resume(&self, loan: &Loan) -> bool {
        is_payment_pending(loan, PaymentType::Funding)
    }
}

/// Strategy for the disbursement segment (Disbursing, DisbursingPaused,
/// Disbursed).
pub struct DisbursementStrategy;

impl PaymentEvaluationStrategy for DisbursementStrategy {
    fn payment_type(&self) -> PaymentType {
        PaymentType::Disbursement
    }

    fn should_complete(&self, loan: &Loan) -> bool {
        is_payment_completed(loan, PaymentType::Disbursement)
    }

    fn should_pause(&self, loan: &Loan) -> bool {
        is_payment_failed(loan, PaymentType::Disbursement)
    }

    fn should_resume(&self, loan: &Loan) -> bool {
        is_payment_pending(loan, PaymentType::Disbursement)
    }
}

/// Strategy for the repayment segment (Repaying, RepaymentPaused, Repaid).
///
/// Completion requires the conjunction: the governing repayment completed
/// *and* its installment number equals the loan's expected count. A
/// completed intermediate installment must never close out the segment.
pub struct RepaymentStrategy;

impl PaymentEvaluationStrategy for RepaymentStrategy {
    fn payment_type(&self) -> PaymentType {
        PaymentType::Repayment
    }

    fn should_complete(&self, loan: &Loan) -> bool {
        is_payment_completed(loan, PaymentType::Repayment)
            && is_last_payment(loan, PaymentType::Repayment)
    }

    fn should_pause(&self, loan: &Loan) -> bool {
        is_payment_failed(loan, PaymentType::Repayment)
    }

    fn should_resume(&self, loan: &Loan) -> bool {
        is_payment_pending(loan, PaymentType::Repayment)
    }
}

/// Strategy for the terminal `Closed` state: nothing ever fires.
pub struct ClosedStrategy;

impl PaymentEvaluationStrategy for ClosedStrategy {
    fn payment_type(&self) -> PaymentType {
        PaymentType::Repayment
    }

    fn should_complete(&self, _loan: &Loan) -> bool {
        false
    }

    fn should_pause(&self, _loan: &Loan) -> bool {
        false
    }

    fn should_resume(&self, _loan: &Loan) -> bool {
        false
    }
}

static ACCEPTED: AcceptedStrategy = AcceptedStrategy;
static FUNDING: FundingStrategy = FundingStrategy;
static DISBURSEMENT: DisbursementStrategy = DisbursementStrategy;
static REPAYMENT: RepaymentStrategy = RepaymentStrategy;
static CLOSED: ClosedStrategy = ClosedStrategy;

/// Resolve the strategy registered for a lifecycle state.
///
/// The registration is static: strategies are stateless and shared, so
/// dispatch is a table lookup rather than per-call construction.
pub fn strategy_for(
    state: LoanState,
) -> Result<&'static dyn PaymentEvaluationStrategy, UnsupportedStateError> {
    use LoanState::*;
    match state {
        Accepted => Ok(&ACCEPTED),
        Funding | FundingPaused | Funded => Ok(&FUNDING),
        Disbursing | DisbursingPaused | Disbursed => Ok(&DISBURSEMENT),
        Repaying | RepaymentPaused | Repaid => Ok(&REPAYMENT),
        Closed => Ok(&CLOSED),
        Created | Requested | Offered | Bound => Err(UnsupportedStateError(state)),
    }
}
