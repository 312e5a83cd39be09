//! Transition rules table.
//!
//! Pure, allocation-free lookups over the loan lifecycle graph. These two
//! tables are the single source of truth for which edges exist and which
//! payment type governs each state; the state managers consult them but
//! never extend them.

use thiserror::Error;

use crate::models::{LoanState, PaymentType};

/// Raised when a state has no entry in the lifecycle tables, i.e. a
/// pre-acceptance state reached the engine. This indicates a dispatch
/// defect in the caller, not a recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no lifecycle rules registered for loan state '{0}'")]
pub struct UnsupportedStateError(pub LoanState);

/// Legal next states for a loan in `state`.
///
/// The returned slice is the complete edge set; any transition to a state
/// not listed here is rejected by the manager with
/// `AdvanceError::UnsupportedTransition`.
///
/// # Example
/// ```
/// use loan_lifecycle_rs::models::LoanState;
/// use loan_lifecycle_rs::rules::supported_next_states;
///
/// let next = supported_next_states(LoanState::Repaid).unwrap();
/// assert_eq!(next, &[LoanState::Closed]);
/// assert!(supported_next_states(LoanState::Created).is_err());
/// ```
pub fn supported_next_states(
    state: LoanState,
) -> Result<&'static [LoanState], UnsupportedStateError> {
    use LoanState::*;
    match state {
        Accepted => Ok(&[Funding]),
        Funding => Ok(&[Funded, FundingPaused, Accepted]),
        FundingPaused => Ok(&[Funded, Accepted, Funding]),
        Funded => Ok(&[Accepted, Disbursing]),
        Disbursing => Ok(&[Disbursed, DisbursingPaused, Funded]),
        DisbursingPaused => Ok(&[Disbursed, Funded, Disbursing]),
        Disbursed => Ok(&[Funded, Repaying]),
        Repaying => Ok(&[Repaid, RepaymentPaused, Closed]),
        RepaymentPaused => Ok(&[Repaying, Closed, Repaid]),
        Repaid => Ok(&[Closed]),
        Closed => Ok(&[]),
        Created | Requested | Offered | Bound => Err(UnsupportedStateError(state)),
    }
}

/// Payment type that governs evaluation for a loan in `state`.
pub fn primary_payment_type(state: LoanState) -> Result<PaymentType, UnsupportedStateError> {
    use LoanState::*;
    match state {
        Accepted | Funding | FundingPaused | Funded => Ok(PaymentType::Funding),
        Disbursing | DisbursingPaused | Disbursed => Ok(PaymentType::Disbursement),
        Repaying | RepaymentPaused | Repaid | Closed => Ok(PaymentType::Repayment),
        Created | Requested | Offered | Bound => Err(UnsupportedStateError(state)),
    }
}
