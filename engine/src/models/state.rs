//! Loan lifecycle states and payment classification enums.
//!
//! `LoanState` carries every state a loan record can hold, including the
//! pre-acceptance negotiation states (`Created` through `Bound`). The
//! lifecycle engine only operates on the eleven states from `Accepted`
//! to `Closed`; the pre-acceptance states exist so that dispatching on a
//! freshly loaded loan can fail loudly instead of silently skipping it.
//!
//! # Critical Invariants
//!
//! 1. A loan holds exactly one state at any time
//! 2. State changes happen only along edges in the transition rules table
//! 3. String codes are stable wire values (snake_case) used by the
//!    surrounding platform

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a loan.
///
/// The first four states belong to the negotiation phase handled by the
/// surrounding application; the engine rejects them with
/// `UnsupportedStateError`. From `Accepted` onward the loan is mutated
/// exclusively through the lifecycle engine until it reaches `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanState {
    /// Initial loan information provided; not yet in the engine's domain
    Created,
    /// Borrower-initiated request awaiting a counterparty
    Requested,
    /// Lender-initiated offer awaiting a counterparty
    Offered,
    /// Target user registered and linked to the loan
    Bound,

    /// Target user accepted the loan terms; entry point of the engine
    Accepted,
    /// Funds transfer from lender started
    Funding,
    /// Funds transfer from lender paused
    FundingPaused,
    /// Funds transfer from lender completed
    Funded,
    /// Funds transfer to borrower or biller started
    Disbursing,
    /// Funds transfer to borrower or biller paused
    DisbursingPaused,
    /// Funds transfer to borrower or biller completed
    Disbursed,
    /// Borrower started repaying the loan
    Repaying,
    /// Repayment paused
    RepaymentPaused,
    /// Borrower repaid the loan in full
    Repaid,
    /// Terminal state; the engine no longer mutates the loan
    Closed,
}

impl LoanState {
    /// Stable string code for this state (matches the platform wire format).
    pub fn code(&self) -> &'static str {
        match self {
            LoanState::Created => "created",
            LoanState::Requested => "requested",
            LoanState::Offered => "offered",
            LoanState::Bound => "bound",
            LoanState::Accepted => "accepted",
            LoanState::Funding => "funding",
            LoanState::FundingPaused => "funding_paused",
            LoanState::Funded => "funded",
            LoanState::Disbursing => "disbursing",
            LoanState::DisbursingPaused => "disbursing_paused",
            LoanState::Disbursed => "disbursed",
            LoanState::Repaying => "repaying",
            LoanState::RepaymentPaused => "repayment_paused",
            LoanState::Repaid => "repaid",
            LoanState::Closed => "closed",
        }
    }

    /// All states the lifecycle engine manages, in lifecycle order.
    pub const LIFECYCLE: [LoanState; 11] = [
        LoanState::Accepted,
        LoanState::Funding,
        LoanState::FundingPaused,
        LoanState::Funded,
        LoanState::Disbursing,
        LoanState::DisbursingPaused,
        LoanState::Disbursed,
        LoanState::Repaying,
        LoanState::RepaymentPaused,
        LoanState::Repaid,
        LoanState::Closed,
    ];

    /// Whether this state is managed by the lifecycle engine.
    pub fn is_lifecycle(&self) -> bool {
        !matches!(
            self,
            LoanState::Created | LoanState::Requested | LoanState::Offered | LoanState::Bound
        )
    }

    /// Whether this state is terminal for the engine.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanState::Closed)
    }
}

impl fmt::Display for LoanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Type of a loan payment, one per lifecycle segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Lender -> platform transfer
    Funding,
    /// Platform -> borrower / biller transfer
    Disbursement,
    /// Borrower installment
    Repayment,
}

/// Processing state of a single loan payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending,
    Completed,
    Failed,
}

/// Verification state of a payment account.
///
/// Only `Verified` accounts allow a loan to leave the `Accepted` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    Pending,
    Verified,
    Suspended,
}

/// A loan relation the store can be asked to load alongside the loan.
///
/// The engine requests only what the bound state's evaluation needs, so
/// the persistence layer can avoid loading unrelated aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanRelation {
    /// The loan's payment records
    Payments,
    /// The lender's payment account
    LenderAccount,
    /// The borrower's payment account
    BorrowerAccount,
    /// The biller together with its payment account
    BillerAccount,
}

/// Relations needed to evaluate payment-driven decisions.
pub const PAYMENT_EVALUATION: &[LoanRelation] = &[LoanRelation::Payments];

/// Relations needed to verify connected accounts.
pub const ACCOUNT_VERIFICATION: &[LoanRelation] = &[
    LoanRelation::LenderAccount,
    LoanRelation::BorrowerAccount,
    LoanRelation::BillerAccount,
];

/// Relations for states that gate on both payments and account readiness.
pub const PAYMENT_AND_ACCOUNTS: &[LoanRelation] = &[
    LoanRelation::Payments,
    LoanRelation::LenderAccount,
    LoanRelation::BorrowerAccount,
    LoanRelation::BillerAccount,
];
