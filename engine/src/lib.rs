//! Loan Lifecycle Engine
//!
//! Decides whether and how a loan moves between lifecycle states based
//! on its recorded payments and linked accounts.
//!
//! # Architecture
//!
//! - **models**: Domain types (Loan, LoanPayment, state enums)
//! - **rules**: Transition rules table (legal edges, governing payment type)
//! - **evaluation**: Pure payment predicates and per-segment strategies
//! - **manager**: Generic state manager over per-state decision tables
//! - **lifecycle**: Factory, entry point, administrative override
//! - **store**: Collaborator seams (persistence, notifications)
//!
//! # Critical Invariants
//!
//! 1. State changes happen only along edges in the rules table
//! 2. Decisions are evaluated in priority order; the first match wins
//! 3. A completed non-final repayment steps the loan without changing
//!    its persisted state
//! 4. Re-invoking `advance_loan` with unchanged inputs is a safe no-op

// Module declarations
pub mod evaluation;
pub mod lifecycle;
pub mod manager;
pub mod models;
pub mod rules;
pub mod store;

// Re-exports for convenience
pub use evaluation::{strategy_for, PaymentEvaluationStrategy};
pub use lifecycle::{LoanLifecycle, StateOverride};
pub use manager::{
    config_for, AdvanceError, AdvanceOutcome, Guard, LoanStateManager, StateConfig, StateDecision,
};
pub use models::{
    AccountState, Biller, Loan, LoanPayment, LoanRelation, LoanState, PaymentAccount, PaymentState,
    PaymentType,
};
pub use rules::{primary_payment_type, supported_next_states, UnsupportedStateError};
pub use store::{
    InMemoryLoanStore, LoanNotifier, LoanStore, NotifierEvent, PersistError, RecordingNotifier,
};
