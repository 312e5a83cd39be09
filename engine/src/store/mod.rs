//! Collaborator seams to the persistence and notification layers.
//!
//! The engine never talks to a database or a message bus directly. It
//! consumes two narrow traits: `LoanStore` for loading loans and
//! atomically persisting state changes, and `LoanNotifier` for publishing
//! "state changed" / "state stepped" domain events. Delivery guarantees
//! for notifications belong to the implementor; the engine fires and
//! forgets.

pub mod memory;

pub use memory::{InMemoryLoanStore, NotifierEvent, RecordingNotifier};

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Loan, LoanRelation, LoanState};

/// Errors the persistence collaborator can report when writing a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// The loan no longer exists.
    #[error("loan {0} not found")]
    NotFound(Uuid),

    /// The loan's persisted state no longer matches the expected old
    /// state. A concurrent advance won the race; the caller should
    /// reload and retry if it still wants to act.
    #[error("loan {loan_id} state changed concurrently, now '{actual}'")]
    Conflict { loan_id: Uuid, actual: LoanState },
}

/// Data access seam for loans.
///
/// `persist_loan_state` carries the optimistic-concurrency contract: the
/// write must be rejected with `PersistError::Conflict` when the loan's
/// persisted state no longer equals `expected`. The state check and the
/// write must be one atomic unit.
pub trait LoanStore {
    /// Load a loan with the requested relations, or `None` if it does
    /// not exist. Relations not listed may be left unloaded.
    fn load_loan(&self, loan_id: Uuid, relations: &[LoanRelation]) -> Option<Loan>;

    /// Atomically set the loan's state from `expected` to `next`.
    fn persist_loan_state(
        &self,
        loan_id: Uuid,
        expected: LoanState,
        next: LoanState,
    ) -> Result<(), PersistError>;
}

/// Notification seam for domain events raised by the engine.
pub trait LoanNotifier {
    /// A loan transitioned between lifecycle states.
    fn state_changed(&self, loan_id: Uuid, old_state: LoanState, new_state: LoanState);

    /// A loan made progress without leaving its current state (e.g. a
    /// non-final repayment installment completed).
    fn state_stepped(&self, loan_id: Uuid, state: LoanState);
}

impl<T: LoanStore + ?Sized> LoanStore for &T {
    fn load_loan(&self, loan_id: Uuid, relations: &[LoanRelation]) -> Option<Loan> {
        (**self).load_loan(loan_id, relations)
    }

    fn persist_loan_state(
        &self,
        loan_id: Uuid,
        expected: LoanState,
        next: LoanState,
    ) -> Result<(), PersistError> {
        (**self).persist_loan_state(loan_id, expected, next)
    }
}

impl<T: LoanNotifier + ?Sized> LoanNotifier for &T {
    fn state_changed(&self, loan_id: Uuid, old_state: LoanState, new_state: LoanState) {
        (**self).state_changed(loan_id, old_state, new_state)
    }

    fn state_stepped(&self, loan_id: Uuid, state: LoanState) {
        (**self).state_stepped(loan_id, state)
    }
}
