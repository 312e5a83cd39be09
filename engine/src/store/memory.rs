//! In-memory collaborators.
//!
//! `InMemoryLoanStore` backs the engine's integration tests and doubles
//! as a reference implementation of the optimistic-concurrency contract.
//! It honours relation filtering the way an ORM would: relations not
//! requested come back unloaded, which lets tests prove that each state's
//! `required_relations` list is sufficient.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::models::{Loan, LoanRelation, LoanState};
use crate::store::{LoanNotifier, LoanStore, PersistError};

/// Mutex-guarded loan map implementing `LoanStore`.
#[derive(Default)]
pub struct InMemoryLoanStore {
    loans: Mutex<HashMap<Uuid, Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a loan.
    pub fn insert(&self, loan: Loan) {
        let mut loans = self.loans.lock().unwrap();
        loans.insert(loan.id(), loan);
    }

    /// Fetch a full copy of a loan, all relations included.
    pub fn get(&self, loan_id: Uuid) -> Option<Loan> {
        let loans = self.loans.lock().unwrap();
        loans.get(&loan_id).cloned()
    }
}

impl LoanStore for InMemoryLoanStore {
    fn load_loan(&self, loan_id: Uuid, relations: &[LoanRelation]) -> Option<Loan> {
        let loans = self.loans.lock().unwrap();
        let mut loan = loans.get(&loan_id)?.clone();
        loan.strip_relations(relations);
        Some(loan)
    }

    fn persist_loan_state(
        &self,
        loan_id: Uuid,
        expected: LoanState,
        next: LoanState,
    ) -> Result<(), PersistError> {
        let mut loans = self.loans.lock().unwrap();
        let loan = loans.get_mut(&loan_id).ok_or(PersistError::NotFound(loan_id))?;
        if loan.state() != expected {
            return Err(PersistError::Conflict {
                loan_id,
                actual: loan.state(),
            });
        }
        loan.set_state(next);
        Ok(())
    }
}

/// A notification recorded by `RecordingNotifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEvent {
    Changed {
        loan_id: Uuid,
        old_state: LoanState,
        new_state: LoanState,
    },
    Stepped {
        loan_id: Uuid,
        state: LoanState,
    },
}

/// Notifier that records every event for later assertion.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, in order.
    pub fn events(&self) -> Vec<NotifierEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl LoanNotifier for RecordingNotifier {
    fn state_changed(&self, loan_id: Uuid, old_state: LoanState, new_state: LoanState) {
        self.events.lock().unwrap().push(NotifierEvent::Changed {
            loan_id,
            old_state,
            new_state,
        });
    }

    fn state_stepped(&self, loan_id: Uuid, state: LoanState) {
        self.events
            .lock()
            .unwrap()
            .push(NotifierEvent::Stepped { loan_id, state });
    }
}
