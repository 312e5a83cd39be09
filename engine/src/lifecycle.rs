//! Lifecycle facade: manager factory, the `advance_loan` entry point,
//! and the administrative override path.
//!
//! This is the only surface the surrounding service layer or a scheduled
//! re-evaluation job needs. Everything else in the crate is plumbing
//! behind it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluation::strategy_for;
use crate::manager::{config_for, AdvanceError, AdvanceOutcome, LoanStateManager};
use crate::models::LoanState;
use crate::store::{LoanNotifier, LoanStore, PersistError};

/// Audit record returned by `override_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateOverride {
    pub loan_id: Uuid,
    pub from: LoanState,
    pub to: LoanState,
    /// Operator-supplied justification; required because overrides
    /// bypass the transition rules table
    pub reason: String,
}

/// Facade owning the persistence and notification collaborators.
///
/// # Example
/// ```
/// use loan_lifecycle_rs::lifecycle::LoanLifecycle;
/// use loan_lifecycle_rs::models::{AccountState, Biller, Loan, LoanState, PaymentAccount};
/// use loan_lifecycle_rs::store::{InMemoryLoanStore, RecordingNotifier};
///
/// let store = InMemoryLoanStore::new();
/// let verified = || PaymentAccount::new(AccountState::Verified);
/// let loan = Loan::new(LoanState::Accepted, 3)
///     .with_lender(verified())
///     .with_borrower(verified())
///     .with_biller(Biller::new(verified()));
/// let loan_id = loan.id();
/// store.insert(loan);
///
/// let lifecycle = LoanLifecycle::new(store, RecordingNotifier::new());
/// let outcome = lifecycle.advance_loan(loan_id, None).unwrap();
/// assert!(outcome.changed());
/// ```
pub struct LoanLifecycle<S: LoanStore, N: LoanNotifier> {
    store: S,
    notifier: N,
}

impl<S: LoanStore, N: LoanNotifier> LoanLifecycle<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Access the underlying notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Resolve the state manager that applies to `loan_id`.
    ///
    /// When `current_state` is supplied the lookup is direct and does no
    /// I/O; otherwise the loan's persisted state is loaded first.
    /// Dispatching strictly on persisted state is what guarantees only
    /// the matching manager can ever write a new state for the loan.
    pub fn manager(
        &self,
        loan_id: Uuid,
        current_state: Option<LoanState>,
    ) -> Result<LoanStateManager<'_, S, N>, AdvanceError> {
        let state = match current_state {
            Some(state) => state,
            None => self
                .store
                .load_loan(loan_id, &[])
                .ok_or(AdvanceError::NotFound(loan_id))?
                .state(),
        };
        let config = config_for(state)?;
        let strategy = strategy_for(state)?;
        Ok(LoanStateManager::new(config, strategy, &self.store, &self.notifier))
    }

    /// Advance a loan one evaluation step.
    ///
    /// The single operation callers need: resolves the manager for the
    /// loan's current state and runs it. Safe to re-invoke from a poller;
    /// an already-evaluated loan yields `Unchanged`.
    pub fn advance_loan(
        &self,
        loan_id: Uuid,
        current_state: Option<LoanState>,
    ) -> Result<AdvanceOutcome, AdvanceError> {
        self.manager(loan_id, current_state)?.advance(loan_id)
    }

    /// Administrative state override, outside the normal advance path.
    ///
    /// Bypasses the decision tables and the transition rules table on
    /// purpose: this is the reviewed exception path for compliance
    /// corrections such as reopening a closed loan. The write still goes
    /// through the optimistic persist, and the change is notified and
    /// returned as an auditable record with the operator's reason.
    pub fn override_state(
        &self,
        loan_id: Uuid,
        next_state: LoanState,
        reason: &str,
    ) -> Result<StateOverride, AdvanceError> {
        let loan = self
            .store
            .load_loan(loan_id, &[])
            .ok_or(AdvanceError::NotFound(loan_id))?;
        let from = loan.state();

        self.store
            .persist_loan_state(loan_id, from, next_state)
            .map_err(|err| match err {
                PersistError::NotFound(id) => AdvanceError::NotFound(id),
                PersistError::Conflict { loan_id, actual } => AdvanceError::StateMismatch {
                    loan_id,
                    expected: from,
                    actual,
                },
            })?;

        self.notifier.state_changed(loan_id, from, next_state);
        Ok(StateOverride {
            loan_id,
            from,
            to: next_state,
            reason: reason.to_string(),
        })
    }
}
