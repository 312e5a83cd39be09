//! Loan state manager: the decision-evaluation core.
//!
//! One generic manager serves every lifecycle state. What differs per
//! state is pure data: a `StateConfig` naming the bound state, the
//! relations its evaluation needs, and an ordered list of
//! `StateDecision`s. The manager loads the loan, validates that its
//! persisted state matches the bound state, evaluates decisions in
//! priority order (first match wins), and either persists a transition,
//! reports same-state progress, or does nothing.
//!
//! # Critical Invariants
//!
//! 1. Only the manager bound to the loan's persisted state may write a
//!    new state for it
//! 2. Every persisted transition is an edge in the rules table
//! 3. A progress decision never changes persisted state; it only raises
//!    a "stepped" notification
//! 4. Re-invoking `advance` with unchanged inputs is a no-op

pub mod tables;

pub use tables::{config_for, StateConfig};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::evaluation::{self, PaymentEvaluationStrategy};
use crate::models::{Loan, LoanRelation, LoanState};
use crate::rules::{self, UnsupportedStateError};
use crate::store::{LoanNotifier, LoanStore, PersistError};

/// Guard condition of a state decision, evaluated against the loaded
/// loan through the state's bound payment strategy.
///
/// Guards are data rather than closures so decision tables can live in
/// `const` tables and be checked exhaustively by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// All parties connected with verified payment accounts
    AccountsReady,
    /// Strategy reports the segment completed
    Complete,
    /// Segment completed and the loan is ready for the next stage
    CompleteWithAccountsReady,
    /// Strategy reports the governing payment failed
    Pause,
    /// Strategy reports the governing payment pending again
    Resume,
    /// Strategy-specific escape hatch (defaults to never firing)
    Fallback,
    /// A non-final repayment installment completed
    InstallmentSettled,
    /// Release hold on a fully repaid loan (policy hook, currently
    /// always releases)
    Release,
}

impl Guard {
    /// Evaluate this guard for `loan` under `strategy`.
    pub fn holds(&self, loan: &Loan, strategy: &dyn PaymentEvaluationStrategy) -> bool {
        match self {
            Guard::AccountsReady => evaluation::has_valid_accounts_connected(loan),
            Guard::Complete => strategy.should_complete(loan),
            Guard::CompleteWithAccountsReady => {
                strategy.should_complete(loan) && evaluation::has_valid_accounts_connected(loan)
            }
            Guard::Pause => strategy.should_pause(loan),
            Guard::Resume => strategy.should_resume(loan),
            Guard::Fallback => strategy.should_fallback(loan),
            Guard::InstallmentSettled => {
                evaluation::is_payment_completed(loan, strategy.payment_type())
                    && !evaluation::is_last_payment(loan, strategy.payment_type())
            }
            Guard::Release => !held_in_repaid(loan),
        }
    }
}

/// Hold hook for the Repaid state. Nothing holds loans in Repaid today;
/// the hook exists so a future hold rule changes one function, not the
/// decision tables.
fn held_in_repaid(_loan: &Loan) -> bool {
    false
}

/// One row of a state's decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDecision {
    /// Evaluation order; lower numbers are checked first
    pub priority: u8,
    /// Condition that must hold for this decision to fire
    pub guard: Guard,
    /// Target state when the decision fires
    pub next_state: LoanState,
    /// When set, the decision reports same-state progress instead of a
    /// transition: a "stepped" notification, no persisted change
    pub progress: bool,
}

/// Structured result of one `advance` call. The caller logs this; the
/// engine itself stays silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    /// The loan moved to a new persisted state.
    Transitioned {
        loan_id: Uuid,
        from: LoanState,
        to: LoanState,
    },
    /// The loan made progress without leaving its state.
    Stepped { loan_id: Uuid, state: LoanState },
    /// No decision fired; the expected steady state between evaluations.
    Unchanged { loan_id: Uuid, state: LoanState },
}

impl AdvanceOutcome {
    /// Whether the call changed or progressed the loan.
    pub fn changed(&self) -> bool {
        !matches!(self, AdvanceOutcome::Unchanged { .. })
    }
}

/// Fatal outcomes of an `advance` call. Each indicates bad input or a
/// race the caller must handle; none are retried or swallowed here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvanceError {
    /// The loan does not exist.
    #[error("loan {0} not found")]
    NotFound(Uuid),

    /// The loan's persisted state does not match the manager's bound
    /// state: a stale read or a lost race. Safe to retry after reload.
    #[error("loan {loan_id} is in state '{actual}', expected '{expected}'")]
    StateMismatch {
        loan_id: Uuid,
        expected: LoanState,
        actual: LoanState,
    },

    /// A decision targeted a state with no edge from the current one.
    /// Indicates a defective decision table.
    #[error("loan {loan_id}: transition '{from}' -> '{to}' is not in the rules table")]
    UnsupportedTransition {
        loan_id: Uuid,
        from: LoanState,
        to: LoanState,
    },

    /// No manager or decision table is registered for the state.
    #[error(transparent)]
    UnsupportedState(#[from] UnsupportedStateError),
}

/// A state manager bound to one lifecycle state.
///
/// Construct through `LoanLifecycle::manager`, which pairs the static
/// `StateConfig` and strategy for a state with the caller's store and
/// notifier.
pub struct LoanStateManager<'a, S: LoanStore, N: LoanNotifier> {
    config: &'static StateConfig,
    strategy: &'static dyn PaymentEvaluationStrategy,
    store: &'a S,
    notifier: &'a N,
}

impl<S: LoanStore, N: LoanNotifier> std::fmt::Debug for LoanStateManager<'_, S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoanStateManager")
            .field("state", &self.config.state)
            .finish_non_exhaustive()
    }
}

impl<'a, S: LoanStore, N: LoanNotifier> LoanStateManager<'a, S, N> {
    pub(crate) fn new(
        config: &'static StateConfig,
        strategy: &'static dyn PaymentEvaluationStrategy,
        store: &'a S,
        notifier: &'a N,
    ) -> Self {
        Self {
            config,
            strategy,
            store,
            notifier,
        }
    }

    /// State this manager is bound to.
    pub fn bound_state(&self) -> LoanState {
        self.config.state
    }

    /// Relations this manager loads before evaluating.
    pub fn required_relations(&self) -> &'static [LoanRelation] {
        self.config.relations
    }

    /// Advance the loan one evaluation step.
    ///
    /// Loads the loan with the bound state's relations, resolves the
    /// first matching decision, and applies it:
    ///
    /// - progress decision: "stepped" notification, state untouched
    /// - transition decision: legality check, optimistic persist,
    ///   "state changed" notification
    /// - no match, or a non-progress decision targeting the current
    ///   state: `Unchanged`
    pub fn advance(&self, loan_id: Uuid) -> Result<AdvanceOutcome, AdvanceError> {
        let loan = self.load_bound_loan(loan_id)?;
        let current = loan.state();

        match self.resolve_decision(&loan) {
            Some(decision) if decision.progress => {
                self.notifier.state_stepped(loan_id, current);
                Ok(AdvanceOutcome::Stepped {
                    loan_id,
                    state: current,
                })
            }
            Some(decision) if decision.next_state != current => {
                self.apply_transition(loan_id, current, decision.next_state)
            }
            _ => Ok(AdvanceOutcome::Unchanged {
                loan_id,
                state: current,
            }),
        }
    }

    /// Load the loan and validate it is in this manager's bound state.
    fn load_bound_loan(&self, loan_id: Uuid) -> Result<Loan, AdvanceError> {
        let loan = self
            .store
            .load_loan(loan_id, self.config.relations)
            .ok_or(AdvanceError::NotFound(loan_id))?;
        if loan.state() != self.config.state {
            return Err(AdvanceError::StateMismatch {
                loan_id,
                expected: self.config.state,
                actual: loan.state(),
            });
        }
        Ok(loan)
    }

    /// First decision whose guard holds, in ascending priority order.
    fn resolve_decision(&self, loan: &Loan) -> Option<&'static StateDecision> {
        let mut decisions: Vec<&StateDecision> = self.config.decisions.iter().collect();
        decisions.sort_by_key(|d| d.priority);
        decisions
            .into_iter()
            .find(|d| d.guard.holds(loan, self.strategy))
    }

    /// Verify legality, persist, and notify a state change.
    fn apply_transition(
        &self,
        loan_id: Uuid,
        from: LoanState,
        to: LoanState,
    ) -> Result<AdvanceOutcome, AdvanceError> {
        let legal = rules::supported_next_states(from)?;
        if !legal.contains(&to) {
            return Err(AdvanceError::UnsupportedTransition { loan_id, from, to });
        }

        self.store
            .persist_loan_state(loan_id, from, to)
            .map_err(|err| match err {
                PersistError::NotFound(id) => AdvanceError::NotFound(id),
                PersistError::Conflict { loan_id, actual } => AdvanceError::StateMismatch {
                    loan_id,
                    expected: from,
                    actual,
                },
            })?;

        self.notifier.state_changed(loan_id, from, to);
        Ok(AdvanceOutcome::Transitioned {
            loan_id,
            from,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::strategy_for;
    use crate::models::{LoanPayment, PaymentState, PaymentType};
    use crate::store::{InMemoryLoanStore, NotifierEvent, RecordingNotifier};

    fn manager<'a>(
        state: LoanState,
        store: &'a InMemoryLoanStore,
        notifier: &'a RecordingNotifier,
    ) -> LoanStateManager<'a, InMemoryLoanStore, RecordingNotifier> {
        LoanStateManager::new(
            config_for(state).unwrap(),
            strategy_for(state).unwrap(),
            store,
            notifier,
        )
    }

    #[test]
    fn test_missing_loan_is_fatal() {
        let store = InMemoryLoanStore::new();
        let notifier = RecordingNotifier::new();
        let id = Uuid::new_v4();

        let err = manager(LoanState::Funding, &store, &notifier)
            .advance(id)
            .unwrap_err();
        assert_eq!(err, AdvanceError::NotFound(id));
        assert!(notifier.events().is_empty());
    }

    #[test]
    fn test_bound_state_mismatch_is_fatal() {
        let store = InMemoryLoanStore::new();
        let notifier = RecordingNotifier::new();
        let loan = Loan::new(LoanState::Funded, 3);
        let id = loan.id();
        store.insert(loan);

        let err = manager(LoanState::Funding, &store, &notifier)
            .advance(id)
            .unwrap_err();
        assert_eq!(
            err,
            AdvanceError::StateMismatch {
                loan_id: id,
                expected: LoanState::Funding,
                actual: LoanState::Funded,
            }
        );
    }

    #[test]
    fn test_no_matching_decision_is_unchanged() {
        let store = InMemoryLoanStore::new();
        let notifier = RecordingNotifier::new();
        // Funding with a pending payment: none of complete/pause/fallback hold
        let loan = Loan::new(LoanState::Funding, 3);
        let loan = loan.clone().with_payment(
            LoanPayment::new(loan.id(), PaymentType::Funding, 1)
                .with_state(PaymentState::Pending),
        );
        let id = loan.id();
        store.insert(loan);

        let outcome = manager(LoanState::Funding, &store, &notifier)
            .advance(id)
            .unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Unchanged {
                loan_id: id,
                state: LoanState::Funding
            }
        );
        assert!(!outcome.changed());
        assert!(notifier.events().is_empty());
    }

    #[test]
    fn test_transition_persists_and_notifies() {
        let store = InMemoryLoanStore::new();
        let notifier = RecordingNotifier::new();
        let loan = Loan::new(LoanState::Funding, 3);
        let loan = loan.clone().with_payment(
            LoanPayment::new(loan.id(), PaymentType::Funding, 1)
                .with_state(PaymentState::Completed),
        );
        let id = loan.id();
        store.insert(loan);

        let outcome = manager(LoanState::Funding, &store, &notifier)
            .advance(id)
            .unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Transitioned {
                loan_id: id,
                from: LoanState::Funding,
                to: LoanState::Funded,
            }
        );
        assert_eq!(store.get(id).unwrap().state(), LoanState::Funded);
        assert_eq!(
            notifier.events(),
            vec![NotifierEvent::Changed {
                loan_id: id,
                old_state: LoanState::Funding,
                new_state: LoanState::Funded,
            }]
        );
    }

    // A Repaid table authored out of priority order, where both guards
    // hold. Lower priority number must win regardless of slice order.
    static COMPETING: StateConfig = StateConfig {
        state: LoanState::Repaid,
        relations: crate::models::PAYMENT_EVALUATION,
        decisions: &[
            StateDecision {
                priority: 2,
                guard: Guard::Release,
                next_state: LoanState::Closed,
                progress: false,
            },
            StateDecision {
                priority: 1,
                guard: Guard::Release,
                next_state: LoanState::Repaid,
                progress: true,
            },
        ],
    };

    #[test]
    fn test_first_match_wins_by_priority_not_slice_order() {
        let store = InMemoryLoanStore::new();
        let notifier = RecordingNotifier::new();
        let loan = Loan::new(LoanState::Repaid, 3);
        let id = loan.id();
        store.insert(loan);

        let manager = LoanStateManager::new(
            &COMPETING,
            strategy_for(LoanState::Repaid).unwrap(),
            &store,
            &notifier,
        );
        let outcome = manager.advance(id).unwrap();

        // Priority 1 (progress) fires; priority 2 (transition to Closed)
        // is never applied.
        assert_eq!(
            outcome,
            AdvanceOutcome::Stepped {
                loan_id: id,
                state: LoanState::Repaid
            }
        );
        assert_eq!(store.get(id).unwrap().state(), LoanState::Repaid);
        assert_eq!(
            notifier.events(),
            vec![NotifierEvent::Stepped {
                loan_id: id,
                state: LoanState::Repaid
            }]
        );
    }

    // A table whose only decision targets a state with no edge from
    // Repaid. The manager must refuse it rather than persist.
    static DEFECTIVE: StateConfig = StateConfig {
        state: LoanState::Repaid,
        relations: &[],
        decisions: &[StateDecision {
            priority: 1,
            guard: Guard::Release,
            next_state: LoanState::Funding,
            progress: false,
        }],
    };

    #[test]
    fn test_illegal_decision_target_is_rejected() {
        let store = InMemoryLoanStore::new();
        let notifier = RecordingNotifier::new();
        let loan = Loan::new(LoanState::Repaid, 3);
        let id = loan.id();
        store.insert(loan);

        let manager = LoanStateManager::new(
            &DEFECTIVE,
            strategy_for(LoanState::Repaid).unwrap(),
            &store,
            &notifier,
        );
        let err = manager.advance(id).unwrap_err();

        assert_eq!(
            err,
            AdvanceError::UnsupportedTransition {
                loan_id: id,
                from: LoanState::Repaid,
                to: LoanState::Funding,
            }
        );
        assert_eq!(store.get(id).unwrap().state(), LoanState::Repaid);
        assert!(notifier.events().is_empty());
    }

    #[test]
    fn test_outcome_serializes_for_structured_logging() {
        let loan_id = Uuid::new_v4();
        let outcome = AdvanceOutcome::Transitioned {
            loan_id,
            from: LoanState::Repaying,
            to: LoanState::Repaid,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "transitioned");
        assert_eq!(json["from"], "repaying");
        assert_eq!(json["to"], "repaid");
    }
}
