//! Per-state configuration: bound state, required relations, and the
//! ordered decision table.
//!
//! These tables are the complete domain-specific content of the engine.
//! Adding behaviour to a state means adding a row here; the evaluation
//! machinery in the parent module never changes.

use crate::manager::{Guard, StateDecision};
use crate::models::{
    LoanRelation, LoanState, ACCOUNT_VERIFICATION, PAYMENT_AND_ACCOUNTS, PAYMENT_EVALUATION,
};
use crate::rules::UnsupportedStateError;

/// Static configuration of one lifecycle state.
#[derive(Debug, PartialEq, Eq)]
pub struct StateConfig {
    /// State this configuration is bound to
    pub state: LoanState,
    /// Relations to load before evaluating
    pub relations: &'static [LoanRelation],
    /// Ordered decision table; first matching guard wins
    pub decisions: &'static [StateDecision],
}

const fn decision(priority: u8, guard: Guard, next_state: LoanState) -> StateDecision {
    StateDecision {
        priority,
        guard,
        next_state,
        progress: false,
    }
}

const fn progress(priority: u8, guard: Guard, state: LoanState) -> StateDecision {
    StateDecision {
        priority,
        guard,
        next_state: state,
        progress: true,
    }
}

/// Accepted: no payments yet; the loan leaves once every party has a
/// verified payment account connected.
static ACCEPTED: StateConfig = StateConfig {
    state: LoanState::Accepted,
    relations: ACCOUNT_VERIFICATION,
    decisions: &[decision(1, Guard::AccountsReady, LoanState::Funding)],
};

static FUNDING: StateConfig = StateConfig {
    state: LoanState::Funding,
    relations: PAYMENT_EVALUATION,
    decisions: &[
        decision(1, Guard::Complete, LoanState::Funded),
        decision(2, Guard::Pause, LoanState::FundingPaused),
        // Revert to Accepted has no business condition yet
        decision(3, Guard::Fallback, LoanState::Accepted),
    ],
};

static FUNDING_PAUSED: StateConfig = StateConfig {
    state: LoanState::FundingPaused,
    relations: PAYMENT_EVALUATION,
    decisions: &[
        decision(1, Guard::Resume, LoanState::Funding),
        decision(2, Guard::Complete, LoanState::Funded),
        decision(3, Guard::Fallback, LoanState::Accepted),
    ],
};

/// Funded: the stage handover also re-checks account readiness before
/// disbursement may start.
static FUNDED: StateConfig = StateConfig {
    state: LoanState::Funded,
    relations: PAYMENT_AND_ACCOUNTS,
    decisions: &[
        decision(1, Guard::CompleteWithAccountsReady, LoanState::Disbursing),
        decision(2, Guard::Fallback, LoanState::Accepted),
    ],
};

static DISBURSING: StateConfig = StateConfig {
    state: LoanState::Disbursing,
    relations: PAYMENT_EVALUATION,
    decisions: &[
        decision(1, Guard::Complete, LoanState::Disbursed),
        decision(2, Guard::Pause, LoanState::DisbursingPaused),
        decision(3, Guard::Fallback, LoanState::Funded),
    ],
};

static DISBURSING_PAUSED: StateConfig = StateConfig {
    state: LoanState::DisbursingPaused,
    relations: PAYMENT_EVALUATION,
    decisions: &[
        decision(1, Guard::Resume, LoanState::Disbursing),
        decision(2, Guard::Complete, LoanState::Disbursed),
        decision(3, Guard::Fallback, LoanState::Funded),
    ],
};

static DISBURSED: StateConfig = StateConfig {
    state: LoanState::Disbursed,
    relations: PAYMENT_AND_ACCOUNTS,
    decisions: &[
        decision(1, Guard::CompleteWithAccountsReady, LoanState::Repaying),
        decision(2, Guard::Fallback, LoanState::Funded),
    ],
};

/// Repaying: a completed final installment transitions to Repaid; a
/// completed intermediate installment is progress only, so the loan
/// stays in Repaying while the next installment is initiated upstream.
static REPAYING: StateConfig = StateConfig {
    state: LoanState::Repaying,
    relations: PAYMENT_EVALUATION,
    decisions: &[
        decision(1, Guard::Complete, LoanState::Repaid),
        progress(2, Guard::InstallmentSettled, LoanState::Repaying),
        decision(3, Guard::Pause, LoanState::RepaymentPaused),
        decision(4, Guard::Fallback, LoanState::Closed),
    ],
};

static REPAYMENT_PAUSED: StateConfig = StateConfig {
    state: LoanState::RepaymentPaused,
    relations: PAYMENT_EVALUATION,
    decisions: &[
        decision(1, Guard::Complete, LoanState::Repaid),
        decision(2, Guard::Resume, LoanState::Repaying),
        progress(3, Guard::InstallmentSettled, LoanState::RepaymentPaused),
        decision(4, Guard::Fallback, LoanState::Closed),
    ],
};

static REPAID: StateConfig = StateConfig {
    state: LoanState::Repaid,
    relations: PAYMENT_EVALUATION,
    decisions: &[decision(1, Guard::Release, LoanState::Closed)],
};

/// Closed is terminal: no relations, no decisions. Exceptional
/// corrections go through the administrative override, never here.
static CLOSED: StateConfig = StateConfig {
    state: LoanState::Closed,
    relations: &[],
    decisions: &[],
};

/// All lifecycle state configurations, in lifecycle order.
pub static CONFIGS: [&StateConfig; 11] = [
    &ACCEPTED,
    &FUNDING,
    &FUNDING_PAUSED,
    &FUNDED,
    &DISBURSING,
    &DISBURSING_PAUSED,
    &DISBURSED,
    &REPAYING,
    &REPAYMENT_PAUSED,
    &REPAID,
    &CLOSED,
];

/// Resolve the configuration bound to `state`.
pub fn config_for(state: LoanState) -> Result<&'static StateConfig, UnsupportedStateError> {
    CONFIGS
        .iter()
        .find(|config| config.state == state)
        .copied()
        .ok_or(UnsupportedStateError(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoanState;

    #[test]
    fn test_every_lifecycle_state_has_a_config() {
        for state in LoanState::LIFECYCLE {
            assert_eq!(config_for(state).unwrap().state, state);
        }
    }

    #[test]
    fn test_pre_engine_states_have_no_config() {
        assert_eq!(
            config_for(LoanState::Created),
            Err(UnsupportedStateError(LoanState::Created))
        );
    }

    #[test]
    fn test_priorities_are_unique_per_table() {
        for config in CONFIGS {
            let mut priorities: Vec<u8> = config.decisions.iter().map(|d| d.priority).collect();
            priorities.sort_unstable();
            priorities.dedup();
            assert_eq!(
                priorities.len(),
                config.decisions.len(),
                "duplicate priority in {} table",
                config.state
            );
        }
    }

    #[test]
    fn test_progress_decisions_target_their_own_state() {
        for config in CONFIGS {
            for decision in config.decisions {
                if decision.progress {
                    assert_eq!(decision.next_state, config.state);
                }
            }
        }
    }

    #[test]
    fn test_closed_is_empty() {
        let closed = config_for(LoanState::Closed).unwrap();
        assert!(closed.decisions.is_empty());
        assert!(closed.relations.is_empty());
    }
}
