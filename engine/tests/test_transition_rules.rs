//! Transition rules table tests: exact edges and decision-table legality.

use loan_lifecycle_rs::manager::tables::CONFIGS;
use loan_lifecycle_rs::models::{LoanState, PaymentType};
use loan_lifecycle_rs::rules::{primary_payment_type, supported_next_states};

use LoanState::*;

#[test]
fn test_exact_edge_set() {
    let expected: [(LoanState, &[LoanState]); 11] = [
        (Accepted, &[Funding]),
        (Funding, &[Funded, FundingPaused, Accepted]),
        (FundingPaused, &[Funded, Accepted, Funding]),
        (Funded, &[Accepted, Disbursing]),
        (Disbursing, &[Disbursed, DisbursingPaused, Funded]),
        (DisbursingPaused, &[Disbursed, Funded, Disbursing]),
        (Disbursed, &[Funded, Repaying]),
        (Repaying, &[Repaid, RepaymentPaused, Closed]),
        (RepaymentPaused, &[Repaying, Closed, Repaid]),
        (Repaid, &[Closed]),
        (Closed, &[]),
    ];

    for (state, edges) in expected {
        assert_eq!(
            supported_next_states(state).unwrap(),
            edges,
            "edge set mismatch for {state}"
        );
    }
}

#[test]
fn test_primary_payment_types() {
    for state in [Accepted, Funding, FundingPaused, Funded] {
        assert_eq!(primary_payment_type(state).unwrap(), PaymentType::Funding);
    }
    for state in [Disbursing, DisbursingPaused, Disbursed] {
        assert_eq!(
            primary_payment_type(state).unwrap(),
            PaymentType::Disbursement
        );
    }
    for state in [Repaying, RepaymentPaused, Repaid, Closed] {
        assert_eq!(primary_payment_type(state).unwrap(), PaymentType::Repayment);
    }
}

/// Every non-progress decision in every table targets a legal edge. This
/// checks the entire table, so a new decision row with an illegal target
/// fails here before it can fail at runtime.
#[test]
fn test_every_decision_target_is_a_legal_edge() {
    for config in CONFIGS {
        let legal = supported_next_states(config.state).unwrap();
        for decision in config.decisions {
            if decision.progress {
                // Progress decisions stay in place; nothing to check
                // against the edge table.
                assert_eq!(decision.next_state, config.state);
            } else {
                assert!(
                    legal.contains(&decision.next_state),
                    "decision {:?} in {} targets illegal state {}",
                    decision.guard,
                    config.state,
                    decision.next_state
                );
            }
        }
    }
}

#[test]
fn test_pre_engine_states_have_no_rules() {
    for state in [Created, Requested, Offered, Bound] {
        assert!(supported_next_states(state).is_err());
        assert!(primary_payment_type(state).is_err());
    }
}
