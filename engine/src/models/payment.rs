//! Loan payment record.
//!
//! A `LoanPayment` is one recorded money movement for a loan: a funding
//! transfer, a disbursement, or a repayment installment. The engine never
//! executes payments; it only reads their recorded outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::state::{PaymentState, PaymentType};

/// A single payment belonging to exactly one loan.
///
/// `payment_number` is the ordinal within the payment's type. It only
/// carries meaning for repayments, where it is compared against the
/// loan's expected installment count to detect the final installment.
///
/// # Example
/// ```
/// use loan_lifecycle_rs::models::{LoanPayment, PaymentState, PaymentType};
/// use uuid::Uuid;
///
/// let loan_id = Uuid::new_v4();
/// let payment = LoanPayment::new(loan_id, PaymentType::Repayment, 2)
///     .with_state(PaymentState::Completed);
///
/// assert_eq!(payment.payment_number(), 2);
/// assert_eq!(payment.state(), PaymentState::Completed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPayment {
    /// Unique payment identifier
    id: Uuid,

    /// Owning loan
    loan_id: Uuid,

    /// Lifecycle segment this payment belongs to
    payment_type: PaymentType,

    /// Recorded processing outcome
    state: PaymentState,

    /// Ordinal within the payment's type (1-based)
    payment_number: u32,

    /// Creation timestamp; newest payment of a type governs evaluation
    created_at: DateTime<Utc>,
}

impl LoanPayment {
    /// Create a new pending payment stamped with the current time.
    pub fn new(loan_id: Uuid, payment_type: PaymentType, payment_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            payment_type,
            state: PaymentState::Pending,
            payment_number,
            created_at: Utc::now(),
        }
    }

    /// Set the payment state (builder pattern).
    pub fn with_state(mut self, state: PaymentState) -> Self {
        self.state = state;
        self
    }

    /// Set the creation timestamp (builder pattern).
    ///
    /// Tests use this to model retried payments, where a newer record of
    /// the same type supersedes an older one.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Get payment ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get owning loan ID
    pub fn loan_id(&self) -> Uuid {
        self.loan_id
    }

    /// Get payment type
    pub fn payment_type(&self) -> PaymentType {
        self.payment_type
    }

    /// Get payment state
    pub fn state(&self) -> PaymentState {
        self.state
    }

    /// Get ordinal within the payment's type
    pub fn payment_number(&self) -> u32 {
        self.payment_number
    }

    /// Get creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record the payment as completed.
    pub fn mark_completed(&mut self) {
        self.state = PaymentState::Completed;
    }

    /// Record the payment as failed.
    pub fn mark_failed(&mut self) {
        self.state = PaymentState::Failed;
    }
}
