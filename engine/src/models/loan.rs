//! Loan aggregate and linked account records.
//!
//! The `Loan` struct mirrors what the persistence layer hands the engine:
//! the scalar columns plus whichever relations were requested. Relations
//! that were not loaded are empty (`payments`) or `None` (accounts,
//! biller); every evaluation treats absent data as "condition not met",
//! never as an error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::payment::LoanPayment;
use crate::models::state::{AccountState, LoanState};

/// A payment account belonging to a lender, borrower, or biller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAccount {
    id: Uuid,
    state: AccountState,
}

impl PaymentAccount {
    /// Create an account in the given verification state.
    pub fn new(state: AccountState) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
        }
    }

    /// Get account ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get verification state
    pub fn state(&self) -> AccountState {
        self.state
    }

    /// Whether the account passed verification.
    pub fn is_verified(&self) -> bool {
        self.state == AccountState::Verified
    }
}

/// A biller that receives disbursements for bill-pay loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biller {
    id: Uuid,
    payment_account_id: Option<Uuid>,
    payment_account: Option<PaymentAccount>,
}

impl Biller {
    /// Create a biller with a linked payment account.
    pub fn new(payment_account: PaymentAccount) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_account_id: Some(payment_account.id()),
            payment_account: Some(payment_account),
        }
    }

    /// Create a biller with no payment account linked yet.
    pub fn without_account() -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_account_id: None,
            payment_account: None,
        }
    }

    /// Get biller ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get linked payment account ID, if any
    pub fn payment_account_id(&self) -> Option<Uuid> {
        self.payment_account_id
    }

    /// Get linked payment account, if loaded
    pub fn payment_account(&self) -> Option<&PaymentAccount> {
        self.payment_account.as_ref()
    }

    /// Drop the loaded account relation, keeping the ID column.
    pub(crate) fn strip_account(&mut self) {
        self.payment_account = None;
    }
}

/// Loan aggregate as seen by the lifecycle engine.
///
/// # Example
/// ```
/// use loan_lifecycle_rs::models::{Loan, LoanPayment, LoanState, PaymentState, PaymentType};
///
/// let loan = Loan::new(LoanState::Repaying, 3);
/// let payment = LoanPayment::new(loan.id(), PaymentType::Repayment, 3)
///     .with_state(PaymentState::Completed);
/// let loan = loan.with_payment(payment);
///
/// assert_eq!(loan.state(), LoanState::Repaying);
/// assert_eq!(loan.payments().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Unique loan identifier
    id: Uuid,

    /// Current lifecycle state
    state: LoanState,

    /// Total number of expected repayment installments
    payments_count: u32,

    /// Party identifiers
    lender_id: Option<Uuid>,
    borrower_id: Option<Uuid>,
    biller_id: Option<Uuid>,

    /// Account identifier columns
    lender_account_id: Option<Uuid>,
    borrower_account_id: Option<Uuid>,

    /// Loaded relations; empty / `None` when not requested from the store
    payments: Vec<LoanPayment>,
    lender_account: Option<PaymentAccount>,
    borrower_account: Option<PaymentAccount>,
    biller: Option<Biller>,
}

impl Loan {
    /// Create a loan in the given state with the expected installment count.
    pub fn new(state: LoanState, payments_count: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
            payments_count,
            lender_id: None,
            borrower_id: None,
            biller_id: None,
            lender_account_id: None,
            borrower_account_id: None,
            payments: Vec::new(),
            lender_account: None,
            borrower_account: None,
            biller: None,
        }
    }

    /// Attach the lender party and account (builder pattern).
    pub fn with_lender(mut self, account: PaymentAccount) -> Self {
        self.lender_id = Some(Uuid::new_v4());
        self.lender_account_id = Some(account.id());
        self.lender_account = Some(account);
        self
    }

    /// Attach the borrower party and account (builder pattern).
    pub fn with_borrower(mut self, account: PaymentAccount) -> Self {
        self.borrower_id = Some(Uuid::new_v4());
        self.borrower_account_id = Some(account.id());
        self.borrower_account = Some(account);
        self
    }

    /// Attach the biller (builder pattern).
    pub fn with_biller(mut self, biller: Biller) -> Self {
        self.biller_id = Some(biller.id());
        self.biller = Some(biller);
        self
    }

    /// Append a payment record (builder pattern).
    pub fn with_payment(mut self, payment: LoanPayment) -> Self {
        self.payments.push(payment);
        self
    }

    /// Get loan ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get current lifecycle state
    pub fn state(&self) -> LoanState {
        self.state
    }

    /// Get expected repayment installment count
    pub fn payments_count(&self) -> u32 {
        self.payments_count
    }

    /// Get lender party ID
    pub fn lender_id(&self) -> Option<Uuid> {
        self.lender_id
    }

    /// Get borrower party ID
    pub fn borrower_id(&self) -> Option<Uuid> {
        self.borrower_id
    }

    /// Get biller ID
    pub fn biller_id(&self) -> Option<Uuid> {
        self.biller_id
    }

    /// Get lender account ID column
    pub fn lender_account_id(&self) -> Option<Uuid> {
        self.lender_account_id
    }

    /// Get borrower account ID column
    pub fn borrower_account_id(&self) -> Option<Uuid> {
        self.borrower_account_id
    }

    /// Get loaded payment records
    pub fn payments(&self) -> &[LoanPayment] {
        &self.payments
    }

    /// Get loaded lender account relation
    pub fn lender_account(&self) -> Option<&PaymentAccount> {
        self.lender_account.as_ref()
    }

    /// Get loaded borrower account relation
    pub fn borrower_account(&self) -> Option<&PaymentAccount> {
        self.borrower_account.as_ref()
    }

    /// Get loaded biller relation
    pub fn biller(&self) -> Option<&Biller> {
        self.biller.as_ref()
    }

    /// Set the lifecycle state. Reserved for the persistence seam; the
    /// engine itself goes through `LoanStore::persist_loan_state`.
    pub(crate) fn set_state(&mut self, state: LoanState) {
        self.state = state;
    }

    /// Drop relations that were not requested, mimicking a partial load.
    pub(crate) fn strip_relations(&mut self, keep: &[crate::models::LoanRelation]) {
        use crate::models::LoanRelation;
        if !keep.contains(&LoanRelation::Payments) {
            self.payments.clear();
        }
        if !keep.contains(&LoanRelation::LenderAccount) {
            self.lender_account = None;
        }
        if !keep.contains(&LoanRelation::BorrowerAccount) {
            self.borrower_account = None;
        }
        if !keep.contains(&LoanRelation::BillerAccount) {
            if let Some(biller) = self.biller.as_mut() {
                biller.strip_account();
            }
        }
    }
}
