//! Domain models: loans, payments, accounts, and lifecycle enums.

pub mod loan;
pub mod payment;
pub mod state;

pub use loan::{Biller, Loan, PaymentAccount};
pub use payment::LoanPayment;
pub use state::{
    AccountState, LoanRelation, LoanState, PaymentState, PaymentType, ACCOUNT_VERIFICATION,
    PAYMENT_AND_ACCOUNTS, PAYMENT_EVALUATION,
};
