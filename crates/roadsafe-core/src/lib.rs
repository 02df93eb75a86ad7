//! RoadSafe Core
//!
//! Money arithmetic in integer minor units, the debt and fine domain types,
//! and the late-fee accrual calculator shared by every other crate.

pub mod error;
pub mod types;
pub mod accrual;

pub use error::CoreError;
pub use types::{
    Debt, Fine, GatewayStatus, Liability, LiabilityStatus, Money, PaymentAttempt, Subject,
    SubjectType,
};
pub use accrual::{AccrualQuote, DebtSummary, LateFeePolicy};
