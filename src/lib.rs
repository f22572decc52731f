pub mod account;
pub mod adjustment;
pub mod auth;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod investment;
pub mod ledger;
pub mod plan;
pub mod returns;
pub mod store;
pub mod types;
pub mod views;
pub mod withdrawal;

// re-export key types
pub use account::Account;
pub use adjustment::{Adjustment, AdjustmentDirection, AdjustmentField};
pub use auth::{Admin, AdminRole, AdminStatus, AdminToken};
pub use config::{LedgerConfig, PlanConfig, PlanTerms, TierThresholds};
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, LedgerError, Result};
pub use events::{EventStore, LedgerEvent};
pub use investment::{AccrualOutcome, Investment, Payout};
pub use ledger::{
    ConsistencyReport, Dashboard, FieldMismatch, Ledger, PlatformStats, WithdrawalEligibility,
};
pub use plan::{InvestmentPlan, PlanSnapshot};
pub use returns::{compounded_yield, AccrualClock, ReturnCalculator, ReturnSchedule, TierClassifier, WeekDue};
pub use store::{Book, LedgerStore, MemoryStore};
pub use types::{
    AccountId, AccountStatus, AccruedWeek, AdminId, FundingSource, InvestmentId, InvestmentStatus,
    PlanId, PlanTier, Tier, WeeklyReturn, WithdrawalId, WithdrawalStatus,
};
pub use views::{AccountView, InvestmentView, WithdrawalView};
pub use withdrawal::Withdrawal;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
