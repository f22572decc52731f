use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::{AccountStatus, InvestmentStatus, Tier, WithdrawalStatus};

/// coarse error class callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    NotFound,
    State,
    Eligibility,
    InsufficientFunds,
    Authorization,
    Persistence,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("below plan minimum: minimum {minimum}, requested {requested}")]
    BelowPlanMinimum {
        minimum: Money,
        requested: Money,
    },

    #[error("above plan maximum: maximum {maximum}, requested {requested}")]
    AbovePlanMaximum {
        maximum: Money,
        requested: Money,
    },

    #[error("invalid weekly rate: {rate}")]
    InvalidRate {
        rate: Rate,
    },

    #[error("invalid week count: {weeks}")]
    InvalidWeekCount {
        weeks: u32,
    },

    #[error("return schedule out of range: {principal} at {rate} for {weeks} weeks")]
    ScheduleOverflow {
        principal: Money,
        rate: Rate,
        weeks: u32,
    },

    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("email already registered: {email}")]
    EmailInUse {
        email: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("account not found: {id}")]
    AccountNotFound {
        id: Uuid,
    },

    #[error("plan not found or inactive: {id}")]
    PlanNotFound {
        id: Uuid,
    },

    #[error("investment not found: {id}")]
    InvestmentNotFound {
        id: Uuid,
    },

    #[error("withdrawal not found: {id}")]
    WithdrawalNotFound {
        id: Uuid,
    },

    #[error("cannot {action} investment {id}: current status is {current}")]
    InvalidInvestmentTransition {
        id: Uuid,
        current: InvestmentStatus,
        action: &'static str,
    },

    #[error("cannot {action} withdrawal {id}: current status is {current}")]
    InvalidWithdrawalTransition {
        id: Uuid,
        current: WithdrawalStatus,
        action: &'static str,
    },

    #[error("week {requested} of investment {id} is out of order: next week is {expected}")]
    AccrualOutOfOrder {
        id: Uuid,
        expected: u32,
        requested: u32,
    },

    #[error("week {week} of investment {id} is not due until {due_at}")]
    AccrualNotDue {
        id: Uuid,
        week: u32,
        due_at: chrono::DateTime<chrono::Utc>,
    },

    #[error("account {id} still holds {investments} open investments and {withdrawals} pending withdrawals")]
    AccountHasOpenPositions {
        id: Uuid,
        investments: usize,
        withdrawals: usize,
    },

    #[error("withdrawal requires tier {required}, account is tier {tier}")]
    TierTooLow {
        tier: Tier,
        required: Tier,
    },

    #[error("account {id} is not active: current status is {status:?}")]
    AccountNotActive {
        id: Uuid,
        status: AccountStatus,
    },

    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Money,
        requested: Money,
    },

    #[error("unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    #[error("persistence failure: {message}")]
    Persistence {
        message: String,
    },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount { .. }
            | LedgerError::BelowPlanMinimum { .. }
            | LedgerError::AbovePlanMaximum { .. }
            | LedgerError::InvalidRate { .. }
            | LedgerError::InvalidWeekCount { .. }
            | LedgerError::ScheduleOverflow { .. }
            | LedgerError::InvalidField { .. }
            | LedgerError::EmailInUse { .. }
            | LedgerError::InvalidConfiguration { .. } => ErrorKind::Validation,

            LedgerError::AccountNotFound { .. }
            | LedgerError::PlanNotFound { .. }
            | LedgerError::InvestmentNotFound { .. }
            | LedgerError::WithdrawalNotFound { .. } => ErrorKind::NotFound,

            LedgerError::InvalidInvestmentTransition { .. }
            | LedgerError::InvalidWithdrawalTransition { .. }
            | LedgerError::AccrualOutOfOrder { .. }
            | LedgerError::AccrualNotDue { .. }
            | LedgerError::AccountHasOpenPositions { .. } => ErrorKind::State,

            LedgerError::TierTooLow { .. } | LedgerError::AccountNotActive { .. } => {
                ErrorKind::Eligibility
            }

            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::Unauthorized { .. } => ErrorKind::Authorization,
            LedgerError::Persistence { .. } => ErrorKind::Persistence,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
