use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for an account
pub type AccountId = Uuid;
/// unique identifier for a catalog plan
pub type PlanId = Uuid;
/// unique identifier for an investment
pub type InvestmentId = Uuid;
/// unique identifier for a withdrawal
pub type WithdrawalId = Uuid;
/// unique identifier for an administrator
pub type AdminId = Uuid;

/// account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
    Pending,
}

/// investment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    /// requested, waiting for an administrator
    Pending,
    /// approved and running
    Active,
    /// paid out
    Completed,
    /// rejected before activation
    Cancelled,
}

impl InvestmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvestmentStatus::Completed | InvestmentStatus::Cancelled)
    }

    /// counts toward the withdrawal tier
    pub fn is_qualifying(&self) -> bool {
        matches!(self, InvestmentStatus::Active | InvestmentStatus::Completed)
    }

    /// principal still held by the platform
    pub fn is_locked(&self) -> bool {
        matches!(self, InvestmentStatus::Pending | InvestmentStatus::Active)
    }
}

impl fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvestmentStatus::Pending => "pending",
            InvestmentStatus::Active => "active",
            InvestmentStatus::Completed => "completed",
            InvestmentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// withdrawal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    /// approved and paid out
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// withdrawal eligibility class derived from qualifying principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    One = 1,
    Two = 2,
    Three = 3,
}

impl Tier {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::One => "Tier 1 - Building",
            Tier::Two => "Tier 2 - Growing",
            Tier::Three => "Tier 3 - Elite",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// catalog label of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Starter,
    Growth,
    Premium,
    Elite,
    /// terms set by an administrator for a single investment
    Custom,
}

/// where an investment's principal came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingSource {
    /// transferred in from outside, optionally with a proof reference
    ExternalTransfer { proof: Option<String> },
    /// debited from the account balance at creation
    AccountBalance,
}

/// one projected week of a compounding schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReturn {
    pub week: u32,
    pub return_amount: Money,
    pub cumulative_value: Money,
}

/// one week actually applied to an active investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccruedWeek {
    pub week: u32,
    pub return_amount: Money,
    pub cumulative_value: Money,
    pub processed_at: DateTime<Utc>,
}
