use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{AccountId, AdminId};

/// account aggregate an administrator may correct by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentField {
    Balance,
    TotalEarnings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    Credit,
    Debit,
}

impl AdjustmentDirection {
    /// value after applying `amount` to `previous`, never below zero
    pub fn apply(&self, previous: Money, amount: Money) -> Result<Money> {
        match self {
            AdjustmentDirection::Credit => Ok(previous + amount),
            AdjustmentDirection::Debit => {
                previous
                    .checked_sub(amount)
                    .ok_or(LedgerError::InsufficientFunds {
                        available: previous,
                        requested: amount,
                    })
            }
        }
    }
}

/// audit record of a manual balance or earnings correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub id: Uuid,
    pub account_id: AccountId,
    pub field: AdjustmentField,
    pub direction: AdjustmentDirection,
    pub amount: Money,
    pub previous_value: Money,
    pub new_value: Money,
    pub note: String,
    pub admin_id: AdminId,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_apply() {
        let credit = AdjustmentDirection::Credit.apply(Money::from_major(10), Money::from_major(5));
        assert_eq!(credit.unwrap(), Money::from_major(15));

        let debit = AdjustmentDirection::Debit.apply(Money::from_major(10), Money::from_major(10));
        assert_eq!(debit.unwrap(), Money::ZERO);

        let overdraw = AdjustmentDirection::Debit.apply(Money::from_major(10), Money::from_major(11));
        assert!(matches!(overdraw, Err(LedgerError::InsufficientFunds { .. })));
    }
}
