use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{PlanConfig, PlanTerms};
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{PlanId, PlanTier};

/// catalog entry offered to investors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPlan {
    pub id: PlanId,
    pub config: PlanConfig,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl InvestmentPlan {
    pub fn new(id: PlanId, config: PlanConfig, now: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            is_active: true,
            created_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// check a principal against the plan's bounds
    pub fn check_principal(&self, principal: Money) -> Result<()> {
        if !principal.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: principal });
        }
        if principal < self.config.minimum_amount {
            return Err(LedgerError::BelowPlanMinimum {
                minimum: self.config.minimum_amount,
                requested: principal,
            });
        }
        if let Some(maximum) = self.config.maximum_amount {
            if principal > maximum {
                return Err(LedgerError::AbovePlanMaximum {
                    maximum,
                    requested: principal,
                });
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot::from_config(&self.config)
    }
}

/// plan terms frozen onto an investment at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub name: String,
    pub tier: PlanTier,
    pub weekly_rate: Rate,
    pub weeks: u32,
    pub duration_days: u32,
}

impl PlanSnapshot {
    pub fn from_config(config: &PlanConfig) -> Self {
        Self {
            name: config.name.clone(),
            tier: config.tier,
            weekly_rate: config.terms.weekly_rate,
            weeks: config.terms.weeks,
            duration_days: config.terms.duration_days,
        }
    }

    pub fn terms(&self) -> PlanTerms {
        PlanTerms {
            weekly_rate: self.weekly_rate,
            weeks: self.weeks,
            duration_days: self.duration_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn starter() -> InvestmentPlan {
        InvestmentPlan::new(Uuid::new_v4(), PlanConfig::starter(), Utc::now()).unwrap()
    }

    #[test]
    fn test_principal_bounds() {
        let plan = starter();
        assert!(plan.check_principal(Money::from_major(10_000)).is_ok());
        assert!(plan.check_principal(Money::from_major(50_000)).is_ok());
        assert_eq!(
            plan.check_principal(Money::from_major(9_999)).unwrap_err(),
            LedgerError::BelowPlanMinimum {
                minimum: Money::from_major(10_000),
                requested: Money::from_major(9_999),
            }
        );
        assert!(matches!(
            plan.check_principal(Money::from_major(50_001)),
            Err(LedgerError::AbovePlanMaximum { .. })
        ));
        assert!(matches!(
            plan.check_principal(Money::ZERO),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_uncapped_plan() {
        let plan = InvestmentPlan::new(Uuid::new_v4(), PlanConfig::elite(), Utc::now()).unwrap();
        assert!(plan.check_principal(Money::from_major(50_000_000)).is_ok());
    }

    #[test]
    fn test_snapshot_is_detached_from_plan() {
        let mut plan = starter();
        let snapshot = plan.snapshot();
        plan.config.terms.weekly_rate = Rate::from_percentage(1);
        assert_eq!(snapshot.weekly_rate, Rate::from_percentage(15));
        assert_eq!(snapshot.terms().weeks, 4);
    }
}
