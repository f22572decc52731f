use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::{PlanTier, Tier};

/// longest accrual week a ledger accepts
pub const MAX_WEEK_LENGTH_DAYS: i64 = 366;
/// longest plan term, in weeks
pub const MAX_PLAN_WEEKS: u32 = 520;
/// longest plan duration, in days
pub const MAX_PLAN_DURATION_DAYS: u32 = 3_660;

/// ledger-wide policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub tier_thresholds: TierThresholds,
    /// minimum tier allowed to withdraw
    pub withdrawal_tier: Tier,
    /// length of one accrual week
    pub week_length_days: i64,
    /// subtract a cancelled investment's principal from total invested
    pub reverse_invested_on_cancel: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tier_thresholds: TierThresholds::default(),
            withdrawal_tier: Tier::Three,
            week_length_days: 7,
            reverse_invested_on_cancel: false,
        }
    }
}

impl LedgerConfig {
    /// parse and validate a json configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tier_thresholds.validate()?;
        if !(1..=MAX_WEEK_LENGTH_DAYS).contains(&self.week_length_days) {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "week length must be between 1 and {} days, got {}",
                    MAX_WEEK_LENGTH_DAYS, self.week_length_days
                ),
            });
        }
        Ok(())
    }
}

/// lower bounds (inclusive) of tiers 2 and 3
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub tier_two: Money,
    pub tier_three: Money,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            tier_two: Money::from_major(1_000_000),
            tier_three: Money::from_major(5_000_000),
        }
    }
}

impl TierThresholds {
    pub fn validate(&self) -> Result<()> {
        if !self.tier_two.is_positive() || self.tier_three <= self.tier_two {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "tier thresholds must satisfy 0 < tier two ({}) < tier three ({})",
                    self.tier_two, self.tier_three
                ),
            });
        }
        Ok(())
    }
}

/// rate and duration terms of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTerms {
    pub weekly_rate: Rate,
    pub weeks: u32,
    pub duration_days: u32,
}

impl PlanTerms {
    pub fn validate(&self) -> Result<()> {
        if self.weekly_rate.is_negative() {
            return Err(LedgerError::InvalidRate { rate: self.weekly_rate });
        }
        if self.weeks == 0 || self.weeks > MAX_PLAN_WEEKS {
            return Err(LedgerError::InvalidWeekCount { weeks: self.weeks });
        }
        if self.duration_days == 0 || self.duration_days > MAX_PLAN_DURATION_DAYS {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "plan duration must be between 1 and {} days, got {}",
                    MAX_PLAN_DURATION_DAYS, self.duration_days
                ),
            });
        }
        Ok(())
    }
}

/// catalog entry definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub name: String,
    pub tier: PlanTier,
    pub minimum_amount: Money,
    pub maximum_amount: Option<Money>,
    pub terms: PlanTerms,
    pub description: String,
}

impl PlanConfig {
    pub fn validate(&self) -> Result<()> {
        self.terms.validate()?;
        if self.minimum_amount.is_negative() {
            return Err(LedgerError::InvalidAmount { amount: self.minimum_amount });
        }
        if let Some(maximum) = self.maximum_amount {
            if maximum < self.minimum_amount {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!(
                        "plan {} maximum {} is below its minimum {}",
                        self.name, maximum, self.minimum_amount
                    ),
                });
            }
        }
        Ok(())
    }

    fn four_week(
        name: &str,
        tier: PlanTier,
        minimum: i64,
        maximum: Option<i64>,
        weekly_percentage: u32,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            tier,
            minimum_amount: Money::from_major(minimum),
            maximum_amount: maximum.map(Money::from_major),
            terms: PlanTerms {
                weekly_rate: Rate::from_percentage(weekly_percentage),
                weeks: 4,
                duration_days: 30,
            },
            description: description.to_string(),
        }
    }

    /// 15% weekly, $10,000 - $50,000
    pub fn starter() -> Self {
        Self::four_week(
            "Starter Plan",
            PlanTier::Starter,
            10_000,
            Some(50_000),
            15,
            "15% weekly compounding over 4 weeks",
        )
    }

    /// 20% weekly, $50,000 - $150,000
    pub fn growth() -> Self {
        Self::four_week(
            "Growth Plan",
            PlanTier::Growth,
            50_000,
            Some(150_000),
            20,
            "20% weekly compounding over 4 weeks",
        )
    }

    /// 25% weekly, $150,000 - $500,000
    pub fn premium() -> Self {
        Self::four_week(
            "Premium Plan",
            PlanTier::Premium,
            150_000,
            Some(500_000),
            25,
            "25% weekly compounding over 4 weeks",
        )
    }

    /// 50% weekly, $500,000 and up
    pub fn elite() -> Self {
        Self::four_week(
            "Elite Plan",
            PlanTier::Elite,
            500_000,
            None,
            50,
            "50% weekly compounding over 4 weeks",
        )
    }

    pub fn standard_catalog() -> Vec<Self> {
        vec![Self::starter(), Self::growth(), Self::premium(), Self::elite()]
    }

    /// one-off terms for an administrator-created investment
    pub fn custom(name: &str, weekly_rate: Rate, weeks: u32, duration_days: u32) -> Self {
        Self {
            name: name.to_string(),
            tier: PlanTier::Custom,
            minimum_amount: Money::ZERO,
            maximum_amount: None,
            terms: PlanTerms { weekly_rate, weeks, duration_days },
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.withdrawal_tier, Tier::Three);
        assert_eq!(config.tier_thresholds.tier_three, Money::from_major(5_000_000));
    }

    #[test]
    fn test_from_json_with_partial_fields() {
        let config = LedgerConfig::from_json(r#"{ "reverse_invested_on_cancel": true }"#).unwrap();
        assert!(config.reverse_invested_on_cancel);
        assert_eq!(config.week_length_days, 7);
    }

    #[test]
    fn test_from_json_rejects_inverted_thresholds() {
        let json = r#"{
            "tier_thresholds": { "tier_two": "5000000", "tier_three": "1000000" }
        }"#;
        let err = LedgerConfig::from_json(json).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Validation);
    }

    #[test]
    fn test_week_length_is_bounded() {
        for days in [0, -7, 367, i64::MAX] {
            let config = LedgerConfig { week_length_days: days, ..LedgerConfig::default() };
            assert!(
                matches!(config.validate(), Err(LedgerError::InvalidConfiguration { .. })),
                "week length {} accepted",
                days
            );
        }
        let config = LedgerConfig { week_length_days: MAX_WEEK_LENGTH_DAYS, ..LedgerConfig::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_standard_catalog() {
        let catalog = PlanConfig::standard_catalog();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.iter().all(|p| p.validate().is_ok()));

        let elite = PlanConfig::elite();
        assert_eq!(elite.maximum_amount, None);
        assert_eq!(elite.terms.weekly_rate, Rate::from_percentage(50));
        assert_eq!(elite.terms.weeks, 4);
    }

    #[test]
    fn test_plan_validation() {
        let mut plan = PlanConfig::starter();
        plan.maximum_amount = Some(Money::from_major(5_000));
        assert!(plan.validate().is_err());

        let mut plan = PlanConfig::starter();
        plan.terms.weeks = 0;
        assert_eq!(
            plan.validate().unwrap_err(),
            LedgerError::InvalidWeekCount { weeks: 0 }
        );

        let plan = PlanConfig::custom("negative", Rate::from_decimal(dec!(-0.01)), 4, 30);
        assert!(matches!(plan.validate(), Err(LedgerError::InvalidRate { .. })));
    }

    #[test]
    fn test_plan_terms_are_bounded() {
        let plan = PlanConfig::custom("long", Rate::from_percentage(1), u32::MAX, 30);
        assert_eq!(plan.validate().unwrap_err(), LedgerError::InvalidWeekCount { weeks: u32::MAX });

        let plan = PlanConfig::custom("long", Rate::from_percentage(1), 4, MAX_PLAN_DURATION_DAYS + 1);
        assert!(matches!(plan.validate(), Err(LedgerError::InvalidConfiguration { .. })));

        let plan = PlanConfig::custom("ten years", Rate::from_percentage(1), MAX_PLAN_WEEKS, MAX_PLAN_DURATION_DAYS);
        assert!(plan.validate().is_ok());
    }
}
