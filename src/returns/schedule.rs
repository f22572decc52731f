use serde::{Deserialize, Serialize};

use crate::config::MAX_PLAN_WEEKS;
use crate::decimal::{round_cents, Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::WeeklyReturn;

/// projected week-by-week growth of a principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSchedule {
    pub principal: Money,
    pub weekly_returns: Vec<WeeklyReturn>,
    pub final_value: Money,
    pub total_profit: Money,
}

impl ReturnSchedule {
    pub fn weeks(&self) -> u32 {
        self.weekly_returns.len() as u32
    }

    /// projected entry for a 1-based week
    pub fn week(&self, week: u32) -> Option<&WeeklyReturn> {
        if week == 0 {
            return None;
        }
        self.weekly_returns.get((week - 1) as usize)
    }
}

/// weekly compounding calculator
///
/// Each week earns `value * rate` on the running value. The running value is
/// carried at full precision; every recorded figure is rounded to cents on its
/// own, so `total_profit` can differ from `final_value - principal` by a cent.
/// A schedule whose value leaves the decimal range is refused with
/// `LedgerError::ScheduleOverflow`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnCalculator;

impl ReturnCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn compute_schedule(
        &self,
        principal: Money,
        weekly_rate: Rate,
        weeks: u32,
    ) -> Result<ReturnSchedule> {
        if !principal.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: principal });
        }
        if weekly_rate.is_negative() {
            return Err(LedgerError::InvalidRate { rate: weekly_rate });
        }
        if weeks == 0 || weeks > MAX_PLAN_WEEKS {
            return Err(LedgerError::InvalidWeekCount { weeks });
        }

        let overflow = || LedgerError::ScheduleOverflow {
            principal,
            rate: weekly_rate,
            weeks,
        };
        let initial = principal.as_decimal();
        let rate = weekly_rate.as_decimal();
        let mut current_value = initial;
        let mut weekly_returns = Vec::with_capacity(weeks as usize);

        for week in 1..=weeks {
            let return_amount = current_value.checked_mul(rate).ok_or_else(overflow)?;
            current_value = current_value.checked_add(return_amount).ok_or_else(overflow)?;
            weekly_returns.push(WeeklyReturn {
                week,
                return_amount: Money::from_decimal(round_cents(return_amount)),
                cumulative_value: Money::from_decimal(round_cents(current_value)),
            });
        }

        Ok(ReturnSchedule {
            principal,
            weekly_returns,
            final_value: Money::from_decimal(round_cents(current_value)),
            total_profit: Money::from_decimal(round_cents(current_value - initial)),
        })
    }
}

/// convenience wrapper around [`ReturnCalculator::compute_schedule`]
pub fn compute_schedule(principal: Money, weekly_rate: Rate, weeks: u32) -> Result<ReturnSchedule> {
    ReturnCalculator::new().compute_schedule(principal, weekly_rate, weeks)
}
