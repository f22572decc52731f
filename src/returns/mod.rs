pub mod accrual;
pub mod schedule;
pub mod tier;

use rust_decimal::Decimal;

use crate::decimal::Rate;
use crate::errors::{LedgerError, Result};

pub use accrual::{AccrualClock, WeekDue};
pub use schedule::{ReturnCalculator, ReturnSchedule};
pub use tier::TierClassifier;

/// total growth of one unit after `weeks` of compounding at `weekly_rate`
pub fn compounded_yield(weekly_rate: Rate, weeks: u32) -> Result<Rate> {
    let overflow = || LedgerError::InvalidRate { rate: weekly_rate };
    // calculate (1 + r)^n - 1 using iteration
    let mut factor = Decimal::ONE;
    let base = Decimal::ONE.checked_add(weekly_rate.as_decimal()).ok_or_else(overflow)?;
    for _ in 0..weeks {
        factor = factor.checked_mul(base).ok_or_else(overflow)?;
    }
    Ok(Rate::from_decimal(factor - Decimal::ONE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compounded_yield() {
        // 15% weekly for 4 weeks is roughly 74.9%
        let growth = compounded_yield(Rate::from_percentage(15), 4).unwrap();
        assert_eq!(growth.as_percentage().round_dp(1), dec!(74.9));

        // 50% weekly for 4 weeks is 406.25%
        let growth = compounded_yield(Rate::from_percentage(50), 4).unwrap();
        assert_eq!(growth.as_percentage(), dec!(406.25));
    }

    #[test]
    fn test_zero_rate_has_no_growth() {
        assert_eq!(compounded_yield(Rate::ZERO, 12).unwrap().as_decimal(), Decimal::ZERO);
    }

    #[test]
    fn test_yield_out_of_range_is_an_error() {
        let err = compounded_yield(Rate::from_percentage(100), 200).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRate { .. }));
    }
}
