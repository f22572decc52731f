use chrono::{DateTime, Duration, Utc};

use crate::errors::{LedgerError, Result};

/// outcome of checking whether a week may be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekDue {
    /// week was already applied; re-running is a no-op
    AlreadyApplied,
    /// week is the next one and its calendar date has passed
    Due,
    /// week is the next one but not before `due_at`
    NotYet { due_at: DateTime<Utc> },
    /// an earlier week is still outstanding
    OutOfOrder { expected: u32 },
    /// week lies outside the plan term
    BeyondTerm,
}

/// calendar rules for weekly accrual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualClock {
    week_length: Duration,
}

impl Default for AccrualClock {
    fn default() -> Self {
        Self {
            week_length: Duration::days(7),
        }
    }
}

impl AccrualClock {
    pub fn new(week_length_days: i64) -> Result<Self> {
        let week_length = Duration::try_days(week_length_days)
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| LedgerError::InvalidConfiguration {
                message: format!("unusable week length of {} days", week_length_days),
            })?;
        Ok(Self { week_length })
    }

    /// instant at which `week` (1-based) becomes eligible, if representable
    pub fn due_at(&self, started_at: DateTime<Utc>, week: u32) -> Option<DateTime<Utc>> {
        let weeks = i32::try_from(week).ok()?;
        let offset = self.week_length.checked_mul(weeks)?;
        started_at.checked_add_signed(offset)
    }

    /// number of whole weeks elapsed since `started_at`, capped at `term_weeks`
    pub fn weeks_elapsed(&self, started_at: DateTime<Utc>, now: DateTime<Utc>, term_weeks: u32) -> u32 {
        if now <= started_at {
            return 0;
        }
        let elapsed = (now - started_at).num_seconds() / self.week_length.num_seconds();
        (elapsed.max(0) as u64).min(term_weeks as u64) as u32
    }

    pub fn check(
        &self,
        started_at: DateTime<Utc>,
        now: DateTime<Utc>,
        weeks_applied: u32,
        term_weeks: u32,
        week: u32,
    ) -> WeekDue {
        if week == 0 || week > term_weeks {
            return WeekDue::BeyondTerm;
        }
        if week <= weeks_applied {
            return WeekDue::AlreadyApplied;
        }
        if week != weeks_applied + 1 {
            return WeekDue::OutOfOrder {
                expected: weeks_applied + 1,
            };
        }
        let Some(due_at) = self.due_at(started_at, week) else {
            return WeekDue::BeyondTerm;
        };
        if now < due_at {
            WeekDue::NotYet { due_at }
        } else {
            WeekDue::Due
        }
    }
}
