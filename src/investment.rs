use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::plan::PlanSnapshot;
use crate::returns::{AccrualClock, ReturnCalculator, ReturnSchedule, WeekDue};
use crate::types::{
    AccountId, AccruedWeek, AdminId, FundingSource, InvestmentId, InvestmentStatus, PlanId,
};

/// amounts owed to the account when an investment completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub total_return: Money,
    pub profit: Money,
}

/// result of applying one accrual week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualOutcome {
    Applied(AccruedWeek),
    AlreadyApplied,
}

/// a fixed-term compounding investment
///
/// pending -> active -> completed, or pending -> cancelled. Every transition
/// checks the current status before touching any field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub(crate) id: InvestmentId,
    pub(crate) account_id: AccountId,
    pub(crate) plan_id: Option<PlanId>,

    pub(crate) principal: Money,
    pub(crate) plan_snapshot: PlanSnapshot,
    pub(crate) funding: FundingSource,
    pub(crate) status: InvestmentStatus,

    // informational projection computed at creation
    pub(crate) projected: ReturnSchedule,
    // weeks actually applied, append-only
    pub(crate) weekly_returns: Vec<AccruedWeek>,
    pub(crate) current_value: Money,
    pub(crate) profit: Money,
    pub(crate) total_return: Option<Money>,

    pub(crate) created_at: DateTime<Utc>,
    pub(crate) start_date: Option<DateTime<Utc>>,
    pub(crate) end_date: Option<DateTime<Utc>>,
    pub(crate) approved_at: Option<DateTime<Utc>>,
    pub(crate) approved_by: Option<AdminId>,
    pub(crate) rejected_at: Option<DateTime<Utc>>,
    pub(crate) rejected_by: Option<AdminId>,
    pub(crate) rejection_reason: Option<String>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) completed_by: Option<AdminId>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Investment {
    /// new pending investment with its projected schedule
    pub(crate) fn request(
        id: InvestmentId,
        account_id: AccountId,
        plan_id: Option<PlanId>,
        principal: Money,
        plan_snapshot: PlanSnapshot,
        funding: FundingSource,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        plan_snapshot.terms().validate()?;
        let projected = ReturnCalculator::new().compute_schedule(
            principal,
            plan_snapshot.weekly_rate,
            plan_snapshot.weeks,
        )?;

        Ok(Self {
            id,
            account_id,
            plan_id,
            principal,
            plan_snapshot,
            funding,
            status: InvestmentStatus::Pending,
            projected,
            weekly_returns: Vec::new(),
            current_value: principal,
            profit: Money::ZERO,
            total_return: None,
            created_at: now,
            start_date: None,
            end_date: None,
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
            rejection_reason: None,
            completed_at: None,
            completed_by: None,
            updated_at: now,
        })
    }

    fn transition_error(&self, action: &'static str) -> LedgerError {
        LedgerError::InvalidInvestmentTransition {
            id: self.id,
            current: self.status,
            action,
        }
    }

    /// pending -> active; fixes profit from the projected schedule
    pub(crate) fn approve(&mut self, admin: AdminId, now: DateTime<Utc>) -> Result<()> {
        if self.status != InvestmentStatus::Pending {
            return Err(self.transition_error("approve"));
        }

        self.status = InvestmentStatus::Active;
        self.profit = self.projected.total_profit;
        self.total_return = Some(self.principal + self.profit);
        self.approved_at = Some(now);
        self.approved_by = Some(admin);
        self.start_date = Some(now);
        self.end_date = Some(now + Duration::days(self.plan_snapshot.duration_days as i64));
        self.updated_at = now;
        Ok(())
    }

    /// pending -> cancelled; returns the principal to refund
    pub(crate) fn reject(&mut self, admin: AdminId, reason: String, now: DateTime<Utc>) -> Result<Money> {
        if self.status != InvestmentStatus::Pending {
            return Err(self.transition_error("reject"));
        }

        self.status = InvestmentStatus::Cancelled;
        self.rejected_at = Some(now);
        self.rejected_by = Some(admin);
        self.rejection_reason = Some(reason);
        self.updated_at = now;
        Ok(self.principal)
    }

    /// active -> completed; returns what must be credited
    pub(crate) fn complete(&mut self, admin: AdminId, now: DateTime<Utc>) -> Result<Payout> {
        if self.status != InvestmentStatus::Active {
            return Err(self.transition_error("complete"));
        }

        let total_return = *self.total_return.get_or_insert(self.principal + self.profit);
        self.status = InvestmentStatus::Completed;
        self.current_value = total_return;
        self.completed_at = Some(now);
        self.completed_by = Some(admin);
        self.updated_at = now;
        Ok(Payout {
            total_return,
            profit: self.profit,
        })
    }

    /// apply one week of growth, idempotent per week number
    pub(crate) fn accrue(&mut self, week: u32, clock: &AccrualClock, now: DateTime<Utc>) -> Result<AccrualOutcome> {
        if self.status != InvestmentStatus::Active {
            return Err(self.transition_error("accrue"));
        }
        let started_at = self.start_date.unwrap_or(self.created_at);

        match clock.check(started_at, now, self.weeks_completed(), self.plan_snapshot.weeks, week) {
            WeekDue::AlreadyApplied => Ok(AccrualOutcome::AlreadyApplied),
            WeekDue::BeyondTerm => Err(LedgerError::InvalidWeekCount { weeks: week }),
            WeekDue::OutOfOrder { expected } => Err(LedgerError::AccrualOutOfOrder {
                id: self.id,
                expected,
                requested: week,
            }),
            WeekDue::NotYet { due_at } => Err(LedgerError::AccrualNotDue {
                id: self.id,
                week,
                due_at,
            }),
            WeekDue::Due => {
                let projected = self
                    .projected
                    .week(week)
                    .ok_or(LedgerError::InvalidWeekCount { weeks: week })?;
                let accrued = AccruedWeek {
                    week,
                    return_amount: projected.return_amount,
                    cumulative_value: projected.cumulative_value,
                    processed_at: now,
                };
                self.weekly_returns.push(accrued);
                self.current_value = accrued.cumulative_value;
                self.updated_at = now;
                Ok(AccrualOutcome::Applied(accrued))
            }
        }
    }

    pub fn id(&self) -> InvestmentId {
        self.id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn plan_id(&self) -> Option<PlanId> {
        self.plan_id
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn plan_snapshot(&self) -> &PlanSnapshot {
        &self.plan_snapshot
    }

    pub fn funding(&self) -> &FundingSource {
        &self.funding
    }

    pub fn status(&self) -> InvestmentStatus {
        self.status
    }

    pub fn projected(&self) -> &ReturnSchedule {
        &self.projected
    }

    pub fn weekly_returns(&self) -> &[AccruedWeek] {
        &self.weekly_returns
    }

    pub fn weeks_completed(&self) -> u32 {
        self.weekly_returns.len() as u32
    }

    pub fn current_value(&self) -> Money {
        self.current_value
    }

    pub fn profit(&self) -> Money {
        self.profit
    }

    pub fn total_return(&self) -> Option<Money> {
        self.total_return
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn approved_by(&self) -> Option<AdminId> {
        self.approved_by
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_admin_approved(&self) -> bool {
        self.approved_at.is_some()
    }
}
