use hourglass_rs::SafeTimeProvider;
use tracing::info;
use uuid::Uuid;

use super::{refused, Ledger};
use crate::auth::AdminToken;
use crate::config::PlanConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::investment::{AccrualOutcome, Investment};
use crate::plan::PlanSnapshot;
use crate::store::LedgerStore;
use crate::types::{AccountId, AccruedWeek, FundingSource, InvestmentId, InvestmentStatus, PlanId};

const DEFAULT_REJECTION: &str = "Rejected by admin";

impl<S: LedgerStore> Ledger<S> {
    /// request a new externally funded investment in a catalog plan
    ///
    /// Nothing is debited; the principal arrives by transfer and `proof` points
    /// at it. The investment waits in `pending` for an administrator.
    pub fn create_investment(
        &self,
        account_id: AccountId,
        plan_id: PlanId,
        principal: Money,
        proof: Option<String>,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();
        let result = self.store.transact(|book| {
            let account = book.account(account_id)?;
            account.ensure_active()?;
            let plan = book.active_plan(plan_id)?;
            plan.check_principal(principal)?;

            let investment = Investment::request(
                Uuid::new_v4(),
                account_id,
                Some(plan_id),
                principal,
                plan.snapshot(),
                FundingSource::ExternalTransfer { proof },
                now,
            )?;

            book.account_mut(account_id)?.record_investment(principal, now);
            book.events.emit(LedgerEvent::InvestmentRequested {
                investment_id: investment.id,
                account_id,
                principal,
                projected_profit: investment.projected.total_profit,
                timestamp: now,
            });
            book.investments.insert(investment.id, investment.clone());
            Ok(investment)
        });
        let investment = refused("create_investment", result)?;

        info!(
            investment_id = %investment.id,
            account_id = %account_id,
            principal = %principal,
            plan = %investment.plan_snapshot.name,
            "investment requested"
        );
        Ok(investment)
    }

    /// create a balance-funded investment directly in `active`
    ///
    /// `terms` is usually [`PlanConfig::custom`]; its bounds are not enforced,
    /// only its rate and duration are frozen onto the investment.
    pub fn admin_create_investment(
        &self,
        token: &AdminToken,
        account_id: AccountId,
        terms: PlanConfig,
        principal: Money,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();
        let result = token.require_balance_rights().and_then(|()| {
            terms.terms.validate()?;
            if !principal.is_positive() {
                return Err(LedgerError::InvalidAmount { amount: principal });
            }

            self.store.transact(|book| {
                let account = book.account(account_id)?;
                account.ensure_funds(principal)?;
                let balance_before = account.balance;

                let mut investment = Investment::request(
                    Uuid::new_v4(),
                    account_id,
                    None,
                    principal,
                    PlanSnapshot::from_config(&terms),
                    FundingSource::AccountBalance,
                    now,
                )?;
                investment.approve(token.admin_id(), now)?;

                let account = book.account_mut(account_id)?;
                account.debit_balance(principal, now)?;
                account.record_investment(principal, now);
                let balance_after = account.balance;

                book.events.emit(LedgerEvent::InvestmentCreatedByAdmin {
                    investment_id: investment.id,
                    account_id,
                    principal,
                    admin_id: token.admin_id(),
                    balance_before,
                    balance_after,
                    timestamp: now,
                });
                book.investments.insert(investment.id, investment.clone());
                Ok(investment)
            })
        });
        let investment = refused("admin_create_investment", result)?;

        info!(
            investment_id = %investment.id,
            account_id = %account_id,
            principal = %principal,
            admin_id = %token.admin_id(),
            "investment created by admin"
        );
        Ok(investment)
    }

    /// pending -> active; profit is fixed from the projected schedule
    pub fn approve_investment(
        &self,
        token: &AdminToken,
        investment_id: InvestmentId,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();
        let result = self.store.transact(|book| {
            let investment = book.investment_mut(investment_id)?;
            investment.approve(token.admin_id(), now)?;
            let investment = investment.clone();

            book.events.emit(LedgerEvent::InvestmentApproved {
                investment_id,
                admin_id: token.admin_id(),
                profit: investment.profit,
                timestamp: now,
            });
            Ok(investment)
        });
        let investment = refused("approve_investment", result)?;

        info!(
            investment_id = %investment_id,
            admin_id = %token.admin_id(),
            profit = %investment.profit,
            "investment approved"
        );
        Ok(investment)
    }

    /// pending -> cancelled; refunds the principal to the account balance once
    pub fn reject_investment(
        &self,
        token: &AdminToken,
        investment_id: InvestmentId,
        reason: Option<String>,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();
        let reason = reason.unwrap_or_else(|| DEFAULT_REJECTION.to_string());
        let reverse_invested = self.config.reverse_invested_on_cancel;

        let result = self.store.transact(|book| {
            let account_id = book.investment(investment_id)?.account_id;
            let balance_before = book.account(account_id)?.balance;

            let investment = book.investment_mut(investment_id)?;
            let refund = investment.reject(token.admin_id(), reason.clone(), now)?;
            let investment = investment.clone();

            let account = book.account_mut(account_id)?;
            account.credit_balance(refund, now);
            if reverse_invested {
                account.reverse_investment(investment.principal, now);
            }
            let balance_after = account.balance;

            book.events.emit(LedgerEvent::InvestmentRejected {
                investment_id,
                admin_id: token.admin_id(),
                refund,
                reason: reason.clone(),
                balance_before,
                balance_after,
                timestamp: now,
            });
            Ok(investment)
        });
        let investment = refused("reject_investment", result)?;

        info!(
            investment_id = %investment_id,
            admin_id = %token.admin_id(),
            refund = %investment.principal,
            reason = %reason,
            "investment rejected"
        );
        Ok(investment)
    }

    /// active -> completed; credits the total return and the profit once
    pub fn complete_investment(
        &self,
        token: &AdminToken,
        investment_id: InvestmentId,
        time: &SafeTimeProvider,
    ) -> Result<Investment> {
        let now = time.now();
        let result = self.store.transact(|book| {
            let account_id = book.investment(investment_id)?.account_id;
            let balance_before = book.account(account_id)?.balance;

            let investment = book.investment_mut(investment_id)?;
            let payout = investment.complete(token.admin_id(), now)?;
            let investment = investment.clone();

            let account = book.account_mut(account_id)?;
            account.record_payout(payout.total_return, payout.profit, now);
            let balance_after = account.balance;

            book.events.emit(LedgerEvent::InvestmentCompleted {
                investment_id,
                admin_id: token.admin_id(),
                total_return: payout.total_return,
                profit: payout.profit,
                balance_before,
                balance_after,
                timestamp: now,
            });
            Ok(investment)
        });
        let investment = refused("complete_investment", result)?;

        info!(
            investment_id = %investment_id,
            admin_id = %token.admin_id(),
            total_return = ?investment.total_return,
            "investment completed"
        );
        Ok(investment)
    }

    /// apply one week to an active investment; re-running a week is a no-op
    pub fn accrue_week(
        &self,
        investment_id: InvestmentId,
        week: u32,
        time: &SafeTimeProvider,
    ) -> Result<AccrualOutcome> {
        let now = time.now();
        let result = self.store.transact(|book| {
            let outcome = book
                .investment_mut(investment_id)?
                .accrue(week, &self.clock, now)?;
            if let AccrualOutcome::Applied(accrued) = outcome {
                book.events.emit(week_accrued(investment_id, accrued));
            }
            Ok(outcome)
        });
        let outcome = refused("accrue_week", result)?;

        if let AccrualOutcome::Applied(accrued) = outcome {
            info!(
                investment_id = %investment_id,
                week = accrued.week,
                value = %accrued.cumulative_value,
                "week accrued"
            );
        }
        Ok(outcome)
    }

    /// apply every week that has come due across all active investments
    pub fn accrue_due(&self, time: &SafeTimeProvider) -> Result<Vec<(InvestmentId, AccruedWeek)>> {
        let now = time.now();
        let applied = self.store.transact(|book| {
            let mut applied = Vec::new();
            let mut active: Vec<InvestmentId> = book
                .investments
                .values()
                .filter(|i| i.status == InvestmentStatus::Active)
                .map(|i| i.id)
                .collect();
            active.sort();

            for investment_id in active {
                let investment = book.investment_mut(investment_id)?;
                let started_at = investment.start_date.unwrap_or(investment.created_at);
                let due = self
                    .clock
                    .weeks_elapsed(started_at, now, investment.plan_snapshot.weeks);

                for week in investment.weeks_completed() + 1..=due {
                    if let AccrualOutcome::Applied(accrued) = investment.accrue(week, &self.clock, now)? {
                        applied.push((investment_id, accrued));
                    }
                }
            }

            for (investment_id, accrued) in &applied {
                book.events.emit(week_accrued(*investment_id, *accrued));
            }
            Ok(applied)
        });
        let applied = refused("accrue_due", applied)?;

        info!(weeks = applied.len(), "accrual run finished");
        Ok(applied)
    }
}

fn week_accrued(investment_id: InvestmentId, accrued: AccruedWeek) -> LedgerEvent {
    LedgerEvent::WeekAccrued {
        investment_id,
        week: accrued.week,
        return_amount: accrued.return_amount,
        cumulative_value: accrued.cumulative_value,
        timestamp: accrued.processed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AdminRole;
    use crate::config::LedgerConfig;
    use crate::errors::ErrorKind;
    use crate::ledger::testing::{fixture, fixture_with, token};
    use crate::decimal::Rate;
    use chrono::Duration;

    fn money(s: &str) -> Money {
        Money::from_str_exact(s).unwrap()
    }

    #[test]
    fn test_create_does_not_debit() {
        let fx = fixture();
        fx.fund(Money::from_major(1_000));

        let investment = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), Some("wire-1".into()), &fx.time)
            .unwrap();

        assert_eq!(investment.status(), InvestmentStatus::Pending);
        assert_eq!(investment.projected().total_profit, money("7490.06"));
        assert_eq!(
            investment.funding(),
            &FundingSource::ExternalTransfer { proof: Some("wire-1".into()) }
        );
        let account = fx.ledger.account(fx.account).unwrap();
        assert_eq!(account.balance(), Money::from_major(1_000));
        assert_eq!(account.total_invested(), Money::from_major(10_000));
    }

    #[test]
    fn test_create_validates_plan_bounds() {
        let fx = fixture();
        let err = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(9_000), None, &fx.time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = fx
            .ledger
            .create_investment(fx.account, Uuid::new_v4(), Money::from_major(10_000), None, &fx.time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        fx.ledger.deactivate_plan(&fx.admin, fx.starter, &fx.time).unwrap();
        let err = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap_err();
        assert_eq!(err, LedgerError::PlanNotFound { id: fx.starter });

        // nothing was recorded by the failed attempts
        assert_eq!(fx.ledger.account(fx.account).unwrap().total_invested(), Money::ZERO);
        assert!(fx.ledger.investments_for(fx.account).unwrap().is_empty());
    }

    #[test]
    fn test_complete_credits_return_and_earnings() {
        let fx = fixture();
        let investment = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap();
        fx.ledger.approve_investment(&fx.admin, investment.id(), &fx.time).unwrap();
        let completed = fx.ledger.complete_investment(&fx.admin, investment.id(), &fx.time).unwrap();

        assert_eq!(completed.status(), InvestmentStatus::Completed);
        assert_eq!(completed.total_return(), Some(money("17490.06")));
        let account = fx.ledger.account(fx.account).unwrap();
        assert_eq!(account.balance(), money("17490.06"));
        assert_eq!(account.total_earnings(), money("7490.06"));
    }

    #[test]
    fn test_second_complete_fails_without_credit() {
        let fx = fixture();
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap()
            .id();
        fx.ledger.approve_investment(&fx.admin, id, &fx.time).unwrap();
        fx.ledger.complete_investment(&fx.admin, id, &fx.time).unwrap();
        let balance = fx.balance();

        let err = fx.ledger.complete_investment(&fx.admin, id, &fx.time).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(fx.balance(), balance);
        assert_eq!(fx.ledger.account(fx.account).unwrap().total_earnings(), money("7490.06"));
    }

    #[test]
    fn test_reject_refunds_principal_once() {
        let fx = fixture();
        fx.fund(Money::from_major(250));
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(12_000), None, &fx.time)
            .unwrap()
            .id();

        let before = fx.balance();
        let rejected = fx.ledger.reject_investment(&fx.admin, id, None, &fx.time).unwrap();
        assert_eq!(rejected.status(), InvestmentStatus::Cancelled);
        assert_eq!(rejected.rejection_reason(), Some("Rejected by admin"));
        assert_eq!(fx.balance(), before + Money::from_major(12_000));

        let err = fx
            .ledger
            .reject_investment(&fx.admin, id, Some("again".into()), &fx.time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(fx.balance(), before + Money::from_major(12_000));

        // total invested keeps the cancelled principal by default
        assert_eq!(fx.ledger.account(fx.account).unwrap().total_invested(), Money::from_major(12_000));
    }

    #[test]
    fn test_reject_can_reverse_total_invested() {
        let config = LedgerConfig { reverse_invested_on_cancel: true, ..LedgerConfig::default() };
        let fx = fixture_with(config);
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(12_000), None, &fx.time)
            .unwrap()
            .id();
        fx.ledger.reject_investment(&fx.admin, id, None, &fx.time).unwrap();
        assert_eq!(fx.ledger.account(fx.account).unwrap().total_invested(), Money::ZERO);
    }

    #[test]
    fn test_active_investment_cannot_be_cancelled() {
        let fx = fixture();
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap()
            .id();
        fx.ledger.approve_investment(&fx.admin, id, &fx.time).unwrap();

        let err = fx.ledger.reject_investment(&fx.admin, id, None, &fx.time).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidInvestmentTransition {
                id,
                current: InvestmentStatus::Active,
                action: "reject",
            }
        );
        assert_eq!(fx.balance(), Money::ZERO);
    }

    #[test]
    fn test_moderator_can_run_lifecycle() {
        let fx = fixture();
        let moderator = token(AdminRole::Moderator);
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap()
            .id();
        fx.ledger.approve_investment(&moderator, id, &fx.time).unwrap();
        fx.ledger.complete_investment(&moderator, id, &fx.time).unwrap();
    }

    #[test]
    fn test_admin_create_debits_balance() {
        let fx = fixture();
        fx.fund(Money::from_major(20_000));

        let terms = PlanConfig::custom("Bespoke", Rate::from_percentage(15), 4, 30);
        let investment = fx
            .ledger
            .admin_create_investment(&fx.admin, fx.account, terms, Money::from_major(10_000), &fx.time)
            .unwrap();

        assert_eq!(investment.status(), InvestmentStatus::Active);
        assert!(investment.is_admin_approved());
        assert_eq!(investment.funding(), &FundingSource::AccountBalance);
        assert_eq!(investment.profit(), money("7490.06"));

        let account = fx.ledger.account(fx.account).unwrap();
        assert_eq!(account.balance(), Money::from_major(10_000));
        assert_eq!(account.total_invested(), Money::from_major(10_000));

        fx.ledger.complete_investment(&fx.admin, investment.id(), &fx.time).unwrap();
        assert_eq!(fx.balance(), money("27490.06"));
    }

    #[test]
    fn test_admin_create_requires_funds_and_rights() {
        let fx = fixture();
        fx.fund(Money::from_major(5_000));
        let terms = PlanConfig::custom("Bespoke", Rate::from_percentage(10), 4, 30);

        let err = fx
            .ledger
            .admin_create_investment(&fx.admin, fx.account, terms.clone(), Money::from_major(5_001), &fx.time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

        let err = fx
            .ledger
            .admin_create_investment(&token(AdminRole::Moderator), fx.account, terms, Money::from_major(1_000), &fx.time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        assert_eq!(fx.balance(), Money::from_major(5_000));
        assert!(fx.ledger.investments_for(fx.account).unwrap().is_empty());
    }

    #[test]
    fn test_runaway_terms_are_refused_without_writes() {
        let fx = fixture();
        fx.fund(Money::from_major(2_000_000));
        let terms = PlanConfig::custom("Big", Rate::from_percentage(100), 80, 560);

        let err = fx
            .ledger
            .admin_create_investment(&fx.admin, fx.account, terms.clone(), Money::from_major(1_000_000), &fx.time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ScheduleOverflow { weeks: 80, .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fx.balance(), Money::from_major(2_000_000));

        let plan = fx.ledger.add_plan(&fx.admin, terms, &fx.time).unwrap().id;
        let err = fx
            .ledger
            .create_investment(fx.account, plan, Money::from_major(1_000_000), None, &fx.time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(fx.ledger.investments_for(fx.account).unwrap().is_empty());

        // the store is still usable afterwards
        fx.ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap();
    }

    #[test]
    fn test_plan_edit_does_not_touch_existing_investment() {
        let fx = fixture();
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap()
            .id();

        let mut terms = PlanConfig::starter();
        terms.terms.weekly_rate = Rate::from_percentage(1);
        fx.ledger.update_plan(&fx.admin, fx.starter, terms, &fx.time).unwrap();

        let approved = fx.ledger.approve_investment(&fx.admin, id, &fx.time).unwrap();
        assert_eq!(approved.plan_snapshot().weekly_rate, Rate::from_percentage(15));
        assert_eq!(approved.profit(), money("7490.06"));
    }

    #[test]
    fn test_accrue_week_is_idempotent() {
        let fx = fixture();
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap()
            .id();
        fx.ledger.approve_investment(&fx.admin, id, &fx.time).unwrap();

        let err = fx.ledger.accrue_week(id, 1, &fx.time).unwrap_err();
        assert!(matches!(err, LedgerError::AccrualNotDue { week: 1, .. }));

        fx.time.test_control().unwrap().advance(Duration::days(7));
        assert!(matches!(fx.ledger.accrue_week(id, 1, &fx.time).unwrap(), AccrualOutcome::Applied(_)));
        assert_eq!(fx.ledger.accrue_week(id, 1, &fx.time).unwrap(), AccrualOutcome::AlreadyApplied);

        let investment = fx.ledger.investment(id).unwrap();
        assert_eq!(investment.weeks_completed(), 1);
        assert_eq!(investment.current_value(), Money::from_major(11_500));
        // accrual never touches the account
        assert_eq!(fx.balance(), Money::ZERO);
    }

    #[test]
    fn test_accrue_due_catches_up() {
        let fx = fixture();
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap()
            .id();
        fx.ledger.approve_investment(&fx.admin, id, &fx.time).unwrap();

        fx.time.test_control().unwrap().advance(Duration::days(15));
        let applied = fx.ledger.accrue_due(&fx.time).unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(fx.ledger.investment(id).unwrap().current_value(), Money::from_major(13_225));

        // nothing new until another week passes
        assert!(fx.ledger.accrue_due(&fx.time).unwrap().is_empty());

        fx.time.test_control().unwrap().advance(Duration::days(60));
        let applied = fx.ledger.accrue_due(&fx.time).unwrap();
        assert_eq!(applied.len(), 2);
        let investment = fx.ledger.investment(id).unwrap();
        assert_eq!(investment.weeks_completed(), 4);
        assert_eq!(investment.current_value(), money("17490.06"));
    }
}
