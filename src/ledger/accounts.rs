use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};
use uuid::Uuid;

use super::{refused, Ledger};
use crate::account::Account;
use crate::adjustment::{Adjustment, AdjustmentDirection, AdjustmentField};
use crate::auth::AdminToken;
use crate::config::PlanConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::plan::InvestmentPlan;
use crate::store::LedgerStore;
use crate::types::{AccountId, AccountStatus, PlanId, WithdrawalStatus};

impl<S: LedgerStore> Ledger<S> {
    /// open an account with zeroed financial fields
    pub fn open_account(&self, full_name: &str, email: &str, time: &SafeTimeProvider) -> Result<Account> {
        let now = time.now();
        let full_name = full_name.trim();
        let email = email.trim().to_lowercase();

        let result = self.store.transact(|book| {
            if full_name.is_empty() {
                return Err(LedgerError::InvalidField {
                    field: "full_name",
                    reason: "must not be empty".to_string(),
                });
            }
            if !email.contains('@') {
                return Err(LedgerError::InvalidField {
                    field: "email",
                    reason: format!("{:?} is not an email address", email),
                });
            }
            if book.accounts.values().any(|a| a.email == email) {
                return Err(LedgerError::EmailInUse { email: email.clone() });
            }

            let account = Account::open(Uuid::new_v4(), full_name.to_string(), email.clone(), now);
            book.events.emit(LedgerEvent::AccountOpened {
                account_id: account.id,
                timestamp: now,
            });
            book.accounts.insert(account.id, account.clone());
            Ok(account)
        });
        let account = refused("open_account", result)?;

        info!(account_id = %account.id, "account opened");
        Ok(account)
    }

    pub fn set_account_status(
        &self,
        token: &AdminToken,
        account_id: AccountId,
        status: AccountStatus,
        time: &SafeTimeProvider,
    ) -> Result<Account> {
        let now = time.now();
        let result = self.store.transact(|book| {
            let account = book.account_mut(account_id)?;
            let old_status = account.status;
            account.set_status(status, now);
            let account = account.clone();

            book.events.emit(LedgerEvent::AccountStatusChanged {
                account_id,
                old_status,
                new_status: status,
                admin_id: token.admin_id(),
                timestamp: now,
            });
            Ok(account)
        });
        let account = refused("set_account_status", result)?;

        info!(account_id = %account_id, status = ?status, admin_id = %token.admin_id(), "account status changed");
        Ok(account)
    }

    /// remove an account that holds no open investment or pending withdrawal
    pub fn close_account(&self, token: &AdminToken, account_id: AccountId, time: &SafeTimeProvider) -> Result<Account> {
        let now = time.now();
        let result = token.require_balance_rights().and_then(|()| {
            self.store.transact(|book| {
                book.account(account_id)?;
                let investments = book
                    .investments_of(account_id)
                    .filter(|i| i.status.is_locked())
                    .count();
                let withdrawals = book
                    .withdrawals_of(account_id)
                    .filter(|w| w.status == WithdrawalStatus::Pending)
                    .count();
                if investments > 0 || withdrawals > 0 {
                    return Err(LedgerError::AccountHasOpenPositions {
                        id: account_id,
                        investments,
                        withdrawals,
                    });
                }

                let account = book
                    .accounts
                    .remove(&account_id)
                    .ok_or(LedgerError::AccountNotFound { id: account_id })?;
                book.events.emit(LedgerEvent::AccountClosed {
                    account_id,
                    admin_id: token.admin_id(),
                    final_balance: account.balance,
                    timestamp: now,
                });
                Ok(account)
            })
        });
        let account = refused("close_account", result)?;

        info!(account_id = %account_id, final_balance = %account.balance, "account closed");
        Ok(account)
    }

    /// audited manual correction of an account's balance or earnings
    #[allow(clippy::too_many_arguments)]
    pub fn adjust(
        &self,
        token: &AdminToken,
        account_id: AccountId,
        field: AdjustmentField,
        direction: AdjustmentDirection,
        amount: Money,
        note: &str,
        time: &SafeTimeProvider,
    ) -> Result<Adjustment> {
        let now = time.now();
        let result = token.require_balance_rights().and_then(|()| {
            if !amount.is_positive() {
                return Err(LedgerError::InvalidAmount { amount });
            }
            self.store.transact(|book| {
                let account = book.account_mut(account_id)?;
                let previous_value = match field {
                    AdjustmentField::Balance => account.balance,
                    AdjustmentField::TotalEarnings => account.total_earnings,
                };
                let new_value = direction.apply(previous_value, amount)?;
                match field {
                    AdjustmentField::Balance => account.set_balance(new_value, now),
                    AdjustmentField::TotalEarnings => account.set_earnings(new_value, now),
                }

                let adjustment = Adjustment {
                    id: Uuid::new_v4(),
                    account_id,
                    field,
                    direction,
                    amount,
                    previous_value,
                    new_value,
                    note: note.to_string(),
                    admin_id: token.admin_id(),
                    at: now,
                };
                book.events.emit(LedgerEvent::BalanceAdjusted {
                    account_id,
                    admin_id: token.admin_id(),
                    field,
                    direction,
                    amount,
                    previous_value,
                    new_value,
                    note: adjustment.note.clone(),
                    timestamp: now,
                });
                book.adjustments.push(adjustment.clone());
                Ok(adjustment)
            })
        });
        let adjustment = refused("adjust", result)?;

        warn!(
            account_id = %account_id,
            admin_id = %token.admin_id(),
            field = ?field,
            previous = %adjustment.previous_value,
            new = %adjustment.new_value,
            "manual adjustment applied"
        );
        Ok(adjustment)
    }

    pub fn add_plan(&self, token: &AdminToken, config: PlanConfig, time: &SafeTimeProvider) -> Result<InvestmentPlan> {
        let now = time.now();
        let result = token.require_catalog_rights().and_then(|()| {
            let plan = InvestmentPlan::new(Uuid::new_v4(), config, now)?;
            self.store.transact(|book| {
                book.events.emit(LedgerEvent::PlanAdded {
                    plan_id: plan.id,
                    name: plan.config.name.clone(),
                    admin_id: token.admin_id(),
                    timestamp: now,
                });
                book.plans.insert(plan.id, plan.clone());
                Ok(plan)
            })
        });
        let plan = refused("add_plan", result)?;

        info!(plan_id = %plan.id, name = %plan.config.name, "plan added");
        Ok(plan)
    }

    /// seed the four standard plans
    pub fn seed_standard_catalog(&self, token: &AdminToken, time: &SafeTimeProvider) -> Result<Vec<InvestmentPlan>> {
        PlanConfig::standard_catalog()
            .into_iter()
            .map(|config| self.add_plan(token, config, time))
            .collect()
    }

    /// replace a plan's terms; investments keep the snapshot they were created with
    pub fn update_plan(
        &self,
        token: &AdminToken,
        plan_id: PlanId,
        config: PlanConfig,
        time: &SafeTimeProvider,
    ) -> Result<InvestmentPlan> {
        let now = time.now();
        let result = token.require_catalog_rights().and_then(|()| {
            config.validate()?;
            self.store.transact(|book| {
                let plan = book.plan_mut(plan_id)?;
                plan.config = config;
                let plan = plan.clone();
                book.events.emit(LedgerEvent::PlanUpdated {
                    plan_id,
                    admin_id: token.admin_id(),
                    timestamp: now,
                });
                Ok(plan)
            })
        });
        let plan = refused("update_plan", result)?;

        info!(plan_id = %plan_id, "plan updated");
        Ok(plan)
    }

    pub fn deactivate_plan(&self, token: &AdminToken, plan_id: PlanId, time: &SafeTimeProvider) -> Result<InvestmentPlan> {
        let now = time.now();
        let result = token.require_catalog_rights().and_then(|()| {
            self.store.transact(|book| {
                let plan = book.plan_mut(plan_id)?;
                plan.is_active = false;
                let plan = plan.clone();
                book.events.emit(LedgerEvent::PlanDeactivated {
                    plan_id,
                    admin_id: token.admin_id(),
                    timestamp: now,
                });
                Ok(plan)
            })
        });
        let plan = refused("deactivate_plan", result)?;

        info!(plan_id = %plan_id, "plan deactivated");
        Ok(plan)
    }

    /// active plans, cheapest first
    pub fn list_active_plans(&self) -> Result<Vec<InvestmentPlan>> {
        self.store.read(|book| {
            let mut plans: Vec<InvestmentPlan> = book.plans().filter(|p| p.is_active).cloned().collect();
            plans.sort_by(|a, b| a.config.minimum_amount.cmp(&b.config.minimum_amount));
            plans
        })
    }

    /// an active plan; inactive plans are reported as missing
    pub fn get_plan(&self, plan_id: PlanId) -> Result<InvestmentPlan> {
        self.store.read(|book| book.active_plan(plan_id).cloned())?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AdminRole;
    use crate::errors::ErrorKind;
    use crate::ledger::testing::{fixture, token};

    #[test]
    fn test_open_account_rejects_duplicates() {
        let fx = fixture();
        let err = fx.ledger.open_account("Ada Again", " ADA@example.com", &fx.time).unwrap_err();
        assert_eq!(err, LedgerError::EmailInUse { email: "ada@example.com".to_string() });

        let err = fx.ledger.open_account("  ", "blank@example.com", &fx.time).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = fx.ledger.open_account("No Email", "nobody", &fx.time).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidField { field: "email", .. }));
    }

    #[test]
    fn test_suspended_account_cannot_invest() {
        let fx = fixture();
        fx.ledger
            .set_account_status(&fx.admin, fx.account, AccountStatus::Suspended, &fx.time)
            .unwrap();
        let err = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Eligibility);

        fx.ledger
            .set_account_status(&fx.admin, fx.account, AccountStatus::Active, &fx.time)
            .unwrap();
        assert!(fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .is_ok());
    }

    #[test]
    fn test_close_account_blocked_by_open_positions() {
        let fx = fixture();
        let id = fx
            .ledger
            .create_investment(fx.account, fx.starter, Money::from_major(10_000), None, &fx.time)
            .unwrap()
            .id();

        let err = fx.ledger.close_account(&fx.admin, fx.account, &fx.time).unwrap_err();
        assert_eq!(
            err,
            LedgerError::AccountHasOpenPositions { id: fx.account, investments: 1, withdrawals: 0 }
        );

        fx.ledger.reject_investment(&fx.admin, id, None, &fx.time).unwrap();
        let closed = fx.ledger.close_account(&fx.admin, fx.account, &fx.time).unwrap();
        assert_eq!(closed.balance(), Money::from_major(10_000));
        assert_eq!(
            fx.ledger.account(fx.account).unwrap_err(),
            LedgerError::AccountNotFound { id: fx.account }
        );
    }

    #[test]
    fn test_adjust_records_before_and_after() {
        let fx = fixture();
        fx.fund(Money::from_major(300));

        let adjustment = fx
            .ledger
            .adjust(
                &fx.admin,
                fx.account,
                AdjustmentField::TotalEarnings,
                AdjustmentDirection::Credit,
                Money::from_major(75),
                "promo bonus",
                &fx.time,
            )
            .unwrap();
        assert_eq!(adjustment.previous_value, Money::ZERO);
        assert_eq!(adjustment.new_value, Money::from_major(75));

        let err = fx
            .ledger
            .adjust(
                &fx.admin,
                fx.account,
                AdjustmentField::Balance,
                AdjustmentDirection::Debit,
                Money::from_major(301),
                "too much",
                &fx.time,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(fx.balance(), Money::from_major(300));
    }

    #[test]
    fn test_moderator_cannot_adjust_or_edit_catalog() {
        let fx = fixture();
        let moderator = token(AdminRole::Moderator);

        let err = fx
            .ledger
            .adjust(
                &moderator,
                fx.account,
                AdjustmentField::Balance,
                AdjustmentDirection::Credit,
                Money::from_major(1),
                "nope",
                &fx.time,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);

        let err = fx.ledger.deactivate_plan(&moderator, fx.starter, &fx.time).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(fx.ledger.get_plan(fx.starter).is_ok());
    }

    #[test]
    fn test_catalog_listing() {
        let fx = fixture();
        let plans = fx.ledger.list_active_plans().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].id, fx.starter);

        fx.ledger.deactivate_plan(&fx.admin, fx.starter, &fx.time).unwrap();
        assert_eq!(fx.ledger.list_active_plans().unwrap().len(), 1);
        assert_eq!(
            fx.ledger.get_plan(fx.starter).unwrap_err(),
            LedgerError::PlanNotFound { id: fx.starter }
        );

        let seeded = fx.ledger.seed_standard_catalog(&fx.admin, &fx.time).unwrap();
        assert_eq!(seeded.len(), 4);
        assert_eq!(fx.ledger.list_active_plans().unwrap().len(), 5);
    }
}
