/// serialization support for ledger entities
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::investment::Investment;
use crate::ledger::{Dashboard, Ledger};
use crate::returns::compounded_yield;
use crate::store::LedgerStore;
use crate::types::{
    AccountId, AccountStatus, AccruedWeek, InvestmentId, InvestmentStatus, Tier, WeeklyReturn,
    WithdrawalId, WithdrawalStatus,
};
use crate::withdrawal::Withdrawal;

/// serializable view of an investment
#[derive(Debug, Serialize, Deserialize)]
pub struct InvestmentView {
    pub id: InvestmentId,
    pub account_id: AccountId,
    pub status: InvestmentStatus,
    pub plan: PlanTermsView,
    pub financial: InvestmentFinancialView,
    pub dates: InvestmentDatesView,
    pub projected: Vec<WeeklyReturn>,
    pub accrued: Vec<AccruedWeek>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanTermsView {
    pub name: String,
    pub weekly_rate: Rate,
    pub weeks: u32,
    pub duration_days: u32,
    /// growth of one unit over the full term, absent when out of range
    pub term_yield: Option<Rate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvestmentFinancialView {
    pub principal: Money,
    pub current_value: Money,
    pub profit: Money,
    pub total_return: Option<Money>,
    pub projected_profit: Money,
    pub weeks_completed: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvestmentDatesView {
    pub created_at: DateTime<Utc>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl InvestmentView {
    pub fn from_investment(investment: &Investment) -> Self {
        let snapshot = investment.plan_snapshot();
        InvestmentView {
            id: investment.id(),
            account_id: investment.account_id(),
            status: investment.status(),
            plan: PlanTermsView {
                name: snapshot.name.clone(),
                weekly_rate: snapshot.weekly_rate,
                weeks: snapshot.weeks,
                duration_days: snapshot.duration_days,
                term_yield: compounded_yield(snapshot.weekly_rate, snapshot.weeks).ok(),
            },
            financial: InvestmentFinancialView {
                principal: investment.principal(),
                current_value: investment.current_value(),
                profit: investment.profit(),
                total_return: investment.total_return(),
                projected_profit: investment.projected().total_profit,
                weeks_completed: investment.weeks_completed(),
            },
            dates: InvestmentDatesView {
                created_at: investment.created_at(),
                start_date: investment.start_date(),
                end_date: investment.end_date(),
                approved_at: investment.approved_at(),
                completed_at: investment.completed_at(),
            },
            projected: investment.projected().weekly_returns.clone(),
            accrued: investment.weekly_returns().to_vec(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// serializable view of a withdrawal
#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawalView {
    pub id: WithdrawalId,
    pub amount: Money,
    pub method: String,
    pub status: WithdrawalStatus,
    pub tier_at_request: Tier,
    pub external_ref: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl WithdrawalView {
    pub fn from_withdrawal(withdrawal: &Withdrawal) -> Self {
        WithdrawalView {
            id: withdrawal.id(),
            amount: withdrawal.amount(),
            method: withdrawal.method().to_string(),
            status: withdrawal.status(),
            tier_at_request: withdrawal.tier_at_request(),
            external_ref: withdrawal.external_ref().map(str::to_string),
            rejection_reason: withdrawal.rejection_reason().map(str::to_string),
            created_at: withdrawal.created_at(),
            processed_at: withdrawal.processed_at(),
        }
    }
}

/// everything an account holder sees, in one document
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub full_name: String,
    pub email: String,
    pub status: AccountStatus,
    pub dashboard: Dashboard,
    pub investments: Vec<InvestmentView>,
    pub withdrawals: Vec<WithdrawalView>,
}

impl AccountView {
    pub fn build(
        account: &Account,
        dashboard: Dashboard,
        investments: &[Investment],
        withdrawals: &[Withdrawal],
    ) -> Self {
        AccountView {
            id: account.id(),
            full_name: account.full_name().to_string(),
            email: account.email().to_string(),
            status: account.status(),
            dashboard,
            investments: investments.iter().map(InvestmentView::from_investment).collect(),
            withdrawals: withdrawals.iter().map(WithdrawalView::from_withdrawal).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<S: LedgerStore> Ledger<S> {
    pub fn account_view(&self, account_id: AccountId) -> Result<AccountView> {
        let account = self.account(account_id)?;
        let dashboard = self.dashboard(account_id)?;
        let investments = self.investments_for(account_id)?;
        let withdrawals = self.withdrawals_for(account_id)?;
        Ok(AccountView::build(&account, dashboard, &investments, &withdrawals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Admin, AdminRole, AdminToken};
    use crate::config::{LedgerConfig, PlanConfig};
    use chrono::TimeZone;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use uuid::Uuid;

    #[test]
    fn test_account_view_json() {
        let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let admin = AdminToken::issue(&Admin::new(Uuid::new_v4(), "Ops", "ops@example.com", AdminRole::Admin)).unwrap();
        let ledger = Ledger::in_memory(LedgerConfig::default()).unwrap();

        let account = ledger.open_account("Ada Obi", "ada@example.com", &time).unwrap().id();
        let plan = ledger.add_plan(&admin, PlanConfig::starter(), &time).unwrap().id;
        let id = ledger
            .create_investment(account, plan, Money::from_major(10_000), None, &time)
            .unwrap()
            .id();
        ledger.approve_investment(&admin, id, &time).unwrap();

        let view = ledger.account_view(account).unwrap();
        assert_eq!(view.investments.len(), 1);
        assert_eq!(view.investments[0].financial.profit, Money::from_str_exact("7490.06").unwrap());
        assert_eq!(view.investments[0].projected.len(), 4);

        let json = view.to_json_pretty().unwrap();
        assert!(json.contains("\"status\": \"active\""));
        assert!(json.contains("\"Starter Plan\""));

        let single = InvestmentView::from_investment(&ledger.investment(id).unwrap());
        let parsed: serde_json::Value = serde_json::from_str(&single.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed["plan"]["weeks"], 4);
    }
}
