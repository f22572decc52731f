use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{pending_withdrawals, qualifying_principal, Ledger};
use crate::account::Account;
use crate::adjustment::{Adjustment, AdjustmentField};
use crate::auth::AdminToken;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::LedgerEvent;
use crate::investment::Investment;
use crate::store::{Book, LedgerStore};
use crate::types::{
    AccountId, AccountStatus, FundingSource, InvestmentId, InvestmentStatus, Tier, WithdrawalId,
    WithdrawalStatus,
};
use crate::withdrawal::Withdrawal;

/// answer to "may this account withdraw, and what would it take"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalEligibility {
    pub account_id: AccountId,
    pub tier: Tier,
    pub required_tier: Tier,
    pub qualifying_principal: Money,
    pub can_withdraw: bool,
    /// qualifying principal needed for the next tier, None at the top
    pub next_tier_requirement: Option<Money>,
    /// balance not already promised to pending withdrawals
    pub available_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub account_id: AccountId,
    pub balance: Money,
    pub total_invested: Money,
    pub total_earnings: Money,
    pub total_withdrawn: Money,
    /// current value of active investments
    pub portfolio_value: Money,
    pub qualifying_principal: Money,
    pub tier: Tier,
    pub can_withdraw: bool,
    pub pending_investments: usize,
    pub active_investments: usize,
    pub completed_investments: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub accounts: usize,
    pub active_accounts: usize,
    pub pending_investments: usize,
    pub active_investments: usize,
    pub completed_investments: usize,
    pub cancelled_investments: usize,
    pub active_principal: Money,
    pub pending_withdrawals: usize,
    pub pending_withdrawal_amount: Money,
    pub total_withdrawn: Money,
    pub total_balances: Money,
    pub total_earnings: Money,
}

/// an aggregate that disagrees with the history behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMismatch {
    pub field: String,
    pub recorded: Money,
    pub expected: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub account_id: AccountId,
    pub mismatches: Vec<FieldMismatch>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl<S: LedgerStore> Ledger<S> {
    pub fn account(&self, account_id: AccountId) -> Result<Account> {
        self.store.read(|book| book.account(account_id).cloned())?
    }

    pub fn investment(&self, investment_id: InvestmentId) -> Result<Investment> {
        self.store.read(|book| book.investment(investment_id).cloned())?
    }

    pub fn withdrawal(&self, withdrawal_id: WithdrawalId) -> Result<Withdrawal> {
        self.store.read(|book| book.withdrawal(withdrawal_id).cloned())?
    }

    /// newest first
    pub fn investments_for(&self, account_id: AccountId) -> Result<Vec<Investment>> {
        self.store.read(|book| {
            let mut investments: Vec<Investment> = book.investments_of(account_id).cloned().collect();
            investments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
            investments
        })
    }

    /// newest first
    pub fn withdrawals_for(&self, account_id: AccountId) -> Result<Vec<Withdrawal>> {
        self.store.read(|book| {
            let mut withdrawals: Vec<Withdrawal> = book.withdrawals_of(account_id).cloned().collect();
            withdrawals.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
            withdrawals
        })
    }

    pub fn tier(&self, account_id: AccountId) -> Result<Tier> {
        self.store.read(|book| -> Result<Tier> {
            book.account(account_id)?;
            Ok(self.tier_in(book, account_id))
        })?
    }

    pub fn withdrawal_eligibility(&self, account_id: AccountId) -> Result<WithdrawalEligibility> {
        self.store.read(|book| -> Result<WithdrawalEligibility> {
            let account = book.account(account_id)?;
            let qualifying = qualifying_principal(book, account_id);
            let tier = self.classifier.classify(qualifying);
            Ok(WithdrawalEligibility {
                account_id,
                tier,
                required_tier: self.config.withdrawal_tier,
                qualifying_principal: qualifying,
                can_withdraw: self.may_withdraw(account, tier),
                next_tier_requirement: self.classifier.next_tier_requirement(tier),
                available_balance: (account.balance - pending_withdrawals(book, account_id)).max(Money::ZERO),
            })
        })?
    }

    pub fn dashboard(&self, account_id: AccountId) -> Result<Dashboard> {
        self.store.read(|book| -> Result<Dashboard> {
            let account = book.account(account_id)?;
            let qualifying = qualifying_principal(book, account_id);
            let tier = self.classifier.classify(qualifying);

            let count = |status: InvestmentStatus| {
                book.investments_of(account_id).filter(|i| i.status == status).count()
            };
            let portfolio_value: Money = book
                .investments_of(account_id)
                .filter(|i| i.status == InvestmentStatus::Active)
                .map(|i| i.current_value)
                .sum();

            Ok(Dashboard {
                account_id,
                balance: account.balance,
                total_invested: account.total_invested,
                total_earnings: account.total_earnings,
                total_withdrawn: account.total_withdrawn,
                portfolio_value,
                qualifying_principal: qualifying,
                tier,
                can_withdraw: self.may_withdraw(account, tier),
                pending_investments: count(InvestmentStatus::Pending),
                active_investments: count(InvestmentStatus::Active),
                completed_investments: count(InvestmentStatus::Completed),
            })
        })?
    }

    /// platform-wide counts and totals for operators
    pub fn platform_stats(&self, token: &AdminToken) -> Result<PlatformStats> {
        debug!(admin_id = %token.admin_id(), role = ?token.role(), "platform stats requested");
        self.store.read(|book| {
            let mut stats = PlatformStats::default();

            for account in book.accounts() {
                stats.accounts += 1;
                if account.status == AccountStatus::Active {
                    stats.active_accounts += 1;
                }
                stats.total_balances += account.balance;
                stats.total_earnings += account.total_earnings;
            }

            for investment in book.investments.values() {
                match investment.status {
                    InvestmentStatus::Pending => stats.pending_investments += 1,
                    InvestmentStatus::Active => {
                        stats.active_investments += 1;
                        stats.active_principal += investment.principal;
                    }
                    InvestmentStatus::Completed => stats.completed_investments += 1,
                    InvestmentStatus::Cancelled => stats.cancelled_investments += 1,
                }
            }

            for withdrawal in book.withdrawals.values() {
                match withdrawal.status {
                    WithdrawalStatus::Pending => {
                        stats.pending_withdrawals += 1;
                        stats.pending_withdrawal_amount += withdrawal.amount;
                    }
                    WithdrawalStatus::Completed => stats.total_withdrawn += withdrawal.amount,
                    WithdrawalStatus::Rejected => {}
                }
            }

            stats
        })
    }

    /// recompute every aggregate of an account from its history
    pub fn audit_account(&self, account_id: AccountId) -> Result<ConsistencyReport> {
        self.store.read(|book| -> Result<ConsistencyReport> {
            let account = book.account(account_id)?;
            let expected = expected_aggregates(book, account_id, self.config.reverse_invested_on_cancel);

            let mismatches = [
                ("balance", account.balance, expected.balance),
                ("total_invested", account.total_invested, expected.total_invested),
                ("total_earnings", account.total_earnings, expected.total_earnings),
                ("total_withdrawn", account.total_withdrawn, expected.total_withdrawn),
            ]
            .into_iter()
            .filter(|(_, recorded, expected)| recorded != expected)
            .map(|(field, recorded, expected)| FieldMismatch {
                field: field.to_string(),
                recorded,
                expected,
            })
            .collect();

            Ok(ConsistencyReport { account_id, mismatches })
        })?
    }

    /// copy of the event journal
    pub fn events(&self) -> Result<Vec<LedgerEvent>> {
        self.store.read(|book| book.events().events().to_vec())
    }

    /// drain the event journal
    pub fn take_events(&self) -> Result<Vec<LedgerEvent>> {
        self.store.transact(|book| Ok(book.events.take_events()))
    }
}

#[derive(Default)]
struct Aggregates {
    balance: Money,
    total_invested: Money,
    total_earnings: Money,
    total_withdrawn: Money,
}

fn expected_aggregates(book: &Book, account_id: AccountId, reverse_invested_on_cancel: bool) -> Aggregates {
    let mut totals = Aggregates::default();
    // credits and debits are summed separately so the balance never dips mid-walk
    let mut debits = Money::ZERO;

    for investment in book.investments_of(account_id) {
        let cancelled = investment.status == InvestmentStatus::Cancelled;
        if !(cancelled && reverse_invested_on_cancel) {
            totals.total_invested += investment.principal;
        }
        if investment.funding == FundingSource::AccountBalance {
            debits += investment.principal;
        }
        match investment.status {
            InvestmentStatus::Cancelled => totals.balance += investment.principal,
            InvestmentStatus::Completed => {
                totals.balance += investment.total_return.unwrap_or(investment.principal + investment.profit);
                totals.total_earnings += investment.profit;
            }
            InvestmentStatus::Pending | InvestmentStatus::Active => {}
        }
    }

    for withdrawal in book.withdrawals_of(account_id) {
        if withdrawal.status == WithdrawalStatus::Completed {
            debits += withdrawal.amount;
            totals.total_withdrawn += withdrawal.amount;
        }
    }

    for adjustment in book.adjustments_of(account_id) {
        let (credit, debit) = signed(adjustment);
        match adjustment.field {
            AdjustmentField::Balance => {
                totals.balance += credit;
                debits += debit;
            }
            AdjustmentField::TotalEarnings => {
                totals.total_earnings = totals.total_earnings + credit - debit;
            }
        }
    }

    totals.balance -= debits;
    totals
}

fn signed(adjustment: &Adjustment) -> (Money, Money) {
    if adjustment.new_value >= adjustment.previous_value {
        (adjustment.new_value - adjustment.previous_value, Money::ZERO)
    } else {
        (Money::ZERO, adjustment.previous_value - adjustment.new_value)
    }
}
