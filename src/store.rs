use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::account::Account;
use crate::adjustment::Adjustment;
use crate::errors::{LedgerError, Result};
use crate::events::EventStore;
use crate::investment::Investment;
use crate::plan::InvestmentPlan;
use crate::types::{AccountId, InvestmentId, PlanId, WithdrawalId};
use crate::withdrawal::Withdrawal;

/// the full persisted state of a ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    pub(crate) accounts: HashMap<AccountId, Account>,
    pub(crate) plans: HashMap<PlanId, InvestmentPlan>,
    pub(crate) investments: HashMap<InvestmentId, Investment>,
    pub(crate) withdrawals: HashMap<WithdrawalId, Withdrawal>,
    pub(crate) adjustments: Vec<Adjustment>,
    pub(crate) events: EventStore,
}

impl Book {
    pub fn account(&self, id: AccountId) -> Result<&Account> {
        self.accounts.get(&id).ok_or(LedgerError::AccountNotFound { id })
    }

    pub(crate) fn account_mut(&mut self, id: AccountId) -> Result<&mut Account> {
        self.accounts.get_mut(&id).ok_or(LedgerError::AccountNotFound { id })
    }

    /// any plan, active or not
    pub fn plan(&self, id: PlanId) -> Result<&InvestmentPlan> {
        self.plans.get(&id).ok_or(LedgerError::PlanNotFound { id })
    }

    /// a plan that is still offered
    pub fn active_plan(&self, id: PlanId) -> Result<&InvestmentPlan> {
        self.plans
            .get(&id)
            .filter(|p| p.is_active)
            .ok_or(LedgerError::PlanNotFound { id })
    }

    pub(crate) fn plan_mut(&mut self, id: PlanId) -> Result<&mut InvestmentPlan> {
        self.plans.get_mut(&id).ok_or(LedgerError::PlanNotFound { id })
    }

    pub fn investment(&self, id: InvestmentId) -> Result<&Investment> {
        self.investments.get(&id).ok_or(LedgerError::InvestmentNotFound { id })
    }

    pub(crate) fn investment_mut(&mut self, id: InvestmentId) -> Result<&mut Investment> {
        self.investments
            .get_mut(&id)
            .ok_or(LedgerError::InvestmentNotFound { id })
    }

    pub fn withdrawal(&self, id: WithdrawalId) -> Result<&Withdrawal> {
        self.withdrawals.get(&id).ok_or(LedgerError::WithdrawalNotFound { id })
    }

    pub(crate) fn withdrawal_mut(&mut self, id: WithdrawalId) -> Result<&mut Withdrawal> {
        self.withdrawals
            .get_mut(&id)
            .ok_or(LedgerError::WithdrawalNotFound { id })
    }

    pub fn investments_of(&self, account_id: AccountId) -> impl Iterator<Item = &Investment> {
        self.investments
            .values()
            .filter(move |i| i.account_id == account_id)
    }

    pub fn withdrawals_of(&self, account_id: AccountId) -> impl Iterator<Item = &Withdrawal> {
        self.withdrawals
            .values()
            .filter(move |w| w.account_id == account_id)
    }

    pub fn adjustments_of(&self, account_id: AccountId) -> impl Iterator<Item = &Adjustment> {
        self.adjustments
            .iter()
            .filter(move |a| a.account_id == account_id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn plans(&self) -> impl Iterator<Item = &InvestmentPlan> {
        self.plans.values()
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }
}

/// persistence boundary of the ledger
///
/// `transact` runs serialized against every other transaction on the same
/// store. A closure that returns `Err` leaves no write behind, and a store that
/// fails to commit returns `LedgerError::Persistence`.
pub trait LedgerStore: Send + Sync {
    fn read<T>(&self, f: impl FnOnce(&Book) -> T) -> Result<T>;

    fn transact<T>(&self, f: impl FnOnce(&mut Book) -> Result<T>) -> Result<T>;
}

/// in-process store shared between threads
///
/// Ledger operations check every guard before their first write, so a failed
/// closure has nothing to undo.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    book: Arc<RwLock<Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// start from a previously exported book
    pub fn from_book(book: Book) -> Self {
        Self {
            book: Arc::new(RwLock::new(book)),
        }
    }

    /// deep copy of the current state
    pub fn snapshot(&self) -> Book {
        self.book.read().clone()
    }
}

impl LedgerStore for MemoryStore {
    fn read<T>(&self, f: impl FnOnce(&Book) -> T) -> Result<T> {
        let book = self.book.read();
        Ok(f(&*book))
    }

    fn transact<T>(&self, f: impl FnOnce(&mut Book) -> Result<T>) -> Result<T> {
        let mut book = self.book.write();
        f(&mut *book)
    }
}
