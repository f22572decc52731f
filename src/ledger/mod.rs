mod accounts;
mod investments;
mod reporting;
mod withdrawals;

use tracing::debug;

use crate::account::Account;
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::returns::{AccrualClock, TierClassifier};
use crate::store::{Book, LedgerStore, MemoryStore};
use crate::types::{AccountId, Tier, WithdrawalStatus};

pub use reporting::{
    ConsistencyReport, Dashboard, FieldMismatch, PlatformStats, WithdrawalEligibility,
};

/// money-lifecycle engine over a store
///
/// Every operation runs inside one `LedgerStore::transact` call and checks all
/// of its guards before the first write, so it either commits the status change
/// together with its balance effect or leaves the book untouched.
pub struct Ledger<S: LedgerStore = MemoryStore> {
    config: LedgerConfig,
    classifier: TierClassifier,
    clock: AccrualClock,
    store: S,
}

impl Ledger<MemoryStore> {
    /// ledger over a fresh in-memory store
    pub fn in_memory(config: LedgerConfig) -> Result<Self> {
        Self::new(config, MemoryStore::new())
    }
}

impl<S: LedgerStore> Ledger<S> {
    pub fn new(config: LedgerConfig, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: TierClassifier::new(config.tier_thresholds),
            clock: AccrualClock::new(config.week_length_days)?,
            config,
            store,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn classifier(&self) -> &TierClassifier {
        &self.classifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn tier_in(&self, book: &Book, account_id: AccountId) -> Tier {
        self.classifier.classify(qualifying_principal(book, account_id))
    }

    /// whether `request_withdrawal` would pass its tier and status checks
    fn may_withdraw(&self, account: &Account, tier: Tier) -> bool {
        tier >= self.config.withdrawal_tier && account.is_active()
    }
}

/// principal of the account's active and completed investments
pub(crate) fn qualifying_principal(book: &Book, account_id: AccountId) -> Money {
    book.investments_of(account_id)
        .filter(|i| i.status.is_qualifying())
        .map(|i| i.principal)
        .sum()
}

/// cash already promised to pending withdrawals
pub(crate) fn pending_withdrawals(book: &Book, account_id: AccountId) -> Money {
    book.withdrawals_of(account_id)
        .filter(|w| w.status == WithdrawalStatus::Pending)
        .map(|w| w.amount)
        .sum()
}

fn refused<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        debug!(operation, kind = ?err.kind(), error = %err, "ledger operation refused");
    }
    result
}
