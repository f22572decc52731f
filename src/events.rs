use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adjustment::{AdjustmentDirection, AdjustmentField};
use crate::decimal::Money;
use crate::types::{
    AccountId, AccountStatus, AdminId, InvestmentId, PlanId, Tier, WithdrawalId,
};

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // account events
    AccountOpened {
        account_id: AccountId,
        timestamp: DateTime<Utc>,
    },
    AccountStatusChanged {
        account_id: AccountId,
        old_status: AccountStatus,
        new_status: AccountStatus,
        admin_id: AdminId,
        timestamp: DateTime<Utc>,
    },
    AccountClosed {
        account_id: AccountId,
        admin_id: AdminId,
        final_balance: Money,
        timestamp: DateTime<Utc>,
    },

    // catalog events
    PlanAdded {
        plan_id: PlanId,
        name: String,
        admin_id: AdminId,
        timestamp: DateTime<Utc>,
    },
    PlanUpdated {
        plan_id: PlanId,
        admin_id: AdminId,
        timestamp: DateTime<Utc>,
    },
    PlanDeactivated {
        plan_id: PlanId,
        admin_id: AdminId,
        timestamp: DateTime<Utc>,
    },

    // investment events
    InvestmentRequested {
        investment_id: InvestmentId,
        account_id: AccountId,
        principal: Money,
        projected_profit: Money,
        timestamp: DateTime<Utc>,
    },
    InvestmentCreatedByAdmin {
        investment_id: InvestmentId,
        account_id: AccountId,
        principal: Money,
        admin_id: AdminId,
        balance_before: Money,
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },
    InvestmentApproved {
        investment_id: InvestmentId,
        admin_id: AdminId,
        profit: Money,
        timestamp: DateTime<Utc>,
    },
    InvestmentRejected {
        investment_id: InvestmentId,
        admin_id: AdminId,
        refund: Money,
        reason: String,
        balance_before: Money,
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },
    InvestmentCompleted {
        investment_id: InvestmentId,
        admin_id: AdminId,
        total_return: Money,
        profit: Money,
        balance_before: Money,
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },
    WeekAccrued {
        investment_id: InvestmentId,
        week: u32,
        return_amount: Money,
        cumulative_value: Money,
        timestamp: DateTime<Utc>,
    },

    // withdrawal events
    WithdrawalRequested {
        withdrawal_id: WithdrawalId,
        account_id: AccountId,
        amount: Money,
        tier: Tier,
        timestamp: DateTime<Utc>,
    },
    WithdrawalApproved {
        withdrawal_id: WithdrawalId,
        admin_id: AdminId,
        amount: Money,
        external_ref: String,
        balance_before: Money,
        balance_after: Money,
        timestamp: DateTime<Utc>,
    },
    WithdrawalRejected {
        withdrawal_id: WithdrawalId,
        admin_id: AdminId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    // manual corrections
    BalanceAdjusted {
        account_id: AccountId,
        admin_id: AdminId,
        field: AdjustmentField,
        direction: AdjustmentDirection,
        amount: Money,
        previous_value: Money,
        new_value: Money,
        note: String,
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// account the event belongs to, when it names one directly
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            LedgerEvent::AccountOpened { account_id, .. }
            | LedgerEvent::AccountStatusChanged { account_id, .. }
            | LedgerEvent::AccountClosed { account_id, .. }
            | LedgerEvent::InvestmentRequested { account_id, .. }
            | LedgerEvent::InvestmentCreatedByAdmin { account_id, .. }
            | LedgerEvent::WithdrawalRequested { account_id, .. }
            | LedgerEvent::BalanceAdjusted { account_id, .. } => Some(*account_id),
            _ => None,
        }
    }
}

/// append-only journal of ledger events
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventStore {
    events: Vec<LedgerEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// drain the journal, e.g. to ship it to an external sink
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_take_events_drains() {
        let mut store = EventStore::new();
        let account_id = Uuid::new_v4();
        store.emit(LedgerEvent::AccountOpened {
            account_id,
            timestamp: Utc::now(),
        });
        assert_eq!(store.len(), 1);
        assert_eq!(store.events()[0].account_id(), Some(account_id));

        let drained = store.take_events();
        assert_eq!(drained.len(), 1);
        assert!(store.is_empty());
    }
}
