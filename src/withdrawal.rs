use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{AccountId, AdminId, Tier, WithdrawalId, WithdrawalStatus};

/// a request to pay cash out of an account balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub(crate) id: WithdrawalId,
    pub(crate) account_id: AccountId,
    pub(crate) amount: Money,
    pub(crate) method: String,
    pub(crate) destination: String,
    pub(crate) status: WithdrawalStatus,
    // tier at the time of the request, kept for audit
    pub(crate) tier_at_request: Tier,
    pub(crate) external_ref: Option<String>,
    pub(crate) rejection_reason: Option<String>,
    pub(crate) processed_by: Option<AdminId>,
    pub(crate) processed_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Withdrawal {
    pub(crate) fn request(
        id: WithdrawalId,
        account_id: AccountId,
        amount: Money,
        method: String,
        destination: String,
        tier_at_request: Tier,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            amount,
            method,
            destination,
            status: WithdrawalStatus::Pending,
            tier_at_request,
            external_ref: None,
            rejection_reason: None,
            processed_by: None,
            processed_at: None,
            created_at: now,
        }
    }

    pub(crate) fn ensure_pending(&self, action: &'static str) -> Result<()> {
        if self.status != WithdrawalStatus::Pending {
            return Err(LedgerError::InvalidWithdrawalTransition {
                id: self.id,
                current: self.status,
                action,
            });
        }
        Ok(())
    }

    pub(crate) fn approve(&mut self, admin: AdminId, external_ref: String, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending("approve")?;
        self.status = WithdrawalStatus::Completed;
        self.external_ref = Some(external_ref);
        self.processed_by = Some(admin);
        self.processed_at = Some(now);
        Ok(())
    }

    pub(crate) fn reject(&mut self, admin: AdminId, reason: String, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending("reject")?;
        self.status = WithdrawalStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.processed_by = Some(admin);
        self.processed_at = Some(now);
        Ok(())
    }

    pub fn id(&self) -> WithdrawalId {
        self.id
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn status(&self) -> WithdrawalStatus {
        self.status
    }

    pub fn tier_at_request(&self) -> Tier {
        self.tier_at_request
    }

    pub fn external_ref(&self) -> Option<&str> {
        self.external_ref.as_deref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn processed_by(&self) -> Option<AdminId> {
        self.processed_by
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
