use hourglass_rs::SafeTimeProvider;
use tracing::info;
use uuid::Uuid;

use super::{pending_withdrawals, refused, Ledger};
use crate::auth::AdminToken;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::LedgerEvent;
use crate::store::LedgerStore;
use crate::types::{AccountId, WithdrawalId};
use crate::withdrawal::Withdrawal;

const DEFAULT_REJECTION: &str = "Rejected by admin";

impl<S: LedgerStore> Ledger<S> {
    /// request a cash-out; nothing is debited until approval
    ///
    /// The amount must fit inside the balance left after earlier pending
    /// withdrawals, and the account must sit in the withdrawal tier.
    pub fn request_withdrawal(
        &self,
        account_id: AccountId,
        amount: Money,
        method: &str,
        destination: &str,
        time: &SafeTimeProvider,
    ) -> Result<Withdrawal> {
        let now = time.now();
        let result = self.store.transact(|book| {
            if !amount.is_positive() {
                return Err(LedgerError::InvalidAmount { amount });
            }
            let account = book.account(account_id)?;
            account.ensure_active()?;

            let tier = self.tier_in(book, account_id);
            if tier < self.config.withdrawal_tier {
                return Err(LedgerError::TierTooLow {
                    tier,
                    required: self.config.withdrawal_tier,
                });
            }

            let available = (account.balance - pending_withdrawals(book, account_id)).max(Money::ZERO);
            if amount > available {
                return Err(LedgerError::InsufficientFunds {
                    available,
                    requested: amount,
                });
            }

            let withdrawal = Withdrawal::request(
                Uuid::new_v4(),
                account_id,
                amount,
                method.to_string(),
                destination.to_string(),
                tier,
                now,
            );
            book.events.emit(LedgerEvent::WithdrawalRequested {
                withdrawal_id: withdrawal.id,
                account_id,
                amount,
                tier,
                timestamp: now,
            });
            book.withdrawals.insert(withdrawal.id, withdrawal.clone());
            Ok(withdrawal)
        });
        let withdrawal = refused("request_withdrawal", result)?;

        info!(
            withdrawal_id = %withdrawal.id,
            account_id = %account_id,
            amount = %amount,
            tier = %withdrawal.tier_at_request,
            "withdrawal requested"
        );
        Ok(withdrawal)
    }

    /// pending -> completed; debits the balance and records the payout
    pub fn approve_withdrawal(
        &self,
        token: &AdminToken,
        withdrawal_id: WithdrawalId,
        external_ref: Option<String>,
        time: &SafeTimeProvider,
    ) -> Result<Withdrawal> {
        let now = time.now();
        let external_ref = external_ref.unwrap_or_else(|| format!("TX{}", now.timestamp_millis()));

        let result = self.store.transact(|book| {
            let withdrawal = book.withdrawal(withdrawal_id)?;
            withdrawal.ensure_pending("approve")?;
            let (account_id, amount) = (withdrawal.account_id, withdrawal.amount);

            let account = book.account(account_id)?;
            account.ensure_funds(amount)?;
            let balance_before = account.balance;

            let withdrawal = book.withdrawal_mut(withdrawal_id)?;
            withdrawal.approve(token.admin_id(), external_ref.clone(), now)?;
            let withdrawal = withdrawal.clone();

            let account = book.account_mut(account_id)?;
            account.record_withdrawal(amount, now)?;
            let balance_after = account.balance;

            book.events.emit(LedgerEvent::WithdrawalApproved {
                withdrawal_id,
                admin_id: token.admin_id(),
                amount,
                external_ref: external_ref.clone(),
                balance_before,
                balance_after,
                timestamp: now,
            });
            Ok(withdrawal)
        });
        let withdrawal = refused("approve_withdrawal", result)?;

        info!(
            withdrawal_id = %withdrawal_id,
            admin_id = %token.admin_id(),
            amount = %withdrawal.amount,
            external_ref = %external_ref,
            "withdrawal approved"
        );
        Ok(withdrawal)
    }

    /// pending -> rejected; the balance was never debited so nothing moves
    pub fn reject_withdrawal(
        &self,
        token: &AdminToken,
        withdrawal_id: WithdrawalId,
        reason: Option<String>,
        time: &SafeTimeProvider,
    ) -> Result<Withdrawal> {
        let now = time.now();
        let reason = reason.unwrap_or_else(|| DEFAULT_REJECTION.to_string());

        let result = self.store.transact(|book| {
            let withdrawal = book.withdrawal_mut(withdrawal_id)?;
            withdrawal.reject(token.admin_id(), reason.clone(), now)?;
            let withdrawal = withdrawal.clone();

            book.events.emit(LedgerEvent::WithdrawalRejected {
                withdrawal_id,
                admin_id: token.admin_id(),
                reason: reason.clone(),
                timestamp: now,
            });
            Ok(withdrawal)
        });
        let withdrawal = refused("reject_withdrawal", result)?;

        info!(
            withdrawal_id = %withdrawal_id,
            admin_id = %token.admin_id(),
            reason = %reason,
            "withdrawal rejected"
        );
        Ok(withdrawal)
    }
}
