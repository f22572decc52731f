use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{AccountId, AccountStatus};

/// a user's financial position
///
/// The aggregate fields are only writable inside the crate; every change goes
/// through a ledger operation that also records an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub(crate) id: AccountId,
    pub(crate) full_name: String,
    pub(crate) email: String,

    // withdrawable cash
    pub(crate) balance: Money,
    // cumulative principal ever committed
    pub(crate) total_invested: Money,
    // cumulative profit credited
    pub(crate) total_earnings: Money,
    // cumulative cash paid out
    pub(crate) total_withdrawn: Money,

    pub(crate) status: AccountStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Account {
    pub(crate) fn open(id: AccountId, full_name: String, email: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name,
            email: email.trim().to_lowercase(),
            balance: Money::ZERO,
            total_invested: Money::ZERO,
            total_earnings: Money::ZERO,
            total_withdrawn: Money::ZERO,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn total_invested(&self) -> Money {
        self.total_invested
    }

    pub fn total_earnings(&self) -> Money {
        self.total_earnings
    }

    pub fn total_withdrawn(&self) -> Money {
        self.total_withdrawn
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// fail unless the account may start new investments or withdrawals
    pub(crate) fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(LedgerError::AccountNotActive {
                id: self.id,
                status: self.status,
            })
        }
    }

    /// fail unless `amount` can be taken from the balance
    pub(crate) fn ensure_funds(&self, amount: Money) -> Result<()> {
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                available: self.balance,
                requested: amount,
            });
        }
        Ok(())
    }

    pub(crate) fn credit_balance(&mut self, amount: Money, now: DateTime<Utc>) {
        self.balance += amount;
        self.updated_at = now;
    }

    /// callers check `ensure_funds` before their first write
    pub(crate) fn debit_balance(&mut self, amount: Money, now: DateTime<Utc>) -> Result<()> {
        self.ensure_funds(amount)?;
        self.balance -= amount;
        self.updated_at = now;
        Ok(())
    }

    pub(crate) fn record_investment(&mut self, principal: Money, now: DateTime<Utc>) {
        self.total_invested += principal;
        self.updated_at = now;
    }

    pub(crate) fn reverse_investment(&mut self, principal: Money, now: DateTime<Utc>) {
        self.total_invested = (self.total_invested - principal).max(Money::ZERO);
        self.updated_at = now;
    }

    /// credit a payout: the full return to balance, the profit to earnings
    pub(crate) fn record_payout(&mut self, total_return: Money, profit: Money, now: DateTime<Utc>) {
        self.balance += total_return;
        self.total_earnings += profit;
        self.updated_at = now;
    }

    pub(crate) fn record_withdrawal(&mut self, amount: Money, now: DateTime<Utc>) -> Result<()> {
        self.debit_balance(amount, now)?;
        self.total_withdrawn += amount;
        Ok(())
    }

    pub(crate) fn set_earnings(&mut self, value: Money, now: DateTime<Utc>) {
        self.total_earnings = value;
        self.updated_at = now;
    }

    pub(crate) fn set_balance(&mut self, value: Money, now: DateTime<Utc>) {
        self.balance = value;
        self.updated_at = now;
    }

    pub(crate) fn set_status(&mut self, status: AccountStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn account() -> Account {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Account::open(Uuid::new_v4(), "Ada Obi".to_string(), " Ada@Example.com ".to_string(), now)
    }

    #[test]
    fn test_open_account_is_zeroed() {
        let account = account();
        assert_eq!(account.balance(), Money::ZERO);
        assert_eq!(account.total_invested(), Money::ZERO);
        assert_eq!(account.total_earnings(), Money::ZERO);
        assert_eq!(account.total_withdrawn(), Money::ZERO);
        assert_eq!(account.status(), AccountStatus::Active);
        assert_eq!(account.email(), "ada@example.com");
    }

    #[test]
    fn test_debit_never_goes_negative() {
        let mut account = account();
        let now = account.created_at;
        account.credit_balance(Money::from_major(100), now);

        let err = account.debit_balance(Money::from_major(101), now).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                available: Money::from_major(100),
                requested: Money::from_major(101),
            }
        );
        assert_eq!(account.balance(), Money::from_major(100));

        account.debit_balance(Money::from_major(100), now).unwrap();
        assert_eq!(account.balance(), Money::ZERO);
    }

    #[test]
    fn test_payout_credits_balance_and_earnings() {
        let mut account = account();
        let now = account.created_at;
        account.record_payout(
            Money::from_str_exact("17490.06").unwrap(),
            Money::from_str_exact("7490.06").unwrap(),
            now,
        );
        assert_eq!(account.balance(), Money::from_str_exact("17490.06").unwrap());
        assert_eq!(account.total_earnings(), Money::from_str_exact("7490.06").unwrap());
    }

    #[test]
    fn test_withdrawal_moves_balance_to_withdrawn() {
        let mut account = account();
        let now = account.created_at;
        account.credit_balance(Money::from_major(500), now);
        account.record_withdrawal(Money::from_major(200), now).unwrap();
        assert_eq!(account.balance(), Money::from_major(300));
        assert_eq!(account.total_withdrawn(), Money::from_major(200));

        assert!(account.record_withdrawal(Money::from_major(301), now).is_err());
        assert_eq!(account.total_withdrawn(), Money::from_major(200));
    }

    #[test]
    fn test_suspended_account_is_not_eligible() {
        let mut account = account();
        let now = account.created_at;
        account.set_status(AccountStatus::Suspended, now);
        assert!(matches!(
            account.ensure_active(),
            Err(LedgerError::AccountNotActive { status: AccountStatus::Suspended, .. })
        ));
    }
}
