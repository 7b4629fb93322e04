use super::locks::KeyedLocks;
use crate::domain::ids::UserId;
use crate::domain::money::{Amount, Balance};
use crate::domain::ports::UserStoreRef;
use crate::domain::user::UserAccount;
use crate::error::{GameError, Result};
use tracing::debug;

/// The only writer of user balances.
///
/// Each adjustment is a read-modify-write under that user's lock, so a
/// balance check and the deduction it guards can never interleave with
/// another adjustment of the same user, whichever board triggered it.
pub struct BalanceLedger {
    users: UserStoreRef,
    locks: KeyedLocks<UserId>,
}

impl BalanceLedger {
    pub fn new(users: UserStoreRef) -> Self {
        Self {
            users,
            locks: KeyedLocks::new(),
        }
    }

    /// Returns the existing account, or creates one with `starting_balance`.
    pub async fn open_account(
        &self,
        user_id: &UserId,
        name: &str,
        starting_balance: Balance,
    ) -> Result<UserAccount> {
        let _guard = self.locks.lock(user_id).await;
        if let Some(existing) = self.users.get(user_id).await? {
            return Ok(existing);
        }
        let account = UserAccount::new(user_id.clone(), name, starting_balance);
        self.users.store(account.clone()).await?;
        debug!(user_id = %user_id, balance = %starting_balance, "Opened account");
        Ok(account)
    }

    pub async fn balance(&self, user_id: &UserId) -> Result<Balance> {
        Ok(self.load(user_id).await?.balance)
    }

    pub async fn credit(&self, user_id: &UserId, amount: Amount) -> Result<Balance> {
        let _guard = self.locks.lock(user_id).await;
        let mut account = self.load(user_id).await?;
        if amount.is_zero() {
            return Ok(account.balance);
        }
        account.credit(amount);
        let balance = account.balance;
        self.users.store(account).await?;
        debug!(user_id = %user_id, %amount, %balance, "Credited balance");
        Ok(balance)
    }

    /// Fails with `InsufficientBalance` and leaves the balance untouched when it does not cover `amount`.
    pub async fn debit(&self, user_id: &UserId, amount: Amount) -> Result<Balance> {
        let _guard = self.locks.lock(user_id).await;
        let mut account = self.load(user_id).await?;
        if amount.is_zero() {
            return Ok(account.balance);
        }
        account.debit(amount)?;
        let balance = account.balance;
        self.users.store(account).await?;
        debug!(user_id = %user_id, %amount, %balance, "Debited balance");
        Ok(balance)
    }

    async fn load(&self, user_id: &UserId) -> Result<UserAccount> {
        self.users
            .get(user_id)
            .await?
            .ok_or(GameError::Unauthenticated)
    }
}
