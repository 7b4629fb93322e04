use super::ids::UserId;
use super::money::{Amount, Balance};
use crate::error::GameError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A player's profile and spendable balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: UserId,
    pub name: String,
    pub balance: Balance,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(user_id: UserId, name: impl Into<String>, starting_balance: Balance) -> Self {
        Self {
            user_id,
            name: name.into(),
            balance: starting_balance,
            created_at: Utc::now(),
        }
    }

    /// Adds funds to the balance
    pub fn credit(&mut self, amount: Amount) {
        self.balance += Balance::from(amount);
    }

    /// Removes funds if the balance covers them
    pub fn debit(&mut self, amount: Amount) -> Result<(), GameError> {
        if self.balance.covers(amount) {
            self.balance -= Balance::from(amount);
            Ok(())
        } else {
            Err(GameError::InsufficientBalance {
                required: amount.into(),
                available: self.balance,
            })
        }
    }
}
