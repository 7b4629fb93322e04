use super::board::SquareClaim;
use super::ids::{BoardId, EntryId, UserId};
use super::money::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A paid claim on one square of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub entry_id: EntryId,
    pub board_id: BoardId,
    pub user_id: UserId,
    pub user_name: String,
    pub square_index: usize,
    pub paid_amount: Amount,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(
        board_id: BoardId,
        user_id: UserId,
        user_name: impl Into<String>,
        square_index: usize,
        paid_amount: Amount,
    ) -> Self {
        Self {
            entry_id: EntryId::generate(),
            board_id,
            user_id,
            user_name: user_name.into(),
            square_index,
            paid_amount,
            created_at: Utc::now(),
        }
    }

    /// The square occupant record pointing back at this entry.
    pub fn claim(&self) -> SquareClaim {
        SquareClaim {
            user_id: self.user_id.clone(),
            user_name: self.user_name.clone(),
            entry_id: self.entry_id.clone(),
        }
    }
}
