use super::board::Board;
use super::ids::{BoardId, PayoutId, UserId};
use super::money::Amount;
use super::score::Quarter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quarter's share of the pot credited to its winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub payout_id: PayoutId,
    pub board_id: BoardId,
    pub user_id: UserId,
    pub quarter: Quarter,
    pub amount: Amount,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl Payout {
    /// A payout that has already been credited to the winner.
    pub fn paid(board_id: BoardId, user_id: UserId, quarter: Quarter, amount: Amount) -> Self {
        Self {
            payout_id: PayoutId::generate(),
            board_id,
            user_id,
            quarter,
            amount,
            paid: true,
            created_at: Utc::now(),
        }
    }
}

/// `pot * fraction(quarter)`.
pub fn payout_amount(board: &Board, quarter: Quarter) -> Amount {
    board.pot().scaled(quarter.payout_fraction())
}
