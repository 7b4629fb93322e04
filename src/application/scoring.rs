use super::ledger::BalanceLedger;
use super::undo::{Undo, UndoLog};
use crate::domain::board::Board;
use crate::domain::ids::UserId;
use crate::domain::lifecycle::BoardStatus;
use crate::domain::money::Amount;
use crate::domain::payout::{Payout, payout_amount};
use crate::domain::ports::Stores;
use crate::domain::score::{Quarter, Score};
use crate::error::{GameError, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub quarter: Quarter,
    pub winning_digit: u8,
    pub winner: Option<UserId>,
    /// The quarter's share of the pot, whether or not anyone won it.
    pub payout_amount: Amount,
    pub status: BoardStatus,
}

/// Records quarter scores and settles the matching payout.
pub struct ScoreProcessor {
    stores: Stores,
    ledger: Arc<BalanceLedger>,
}

impl ScoreProcessor {
    pub fn new(stores: Stores, ledger: Arc<BalanceLedger>) -> Self {
        Self { stores, ledger }
    }

    /// Scores `quarter` on a board whose lock the caller holds.
    ///
    /// Quarters are write-once: a second score for the same quarter is
    /// rejected before anything moves.
    pub async fn update_score(
        &self,
        board: &mut Board,
        actor: &UserId,
        quarter: &str,
        score_text: &str,
    ) -> Result<ScoreOutcome> {
        if !board.is_creator(actor) {
            return Err(GameError::Forbidden {
                action: "update scores",
            });
        }
        board.status.require(BoardStatus::Active)?;
        let quarter: Quarter = quarter.parse()?;
        let score: Score = score_text.parse()?;
        if board.is_scored(quarter) {
            return Err(GameError::QuarterAlreadyScored(quarter));
        }

        let winning_digit = score.winning_digit();
        let winner = board
            .occupant_of_digit(winning_digit)
            .map(|claim| claim.user_id.clone());
        if winner.is_none() {
            warn!(board_id = %board.board_id, %quarter, winning_digit, "No occupant holds the winning digit");
        }
        let amount = payout_amount(board, quarter);

        let mut next = board.clone();
        next.record_quarter(quarter, score_text, winner.clone())?;

        let mut undo = UndoLog::default();
        if let Err(e) = self
            .settle(&next, quarter, winner.as_ref(), amount, &mut undo)
            .await
        {
            undo.rollback(&self.stores, &self.ledger).await;
            return Err(e);
        }

        info!(
            board_id = %next.board_id,
            %quarter,
            score = score_text,
            winning_digit,
            winner = ?winner,
            %amount,
            "Quarter scored"
        );
        if next.status.is_terminal() {
            info!(board_id = %next.board_id, "Board completed");
        }

        *board = next;
        Ok(ScoreOutcome {
            quarter,
            winning_digit,
            winner,
            payout_amount: amount,
            status: board.status,
        })
    }

    /// Pays the winner (if any), then persists the scored board.
    async fn settle(
        &self,
        next: &Board,
        quarter: Quarter,
        winner: Option<&UserId>,
        amount: Amount,
        undo: &mut UndoLog,
    ) -> Result<()> {
        if let Some(winner) = winner {
            let payout = Payout::paid(next.board_id.clone(), winner.clone(), quarter, amount);
            let payout_id = payout.payout_id.clone();
            self.stores.payouts.store(payout).await?;
            undo.push(Undo::DeletePayout(payout_id));

            self.ledger.credit(winner, amount).await?;
            undo.push(Undo::Debit(winner.clone(), amount));
        }
        self.stores.boards.store(next.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{BOARD_SIZE, SquareClaim};
    use crate::domain::entry::Entry;
    use crate::domain::money::Balance;
    use rust_decimal_macros::dec;

    const DIGITS: [u8; BOARD_SIZE] = [3, 1, 4, 0, 5, 9, 2, 6, 8, 7];

    struct Fixture {
        stores: Stores,
        ledger: Arc<BalanceLedger>,
        scorer: ScoreProcessor,
        board: Board,
    }

    /// An active board with fee 10 where square `i` belongs to `user{i}`.
    async fn fixture() -> Fixture {
        let stores = Stores::in_memory();
        let ledger = Arc::new(BalanceLedger::new(stores.users.clone()));
        let mut board = Board::new(UserId::from("host"), "Final", Amount::new(dec!(10)).unwrap());
        for i in 0..BOARD_SIZE {
            let id = UserId::from(format!("user{i}"));
            ledger
                .open_account(&id, &format!("User {i}"), Balance::new(dec!(100)))
                .await
                .unwrap();
            let entry = Entry::new(board.board_id.clone(), id, format!("User {i}"), i, board.entry_fee);
            board.occupy(i, entry.claim()).unwrap();
        }
        board.activate(DIGITS).unwrap();
        stores.boards.store(board.clone()).await.unwrap();
        Fixture {
            scorer: ScoreProcessor::new(stores.clone(), ledger.clone()),
            stores,
            ledger,
            board,
        }
    }

    fn host() -> UserId {
        UserId::from("host")
    }

    #[tokio::test]
    async fn test_score_pays_digit_holder() {
        let mut fx = fixture().await;
        // 21-17 -> 8, which DIGITS puts on square 8
        let outcome = fx
            .scorer
            .update_score(&mut fx.board, &host(), "Q1", "21-17")
            .await
            .unwrap();

        assert_eq!(outcome.winning_digit, 8);
        assert_eq!(outcome.winner, Some(UserId::from("user8")));
        assert_eq!(outcome.payout_amount.value(), dec!(20.0));
        assert_eq!(outcome.status, BoardStatus::Active);
        assert_eq!(
            fx.ledger.balance(&UserId::from("user8")).await.unwrap(),
            Balance::new(dec!(120))
        );

        let payouts = fx.stores.payouts.for_board(&fx.board.board_id).await.unwrap();
        assert_eq!(payouts.len(), 1);
        assert!(payouts[0].paid);
        assert_eq!(payouts[0].quarter, Quarter::Q1);

        let stored = fx.stores.boards.get(&fx.board.board_id).await.unwrap().unwrap();
        assert_eq!(stored.quarter_scores[&Quarter::Q1], "21-17");
        assert_eq!(stored.winners[&Quarter::Q1], Some(UserId::from("user8")));
    }

    #[tokio::test]
    async fn test_rescoring_is_rejected_without_payout() {
        let mut fx = fixture().await;
        fx.scorer
            .update_score(&mut fx.board, &host(), "Q2", "7-0")
            .await
            .unwrap();
        let result = fx
            .scorer
            .update_score(&mut fx.board, &host(), "Q2", "10-3")
            .await;

        assert!(matches!(result, Err(GameError::QuarterAlreadyScored(Quarter::Q2))));
        assert_eq!(fx.stores.payouts.for_board(&fx.board.board_id).await.unwrap().len(), 1);
        assert_eq!(fx.board.quarter_scores[&Quarter::Q2], "7-0");
    }

    #[tokio::test]
    async fn test_q4_completes_board() {
        let mut fx = fixture().await;
        let outcome = fx
            .scorer
            .update_score(&mut fx.board, &host(), "Q4", "30-24")
            .await
            .unwrap();
        // 0 + 4 -> 4, on square 2
        assert_eq!(outcome.winner, Some(UserId::from("user2")));
        assert_eq!(outcome.payout_amount.value(), dec!(40));
        assert_eq!(outcome.status, BoardStatus::Completed);

        let after = fx
            .scorer
            .update_score(&mut fx.board, &host(), "Q1", "3-0")
            .await;
        assert!(matches!(after, Err(GameError::WrongStatus { .. })));
    }

    #[tokio::test]
    async fn test_check_order() {
        let mut fx = fixture().await;
        let stranger = UserId::from("user0");
        assert!(matches!(
            fx.scorer.update_score(&mut fx.board, &stranger, "Q9", "x").await,
            Err(GameError::Forbidden { .. })
        ));
        assert!(matches!(
            fx.scorer.update_score(&mut fx.board, &host(), "Q9", "x").await,
            Err(GameError::InvalidQuarter(_))
        ));
        assert!(matches!(
            fx.scorer.update_score(&mut fx.board, &host(), "Q1", "21:17").await,
            Err(GameError::InvalidScoreFormat(_))
        ));
        assert!(fx.board.quarter_scores.is_empty());
    }

    #[tokio::test]
    async fn test_inactive_board_rejected() {
        let fx = fixture().await;
        let mut pending = Board::new(host(), "Pending", Amount::ZERO);
        let result = fx.scorer.update_score(&mut pending, &host(), "Q1", "1-1").await;
        assert!(matches!(
            result,
            Err(GameError::WrongStatus {
                expected: BoardStatus::Active,
                actual: BoardStatus::Pending
            })
        ));
    }

    #[tokio::test]
    async fn test_unoccupied_digit_records_no_winner() {
        let mut fx = fixture().await;
        // square 8 holds digit 8; empty it to reach the defensive path
        fx.board.squares[8] = None::<SquareClaim>;
        let outcome = fx
            .scorer
            .update_score(&mut fx.board, &host(), "Q3", "21-17")
            .await
            .unwrap();

        assert_eq!(outcome.winner, None);
        assert_eq!(fx.board.winners[&Quarter::Q3], None);
        assert!(fx.stores.payouts.for_board(&fx.board.board_id).await.unwrap().is_empty());
    }
}
