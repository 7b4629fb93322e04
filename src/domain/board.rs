use super::ids::{BoardId, EntryId, UserId};
use super::lifecycle::{BoardStatus, Transition};
use super::money::Amount;
use super::score::Quarter;
use crate::error::{GameError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of squares on every board.
pub const BOARD_SIZE: usize = 10;

/// The occupant of one square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareClaim {
    pub user_id: UserId,
    pub user_name: String,
    pub entry_id: EntryId,
}

/// The board aggregate.
///
/// Owns its squares, digits, scores and winners. `squares[i]` and `digits[i]`
/// describe the same square; both are fixed-size so the slot count can never
/// drift from [`BOARD_SIZE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub board_id: BoardId,
    pub creator_id: UserId,
    pub event_name: String,
    pub entry_fee: Amount,
    pub status: BoardStatus,
    pub squares: [Option<SquareClaim>; BOARD_SIZE],
    /// All `None` until the board fills, then a permutation of 0..=9.
    pub digits: [Option<u8>; BOARD_SIZE],
    pub quarter_scores: BTreeMap<Quarter, String>,
    /// `None` records a scored quarter with no winner.
    pub winners: BTreeMap<Quarter, Option<UserId>>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(creator_id: UserId, event_name: impl Into<String>, entry_fee: Amount) -> Self {
        Self {
            board_id: BoardId::generate(),
            creator_id,
            event_name: event_name.into(),
            entry_fee,
            status: BoardStatus::Pending,
            squares: Default::default(),
            digits: [None; BOARD_SIZE],
            quarter_scores: BTreeMap::new(),
            winners: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Total collected once every square is sold.
    pub fn pot(&self) -> Amount {
        self.entry_fee.scaled(BOARD_SIZE.into())
    }

    pub fn is_creator(&self, user_id: &UserId) -> bool {
        &self.creator_id == user_id
    }

    pub fn filled_count(&self) -> usize {
        self.squares.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.filled_count() == BOARD_SIZE
    }

    pub fn is_vacant(&self, index: usize) -> bool {
        matches!(self.squares.get(index), Some(None))
    }

    /// Indices of the squares held by `user_id`.
    pub fn squares_held_by(&self, user_id: &UserId) -> Vec<usize> {
        self.squares
            .iter()
            .enumerate()
            .filter(|(_, s)| s.as_ref().is_some_and(|c| &c.user_id == user_id))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn occupy(&mut self, index: usize, claim: SquareClaim) -> Result<()> {
        match self.squares.get_mut(index) {
            None => Err(GameError::InvalidIndex(index)),
            Some(Some(_)) => Err(GameError::SquareTaken(index)),
            Some(slot) => {
                *slot = Some(claim);
                Ok(())
            }
        }
    }

    pub fn vacate(&mut self, index: usize) -> Option<SquareClaim> {
        self.squares.get_mut(index).and_then(Option::take)
    }

    /// Writes the digit permutation and moves the board to `Active`.
    ///
    /// Only legal once, on a full `Pending` board.
    pub fn activate(&mut self, digits: [u8; BOARD_SIZE]) -> Result<()> {
        let next = self.status.apply(Transition::Activate)?;
        if !self.is_full() {
            return Err(GameError::Validation(format!(
                "board {} has {} of {} squares filled",
                self.board_id,
                self.filled_count(),
                BOARD_SIZE
            )));
        }
        if !is_permutation(&digits) {
            return Err(GameError::Validation(format!(
                "{digits:?} is not a permutation of 0-9"
            )));
        }
        self.digits = digits.map(Some);
        self.status = next;
        Ok(())
    }

    /// The assigned permutation, if the board has filled.
    pub fn assigned_digits(&self) -> Option<[u8; BOARD_SIZE]> {
        let mut out = [0u8; BOARD_SIZE];
        for (slot, digit) in out.iter_mut().zip(self.digits.iter()) {
            *slot = (*digit)?;
        }
        Some(out)
    }

    /// The occupant of the square holding `digit`, if any.
    pub fn occupant_of_digit(&self, digit: u8) -> Option<&SquareClaim> {
        self.digits
            .iter()
            .position(|d| *d == Some(digit))
            .and_then(|i| self.squares[i].as_ref())
    }

    pub fn is_scored(&self, quarter: Quarter) -> bool {
        self.quarter_scores.contains_key(&quarter)
    }

    /// Records a quarter result, completing the board on Q4.
    pub fn record_quarter(
        &mut self,
        quarter: Quarter,
        score_text: &str,
        winner: Option<UserId>,
    ) -> Result<()> {
        self.status.require(BoardStatus::Active)?;
        if self.is_scored(quarter) {
            return Err(GameError::QuarterAlreadyScored(quarter));
        }
        let next = if quarter.is_final() {
            self.status.apply(Transition::Complete)?
        } else {
            self.status
        };
        self.quarter_scores.insert(quarter, score_text.to_string());
        self.winners.insert(quarter, winner);
        self.status = next;
        Ok(())
    }
}

fn is_permutation(digits: &[u8; BOARD_SIZE]) -> bool {
    let mut seen = [false; BOARD_SIZE];
    for &d in digits {
        match seen.get_mut(d as usize) {
            Some(flag) if !*flag => *flag = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn claim(user: &str) -> SquareClaim {
        SquareClaim {
            user_id: UserId::from(user),
            user_name: user.to_uppercase(),
            entry_id: EntryId::generate(),
        }
    }

    fn full_board() -> Board {
        let mut board = Board::new(
            UserId::from("host"),
            "Final",
            Amount::new(dec!(10)).unwrap(),
        );
        for i in 0..BOARD_SIZE {
            board.occupy(i, claim(&format!("user{i}"))).unwrap();
        }
        board
    }

    #[test]
    fn test_new_board_is_empty_pending() {
        let board = Board::new(UserId::from("host"), "Final", Amount::ZERO);
        assert_eq!(board.status, BoardStatus::Pending);
        assert_eq!(board.squares.len(), BOARD_SIZE);
        assert_eq!(board.digits.len(), BOARD_SIZE);
        assert_eq!(board.filled_count(), 0);
        assert!(board.assigned_digits().is_none());
    }

    #[test]
    fn test_occupy_and_vacate() {
        let mut board = Board::new(UserId::from("host"), "Final", Amount::ZERO);
        board.occupy(4, claim("alice")).unwrap();
        assert!(matches!(
            board.occupy(4, claim("bob")),
            Err(GameError::SquareTaken(4))
        ));
        assert!(matches!(
            board.occupy(10, claim("bob")),
            Err(GameError::InvalidIndex(10))
        ));
        assert_eq!(board.squares_held_by(&UserId::from("alice")), vec![4]);
        assert_eq!(board.vacate(4).unwrap().user_id, UserId::from("alice"));
        assert!(board.is_vacant(4));
        assert!(board.vacate(4).is_none());
    }

    #[test]
    fn test_activate_requires_full_board() {
        let mut board = Board::new(UserId::from("host"), "Final", Amount::ZERO);
        board.occupy(0, claim("alice")).unwrap();
        assert!(board.activate([0, 1, 2, 3, 4, 5, 6, 7, 8, 9]).is_err());
        assert_eq!(board.status, BoardStatus::Pending);
        assert!(board.assigned_digits().is_none());
    }

    #[test]
    fn test_activate_rejects_non_permutation() {
        let mut board = full_board();
        assert!(board.activate([0, 0, 2, 3, 4, 5, 6, 7, 8, 9]).is_err());
        assert!(board.activate([0, 1, 2, 3, 4, 5, 6, 7, 8, 10]).is_err());
        assert_eq!(board.status, BoardStatus::Pending);
    }

    #[test]
    fn test_activate_is_once_only() {
        let mut board = full_board();
        let digits = [3, 1, 4, 0, 5, 9, 2, 6, 8, 7];
        board.activate(digits).unwrap();
        assert_eq!(board.status, BoardStatus::Active);
        assert_eq!(board.assigned_digits(), Some(digits));

        assert!(matches!(
            board.activate([0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            Err(GameError::WrongStatus { .. })
        ));
        assert_eq!(board.assigned_digits(), Some(digits));
    }

    #[test]
    fn test_occupant_of_digit() {
        let mut board = full_board();
        board.activate([3, 1, 4, 0, 5, 9, 2, 6, 8, 7]).unwrap();
        // digit 8 sits on square 8
        assert_eq!(
            board.occupant_of_digit(8).unwrap().user_id,
            UserId::from("user8")
        );
        assert_eq!(
            board.occupant_of_digit(3).unwrap().user_id,
            UserId::from("user0")
        );
    }

    #[test]
    fn test_record_quarter_write_once_and_completion() {
        let mut board = full_board();
        board.activate([0, 1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();

        board
            .record_quarter(Quarter::Q1, "7-0", Some(UserId::from("user7")))
            .unwrap();
        assert!(matches!(
            board.record_quarter(Quarter::Q1, "14-0", None),
            Err(GameError::QuarterAlreadyScored(Quarter::Q1))
        ));
        assert_eq!(board.quarter_scores[&Quarter::Q1], "7-0");
        assert_eq!(board.status, BoardStatus::Active);

        board.record_quarter(Quarter::Q4, "21-17", None).unwrap();
        assert_eq!(board.status, BoardStatus::Completed);
        assert_eq!(board.winners[&Quarter::Q4], None);
        assert!(matches!(
            board.record_quarter(Quarter::Q2, "3-3", None),
            Err(GameError::WrongStatus { .. })
        ));
    }

    #[test]
    fn test_board_json_shape() {
        let board = full_board();
        let value = serde_json::to_value(&board).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["squares"].as_array().unwrap().len(), BOARD_SIZE);
        assert_eq!(value["digits"].as_array().unwrap().len(), BOARD_SIZE);
        let back: Board = serde_json::from_value(value).unwrap();
        assert_eq!(back, board);
    }
}
