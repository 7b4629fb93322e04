use super::assigner::RandomAssigner;
use super::ledger::BalanceLedger;
use super::undo::{Undo, UndoLog};
use crate::domain::board::{BOARD_SIZE, Board};
use crate::domain::entry::Entry;
use crate::domain::ids::UserId;
use crate::domain::lifecycle::BoardStatus;
use crate::domain::money::Amount;
use crate::domain::ports::Stores;
use crate::domain::user::UserAccount;
use crate::error::{GameError, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Squares one user may hold on a single board.
pub const MAX_ENTRIES_PER_USER: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct JoinReceipt {
    pub entry: Entry,
    pub status: BoardStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveReceipt {
    pub refunded: Amount,
    pub count: usize,
}

/// Sells and releases squares.
///
/// Callers hold the board's lock and pass the freshly loaded aggregate;
/// `board` is only replaced once every side effect has been persisted.
pub struct SquareAllocator {
    stores: Stores,
    ledger: Arc<BalanceLedger>,
    assigner: Arc<RandomAssigner>,
}

impl SquareAllocator {
    pub fn new(stores: Stores, ledger: Arc<BalanceLedger>, assigner: Arc<RandomAssigner>) -> Self {
        Self {
            stores,
            ledger,
            assigner,
        }
    }

    pub async fn join(
        &self,
        board: &mut Board,
        user: &UserAccount,
        square_index: usize,
    ) -> Result<JoinReceipt> {
        if square_index >= BOARD_SIZE {
            return Err(GameError::InvalidIndex(square_index));
        }
        board.status.require(BoardStatus::Pending)?;
        if !board.is_vacant(square_index) {
            return Err(GameError::SquareTaken(square_index));
        }
        if board.squares_held_by(&user.user_id).len() >= MAX_ENTRIES_PER_USER {
            return Err(GameError::EntryLimitExceeded {
                limit: MAX_ENTRIES_PER_USER,
            });
        }
        let fee = board.entry_fee;
        if !fee.is_zero() && !user.balance.covers(fee) {
            return Err(GameError::InsufficientBalance {
                required: fee.into(),
                available: user.balance,
            });
        }

        let entry = Entry::new(
            board.board_id.clone(),
            user.user_id.clone(),
            user.name.clone(),
            square_index,
            fee,
        );
        let mut next = board.clone();
        next.occupy(square_index, entry.claim())?;
        if next.is_full() {
            next.activate(self.assigner.assign())?;
        }

        // the snapshot check above may be stale; this one is authoritative
        self.ledger.debit(&user.user_id, fee).await?;

        let mut undo = UndoLog::default();
        undo.push(Undo::Credit(user.user_id.clone(), fee));
        if let Err(e) = self.persist_join(&entry, &next, &mut undo).await {
            undo.rollback(&self.stores, &self.ledger).await;
            return Err(e);
        }

        info!(
            board_id = %next.board_id,
            user_id = %user.user_id,
            square = square_index,
            filled = next.filled_count(),
            "Square joined"
        );
        if next.status == BoardStatus::Active {
            info!(board_id = %next.board_id, digits = ?next.assigned_digits(), "Board activated");
        }

        *board = next;
        Ok(JoinReceipt {
            status: board.status,
            entry,
        })
    }

    async fn persist_join(&self, entry: &Entry, next: &Board, undo: &mut UndoLog) -> Result<()> {
        self.stores.entries.store(entry.clone()).await?;
        undo.push(Undo::DeleteEntry(entry.entry_id.clone()));
        self.stores.boards.store(next.clone()).await
    }

    pub async fn leave(&self, board: &mut Board, user_id: &UserId) -> Result<LeaveReceipt> {
        board.status.require(BoardStatus::Pending)?;
        let entries: Vec<Entry> = self
            .stores
            .entries
            .for_board(&board.board_id)
            .await?
            .into_iter()
            .filter(|e| &e.user_id == user_id)
            .collect();
        let held = board.squares_held_by(user_id);
        if entries.is_empty() && held.is_empty() {
            return Err(GameError::NoEntries);
        }

        let mut next = board.clone();
        for index in held {
            next.vacate(index);
        }
        let refunded: Amount = entries.iter().map(|e| e.paid_amount).sum();

        let mut undo = UndoLog::default();
        if let Err(e) = self
            .persist_leave(board, &next, &entries, refunded, &mut undo)
            .await
        {
            undo.rollback(&self.stores, &self.ledger).await;
            return Err(e);
        }

        info!(
            board_id = %next.board_id,
            user_id = %user_id,
            count = entries.len(),
            %refunded,
            "Left board"
        );
        *board = next;
        Ok(LeaveReceipt {
            refunded,
            count: entries.len(),
        })
    }

    async fn persist_leave(
        &self,
        current: &Board,
        next: &Board,
        entries: &[Entry],
        refunded: Amount,
        undo: &mut UndoLog,
    ) -> Result<()> {
        self.stores.boards.store(next.clone()).await?;
        undo.push(Undo::RestoreBoard(current.clone()));
        for entry in entries {
            self.stores.entries.delete(&entry.entry_id).await?;
            undo.push(Undo::RestoreEntry(entry.clone()));
        }
        if let Some(entry) = entries.first() {
            self.ledger.credit(&entry.user_id, refunded).await?;
        }
        Ok(())
    }

    /// Refunds and removes every entry, then removes the board itself.
    ///
    /// Returns the number of refunded entries.
    pub async fn dissolve(&self, board: &Board) -> Result<usize> {
        board.status.require(BoardStatus::Pending)?;
        let entries = self.stores.entries.for_board(&board.board_id).await?;

        let mut undo = UndoLog::default();
        if let Err(e) = self.persist_dissolve(board, &entries, &mut undo).await {
            undo.rollback(&self.stores, &self.ledger).await;
            return Err(e);
        }

        info!(board_id = %board.board_id, refunded_entries = entries.len(), "Board deleted");
        Ok(entries.len())
    }

    async fn persist_dissolve(
        &self,
        board: &Board,
        entries: &[Entry],
        undo: &mut UndoLog,
    ) -> Result<()> {
        self.stores.boards.delete(&board.board_id).await?;
        undo.push(Undo::RestoreBoard(board.clone()));
        for entry in entries {
            self.stores.entries.delete(&entry.entry_id).await?;
            undo.push(Undo::RestoreEntry(entry.clone()));
        }
        for entry in entries {
            self.ledger.credit(&entry.user_id, entry.paid_amount).await?;
            undo.push(Undo::Debit(entry.user_id.clone(), entry.paid_amount));
        }
        Ok(())
    }
}
