use super::ledger::BalanceLedger;
use crate::domain::board::Board;
use crate::domain::entry::Entry;
use crate::domain::ids::{EntryId, PayoutId, UserId};
use crate::domain::money::Amount;
use crate::domain::ports::Stores;
use crate::error::Result;
use tracing::error;

/// The inverse of one side effect already applied by a mutating unit.
#[derive(Debug)]
pub enum Undo {
    /// Reverses a debit.
    Credit(UserId, Amount),
    /// Reverses a credit.
    Debit(UserId, Amount),
    RestoreBoard(Board),
    RestoreEntry(Entry),
    DeleteEntry(EntryId),
    DeletePayout(PayoutId),
}

/// Side effects of an in-flight mutation, replayed backwards if a later step fails.
#[derive(Debug, Default)]
pub struct UndoLog {
    steps: Vec<Undo>,
}

impl UndoLog {
    pub fn push(&mut self, step: Undo) {
        self.steps.push(step);
    }

    /// Applies the recorded inverses newest first. A step that fails is logged and skipped.
    pub async fn rollback(self, stores: &Stores, ledger: &BalanceLedger) {
        for step in self.steps.into_iter().rev() {
            if let Err(e) = apply(&step, stores, ledger).await {
                error!(?step, error = %e, "Rollback step failed");
            }
        }
    }
}

async fn apply(step: &Undo, stores: &Stores, ledger: &BalanceLedger) -> Result<()> {
    match step {
        Undo::Credit(user_id, amount) => ledger.credit(user_id, *amount).await.map(|_| ()),
        Undo::Debit(user_id, amount) => ledger.debit(user_id, *amount).await.map(|_| ()),
        Undo::RestoreBoard(board) => stores.boards.store(board.clone()).await,
        Undo::RestoreEntry(entry) => stores.entries.store(entry.clone()).await,
        Undo::DeleteEntry(entry_id) => stores.entries.delete(entry_id).await,
        Undo::DeletePayout(payout_id) => stores.payouts.delete(payout_id).await,
    }
}
