use super::allocator::{JoinReceipt, LeaveReceipt, SquareAllocator};
use super::assigner::RandomAssigner;
use super::ledger::BalanceLedger;
use super::locks::{KeyedGuard, KeyedLocks};
use super::scoring::{ScoreOutcome, ScoreProcessor};
use crate::config::EngineConfig;
use crate::domain::board::Board;
use crate::domain::entry::Entry;
use crate::domain::ids::{BoardId, UserId};
use crate::domain::money::Amount;
use crate::domain::payout::Payout;
use crate::domain::ports::Stores;
use crate::domain::user::UserAccount;
use crate::error::{GameError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// A board as listed to one user, with that user's entries on it.
#[derive(Debug, Clone, Serialize)]
pub struct BoardListing {
    pub board: Board,
    pub user_entries: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardDetails {
    pub board: Board,
    pub entries: Vec<Entry>,
    pub payouts: Vec<Payout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: UserAccount,
    pub entries: Vec<Entry>,
    pub payouts: Vec<Payout>,
    pub created_boards: Vec<Board>,
    pub total_winnings: Amount,
}

/// The entry point of the engine.
///
/// Owns the stores and dispatches every operation. Mutations of one board
/// (join, leave, score, delete) run under that board's lock and re-read the
/// board once the lock is held; reads take no lock.
///
/// Once a mutation has its lock it runs on its own task, so dropping the
/// caller's future cannot stop it between two side effects.
pub struct GameRegistry {
    stores: Stores,
    ledger: Arc<BalanceLedger>,
    allocator: Arc<SquareAllocator>,
    scorer: Arc<ScoreProcessor>,
    board_locks: KeyedLocks<BoardId>,
    config: EngineConfig,
}

impl GameRegistry {
    pub fn new(stores: Stores, assigner: RandomAssigner, config: EngineConfig) -> Self {
        let ledger = Arc::new(BalanceLedger::new(stores.users.clone()));
        let allocator = Arc::new(SquareAllocator::new(
            stores.clone(),
            ledger.clone(),
            Arc::new(assigner),
        ));
        let scorer = Arc::new(ScoreProcessor::new(stores.clone(), ledger.clone()));
        Self {
            stores,
            ledger,
            allocator,
            scorer,
            board_locks: KeyedLocks::new(),
            config,
        }
    }

    /// Returns the user's account, opening it with the starting balance on first sight.
    pub async fn register_user(&self, user_id: &UserId, name: &str) -> Result<UserAccount> {
        if user_id.is_blank() {
            return Err(GameError::Unauthenticated);
        }
        self.ledger
            .open_account(user_id, name, self.config.starting_balance)
            .await
    }

    pub async fn create_board(
        &self,
        creator_id: &UserId,
        event_name: &str,
        entry_fee: Decimal,
    ) -> Result<Board> {
        self.authenticate(creator_id).await?;
        let event_name = event_name.trim();
        if event_name.is_empty() {
            return Err(GameError::Validation(
                "Event name must not be empty".to_string(),
            ));
        }
        let entry_fee = Amount::new(entry_fee)?;

        let board = Board::new(creator_id.clone(), event_name, entry_fee);
        self.stores.boards.store(board.clone()).await?;
        info!(board_id = %board.board_id, creator_id = %creator_id, %entry_fee, "Board created");
        Ok(board)
    }

    /// Newest boards first, each with the caller's own entries.
    pub async fn list_boards(&self, user_id: &UserId) -> Result<Vec<BoardListing>> {
        self.authenticate(user_id).await?;
        let mut boards = self.stores.boards.get_all().await?;
        boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        boards.truncate(self.config.board_list_limit);

        let mut by_board: HashMap<BoardId, Vec<Entry>> = HashMap::new();
        for entry in self.stores.entries.for_user(user_id).await? {
            by_board.entry(entry.board_id.clone()).or_default().push(entry);
        }

        Ok(boards
            .into_iter()
            .map(|board| BoardListing {
                user_entries: by_board.remove(&board.board_id).unwrap_or_default(),
                board,
            })
            .collect())
    }

    pub async fn get_board(&self, board_id: &BoardId) -> Result<BoardDetails> {
        let board = self.load_board(board_id).await?;
        let entries = self.stores.entries.for_board(board_id).await?;
        let payouts = self.stores.payouts.for_board(board_id).await?;
        Ok(BoardDetails {
            board,
            entries,
            payouts,
        })
    }

    pub async fn join_board(
        &self,
        board_id: &BoardId,
        user_id: &UserId,
        square_index: usize,
    ) -> Result<JoinReceipt> {
        let user = self.authenticate(user_id).await?;
        let guard = self.board_locks.lock(board_id).await;
        let mut board = self.load_board(board_id).await?;
        let allocator = self.allocator.clone();
        run_locked(guard, async move {
            allocator.join(&mut board, &user, square_index).await
        })
        .await
    }

    pub async fn leave_board(&self, board_id: &BoardId, user_id: &UserId) -> Result<LeaveReceipt> {
        self.authenticate(user_id).await?;
        let guard = self.board_locks.lock(board_id).await;
        let mut board = self.load_board(board_id).await?;
        let allocator = self.allocator.clone();
        let user_id = user_id.clone();
        run_locked(guard, async move { allocator.leave(&mut board, &user_id).await }).await
    }

    pub async fn update_score(
        &self,
        board_id: &BoardId,
        actor_id: &UserId,
        quarter: &str,
        score_text: &str,
    ) -> Result<ScoreOutcome> {
        self.authenticate(actor_id).await?;
        let guard = self.board_locks.lock(board_id).await;
        let mut board = self.load_board(board_id).await?;
        let scorer = self.scorer.clone();
        let actor_id = actor_id.clone();
        let (quarter, score_text) = (quarter.to_string(), score_text.to_string());
        run_locked(guard, async move {
            scorer
                .update_score(&mut board, &actor_id, &quarter, &score_text)
                .await
        })
        .await
    }

    /// Deletes a pending board, refunding every entry. Returns the refunded entry count.
    pub async fn delete_board(&self, board_id: &BoardId, actor_id: &UserId) -> Result<usize> {
        self.authenticate(actor_id).await?;
        let guard = self.board_locks.lock(board_id).await;
        let board = self.load_board(board_id).await?;
        if !board.is_creator(actor_id) {
            return Err(GameError::Forbidden {
                action: "delete the board",
            });
        }
        let allocator = self.allocator.clone();
        run_locked(guard, async move { allocator.dissolve(&board).await }).await
    }

    pub async fn get_profile(&self, user_id: &UserId) -> Result<Profile> {
        let user = self.authenticate(user_id).await?;
        let entries = self.stores.entries.for_user(user_id).await?;
        let payouts = self.stores.payouts.for_user(user_id).await?;
        let mut created_boards: Vec<Board> = self
            .stores
            .boards
            .get_all()
            .await?
            .into_iter()
            .filter(|b| b.is_creator(user_id))
            .collect();
        created_boards.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total_winnings = payouts.iter().map(|p| p.amount).sum();
        Ok(Profile {
            user,
            entries,
            payouts,
            created_boards,
            total_winnings,
        })
    }

    /// Every registered account, ordered by user id.
    pub async fn accounts(&self) -> Result<Vec<UserAccount>> {
        let mut users = self.stores.users.get_all().await?;
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users)
    }

    async fn authenticate(&self, user_id: &UserId) -> Result<UserAccount> {
        if user_id.is_blank() {
            return Err(GameError::Unauthenticated);
        }
        self.stores
            .users
            .get(user_id)
            .await?
            .ok_or(GameError::Unauthenticated)
    }

    async fn load_board(&self, board_id: &BoardId) -> Result<Board> {
        self.stores
            .boards
            .get(board_id)
            .await?
            .ok_or_else(|| GameError::BoardNotFound(board_id.clone()))
    }
}

/// Runs a mutation to completion on its own task while `guard` stays held.
async fn run_locked<T, F>(guard: KeyedGuard<BoardId>, unit: F) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
{
    tokio::spawn(async move {
        let _guard = guard;
        unit.await
    })
    .await?
}
