use crate::domain::board::Board;
use crate::domain::entry::Entry;
use crate::domain::ids::{BoardId, EntryId, PayoutId, UserId};
use crate::domain::payout::Payout;
use crate::domain::ports::{BoardStore, EntryStore, PayoutStore, Stores, UserStore};
use crate::domain::user::UserAccount;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for boards.
///
/// Uses `Arc<RwLock<HashMap<BoardId, Board>>>` to allow shared concurrent access.
#[derive(Default, Clone)]
pub struct InMemoryBoardStore {
    boards: Arc<RwLock<HashMap<BoardId, Board>>>,
}

impl InMemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    async fn store(&self, board: Board) -> Result<()> {
        let mut boards = self.boards.write().await;
        boards.insert(board.board_id.clone(), board);
        Ok(())
    }

    async fn get(&self, board_id: &BoardId) -> Result<Option<Board>> {
        let boards = self.boards.read().await;
        Ok(boards.get(board_id).cloned())
    }

    async fn delete(&self, board_id: &BoardId) -> Result<()> {
        let mut boards = self.boards.write().await;
        boards.remove(board_id);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Board>> {
        let boards = self.boards.read().await;
        Ok(boards.values().cloned().collect())
    }
}

/// A thread-safe in-memory store for entries, keyed by entry id.
#[derive(Default, Clone)]
pub struct InMemoryEntryStore {
    entries: Arc<RwLock<HashMap<EntryId, Entry>>>,
}

impl InMemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryStore for InMemoryEntryStore {
    async fn store(&self, entry: Entry) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.entry_id.clone(), entry);
        Ok(())
    }

    async fn delete(&self, entry_id: &EntryId) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(entry_id);
        Ok(())
    }

    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Entry>> {
        let entries = self.entries.read().await;
        let mut found: Vec<Entry> = entries
            .values()
            .filter(|e| &e.board_id == board_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.square_index);
        Ok(found)
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Entry>> {
        let entries = self.entries.read().await;
        let mut found: Vec<Entry> = entries
            .values()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.created_at);
        Ok(found)
    }
}

/// A thread-safe in-memory store for payouts.
#[derive(Default, Clone)]
pub struct InMemoryPayoutStore {
    payouts: Arc<RwLock<HashMap<PayoutId, Payout>>>,
}

impl InMemoryPayoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PayoutStore for InMemoryPayoutStore {
    async fn store(&self, payout: Payout) -> Result<()> {
        let mut payouts = self.payouts.write().await;
        payouts.insert(payout.payout_id.clone(), payout);
        Ok(())
    }

    async fn delete(&self, payout_id: &PayoutId) -> Result<()> {
        let mut payouts = self.payouts.write().await;
        payouts.remove(payout_id);
        Ok(())
    }

    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Payout>> {
        let payouts = self.payouts.read().await;
        let mut found: Vec<Payout> = payouts
            .values()
            .filter(|p| &p.board_id == board_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.quarter);
        Ok(found)
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Payout>> {
        let payouts = self.payouts.read().await;
        let mut found: Vec<Payout> = payouts
            .values()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.created_at);
        Ok(found)
    }
}

/// A thread-safe in-memory store for user accounts.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, UserAccount>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: UserAccount) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.user_id.clone(), user);
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<UserAccount>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<UserAccount>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }
}

impl Stores {
    /// A fresh, empty set of in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            boards: Arc::new(InMemoryBoardStore::new()),
            entries: Arc::new(InMemoryEntryStore::new()),
            payouts: Arc::new(InMemoryPayoutStore::new()),
            users: Arc::new(InMemoryUserStore::new()),
        }
    }
}
