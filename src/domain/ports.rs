use super::board::Board;
use super::entry::Entry;
use super::ids::{BoardId, EntryId, PayoutId, UserId};
use super::payout::Payout;
use super::user::UserAccount;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn store(&self, board: Board) -> Result<()>;
    async fn get(&self, board_id: &BoardId) -> Result<Option<Board>>;
    async fn delete(&self, board_id: &BoardId) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<Board>>;
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn store(&self, entry: Entry) -> Result<()>;
    async fn delete(&self, entry_id: &EntryId) -> Result<()>;
    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Entry>>;
    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Entry>>;
}

#[async_trait]
pub trait PayoutStore: Send + Sync {
    async fn store(&self, payout: Payout) -> Result<()>;
    async fn delete(&self, payout_id: &PayoutId) -> Result<()>;
    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Payout>>;
    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Payout>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: UserAccount) -> Result<()>;
    async fn get(&self, user_id: &UserId) -> Result<Option<UserAccount>>;
    async fn get_all(&self) -> Result<Vec<UserAccount>>;
}

pub type BoardStoreRef = Arc<dyn BoardStore>;
pub type EntryStoreRef = Arc<dyn EntryStore>;
pub type PayoutStoreRef = Arc<dyn PayoutStore>;
pub type UserStoreRef = Arc<dyn UserStore>;

/// The persistence capability handed to the engine.
#[derive(Clone)]
pub struct Stores {
    pub boards: BoardStoreRef,
    pub entries: EntryStoreRef,
    pub payouts: PayoutStoreRef,
    pub users: UserStoreRef,
}
