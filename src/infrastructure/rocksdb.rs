use crate::domain::board::Board;
use crate::domain::entry::Entry;
use crate::domain::ids::{BoardId, EntryId, PayoutId, UserId};
use crate::domain::payout::Payout;
use crate::domain::ports::{BoardStore, EntryStore, PayoutStore, Stores, UserStore};
use crate::domain::user::UserAccount;
use crate::error::{GameError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for board aggregates.
pub const CF_BOARDS: &str = "boards";
/// Column Family for square entries.
pub const CF_ENTRIES: &str = "entries";
/// Column Family for quarter payouts.
pub const CF_PAYOUTS: &str = "payouts";
/// Column Family for user accounts.
pub const CF_USERS: &str = "users";

/// A persistent store implementation using RocksDB.
///
/// Every entity kind lives in its own Column Family, keyed by its identity
/// and stored as JSON. One `RocksDBStore` implements all four ports.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the four column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_BOARDS, CF_ENTRIES, CF_PAYOUTS, CF_USERS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;
        tracing::info!("Opened RocksDB store");

        Ok(Self { db: Arc::new(db) })
    }

    /// All four ports backed by this database.
    pub fn stores(&self) -> Stores {
        Stores {
            boards: Arc::new(self.clone()),
            entries: Arc::new(self.clone()),
            payouts: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
        }
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        tracing::debug!(cf = cf_name, key, "Stored record");
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn delete_key(&self, cf_name: &str, key: &str) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.delete_cf(cf, key.as_bytes())?;
        Ok(())
    }

    /// Deserializes every value in a column family that passes `keep`.
    fn scan_json<T, F>(&self, cf_name: &str, keep: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let cf = self.cf(cf_name)?;
        let mut found = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: T = serde_json::from_slice(&value)?;
            if keep(&record) {
                found.push(record);
            }
        }
        Ok(found)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| GameError::StorageError(format!("{name} column family not found")))
    }
}

#[async_trait]
impl BoardStore for RocksDBStore {
    async fn store(&self, board: Board) -> Result<()> {
        self.put_json(CF_BOARDS, board.board_id.as_str(), &board)
    }

    async fn get(&self, board_id: &BoardId) -> Result<Option<Board>> {
        self.get_json(CF_BOARDS, board_id.as_str())
    }

    async fn delete(&self, board_id: &BoardId) -> Result<()> {
        self.delete_key(CF_BOARDS, board_id.as_str())
    }

    async fn get_all(&self) -> Result<Vec<Board>> {
        self.scan_json(CF_BOARDS, |_: &Board| true)
    }
}

#[async_trait]
impl EntryStore for RocksDBStore {
    async fn store(&self, entry: Entry) -> Result<()> {
        self.put_json(CF_ENTRIES, entry.entry_id.as_str(), &entry)
    }

    async fn delete(&self, entry_id: &EntryId) -> Result<()> {
        self.delete_key(CF_ENTRIES, entry_id.as_str())
    }

    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Entry>> {
        let mut found = self.scan_json(CF_ENTRIES, |e: &Entry| &e.board_id == board_id)?;
        found.sort_by_key(|e| e.square_index);
        Ok(found)
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Entry>> {
        let mut found = self.scan_json(CF_ENTRIES, |e: &Entry| &e.user_id == user_id)?;
        found.sort_by_key(|e| e.created_at);
        Ok(found)
    }
}

#[async_trait]
impl PayoutStore for RocksDBStore {
    async fn store(&self, payout: Payout) -> Result<()> {
        self.put_json(CF_PAYOUTS, payout.payout_id.as_str(), &payout)
    }

    async fn delete(&self, payout_id: &PayoutId) -> Result<()> {
        self.delete_key(CF_PAYOUTS, payout_id.as_str())
    }

    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Payout>> {
        let mut found = self.scan_json(CF_PAYOUTS, |p: &Payout| &p.board_id == board_id)?;
        found.sort_by_key(|p| p.quarter);
        Ok(found)
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Payout>> {
        let mut found = self.scan_json(CF_PAYOUTS, |p: &Payout| &p.user_id == user_id)?;
        found.sort_by_key(|p| p.created_at);
        Ok(found)
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: UserAccount) -> Result<()> {
        self.put_json(CF_USERS, user.user_id.as_str(), &user)
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<UserAccount>> {
        self.get_json(CF_USERS, user_id.as_str())
    }

    async fn get_all(&self) -> Result<Vec<UserAccount>> {
        self.scan_json(CF_USERS, |_: &UserAccount| true)
    }
}
