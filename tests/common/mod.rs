#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use squares_pool::application::assigner::RandomAssigner;
use squares_pool::application::registry::GameRegistry;
use squares_pool::config::EngineConfig;
use squares_pool::domain::board::{BOARD_SIZE, Board};
use squares_pool::domain::entry::Entry;
use squares_pool::domain::ids::{BoardId, EntryId, PayoutId, UserId};
use squares_pool::domain::money::Balance;
use squares_pool::domain::payout::Payout;
use squares_pool::domain::ports::{
    BoardStore, BoardStoreRef, EntryStore, EntryStoreRef, PayoutStore, PayoutStoreRef, Stores,
};
use squares_pool::error::{GameError, Result};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const HEADER: &str = "command, actor, board, value, note";

pub fn registry() -> GameRegistry {
    registry_with(EngineConfig::default())
}

pub fn registry_with(config: EngineConfig) -> GameRegistry {
    GameRegistry::new(Stores::in_memory(), RandomAssigner::seeded(42), config)
}

pub async fn register(registry: &GameRegistry, id: &str) -> UserId {
    let user_id = UserId::from(id);
    registry.register_user(&user_id, &id.to_uppercase()).await.unwrap();
    user_id
}

/// Registers `player0`..`player9`.
pub async fn players(registry: &GameRegistry) -> Vec<UserId> {
    let mut ids = Vec::with_capacity(BOARD_SIZE);
    for i in 0..BOARD_SIZE {
        ids.push(register(registry, &format!("player{i}")).await);
    }
    ids
}

/// Seats `players[i]` on square `i` until the board is full.
pub async fn fill_board(registry: &GameRegistry, board_id: &BoardId, players: &[UserId]) {
    for (square, user_id) in players.iter().enumerate() {
        registry.join_board(board_id, user_id, square).await.unwrap();
    }
}

pub async fn balance(registry: &GameRegistry, user_id: &UserId) -> Balance {
    registry.get_profile(user_id).await.unwrap().user.balance
}

pub async fn total_balance(registry: &GameRegistry) -> Decimal {
    registry
        .accounts()
        .await
        .unwrap()
        .iter()
        .map(|a| a.balance.0)
        .sum()
}

/// A script file holding the header followed by `lines`.
pub fn script(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

/// Parses the `user,name,balance` report into rows.
pub fn parse_report(stdout: &str) -> Vec<(String, String, Decimal)> {
    let mut reader = csv::Reader::from_reader(stdout.as_bytes());
    reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            (
                record[0].to_string(),
                record[1].to_string(),
                record[2].parse().unwrap(),
            )
        })
        .collect()
}

/// Switches that make the wrapped in-memory stores fail or stall.
#[derive(Default)]
pub struct Faults {
    pub board_writes: AtomicBool,
    pub entry_deletes: AtomicBool,
    pub payout_writes: AtomicBool,
    pub board_write_delay_ms: AtomicU64,
}

impl Faults {
    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(GameError::StorageError(format!("{what} down")))
        } else {
            Ok(())
        }
    }
}

struct FaultyBoardStore {
    inner: BoardStoreRef,
    faults: Arc<Faults>,
}

#[async_trait]
impl BoardStore for FaultyBoardStore {
    async fn store(&self, board: Board) -> Result<()> {
        let delay = self.faults.board_write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Faults::check(&self.faults.board_writes, "boards")?;
        self.inner.store(board).await
    }

    async fn get(&self, board_id: &BoardId) -> Result<Option<Board>> {
        self.inner.get(board_id).await
    }

    async fn delete(&self, board_id: &BoardId) -> Result<()> {
        self.inner.delete(board_id).await
    }

    async fn get_all(&self) -> Result<Vec<Board>> {
        self.inner.get_all().await
    }
}

struct FaultyEntryStore {
    inner: EntryStoreRef,
    faults: Arc<Faults>,
}

#[async_trait]
impl EntryStore for FaultyEntryStore {
    async fn store(&self, entry: Entry) -> Result<()> {
        self.inner.store(entry).await
    }

    async fn delete(&self, entry_id: &EntryId) -> Result<()> {
        Faults::check(&self.faults.entry_deletes, "entries")?;
        self.inner.delete(entry_id).await
    }

    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Entry>> {
        self.inner.for_board(board_id).await
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Entry>> {
        self.inner.for_user(user_id).await
    }
}

struct FaultyPayoutStore {
    inner: PayoutStoreRef,
    faults: Arc<Faults>,
}

#[async_trait]
impl PayoutStore for FaultyPayoutStore {
    async fn store(&self, payout: Payout) -> Result<()> {
        Faults::check(&self.faults.payout_writes, "payouts")?;
        self.inner.store(payout).await
    }

    async fn delete(&self, payout_id: &PayoutId) -> Result<()> {
        self.inner.delete(payout_id).await
    }

    async fn for_board(&self, board_id: &BoardId) -> Result<Vec<Payout>> {
        self.inner.for_board(board_id).await
    }

    async fn for_user(&self, user_id: &UserId) -> Result<Vec<Payout>> {
        self.inner.for_user(user_id).await
    }
}

/// A registry over in-memory stores whose writes can be made to fail.
pub fn faulty_registry() -> (GameRegistry, Arc<Faults>) {
    let faults = Arc::new(Faults::default());
    let inner = Stores::in_memory();
    let stores = Stores {
        boards: Arc::new(FaultyBoardStore {
            inner: inner.boards,
            faults: faults.clone(),
        }),
        entries: Arc::new(FaultyEntryStore {
            inner: inner.entries,
            faults: faults.clone(),
        }),
        payouts: Arc::new(FaultyPayoutStore {
            inner: inner.payouts,
            faults: faults.clone(),
        }),
        users: inner.users,
    };
    let registry = GameRegistry::new(stores, RandomAssigner::seeded(42), EngineConfig::default());
    (registry, faults)
}
