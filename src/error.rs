use crate::domain::lifecycle::BoardStatus;
use crate::domain::ids::BoardId;
use crate::domain::money::Balance;
use crate::domain::score::Quarter;
use thiserror::Error;

/// Classification of a [`GameError`] as seen by the surrounding service layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    NotFound,
    Validation,
    BusinessRuleViolation,
    Internal,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("caller identity is missing or unknown")]
    Unauthenticated,
    #[error("only the board creator may {action}")]
    Forbidden { action: &'static str },
    #[error("board {0} not found")]
    BoardNotFound(BoardId),

    #[error("square index {0} is out of range (0-9)")]
    InvalidIndex(usize),
    #[error("invalid quarter {0:?} (expected Q1, Q2, Q3 or Q4)")]
    InvalidQuarter(String),
    #[error("invalid score format {0:?} (use XX-XX)")]
    InvalidScoreFormat(String),
    #[error("validation error: {0}")]
    Validation(String),

    #[error("board is {actual}, expected {expected}")]
    WrongStatus {
        expected: BoardStatus,
        actual: BoardStatus,
    },
    #[error("square {0} is already taken")]
    SquareTaken(usize),
    #[error("you can only have {limit} entries per board")]
    EntryLimitExceeded { limit: usize },
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Balance,
        available: Balance,
    },
    #[error("you have no entries on this board")]
    NoEntries,
    #[error("quarter {0} has already been scored")]
    QuarterAlreadyScored(Quarter),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    StorageError(String),
    #[error("mutation task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::BoardNotFound(_) => ErrorKind::NotFound,
            Self::InvalidIndex(_)
            | Self::InvalidQuarter(_)
            | Self::InvalidScoreFormat(_)
            | Self::Validation(_) => ErrorKind::Validation,
            Self::WrongStatus { .. }
            | Self::SquareTaken(_)
            | Self::EntryLimitExceeded { .. }
            | Self::InsufficientBalance { .. }
            | Self::NoEntries
            | Self::QuarterAlreadyScored(_) => ErrorKind::BusinessRuleViolation,
            Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::StorageError(_)
            | Self::TaskError(_) => ErrorKind::Internal,
            #[cfg(feature = "storage-rocksdb")]
            Self::RocksDbError(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
