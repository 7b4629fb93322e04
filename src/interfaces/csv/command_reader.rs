use crate::domain::ids::UserId;
use crate::error::{GameError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    User,
    Create,
    Join,
    Leave,
    Score,
    Delete,
}

/// One raw script line: `command, actor, board, value, note`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub command: CommandKind,
    pub actor: String,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A validated script command. Boards are referred to by script label.
#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    RegisterUser {
        user: UserId,
        name: String,
    },
    CreateBoard {
        creator: UserId,
        label: String,
        entry_fee: Decimal,
        event_name: String,
    },
    Join {
        user: UserId,
        label: String,
        square: usize,
    },
    Leave {
        user: UserId,
        label: String,
    },
    Score {
        actor: UserId,
        label: String,
        quarter: String,
        score: String,
    },
    Delete {
        actor: UserId,
        label: String,
    },
}

impl TryFrom<CommandRecord> for Command {
    type Error = GameError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let actor = UserId::from(record.actor);
        let missing = |field: &str| {
            GameError::Validation(format!("{:?} command requires {field}", record.command))
        };
        let label = || record.board.clone().ok_or_else(|| missing("a board"));

        let command = match record.command {
            CommandKind::User => Command::RegisterUser {
                name: record.note.clone().unwrap_or_else(|| actor.to_string()),
                user: actor,
            },
            CommandKind::Create => {
                let label = label()?;
                let fee = record.value.as_deref().ok_or_else(|| missing("an entry fee"))?;
                let entry_fee = fee
                    .parse::<Decimal>()
                    .map_err(|_| GameError::Validation(format!("invalid entry fee {fee:?}")))?;
                Command::CreateBoard {
                    creator: actor,
                    event_name: record.note.clone().unwrap_or_else(|| label.clone()),
                    label,
                    entry_fee,
                }
            }
            CommandKind::Join => {
                let square = record.value.as_deref().ok_or_else(|| missing("a square"))?;
                let square = square
                    .parse::<usize>()
                    .map_err(|_| GameError::Validation(format!("invalid square {square:?}")))?;
                Command::Join {
                    user: actor,
                    label: label()?,
                    square,
                }
            }
            CommandKind::Leave => Command::Leave {
                user: actor,
                label: label()?,
            },
            CommandKind::Score => Command::Score {
                quarter: record.value.clone().ok_or_else(|| missing("a quarter"))?,
                score: record.note.clone().ok_or_else(|| missing("a score"))?,
                actor,
                label: label()?,
            },
            CommandKind::Delete => Command::Delete {
                actor,
                label: label()?,
            },
        };
        Ok(command)
    }
}

/// Reads script commands from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and accepting short records.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and validates commands, one `Result` per record.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(GameError::from).and_then(Command::try_from))
    }
}
