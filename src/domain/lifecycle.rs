use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Life cycle of a board: `Pending -> Active -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatus {
    /// Squares are on sale; entries may join and leave.
    #[default]
    Pending,
    /// All squares sold and digits assigned; quarters are being scored.
    Active,
    /// Q4 has been scored. Terminal.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The tenth square was filled and digits were assigned.
    Activate,
    /// Q4 was scored.
    Complete,
}

impl BoardStatus {
    /// Guards an operation that is only legal in `expected`.
    pub fn require(self, expected: BoardStatus) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(GameError::WrongStatus {
                expected,
                actual: self,
            })
        }
    }

    /// Returns the status reached by `transition`, rejecting anything else.
    pub fn apply(self, transition: Transition) -> Result<BoardStatus> {
        match (self, transition) {
            (BoardStatus::Pending, Transition::Activate) => Ok(BoardStatus::Active),
            (BoardStatus::Active, Transition::Complete) => Ok(BoardStatus::Completed),
            (actual, Transition::Activate) => Err(GameError::WrongStatus {
                expected: BoardStatus::Pending,
                actual,
            }),
            (actual, Transition::Complete) => Err(GameError::WrongStatus {
                expected: BoardStatus::Active,
                actual,
            }),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == BoardStatus::Completed
    }
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BoardStatus::Pending => "pending",
            BoardStatus::Active => "active",
            BoardStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}
