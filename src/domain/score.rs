use crate::error::GameError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four scoring checkpoints of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// Share of the pot paid to this quarter's winner. The four shares sum to 1.
    pub fn payout_fraction(self) -> Decimal {
        match self {
            Quarter::Q1 | Quarter::Q2 | Quarter::Q3 => dec!(0.20),
            Quarter::Q4 => dec!(0.40),
        }
    }

    pub fn is_final(self) -> bool {
        self == Quarter::Q4
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        };
        f.write_str(label)
    }
}

impl FromStr for Quarter {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            other => Err(GameError::InvalidQuarter(other.to_string())),
        }
    }
}

/// A parsed `"<int>-<int>"` quarter score, kept as each side's last digit.
///
/// Sides may be arbitrarily long; only their final digit decides a quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub last_a: u8,
    pub last_b: u8,
}

impl Score {
    /// Sum of both last digits, mod 10.
    pub fn winning_digit(&self) -> u8 {
        (self.last_a + self.last_b) % 10
    }
}

/// The last digit of a trimmed, non-empty run of ASCII digits.
fn last_digit(side: &str) -> Option<u8> {
    let side = side.trim();
    if side.is_empty() || !side.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    side.bytes().last().map(|b| b - b'0')
}

impl FromStr for Score {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidScoreFormat(s.to_string());
        let (a, b) = s.split_once('-').ok_or_else(invalid)?;
        let last_a = last_digit(a).ok_or_else(invalid)?;
        // a second separator leaves a '-' in `b`, which is not a digit
        let last_b = last_digit(b).ok_or_else(invalid)?;
        Ok(Self { last_a, last_b })
    }
}
