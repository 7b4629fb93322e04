use crate::domain::money::Balance;
use rust_decimal_macros::dec;

/// Tunables of a [`GameRegistry`](crate::application::registry::GameRegistry).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Balance given to a user the first time they register.
    pub starting_balance: Balance,
    /// Maximum number of boards returned by `list_boards`, newest first.
    pub board_list_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: Balance::new(dec!(1000)),
            board_list_limit: 100,
        }
    }
}
