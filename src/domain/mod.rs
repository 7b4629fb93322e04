//! Domain model: the board aggregate, its entries and payouts, user balances,
//! and the persistence ports the engine is written against.

pub mod board;
pub mod entry;
pub mod ids;
pub mod lifecycle;
pub mod money;
pub mod payout;
pub mod ports;
pub mod score;
pub mod user;
