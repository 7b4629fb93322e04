//! Application layer containing the game engine orchestration.
//!
//! [`registry::GameRegistry`] is the entry point. It serializes mutations
//! per board with [`locks::KeyedLocks`] and hands the locked aggregate to the
//! component that owns the operation: [`allocator::SquareAllocator`] for
//! joins, leaves and deletion, [`scoring::ScoreProcessor`] for quarter
//! results. Every balance change goes through [`ledger::BalanceLedger`].

pub mod allocator;
pub mod assigner;
pub mod ledger;
pub mod locks;
pub mod registry;
pub mod scoring;
pub mod undo;
