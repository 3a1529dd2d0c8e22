//! Boxcars table engine.
//!
//! This crate contains the deterministic craps core: the table phase
//! machine, the bet ledger, the settlement engine, and pooled-liquidity
//! vault accounting, plus the house bot roster that wagers against the same
//! table.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside the engine.
//! - Do not generate randomness; dice derive only from values delivered
//!   through the request/submit correlation in [`Engine::submit_roll`].
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Execution model
//! Strictly sequential, single-writer: each operation stages its writes on a
//! pending frame and commits atomically, so no caller ever observes partial
//! state and every failure is a full rollback. The event log is append-only
//! and sufficient to reconstruct ledger state (see [`replay`]).
//!
//! The primary entrypoint is [`Engine`].

pub mod bots;
pub mod replay;
pub mod rng;
pub mod settlement;
pub mod table;

mod engine;
mod error;
mod frame;
mod ledger;
mod state;
mod vault;

pub use engine::{BetPlacement, Engine, VaultStats};
pub use error::EngineError;
pub use ledger::{check_amount, check_phase, check_target, removable};
pub use state::{Memory, State, Status};
pub use vault::{assets_for_shares, fee_for, shares_for_deposit};

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod integration_tests;
