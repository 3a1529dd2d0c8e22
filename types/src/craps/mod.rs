//! Craps domain types.
//!
//! Defines table/roll/bet/vault state and constants used by the engine and
//! its clients.

mod bets;
mod config;
mod constants;
mod game;
mod vault;

pub use bets::*;
pub use config::*;
pub use constants::*;
pub use game::*;
pub use vault::*;

#[cfg(test)]
mod tests;
