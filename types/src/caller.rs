//! Capability parameters.
//!
//! Operations take an explicit caller identity plus an allowed-operation set
//! instead of consulting an ambient role table, which keeps the engine pure
//! and testable without a permission subsystem.

use commonware_cryptography::ed25519::PublicKey;

/// May start/end series and request dice rolls.
pub const GRANT_TABLE: u8 = 1 << 0;
/// May place and cancel bets.
pub const GRANT_WAGER: u8 = 1 << 1;
/// May move vault liquidity and credit player chips.
pub const GRANT_LIQUIDITY: u8 = 1 << 2;

/// A caller identity bound to the operations it may perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capability {
    pub actor: PublicKey,
    pub grants: u8,
}

impl Capability {
    pub fn new(actor: PublicKey, grants: u8) -> Self {
        Self { actor, grants }
    }

    /// Full table/wager/liquidity authority.
    pub fn operator(actor: PublicKey) -> Self {
        Self::new(actor, GRANT_TABLE | GRANT_WAGER | GRANT_LIQUIDITY)
    }

    /// Wager-only authority, the default for players and bots.
    pub fn bettor(actor: PublicKey) -> Self {
        Self::new(actor, GRANT_WAGER)
    }

    /// Liquidity-provider authority.
    pub fn provider(actor: PublicKey) -> Self {
        Self::new(actor, GRANT_LIQUIDITY)
    }

    pub fn allows(&self, grant: u8) -> bool {
        self.grants & grant == grant
    }
}
