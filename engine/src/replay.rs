//! Ledger reconstruction from the event log.
//!
//! The audit trail carries enough information to rebuild table, bet-book,
//! chip, vault, and treasury state without reading engine state. Replaying
//! mirrors the settlement double-entry exactly, so any divergence between a
//! replayed ledger and live state indicates a corrupted or truncated log.

use std::collections::BTreeMap;

use boxcars_types::craps::{BetId, BetStatus, Funding, Phase, Roll, VaultId};
use boxcars_types::Event;
use commonware_cryptography::ed25519::PublicKey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("event references unknown bet {bet_id}")]
    UnknownBet { bet_id: BetId },

    #[error("balance underflow while replaying: {0}")]
    Underflow(&'static str),

    #[error("event self-check failed: {0}")]
    Inconsistent(&'static str),
}

/// An unresolved wager as seen by the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenBet {
    pub player: PublicKey,
    pub funding: Funding,
    pub amount: u64,
}

/// Running totals for one vault.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VaultTotals {
    pub total_assets: u64,
    pub escrowed: u64,
    pub total_shares: u64,
}

/// Ledger state reconstructed purely from events.
#[derive(Clone, Debug, Default)]
pub struct ReplayedState {
    pub series_id: Option<u64>,
    pub phase: Phase,
    pub point: Option<u8>,
    pub last_roll: Option<Roll>,
    pub open: BTreeMap<BetId, OpenBet>,
    pub chips: BTreeMap<PublicKey, u64>,
    pub vaults: BTreeMap<VaultId, VaultTotals>,
    pub treasury_fees: u64,
}

impl ReplayedState {
    fn vault(&mut self, id: VaultId) -> &mut VaultTotals {
        self.vaults.entry(id).or_default()
    }

    /// Escrow conservation as reconstructed: per vault, the sum of open-bet
    /// stakes banked there.
    pub fn escrow_by_vault(&self) -> BTreeMap<VaultId, u64> {
        let mut sums: BTreeMap<VaultId, u64> = BTreeMap::new();
        for bet in self.open.values() {
            let vault = match bet.funding {
                Funding::Chips => VaultId::Players,
                Funding::BotVault(bot) => VaultId::Bot(bot),
            };
            *sums.entry(vault).or_default() += bet.amount;
        }
        sums
    }
}

/// Fold the full event log into a ledger.
pub fn replay(events: &[Event]) -> Result<ReplayedState, ReplayError> {
    let mut state = ReplayedState::default();
    for event in events {
        apply(&mut state, event)?;
    }
    Ok(state)
}

fn apply(state: &mut ReplayedState, event: &Event) -> Result<(), ReplayError> {
    match event {
        Event::SeriesStarted { series_id, .. } => {
            state.series_id = Some(*series_id);
            state.phase = Phase::ComeOut;
            state.point = None;
        }
        Event::SeriesEnded { .. } => {
            state.series_id = None;
            state.phase = Phase::Idle;
            state.point = None;
        }
        Event::RollRequested { .. } => {}
        Event::RollApplied {
            roll,
            phase_after,
            point_after,
            ..
        } => {
            state.phase = *phase_after;
            state.point = *point_after;
            state.last_roll = Some(*roll);
            if *phase_after == Phase::Idle {
                state.series_id = None;
            }
        }
        Event::BetPlaced {
            bet_id,
            player,
            funding,
            amount,
            ..
        } => {
            match funding {
                Funding::Chips => {
                    let chips = state.chips.entry(player.clone()).or_default();
                    *chips = chips
                        .checked_sub(*amount)
                        .ok_or(ReplayError::Underflow("stake exceeds chips"))?;
                    let vault = state.vault(VaultId::Players);
                    vault.total_assets += amount;
                    vault.escrowed += amount;
                }
                Funding::BotVault(bot) => {
                    let vault = state.vault(VaultId::Bot(*bot));
                    vault.escrowed += amount;
                    if vault.escrowed > vault.total_assets {
                        return Err(ReplayError::Underflow("bot stake exceeds vault"));
                    }
                }
            }
            state.open.insert(
                *bet_id,
                OpenBet {
                    player: player.clone(),
                    funding: *funding,
                    amount: *amount,
                },
            );
        }
        Event::BetCancelled { bet_id, refund, .. } => {
            let bet = state
                .open
                .remove(bet_id)
                .ok_or(ReplayError::UnknownBet { bet_id: *bet_id })?;
            if bet.amount != *refund {
                return Err(ReplayError::Inconsistent("refund does not match stake"));
            }
            settle_funds(state, &bet, BetStatus::Push, 0, 0)?;
        }
        Event::BetSettled {
            bet_id,
            status,
            amount,
            payout,
            fee,
            ..
        } => {
            let bet = state
                .open
                .remove(bet_id)
                .ok_or(ReplayError::UnknownBet { bet_id: *bet_id })?;
            if bet.amount != *amount {
                return Err(ReplayError::Inconsistent("settled amount mismatch"));
            }
            settle_funds(state, &bet, *status, *payout, *fee)?;
        }
        Event::PlayerCredited {
            player,
            amount,
            new_chips,
        } => {
            let chips = state.chips.entry(player.clone()).or_default();
            let expected = chips
                .checked_add(*amount)
                .ok_or(ReplayError::Underflow("chip overflow"))?;
            if expected != *new_chips {
                return Err(ReplayError::Inconsistent("credited balance mismatch"));
            }
            *chips = expected;
        }
        Event::LiquidityDeposited {
            vault,
            amount,
            shares_minted,
            total_shares,
            total_assets,
            ..
        } => {
            let totals = state.vault(*vault);
            totals.total_assets += amount;
            totals.total_shares += shares_minted;
            if totals.total_assets != *total_assets || totals.total_shares != *total_shares {
                return Err(ReplayError::Inconsistent("deposit totals mismatch"));
            }
        }
        Event::LiquidityWithdrawn {
            vault,
            shares_burned,
            amount,
            total_shares,
            total_assets,
            ..
        } => {
            let totals = state.vault(*vault);
            totals.total_assets = totals
                .total_assets
                .checked_sub(*amount)
                .ok_or(ReplayError::Underflow("withdrawal exceeds assets"))?;
            totals.total_shares = totals
                .total_shares
                .checked_sub(*shares_burned)
                .ok_or(ReplayError::Underflow("burn exceeds shares"))?;
            if totals.total_assets != *total_assets || totals.total_shares != *total_shares {
                return Err(ReplayError::Inconsistent("withdrawal totals mismatch"));
            }
        }
    }
    Ok(())
}

/// Mirror of the engine's terminal double-entry.
fn settle_funds(
    state: &mut ReplayedState,
    bet: &OpenBet,
    status: BetStatus,
    payout: u64,
    fee: u64,
) -> Result<(), ReplayError> {
    let amount = bet.amount;
    match bet.funding {
        Funding::Chips => {
            let players = state.vault(VaultId::Players);
            players.escrowed = players
                .escrowed
                .checked_sub(amount)
                .ok_or(ReplayError::Underflow("escrow release"))?;
            match status {
                BetStatus::Won => {
                    players.total_assets = players
                        .total_assets
                        .checked_sub(amount + payout)
                        .ok_or(ReplayError::Underflow("payout exceeds vault"))?;
                    *state.chips.entry(bet.player.clone()).or_default() += amount + payout;
                }
                BetStatus::Lost => {
                    players.total_assets = players
                        .total_assets
                        .checked_sub(fee)
                        .ok_or(ReplayError::Underflow("fee exceeds vault"))?;
                    state.treasury_fees += fee;
                }
                BetStatus::Push => {
                    players.total_assets = players
                        .total_assets
                        .checked_sub(amount)
                        .ok_or(ReplayError::Underflow("refund exceeds vault"))?;
                    *state.chips.entry(bet.player.clone()).or_default() += amount;
                }
                BetStatus::Open | BetStatus::Working => {
                    return Err(ReplayError::Inconsistent("non-terminal settle event"))
                }
            }
        }
        Funding::BotVault(bot) => {
            {
                let bot_vault = state.vault(VaultId::Bot(bot));
                bot_vault.escrowed = bot_vault
                    .escrowed
                    .checked_sub(amount)
                    .ok_or(ReplayError::Underflow("escrow release"))?;
            }
            match status {
                BetStatus::Won => {
                    let players = state.vault(VaultId::Players);
                    players.total_assets = players
                        .total_assets
                        .checked_sub(payout)
                        .ok_or(ReplayError::Underflow("payout exceeds vault"))?;
                    state.vault(VaultId::Bot(bot)).total_assets += payout;
                }
                BetStatus::Lost => {
                    let bot_vault = state.vault(VaultId::Bot(bot));
                    bot_vault.total_assets = bot_vault
                        .total_assets
                        .checked_sub(amount)
                        .ok_or(ReplayError::Underflow("stake exceeds bot vault"))?;
                    state.vault(VaultId::Players).total_assets += amount - fee;
                    state.treasury_fees += fee;
                }
                BetStatus::Push => {}
                BetStatus::Open | BetStatus::Working => {
                    return Err(ReplayError::Inconsistent("non-terminal settle event"))
                }
            }
        }
    }
    Ok(())
}
