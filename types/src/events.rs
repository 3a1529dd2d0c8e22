//! The append-only audit trail.
//!
//! Every externally observable state change emits one event. Each event
//! carries enough fields for a consumer to reconstruct ledger state from the
//! log alone, without reading engine state.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use crate::craps::{
    BetStatus, BetType, Funding, Phase, RequestToken, Roll, RollOutcome, SeriesEndReason, VaultId,
    RNG_COMMIT_LEN,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A shooter took the dice.
    SeriesStarted { series_id: u64, shooter: PublicKey },

    /// The series closed (seven-out or operator action).
    SeriesEnded {
        series_id: u64,
        reason: SeriesEndReason,
    },

    /// A randomness request was issued for the active series.
    RollRequested {
        token: RequestToken,
        series_id: u64,
        /// Commitment published by the randomness source (0 or 32 bytes).
        commit: Vec<u8>,
    },

    /// Randomness arrived and was mapped onto the table.
    RollApplied {
        roll: Roll,
        outcome: RollOutcome,
        phase_after: Phase,
        point_after: Option<u8>,
    },

    /// A wager entered the book and its stake was escrowed.
    BetPlaced {
        bet_id: u64,
        player: PublicKey,
        funding: Funding,
        series_id: u64,
        bet_type: BetType,
        target: Option<u8>,
        amount: u64,
        created_at_roll: u32,
    },

    /// An open wager was taken down and its stake refunded.
    BetCancelled {
        bet_id: u64,
        series_id: u64,
        refund: u64,
    },

    /// A wager left the book with a terminal status.
    BetSettled {
        bet_id: u64,
        series_id: u64,
        status: BetStatus,
        funding: Funding,
        /// Stake at risk.
        amount: u64,
        /// Winnings paid on top of the returned stake (zero on loss/push).
        payout: u64,
        /// Treasury skim taken from house winnings (zero unless the house won).
        fee: u64,
        resolved_at_roll: u32,
    },

    /// Chips were credited to a player account.
    PlayerCredited {
        player: PublicKey,
        amount: u64,
        new_chips: u64,
    },

    /// Capital entered a vault in exchange for shares.
    LiquidityDeposited {
        vault: VaultId,
        provider: PublicKey,
        amount: u64,
        shares_minted: u64,
        total_shares: u64,
        total_assets: u64,
    },

    /// Shares were burned for a proportional slice of vault assets.
    LiquidityWithdrawn {
        vault: VaultId,
        provider: PublicKey,
        shares_burned: u64,
        amount: u64,
        total_shares: u64,
        total_assets: u64,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::SeriesStarted { series_id, shooter } => {
                0u8.write(writer);
                series_id.write(writer);
                shooter.write(writer);
            }
            Self::SeriesEnded { series_id, reason } => {
                1u8.write(writer);
                series_id.write(writer);
                reason.write(writer);
            }
            Self::RollRequested {
                token,
                series_id,
                commit,
            } => {
                2u8.write(writer);
                token.write(writer);
                series_id.write(writer);
                commit.write(writer);
            }
            Self::RollApplied {
                roll,
                outcome,
                phase_after,
                point_after,
            } => {
                3u8.write(writer);
                roll.write(writer);
                outcome.write(writer);
                phase_after.write(writer);
                point_after.write(writer);
            }
            Self::BetPlaced {
                bet_id,
                player,
                funding,
                series_id,
                bet_type,
                target,
                amount,
                created_at_roll,
            } => {
                4u8.write(writer);
                bet_id.write(writer);
                player.write(writer);
                funding.write(writer);
                series_id.write(writer);
                bet_type.write(writer);
                target.write(writer);
                amount.write(writer);
                created_at_roll.write(writer);
            }
            Self::BetCancelled {
                bet_id,
                series_id,
                refund,
            } => {
                5u8.write(writer);
                bet_id.write(writer);
                series_id.write(writer);
                refund.write(writer);
            }
            Self::BetSettled {
                bet_id,
                series_id,
                status,
                funding,
                amount,
                payout,
                fee,
                resolved_at_roll,
            } => {
                6u8.write(writer);
                bet_id.write(writer);
                series_id.write(writer);
                status.write(writer);
                funding.write(writer);
                amount.write(writer);
                payout.write(writer);
                fee.write(writer);
                resolved_at_roll.write(writer);
            }
            Self::PlayerCredited {
                player,
                amount,
                new_chips,
            } => {
                7u8.write(writer);
                player.write(writer);
                amount.write(writer);
                new_chips.write(writer);
            }
            Self::LiquidityDeposited {
                vault,
                provider,
                amount,
                shares_minted,
                total_shares,
                total_assets,
            } => {
                8u8.write(writer);
                vault.write(writer);
                provider.write(writer);
                amount.write(writer);
                shares_minted.write(writer);
                total_shares.write(writer);
                total_assets.write(writer);
            }
            Self::LiquidityWithdrawn {
                vault,
                provider,
                shares_burned,
                amount,
                total_shares,
                total_assets,
            } => {
                9u8.write(writer);
                vault.write(writer);
                provider.write(writer);
                shares_burned.write(writer);
                amount.write(writer);
                total_shares.write(writer);
                total_assets.write(writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        match tag {
            0 => Ok(Self::SeriesStarted {
                series_id: u64::read(reader)?,
                shooter: PublicKey::read(reader)?,
            }),
            1 => Ok(Self::SeriesEnded {
                series_id: u64::read(reader)?,
                reason: SeriesEndReason::read(reader)?,
            }),
            2 => {
                let token = RequestToken::read(reader)?;
                let series_id = u64::read(reader)?;
                let commit = Vec::<u8>::read_range(reader, 0..=RNG_COMMIT_LEN)?;
                if !(commit.is_empty() || commit.len() == RNG_COMMIT_LEN) {
                    return Err(Error::Invalid("Event", "invalid commit length"));
                }
                Ok(Self::RollRequested {
                    token,
                    series_id,
                    commit,
                })
            }
            3 => Ok(Self::RollApplied {
                roll: Roll::read(reader)?,
                outcome: RollOutcome::read(reader)?,
                phase_after: Phase::read(reader)?,
                point_after: Option::<u8>::read(reader)?,
            }),
            4 => Ok(Self::BetPlaced {
                bet_id: u64::read(reader)?,
                player: PublicKey::read(reader)?,
                funding: Funding::read(reader)?,
                series_id: u64::read(reader)?,
                bet_type: BetType::read(reader)?,
                target: Option::<u8>::read(reader)?,
                amount: u64::read(reader)?,
                created_at_roll: u32::read(reader)?,
            }),
            5 => Ok(Self::BetCancelled {
                bet_id: u64::read(reader)?,
                series_id: u64::read(reader)?,
                refund: u64::read(reader)?,
            }),
            6 => Ok(Self::BetSettled {
                bet_id: u64::read(reader)?,
                series_id: u64::read(reader)?,
                status: BetStatus::read(reader)?,
                funding: Funding::read(reader)?,
                amount: u64::read(reader)?,
                payout: u64::read(reader)?,
                fee: u64::read(reader)?,
                resolved_at_roll: u32::read(reader)?,
            }),
            7 => Ok(Self::PlayerCredited {
                player: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                new_chips: u64::read(reader)?,
            }),
            8 => Ok(Self::LiquidityDeposited {
                vault: VaultId::read(reader)?,
                provider: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                shares_minted: u64::read(reader)?,
                total_shares: u64::read(reader)?,
                total_assets: u64::read(reader)?,
            }),
            9 => Ok(Self::LiquidityWithdrawn {
                vault: VaultId::read(reader)?,
                provider: PublicKey::read(reader)?,
                shares_burned: u64::read(reader)?,
                amount: u64::read(reader)?,
                total_shares: u64::read(reader)?,
                total_assets: u64::read(reader)?,
            }),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::SeriesStarted { series_id, shooter } => {
                series_id.encode_size() + shooter.encode_size()
            }
            Self::SeriesEnded { series_id, reason } => {
                series_id.encode_size() + reason.encode_size()
            }
            Self::RollRequested {
                token,
                series_id,
                commit,
            } => token.encode_size() + series_id.encode_size() + commit.encode_size(),
            Self::RollApplied {
                roll,
                outcome,
                phase_after,
                point_after,
            } => {
                roll.encode_size()
                    + outcome.encode_size()
                    + phase_after.encode_size()
                    + point_after.encode_size()
            }
            Self::BetPlaced {
                bet_id,
                player,
                funding,
                series_id,
                bet_type,
                target,
                amount,
                created_at_roll,
            } => {
                bet_id.encode_size()
                    + player.encode_size()
                    + funding.encode_size()
                    + series_id.encode_size()
                    + bet_type.encode_size()
                    + target.encode_size()
                    + amount.encode_size()
                    + created_at_roll.encode_size()
            }
            Self::BetCancelled {
                bet_id,
                series_id,
                refund,
            } => bet_id.encode_size() + series_id.encode_size() + refund.encode_size(),
            Self::BetSettled {
                bet_id,
                series_id,
                status,
                funding,
                amount,
                payout,
                fee,
                resolved_at_roll,
            } => {
                bet_id.encode_size()
                    + series_id.encode_size()
                    + status.encode_size()
                    + funding.encode_size()
                    + amount.encode_size()
                    + payout.encode_size()
                    + fee.encode_size()
                    + resolved_at_roll.encode_size()
            }
            Self::PlayerCredited {
                player,
                amount,
                new_chips,
            } => player.encode_size() + amount.encode_size() + new_chips.encode_size(),
            Self::LiquidityDeposited {
                vault,
                provider,
                amount,
                shares_minted,
                total_shares,
                total_assets,
            } => {
                vault.encode_size()
                    + provider.encode_size()
                    + amount.encode_size()
                    + shares_minted.encode_size()
                    + total_shares.encode_size()
                    + total_assets.encode_size()
            }
            Self::LiquidityWithdrawn {
                vault,
                provider,
                shares_burned,
                amount,
                total_shares,
                total_assets,
            } => {
                vault.encode_size()
                    + provider.encode_size()
                    + shares_burned.encode_size()
                    + amount.encode_size()
                    + total_shares.encode_size()
                    + total_assets.encode_size()
            }
        }
    }
}
