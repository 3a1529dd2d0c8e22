use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

use super::NUM_BOTS;

/// Addresses into the vault arena: one shared vault banking player action,
/// plus one sub-vault per house bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VaultId {
    Players,
    Bot(u8),
}

impl Write for VaultId {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Players => 0u8.write(writer),
            Self::Bot(bot) => {
                1u8.write(writer);
                bot.write(writer);
            }
        }
    }
}

impl Read for VaultId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Players),
            1 => {
                let bot = u8::read(reader)?;
                if bot >= NUM_BOTS {
                    return Err(Error::Invalid("VaultId", "bot id out of range"));
                }
                Ok(Self::Bot(bot))
            }
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for VaultId {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Players => 0,
            Self::Bot(_) => 1,
        }
    }
}

/// A pooled-capital share vault.
///
/// `total_assets` counts liquid plus escrowed funds; `escrowed` is pinned to
/// the sum of open-bet stakes banked here, and `reserved` tracks the
/// worst-case winnings the vault could owe on those bets. Share value is
/// `total_assets / total_shares` and never decreases from deposits alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct VaultAccount {
    pub total_shares: u64,
    pub total_assets: u64,
    pub escrowed: u64,
    pub reserved: u64,
    pub fee_bps: u16,
}

impl VaultAccount {
    pub fn new(fee_bps: u16) -> Self {
        Self {
            total_shares: 0,
            total_assets: 0,
            escrowed: 0,
            reserved: 0,
            fee_bps,
        }
    }

    /// Assets not locked under open bets.
    pub fn liquid(&self) -> u64 {
        self.total_assets.saturating_sub(self.escrowed)
    }

    /// Liquid assets not reserved against worst-case payouts.
    pub fn free(&self) -> u64 {
        self.liquid().saturating_sub(self.reserved)
    }
}

impl Write for VaultAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.total_shares.write(writer);
        self.total_assets.write(writer);
        self.escrowed.write(writer);
        self.reserved.write(writer);
        self.fee_bps.write(writer);
    }
}

impl Read for VaultAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let account = Self {
            total_shares: u64::read(reader)?,
            total_assets: u64::read(reader)?,
            escrowed: u64::read(reader)?,
            reserved: u64::read(reader)?,
            fee_bps: u16::read(reader)?,
        };
        if account.escrowed > account.total_assets {
            return Err(Error::Invalid("VaultAccount", "escrow exceeds assets"));
        }
        Ok(account)
    }
}

impl EncodeSize for VaultAccount {
    fn encode_size(&self) -> usize {
        self.total_shares.encode_size()
            + self.total_assets.encode_size()
            + self.escrowed.encode_size()
            + self.reserved.encode_size()
            + self.fee_bps.encode_size()
    }
}

/// Funds locked against one open bet. Created atomically with placement,
/// destroyed exactly once at settlement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscrowEntry {
    pub bet_id: u64,
    pub amount: u64,
    pub vault_id: VaultId,
}

impl Write for EscrowEntry {
    fn write(&self, writer: &mut impl BufMut) {
        self.bet_id.write(writer);
        self.amount.write(writer);
        self.vault_id.write(writer);
    }
}

impl Read for EscrowEntry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            bet_id: u64::read(reader)?,
            amount: u64::read(reader)?,
            vault_id: VaultId::read(reader)?,
        })
    }
}

impl EncodeSize for EscrowEntry {
    fn encode_size(&self) -> usize {
        self.bet_id.encode_size() + self.amount.encode_size() + self.vault_id.encode_size()
    }
}

/// Accumulated basis-point skim on net house winnings, owed to the treasury.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TreasuryState {
    pub accumulated_fees: u64,
}

impl Write for TreasuryState {
    fn write(&self, writer: &mut impl BufMut) {
        self.accumulated_fees.write(writer);
    }
}

impl Read for TreasuryState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            accumulated_fees: u64::read(reader)?,
        })
    }
}

impl FixedSize for TreasuryState {
    const SIZE: usize = 8;
}

/// A player's chip balance, staking their bets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PlayerAccount {
    pub chips: u64,
}

impl Write for PlayerAccount {
    fn write(&self, writer: &mut impl BufMut) {
        self.chips.write(writer);
    }
}

impl Read for PlayerAccount {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            chips: u64::read(reader)?,
        })
    }
}

impl FixedSize for PlayerAccount {
    const SIZE: usize = 8;
}
