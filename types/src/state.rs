//! State keys and values for the engine's key-value backend.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use crate::craps::{
    Bet, BetBook, BetId, EscrowEntry, PendingRoll, PlayerAccount, RequestToken, TableState,
    TreasuryState, VaultAccount, VaultId,
};

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// The table singleton.
    Table,
    /// An outstanding randomness request.
    PendingRoll(RequestToken),
    /// A wager, open or archived.
    Bet(BetId),
    /// The open-bet index for the active series.
    BetBook,
    /// A player's chip account.
    Player(PublicKey),
    /// A vault in the arena.
    Vault(VaultId),
    /// A liquidity provider's share balance in a vault.
    Shares(VaultId, PublicKey),
    /// The treasury fee sink.
    Treasury,
    /// Funds locked against an open bet.
    Escrow(BetId),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Table => 0u8.write(writer),
            Self::PendingRoll(token) => {
                1u8.write(writer);
                token.write(writer);
            }
            Self::Bet(id) => {
                2u8.write(writer);
                id.write(writer);
            }
            Self::BetBook => 3u8.write(writer),
            Self::Player(pk) => {
                4u8.write(writer);
                pk.write(writer);
            }
            Self::Vault(id) => {
                5u8.write(writer);
                id.write(writer);
            }
            Self::Shares(vault, pk) => {
                6u8.write(writer);
                vault.write(writer);
                pk.write(writer);
            }
            Self::Treasury => 7u8.write(writer),
            Self::Escrow(id) => {
                8u8.write(writer);
                id.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        match tag {
            0 => Ok(Self::Table),
            1 => Ok(Self::PendingRoll(RequestToken::read(reader)?)),
            2 => Ok(Self::Bet(u64::read(reader)?)),
            3 => Ok(Self::BetBook),
            4 => Ok(Self::Player(PublicKey::read(reader)?)),
            5 => Ok(Self::Vault(VaultId::read(reader)?)),
            6 => Ok(Self::Shares(VaultId::read(reader)?, PublicKey::read(reader)?)),
            7 => Ok(Self::Treasury),
            8 => Ok(Self::Escrow(u64::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Table | Self::BetBook | Self::Treasury => 0,
            Self::PendingRoll(token) => token.encode_size(),
            Self::Bet(id) => id.encode_size(),
            Self::Player(_) => PublicKey::SIZE,
            Self::Vault(id) => id.encode_size(),
            Self::Shares(vault, _) => vault.encode_size() + PublicKey::SIZE,
            Self::Escrow(id) => id.encode_size(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Table(TableState),
    PendingRoll(PendingRoll),
    Bet(Bet),
    BetBook(BetBook),
    Player(PlayerAccount),
    Vault(VaultAccount),
    Shares(u64),
    Treasury(TreasuryState),
    Escrow(EscrowEntry),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Table(table) => {
                0u8.write(writer);
                table.write(writer);
            }
            Self::PendingRoll(pending) => {
                1u8.write(writer);
                pending.write(writer);
            }
            Self::Bet(bet) => {
                2u8.write(writer);
                bet.write(writer);
            }
            Self::BetBook(book) => {
                3u8.write(writer);
                book.write(writer);
            }
            Self::Player(player) => {
                4u8.write(writer);
                player.write(writer);
            }
            Self::Vault(vault) => {
                5u8.write(writer);
                vault.write(writer);
            }
            Self::Shares(shares) => {
                6u8.write(writer);
                shares.write(writer);
            }
            Self::Treasury(treasury) => {
                7u8.write(writer);
                treasury.write(writer);
            }
            Self::Escrow(escrow) => {
                8u8.write(writer);
                escrow.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let tag = u8::read(reader)?;
        match tag {
            0 => Ok(Self::Table(TableState::read(reader)?)),
            1 => Ok(Self::PendingRoll(PendingRoll::read(reader)?)),
            2 => Ok(Self::Bet(Bet::read(reader)?)),
            3 => Ok(Self::BetBook(BetBook::read(reader)?)),
            4 => Ok(Self::Player(PlayerAccount::read(reader)?)),
            5 => Ok(Self::Vault(VaultAccount::read(reader)?)),
            6 => Ok(Self::Shares(u64::read(reader)?)),
            7 => Ok(Self::Treasury(TreasuryState::read(reader)?)),
            8 => Ok(Self::Escrow(EscrowEntry::read(reader)?)),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Table(table) => table.encode_size(),
            Self::PendingRoll(pending) => pending.encode_size(),
            Self::Bet(bet) => bet.encode_size(),
            Self::BetBook(book) => book.encode_size(),
            Self::Player(player) => player.encode_size(),
            Self::Vault(vault) => vault.encode_size(),
            Self::Shares(shares) => shares.encode_size(),
            Self::Treasury(treasury) => treasury.encode_size(),
            Self::Escrow(escrow) => escrow.encode_size(),
        }
    }
}
