use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::{
    hardway_payout, is_point_number, lay_odds_payout, place_payout, true_odds_payout,
    ANY_CRAPS_PAYOUT_DEN, ANY_CRAPS_PAYOUT_NUM, ANY_SEVEN_PAYOUT_DEN, ANY_SEVEN_PAYOUT_NUM,
    ACES_PAYOUT_DEN, ACES_PAYOUT_NUM, FIELD_PAYOUT_2_12_DEN, FIELD_PAYOUT_2_12_NUM,
    HARDWAY_NUMBERS, LINE_PAYOUT_DEN, LINE_PAYOUT_NUM, NUM_BOTS, TWELVE_PAYOUT_DEN,
    TWELVE_PAYOUT_NUM, YO_ELEVEN_PAYOUT_DEN, YO_ELEVEN_PAYOUT_NUM,
};

/// Upper bound on simultaneously open bets tracked by the book.
const MAX_OPEN_BETS: usize = 1024;

pub type BetId = u64;

/// The wager menu.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BetType {
    PassLine = 0,
    DontPass = 1,
    PassOdds = 2,
    DontPassOdds = 3,
    Come = 4,
    DontCome = 5,
    Field = 6,
    Place = 7,
    HardWay = 8,
    AnySeven = 9,
    AnyCraps = 10,
    YoEleven = 11,
    Aces = 12,
    Twelve = 13,
}

impl BetType {
    /// True for bets that resolve on the very next roll regardless of phase.
    pub fn is_one_roll(&self) -> bool {
        matches!(
            self,
            Self::Field | Self::AnySeven | Self::AnyCraps | Self::YoEleven | Self::Aces | Self::Twelve
        )
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Self::PassLine | Self::DontPass)
    }

    pub fn is_odds(&self) -> bool {
        matches!(self, Self::PassOdds | Self::DontPassOdds)
    }

    /// True for place and hard-way bets, which the house may hold ("off")
    /// during come-out rolls.
    pub fn is_number_bet(&self) -> bool {
        matches!(self, Self::Place | Self::HardWay)
    }

    /// Whether placement must supply a target number, and which targets are
    /// acceptable.
    pub fn valid_target(&self, target: Option<u8>) -> bool {
        match self {
            Self::Place => matches!(target, Some(t) if is_point_number(t)),
            Self::HardWay => matches!(target, Some(t) if HARDWAY_NUMBERS.contains(&t)),
            // Odds targets are pinned to the established point by the ledger.
            Self::PassOdds | Self::DontPassOdds => matches!(target, Some(t) if is_point_number(t)),
            // Come bets acquire a target when they travel, never at placement.
            _ => target.is_none(),
        }
    }

    /// Worst-case winnings ratio, used to reserve house liquidity at
    /// placement. `None` only for malformed targets.
    pub fn max_win_ratio(&self, target: Option<u8>) -> Option<(u64, u64)> {
        match self {
            Self::PassLine | Self::DontPass | Self::Come | Self::DontCome => {
                Some((LINE_PAYOUT_NUM, LINE_PAYOUT_DEN))
            }
            Self::PassOdds => true_odds_payout(target?),
            Self::DontPassOdds => lay_odds_payout(target?),
            Self::Field => Some((FIELD_PAYOUT_2_12_NUM, FIELD_PAYOUT_2_12_DEN)),
            Self::Place => place_payout(target?),
            Self::HardWay => hardway_payout(target?),
            Self::AnySeven => Some((ANY_SEVEN_PAYOUT_NUM, ANY_SEVEN_PAYOUT_DEN)),
            Self::AnyCraps => Some((ANY_CRAPS_PAYOUT_NUM, ANY_CRAPS_PAYOUT_DEN)),
            Self::YoEleven => Some((YO_ELEVEN_PAYOUT_NUM, YO_ELEVEN_PAYOUT_DEN)),
            Self::Aces => Some((ACES_PAYOUT_NUM, ACES_PAYOUT_DEN)),
            Self::Twelve => Some((TWELVE_PAYOUT_NUM, TWELVE_PAYOUT_DEN)),
        }
    }
}

impl TryFrom<u8> for BetType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PassLine),
            1 => Ok(Self::DontPass),
            2 => Ok(Self::PassOdds),
            3 => Ok(Self::DontPassOdds),
            4 => Ok(Self::Come),
            5 => Ok(Self::DontCome),
            6 => Ok(Self::Field),
            7 => Ok(Self::Place),
            8 => Ok(Self::HardWay),
            9 => Ok(Self::AnySeven),
            10 => Ok(Self::AnyCraps),
            11 => Ok(Self::YoEleven),
            12 => Ok(Self::Aces),
            13 => Ok(Self::Twelve),
            _ => Err(()),
        }
    }
}

impl Write for BetType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for BetType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        BetType::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for BetType {
    const SIZE: usize = 1;
}

/// Bet lifecycle. `Working` marks a held number bet during come-out rolls;
/// terminal statuses are written exactly once.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetStatus {
    Open = 0,
    Working = 1,
    Won = 2,
    Lost = 3,
    Push = 4,
}

impl BetStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Push)
    }
}

impl Write for BetStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for BetStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Open),
            1 => Ok(Self::Working),
            2 => Ok(Self::Won),
            3 => Ok(Self::Lost),
            4 => Ok(Self::Push),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for BetStatus {
    const SIZE: usize = 1;
}

/// Which pocket stakes a bet: a player's chip account, or a house bot's
/// sub-vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Funding {
    Chips,
    BotVault(u8),
}

impl Write for Funding {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Chips => 0u8.write(writer),
            Self::BotVault(bot) => {
                1u8.write(writer);
                bot.write(writer);
            }
        }
    }
}

impl Read for Funding {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Chips),
            1 => {
                let bot = u8::read(reader)?;
                if bot >= NUM_BOTS {
                    return Err(Error::Invalid("Funding", "bot id out of range"));
                }
                Ok(Self::BotVault(bot))
            }
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Funding {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Chips => 0,
            Self::BotVault(_) => 1,
        }
    }
}

/// A wager. Archived (never deleted) after resolution; only `status`,
/// `target` (come-bet travel), and `resolved_at_roll` ever mutate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub id: BetId,
    pub player: PublicKey,
    pub funding: Funding,
    pub series_id: u64,
    pub bet_type: BetType,
    pub target: Option<u8>,
    pub amount: u64,
    pub status: BetStatus,
    pub created_at_roll: u32,
    pub resolved_at_roll: Option<u32>,
}

impl Bet {
    /// True once a come or don't-come bet has moved onto a number.
    pub fn traveled(&self) -> bool {
        matches!(self.bet_type, BetType::Come | BetType::DontCome) && self.target.is_some()
    }
}

impl Write for Bet {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.player.write(writer);
        self.funding.write(writer);
        self.series_id.write(writer);
        self.bet_type.write(writer);
        self.target.write(writer);
        self.amount.write(writer);
        self.status.write(writer);
        self.created_at_roll.write(writer);
        self.resolved_at_roll.write(writer);
    }
}

impl Read for Bet {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            player: PublicKey::read(reader)?,
            funding: Funding::read(reader)?,
            series_id: u64::read(reader)?,
            bet_type: BetType::read(reader)?,
            target: Option::<u8>::read(reader)?,
            amount: u64::read(reader)?,
            status: BetStatus::read(reader)?,
            created_at_roll: u32::read(reader)?,
            resolved_at_roll: Option::<u32>::read(reader)?,
        })
    }
}

impl EncodeSize for Bet {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.player.encode_size()
            + self.funding.encode_size()
            + self.series_id.encode_size()
            + self.bet_type.encode_size()
            + self.target.encode_size()
            + self.amount.encode_size()
            + self.status.encode_size()
            + self.created_at_roll.encode_size()
            + self.resolved_at_roll.encode_size()
    }
}

/// Index of unresolved bets for the active series.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BetBook {
    pub open: Vec<BetId>,
}

impl BetBook {
    pub fn insert(&mut self, id: BetId) {
        self.open.push(id);
    }

    pub fn remove(&mut self, id: BetId) {
        self.open.retain(|&b| b != id);
    }

    pub fn contains(&self, id: BetId) -> bool {
        self.open.contains(&id)
    }
}

impl Write for BetBook {
    fn write(&self, writer: &mut impl BufMut) {
        self.open.write(writer);
    }
}

impl Read for BetBook {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            open: Vec::<u64>::read_range(reader, 0..=MAX_OPEN_BETS)?,
        })
    }
}

impl EncodeSize for BetBook {
    fn encode_size(&self) -> usize {
        self.open.encode_size()
    }
}
