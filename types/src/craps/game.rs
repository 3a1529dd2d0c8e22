use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::{is_point_number, RNG_COMMIT_LEN};

/// Upper bound on outstanding randomness requests tracked per series.
const MAX_PENDING_ROLLS: usize = 64;

/// Table phases.
///
/// `Idle` means no shooter holds the dice. A come-out roll either decides the
/// line outright or establishes a point and moves the table to `Point`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle = 0,
    ComeOut = 1,
    Point = 2,
}

impl TryFrom<u8> for Phase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Phase::Idle),
            1 => Ok(Phase::ComeOut),
            2 => Ok(Phase::Point),
            _ => Err(()),
        }
    }
}

impl Write for Phase {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for Phase {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        Phase::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for Phase {
    const SIZE: usize = 1;
}

/// The line decision produced by one roll.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollOutcome {
    /// Come-out 7 or 11: pass wins outright.
    Natural = 0,
    /// Come-out 2, 3, or 12: pass loses.
    Craps = 1,
    /// Come-out box number: the point goes on.
    PointEstablished = 2,
    /// Point repeated before a 7: pass wins, back to come-out.
    PointMade = 3,
    /// 7 before the point: series over.
    SevenOut = 4,
    /// No line decision this roll.
    NoDecision = 5,
}

impl TryFrom<u8> for RollOutcome {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RollOutcome::Natural),
            1 => Ok(RollOutcome::Craps),
            2 => Ok(RollOutcome::PointEstablished),
            3 => Ok(RollOutcome::PointMade),
            4 => Ok(RollOutcome::SevenOut),
            5 => Ok(RollOutcome::NoDecision),
            _ => Err(()),
        }
    }
}

impl Write for RollOutcome {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for RollOutcome {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        RollOutcome::try_from(value).map_err(|_| Error::InvalidEnum(value))
    }
}

impl FixedSize for RollOutcome {
    const SIZE: usize = 1;
}

/// Why a series closed.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesEndReason {
    SevenOut = 0,
    Operator = 1,
}

impl Write for SeriesEndReason {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for SeriesEndReason {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::SevenOut),
            1 => Ok(Self::Operator),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for SeriesEndReason {
    const SIZE: usize = 1;
}

/// One shooter's turn with the dice, from come-out to seven-out (or an
/// operator-forced close).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Series {
    pub id: u64,
    pub shooter: PublicKey,
    pub phase: Phase,
    /// Established point, restricted to {4,5,6,8,9,10}.
    pub point: Option<u8>,
    /// Number of rolls recorded so far in this series.
    pub rolls: u32,
}

impl Series {
    pub fn new(id: u64, shooter: PublicKey) -> Self {
        Self {
            id,
            shooter,
            phase: Phase::ComeOut,
            point: None,
            rolls: 0,
        }
    }
}

impl Write for Series {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.shooter.write(writer);
        self.phase.write(writer);
        self.point.write(writer);
        self.rolls.write(writer);
    }
}

impl Read for Series {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let id = u64::read(reader)?;
        let shooter = PublicKey::read(reader)?;
        let phase = Phase::read(reader)?;
        let point = Option::<u8>::read(reader)?;
        if let Some(point) = point {
            if !is_point_number(point) {
                return Err(Error::Invalid("Series", "invalid point"));
            }
        }
        let rolls = u32::read(reader)?;
        Ok(Self {
            id,
            shooter,
            phase,
            point,
            rolls,
        })
    }
}

impl EncodeSize for Series {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.shooter.encode_size()
            + self.phase.encode_size()
            + self.point.encode_size()
            + self.rolls.encode_size()
    }
}

/// A recorded two-die roll. Immutable once written; ordered by `sequence`
/// within its series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roll {
    pub die1: u8,
    pub die2: u8,
    pub series_id: u64,
    pub sequence: u32,
}

impl Roll {
    pub fn total(&self) -> u8 {
        self.die1 + self.die2
    }

    /// True if both dice show the same face.
    pub fn is_hard(&self) -> bool {
        self.die1 == self.die2
    }
}

impl Write for Roll {
    fn write(&self, writer: &mut impl BufMut) {
        self.die1.write(writer);
        self.die2.write(writer);
        self.series_id.write(writer);
        self.sequence.write(writer);
    }
}

impl Read for Roll {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let die1 = u8::read(reader)?;
        let die2 = u8::read(reader)?;
        if !(1..=6).contains(&die1) || !(1..=6).contains(&die2) {
            return Err(Error::Invalid("Roll", "die face out of range"));
        }
        Ok(Self {
            die1,
            die2,
            series_id: u64::read(reader)?,
            sequence: u32::read(reader)?,
        })
    }
}

impl EncodeSize for Roll {
    fn encode_size(&self) -> usize {
        self.die1.encode_size()
            + self.die2.encode_size()
            + self.series_id.encode_size()
            + self.sequence.encode_size()
    }
}

/// Opaque correlation token for an outstanding randomness request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl Write for RequestToken {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for RequestToken {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(u64::read(reader)?))
    }
}

impl FixedSize for RequestToken {
    const SIZE: usize = 8;
}

/// An issued-but-undelivered randomness request.
///
/// Delivery for a token whose series has been superseded is rejected without
/// any state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRoll {
    pub token: RequestToken,
    pub series_id: u64,
    /// Commitment to the reveal value, when the randomness source published
    /// one at request time (0 or 32 bytes).
    pub commit: Vec<u8>,
}

impl Write for PendingRoll {
    fn write(&self, writer: &mut impl BufMut) {
        self.token.write(writer);
        self.series_id.write(writer);
        self.commit.write(writer);
    }
}

impl Read for PendingRoll {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let token = RequestToken::read(reader)?;
        let series_id = u64::read(reader)?;
        let commit = Vec::<u8>::read_range(reader, 0..=RNG_COMMIT_LEN)?;
        if !(commit.is_empty() || commit.len() == RNG_COMMIT_LEN) {
            return Err(Error::Invalid("PendingRoll", "invalid commit length"));
        }
        Ok(Self {
            token,
            series_id,
            commit,
        })
    }
}

impl EncodeSize for PendingRoll {
    fn encode_size(&self) -> usize {
        self.token.encode_size() + self.series_id.encode_size() + self.commit.encode_size()
    }
}

/// The table singleton: current series, monotonic counters, and the most
/// recent roll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableState {
    pub series: Option<Series>,
    pub next_series: u64,
    pub next_bet: u64,
    pub next_token: u64,
    pub last_roll: Option<Roll>,
    /// Tokens of outstanding randomness requests for the active series.
    pub pending: Vec<RequestToken>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            series: None,
            next_series: 1,
            next_bet: 1,
            next_token: 1,
            last_roll: None,
            pending: Vec::new(),
        }
    }
}

impl TableState {
    /// Phase as observed from outside: `Idle` when no series is active.
    pub fn phase(&self) -> Phase {
        self.series.as_ref().map(|s| s.phase).unwrap_or(Phase::Idle)
    }

    pub fn point(&self) -> Option<u8> {
        self.series.as_ref().and_then(|s| s.point)
    }
}

impl Write for TableState {
    fn write(&self, writer: &mut impl BufMut) {
        self.series.write(writer);
        self.next_series.write(writer);
        self.next_bet.write(writer);
        self.next_token.write(writer);
        self.last_roll.write(writer);
        self.pending.write(writer);
    }
}

impl Read for TableState {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            series: Option::<Series>::read(reader)?,
            next_series: u64::read(reader)?,
            next_bet: u64::read(reader)?,
            next_token: u64::read(reader)?,
            last_roll: Option::<Roll>::read(reader)?,
            pending: Vec::<RequestToken>::read_range(reader, 0..=MAX_PENDING_ROLLS)?,
        })
    }
}

impl EncodeSize for TableState {
    fn encode_size(&self) -> usize {
        self.series.encode_size()
            + self.next_series.encode_size()
            + self.next_bet.encode_size()
            + self.next_token.encode_size()
            + self.last_roll.encode_size()
            + self.pending.encode_size()
    }
}
