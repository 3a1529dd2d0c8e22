use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use thiserror::Error as ThisError;

use super::{BASIS_POINTS_SCALE, DEFAULT_FEE_BPS, DEFAULT_MAX_BET, DEFAULT_MIN_BET};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_bet must be positive")]
    ZeroMinBet,
    #[error("max_bet {max_bet} below min_bet {min_bet}")]
    InvertedLimits { min_bet: u64, max_bet: u64 },
    #[error("fee_bps {0} is not below 100%")]
    FeeTooHigh(u16),
}

/// Table configuration, threaded into the engine at construction rather than
/// read from ambient state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    pub min_bet: u64,
    pub max_bet: u64,
    /// Treasury skim on net house winnings, in basis points.
    pub fee_bps: u16,
    /// Whether place and hard-way bets stay live during come-out rolls.
    pub working_on_come_out: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_bet: DEFAULT_MIN_BET,
            max_bet: DEFAULT_MAX_BET,
            fee_bps: DEFAULT_FEE_BPS,
            working_on_come_out: false,
        }
    }
}

impl TableConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_bet == 0 {
            return Err(ConfigError::ZeroMinBet);
        }
        if self.max_bet < self.min_bet {
            return Err(ConfigError::InvertedLimits {
                min_bet: self.min_bet,
                max_bet: self.max_bet,
            });
        }
        if u64::from(self.fee_bps) >= BASIS_POINTS_SCALE {
            return Err(ConfigError::FeeTooHigh(self.fee_bps));
        }
        Ok(())
    }
}

impl Write for TableConfig {
    fn write(&self, writer: &mut impl BufMut) {
        self.min_bet.write(writer);
        self.max_bet.write(writer);
        self.fee_bps.write(writer);
        self.working_on_come_out.write(writer);
    }
}

impl Read for TableConfig {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            min_bet: u64::read(reader)?,
            max_bet: u64::read(reader)?,
            fee_bps: u16::read(reader)?,
            working_on_come_out: bool::read(reader)?,
        })
    }
}

impl FixedSize for TableConfig {
    const SIZE: usize = 8 + 8 + 2 + 1;
}
