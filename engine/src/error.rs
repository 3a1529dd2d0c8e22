use boxcars_types::craps::{BetId, BetType, Phase, VaultId};
use thiserror::Error;

/// Caller-facing failure taxonomy.
///
/// Recoverable errors leave all state untouched: every operation runs on a
/// pending frame that is discarded on failure. The defensive variants
/// (`UnhandledBetOutcome`, `InvariantViolation`) indicate a configuration or
/// accounting bug; they abort only the offending operation and never corrupt
/// other bets or the vaults.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("operation not valid in phase {phase:?}")]
    InvalidState { phase: Phase },

    #[error("no active series")]
    NoActiveSeries,

    #[error("{bet_type:?} cannot be placed in phase {phase:?}")]
    InvalidPhase { bet_type: BetType, phase: Phase },

    #[error("invalid or missing target number for {bet_type:?}")]
    InvalidTarget { bet_type: BetType },

    #[error("amount {amount} outside [{min}, {max}]")]
    AmountOutOfRange { amount: u64, min: u64, max: u64 },

    #[error("insufficient chips: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },

    #[error("vault {vault:?} cannot cover the stake or worst-case payout")]
    InsufficientLiquidity { vault: VaultId },

    #[error("withdrawal would pull funds out from under open bets")]
    InsufficientFreeLiquidity,

    #[error("randomness delivered for an unknown or superseded request")]
    StaleRequest,

    #[error("reveal does not match the registered commitment")]
    CommitMismatch,

    #[error("caller lacks the required grant")]
    Unauthorized,

    #[error("unknown bet {bet_id}")]
    UnknownBet { bet_id: BetId },

    #[error("bet {bet_id} is not open")]
    BetNotOpen { bet_id: BetId },

    #[error("bet {bet_id} cannot be taken down")]
    BetNotRemovable { bet_id: BetId },

    #[error("invalid table configuration: {0}")]
    InvalidConfig(#[from] boxcars_types::craps::ConfigError),

    #[error("no settlement rule for bet {bet_id}")]
    UnhandledBetOutcome { bet_id: BetId },

    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),

    #[error(transparent)]
    State(#[from] anyhow::Error),
}
