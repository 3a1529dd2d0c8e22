//! Pure bet resolution.
//!
//! Settlement is a function from (phase-before-roll, point, roll, open bets,
//! policy) to per-bet dispositions. It holds no state and performs no vault
//! mutation; the engine applies the resulting dispositions atomically.
//!
//! All payouts are `amount * numerator / denominator` in integers, rounded
//! down, with the remainder staying with the house.

use boxcars_types::craps::{
    hardway_payout, is_craps, is_field_winner, is_natural, is_point_number, lay_odds_payout,
    place_payout, true_odds_payout, Bet, BetType, Phase, Roll, FIELD_PAYOUT_2_12_DEN,
    FIELD_PAYOUT_2_12_NUM, FIELD_PAYOUT_NORMAL_DEN, FIELD_PAYOUT_NORMAL_NUM, ACES_PAYOUT_DEN,
    ACES_PAYOUT_NUM, ANY_CRAPS_PAYOUT_DEN, ANY_CRAPS_PAYOUT_NUM, ANY_SEVEN_PAYOUT_DEN,
    ANY_SEVEN_PAYOUT_NUM, TWELVE_PAYOUT_DEN, TWELVE_PAYOUT_NUM, YO_ELEVEN_PAYOUT_DEN,
    YO_ELEVEN_PAYOUT_NUM,
};

use crate::error::EngineError;

/// The roll being settled, keyed by the phase and point *before* the roll
/// advanced the table.
#[derive(Clone, Copy, Debug)]
pub struct RollContext {
    pub phase: Phase,
    pub point: Option<u8>,
    pub roll: Roll,
    /// House policy: place and hard-way bets stay live on come-out rolls.
    pub working_on_come_out: bool,
}

/// What happens to one bet on one roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Stake returned plus winnings.
    Win { winnings: u64 },
    /// Stake forfeited to the house.
    Lose,
    /// Stake returned, no decision.
    Push,
    /// A come/don't-come bet moves onto its number and stays open.
    Travel { target: u8 },
    /// No decision; the bet stays live.
    Ride,
    /// No decision; the bet is held ("off") for this roll by house policy.
    Held,
}

/// Integer payout with floor rounding; the remainder is never paid out.
pub fn payout(amount: u64, num: u64, den: u64) -> u64 {
    debug_assert!(den > 0);
    ((amount as u128) * (num as u128) / (den as u128).max(1)) as u64
}

/// Resolve a single open bet against a roll.
pub fn resolve_bet(bet: &Bet, ctx: &RollContext) -> Result<Disposition, EngineError> {
    let total = ctx.roll.total();
    match bet.bet_type {
        BetType::PassLine => match ctx.phase {
            Phase::ComeOut => {
                if is_natural(total) {
                    Ok(win(bet.amount, 1, 1))
                } else if is_craps(total) {
                    Ok(Disposition::Lose)
                } else {
                    Ok(Disposition::Ride)
                }
            }
            Phase::Point => match ctx.point {
                Some(point) if total == point => Ok(win(bet.amount, 1, 1)),
                Some(_) if total == 7 => Ok(Disposition::Lose),
                Some(_) => Ok(Disposition::Ride),
                None => Err(EngineError::InvariantViolation("point phase without point")),
            },
            Phase::Idle => Err(EngineError::UnhandledBetOutcome { bet_id: bet.id }),
        },

        BetType::DontPass => match ctx.phase {
            Phase::ComeOut => match total {
                7 | 11 => Ok(Disposition::Lose),
                2 | 3 => Ok(win(bet.amount, 1, 1)),
                // Bar twelve: explicit push, not a generic craps loss.
                12 => Ok(Disposition::Push),
                _ => Ok(Disposition::Ride),
            },
            Phase::Point => match ctx.point {
                Some(_) if total == 7 => Ok(win(bet.amount, 1, 1)),
                Some(point) if total == point => Ok(Disposition::Lose),
                Some(_) => Ok(Disposition::Ride),
                None => Err(EngineError::InvariantViolation("point phase without point")),
            },
            Phase::Idle => Err(EngineError::UnhandledBetOutcome { bet_id: bet.id }),
        },

        BetType::PassOdds => {
            let target = bet
                .target
                .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
            if ctx.phase != Phase::Point || ctx.point != Some(target) {
                // Odds ride the current point; anything else is a ledger bug.
                return Err(EngineError::UnhandledBetOutcome { bet_id: bet.id });
            }
            if total == target {
                let (num, den) = true_odds_payout(target)
                    .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
                Ok(win(bet.amount, num, den))
            } else if total == 7 {
                Ok(Disposition::Lose)
            } else {
                Ok(Disposition::Ride)
            }
        }

        BetType::DontPassOdds => {
            let target = bet
                .target
                .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
            if ctx.phase != Phase::Point || ctx.point != Some(target) {
                return Err(EngineError::UnhandledBetOutcome { bet_id: bet.id });
            }
            if total == 7 {
                let (num, den) = lay_odds_payout(target)
                    .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
                Ok(win(bet.amount, num, den))
            } else if total == target {
                Ok(Disposition::Lose)
            } else {
                Ok(Disposition::Ride)
            }
        }

        BetType::Come => match bet.target {
            // Untraveled: the next roll is this bet's private come-out.
            None => {
                if is_natural(total) {
                    Ok(win(bet.amount, 1, 1))
                } else if is_craps(total) {
                    Ok(Disposition::Lose)
                } else if is_point_number(total) {
                    Ok(Disposition::Travel { target: total })
                } else {
                    Err(EngineError::UnhandledBetOutcome { bet_id: bet.id })
                }
            }
            Some(target) => {
                if total == target {
                    Ok(win(bet.amount, 1, 1))
                } else if total == 7 {
                    Ok(Disposition::Lose)
                } else {
                    Ok(Disposition::Ride)
                }
            }
        },

        BetType::DontCome => match bet.target {
            None => match total {
                7 | 11 => Ok(Disposition::Lose),
                2 | 3 => Ok(win(bet.amount, 1, 1)),
                12 => Ok(Disposition::Push),
                _ if is_point_number(total) => Ok(Disposition::Travel { target: total }),
                _ => Err(EngineError::UnhandledBetOutcome { bet_id: bet.id }),
            },
            Some(target) => {
                if total == 7 {
                    Ok(win(bet.amount, 1, 1))
                } else if total == target {
                    Ok(Disposition::Lose)
                } else {
                    Ok(Disposition::Ride)
                }
            }
        },

        BetType::Field => {
            if is_field_winner(total) {
                let (num, den) = if total == 2 || total == 12 {
                    (FIELD_PAYOUT_2_12_NUM, FIELD_PAYOUT_2_12_DEN)
                } else {
                    (FIELD_PAYOUT_NORMAL_NUM, FIELD_PAYOUT_NORMAL_DEN)
                };
                Ok(win(bet.amount, num, den))
            } else {
                Ok(Disposition::Lose)
            }
        }

        BetType::Place => {
            let target = bet
                .target
                .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
            if ctx.phase == Phase::ComeOut && !ctx.working_on_come_out {
                return Ok(Disposition::Held);
            }
            if total == target {
                let (num, den) = place_payout(target)
                    .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
                Ok(win(bet.amount, num, den))
            } else if total == 7 {
                Ok(Disposition::Lose)
            } else {
                Ok(Disposition::Ride)
            }
        }

        BetType::HardWay => {
            let target = bet
                .target
                .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
            if ctx.phase == Phase::ComeOut && !ctx.working_on_come_out {
                return Ok(Disposition::Held);
            }
            if total == target && ctx.roll.is_hard() {
                let (num, den) = hardway_payout(target)
                    .ok_or(EngineError::UnhandledBetOutcome { bet_id: bet.id })?;
                Ok(win(bet.amount, num, den))
            } else if total == 7 || total == target {
                // Seven or the easy way.
                Ok(Disposition::Lose)
            } else {
                Ok(Disposition::Ride)
            }
        }

        BetType::AnySeven => Ok(one_roll(bet.amount, total == 7, ANY_SEVEN_PAYOUT_NUM, ANY_SEVEN_PAYOUT_DEN)),
        BetType::AnyCraps => Ok(one_roll(bet.amount, is_craps(total), ANY_CRAPS_PAYOUT_NUM, ANY_CRAPS_PAYOUT_DEN)),
        BetType::YoEleven => Ok(one_roll(bet.amount, total == 11, YO_ELEVEN_PAYOUT_NUM, YO_ELEVEN_PAYOUT_DEN)),
        BetType::Aces => Ok(one_roll(bet.amount, total == 2, ACES_PAYOUT_NUM, ACES_PAYOUT_DEN)),
        BetType::Twelve => Ok(one_roll(bet.amount, total == 12, TWELVE_PAYOUT_NUM, TWELVE_PAYOUT_DEN)),
    }
}

fn win(amount: u64, num: u64, den: u64) -> Disposition {
    Disposition::Win {
        winnings: payout(amount, num, den),
    }
}

fn one_roll(amount: u64, won: bool, num: u64, den: u64) -> Disposition {
    if won {
        win(amount, num, den)
    } else {
        Disposition::Lose
    }
}
