//! The table phase machine.
//!
//! `Idle -> ComeOut -> Point -> (ComeOut on a made point | Idle on a
//! seven-out)`. Every (phase, total) combination is handled explicitly;
//! combinations that cannot occur fail loudly instead of no-opping.

use boxcars_types::craps::{is_craps, is_natural, is_point_number, Phase, RollOutcome};

use crate::error::EngineError;

/// The line decision for one roll plus the resulting table state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollDecision {
    pub outcome: RollOutcome,
    pub phase_after: Phase,
    pub point_after: Option<u8>,
    /// True when the roll ends the series (seven-out).
    pub series_ends: bool,
}

/// Decide a roll against the current phase and point.
pub fn decide_roll(
    phase: Phase,
    point: Option<u8>,
    total: u8,
) -> Result<RollDecision, EngineError> {
    if !(2..=12).contains(&total) {
        return Err(EngineError::InvariantViolation("roll total out of range"));
    }

    match (phase, point) {
        (Phase::ComeOut, None) => {
            if is_natural(total) {
                // Pass wins outright; the shooter rolls another come-out.
                Ok(RollDecision {
                    outcome: RollOutcome::Natural,
                    phase_after: Phase::ComeOut,
                    point_after: None,
                    series_ends: false,
                })
            } else if is_craps(total) {
                Ok(RollDecision {
                    outcome: RollOutcome::Craps,
                    phase_after: Phase::ComeOut,
                    point_after: None,
                    series_ends: false,
                })
            } else if is_point_number(total) {
                Ok(RollDecision {
                    outcome: RollOutcome::PointEstablished,
                    phase_after: Phase::Point,
                    point_after: Some(total),
                    series_ends: false,
                })
            } else {
                Err(EngineError::InvariantViolation("unclassified come-out total"))
            }
        }
        (Phase::Point, Some(point)) => {
            if total == point {
                // Shooter keeps the dice.
                Ok(RollDecision {
                    outcome: RollOutcome::PointMade,
                    phase_after: Phase::ComeOut,
                    point_after: None,
                    series_ends: false,
                })
            } else if total == 7 {
                Ok(RollDecision {
                    outcome: RollOutcome::SevenOut,
                    phase_after: Phase::Idle,
                    point_after: None,
                    series_ends: true,
                })
            } else {
                Ok(RollDecision {
                    outcome: RollOutcome::NoDecision,
                    phase_after: Phase::Point,
                    point_after: Some(point),
                    series_ends: false,
                })
            }
        }
        (Phase::ComeOut, Some(_)) => Err(EngineError::InvariantViolation(
            "point carried into come-out phase",
        )),
        (Phase::Point, None) => Err(EngineError::InvariantViolation(
            "point phase without a point",
        )),
        (Phase::Idle, _) => Err(EngineError::InvariantViolation("roll without active series")),
    }
}
