//! Bet placement legality.
//!
//! Pure validation: phase legality per bet type, target requirements, and
//! table limits. Escrow and stake movement happen in the engine so the whole
//! placement is one atomic frame.

use boxcars_types::craps::{Bet, BetType, Phase, TableConfig};

use crate::error::EngineError;

/// Phase legality matrix.
///
/// Line bets are a come-out proposition; odds and come bets require an
/// established point; everything else plays during any active phase.
pub fn check_phase(bet_type: BetType, phase: Phase) -> Result<(), EngineError> {
    let legal = match bet_type {
        BetType::PassLine | BetType::DontPass => phase == Phase::ComeOut,
        BetType::PassOdds | BetType::DontPassOdds | BetType::Come | BetType::DontCome => {
            phase == Phase::Point
        }
        BetType::Field
        | BetType::Place
        | BetType::HardWay
        | BetType::AnySeven
        | BetType::AnyCraps
        | BetType::YoEleven
        | BetType::Aces
        | BetType::Twelve => phase != Phase::Idle,
    };
    if legal {
        Ok(())
    } else {
        Err(EngineError::InvalidPhase { bet_type, phase })
    }
}

pub fn check_target(bet_type: BetType, target: Option<u8>) -> Result<(), EngineError> {
    if bet_type.valid_target(target) {
        Ok(())
    } else {
        Err(EngineError::InvalidTarget { bet_type })
    }
}

pub fn check_amount(amount: u64, config: &TableConfig) -> Result<(), EngineError> {
    if amount < config.min_bet || amount > config.max_bet {
        return Err(EngineError::AmountOutOfRange {
            amount,
            min: config.min_bet,
            max: config.max_bet,
        });
    }
    Ok(())
}

/// Whether an open bet may be taken down right now.
///
/// Line bets are locked once a point is on; come bets are locked once they
/// travel. Everything else comes down freely while unresolved.
pub fn removable(bet: &Bet, phase: Phase) -> bool {
    match bet.bet_type {
        BetType::PassLine | BetType::DontPass => phase == Phase::ComeOut,
        BetType::Come | BetType::DontCome => !bet.traveled(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxcars_types::craps::{BetStatus, Funding};
    use commonware_cryptography::{ed25519::PrivateKey, Signer};
    use commonware_math::algebra::Random;
    use rand::{rngs::StdRng, SeedableRng};

    fn bet(bet_type: BetType, target: Option<u8>) -> Bet {
        let mut rng = StdRng::seed_from_u64(3);
        Bet {
            id: 1,
            player: PrivateKey::random(&mut rng).public_key(),
            funding: Funding::Chips,
            series_id: 1,
            bet_type,
            target,
            amount: 10,
            status: BetStatus::Open,
            created_at_roll: 0,
            resolved_at_roll: None,
        }
    }

    #[test]
    fn line_bets_are_come_out_only() {
        assert!(check_phase(BetType::PassLine, Phase::ComeOut).is_ok());
        assert!(matches!(
            check_phase(BetType::PassLine, Phase::Point),
            Err(EngineError::InvalidPhase { .. })
        ));
        assert!(check_phase(BetType::DontPass, Phase::ComeOut).is_ok());
    }

    #[test]
    fn odds_and_come_require_a_point() {
        for bet_type in [
            BetType::PassOdds,
            BetType::DontPassOdds,
            BetType::Come,
            BetType::DontCome,
        ] {
            assert!(check_phase(bet_type, Phase::Point).is_ok());
            assert!(check_phase(bet_type, Phase::ComeOut).is_err());
        }
    }

    #[test]
    fn nothing_plays_while_idle() {
        for bet_type in [BetType::Field, BetType::Place, BetType::AnySeven] {
            assert!(check_phase(bet_type, Phase::Idle).is_err());
        }
    }

    #[test]
    fn amount_limits() {
        let config = TableConfig {
            min_bet: 10,
            max_bet: 100,
            ..TableConfig::default()
        };
        assert!(check_amount(10, &config).is_ok());
        assert!(check_amount(100, &config).is_ok());
        assert!(matches!(
            check_amount(9, &config),
            Err(EngineError::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            check_amount(101, &config),
            Err(EngineError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn removal_rules() {
        assert!(removable(&bet(BetType::PassLine, None), Phase::ComeOut));
        assert!(!removable(&bet(BetType::PassLine, None), Phase::Point));
        assert!(removable(&bet(BetType::Come, None), Phase::Point));
        assert!(!removable(&bet(BetType::Come, Some(6)), Phase::Point));
        assert!(removable(&bet(BetType::Place, Some(6)), Phase::Point));
        assert!(removable(&bet(BetType::HardWay, Some(8)), Phase::ComeOut));
    }
}
