use super::*;
use crate::events::Event;
use crate::state::{Key, Value};
use commonware_codec::{Encode, FixedSize, Read, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, Signer};
use commonware_math::algebra::Random;
use rand::{rngs::StdRng, SeedableRng};

fn test_key(id: u64) -> commonware_cryptography::ed25519::PublicKey {
    let mut rng = StdRng::seed_from_u64(id);
    PrivateKey::random(&mut rng).public_key()
}

#[test]
fn phase_rejects_unknown_tag() {
    let encoded = vec![9u8];
    assert!(Phase::read(&mut &encoded[..]).is_err());
}

#[test]
fn roll_binary_format() {
    let roll = Roll {
        die1: 3,
        die2: 4,
        series_id: 7,
        sequence: 2,
    };
    let encoded = roll.encode();
    assert_eq!(encoded[0], 3);
    assert_eq!(encoded[1], 4);
    assert_eq!(&encoded[2..10], &[0, 0, 0, 0, 0, 0, 0, 7]); // series as u64 BE
    assert_eq!(&encoded[10..14], &[0, 0, 0, 2]); // sequence as u32 BE

    let decoded = Roll::read(&mut &encoded[..]).unwrap();
    assert_eq!(roll, decoded);
    assert_eq!(decoded.total(), 7);
    assert!(!decoded.is_hard());
}

#[test]
fn roll_rejects_bad_faces() {
    let bad = vec![0u8, 4, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1];
    assert!(Roll::read(&mut &bad[..]).is_err());
    let bad = vec![3u8, 7, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1];
    assert!(Roll::read(&mut &bad[..]).is_err());
}

#[test]
fn series_rejects_invalid_point() {
    let mut series = Series::new(1, test_key(1));
    series.phase = Phase::Point;
    series.point = Some(5);
    let mut encoded = series.encode().to_vec();
    let decoded = Series::read(&mut &encoded[..]).unwrap();
    assert_eq!(series, decoded);

    // A 7 can never be the point.
    let point_offset = 8 + commonware_cryptography::ed25519::PublicKey::SIZE + 1 + 1;
    encoded[point_offset] = 7;
    assert!(Series::read(&mut &encoded[..]).is_err());
}

#[test]
fn bet_type_targets() {
    assert!(BetType::Place.valid_target(Some(6)));
    assert!(!BetType::Place.valid_target(Some(7)));
    assert!(!BetType::Place.valid_target(None));
    assert!(BetType::HardWay.valid_target(Some(8)));
    assert!(!BetType::HardWay.valid_target(Some(5)));
    assert!(BetType::PassLine.valid_target(None));
    assert!(!BetType::PassLine.valid_target(Some(4)));
    assert!(BetType::Come.valid_target(None));
}

#[test]
fn bet_type_classification() {
    for one_roll in [
        BetType::Field,
        BetType::AnySeven,
        BetType::AnyCraps,
        BetType::YoEleven,
        BetType::Aces,
        BetType::Twelve,
    ] {
        assert!(one_roll.is_one_roll());
    }
    assert!(!BetType::PassLine.is_one_roll());
    assert!(BetType::Place.is_number_bet());
    assert!(BetType::PassOdds.is_odds());
}

#[test]
fn max_win_ratio_matches_paytable() {
    assert_eq!(BetType::PassLine.max_win_ratio(None), Some((1, 1)));
    assert_eq!(BetType::Field.max_win_ratio(None), Some((2, 1)));
    assert_eq!(BetType::Place.max_win_ratio(Some(4)), Some((9, 5)));
    assert_eq!(BetType::Place.max_win_ratio(Some(6)), Some((7, 6)));
    assert_eq!(BetType::HardWay.max_win_ratio(Some(10)), Some((7, 1)));
    assert_eq!(BetType::HardWay.max_win_ratio(Some(6)), Some((9, 1)));
    assert_eq!(BetType::PassOdds.max_win_ratio(Some(4)), Some((2, 1)));
    assert_eq!(BetType::DontPassOdds.max_win_ratio(Some(4)), Some((1, 2)));
    assert_eq!(BetType::Aces.max_win_ratio(None), Some((30, 1)));
    assert_eq!(BetType::Place.max_win_ratio(Some(7)), None);
}

#[test]
fn bet_roundtrip() {
    let bet = Bet {
        id: 42,
        player: test_key(2),
        funding: Funding::BotVault(3),
        series_id: 1,
        bet_type: BetType::Place,
        target: Some(6),
        amount: 120,
        status: BetStatus::Open,
        created_at_roll: 4,
        resolved_at_roll: None,
    };
    let encoded = bet.encode();
    let decoded = Bet::read(&mut &encoded[..]).unwrap();
    assert_eq!(bet, decoded);
}

#[test]
fn funding_rejects_out_of_range_bot() {
    let encoded = vec![1u8, NUM_BOTS];
    assert!(Funding::read(&mut &encoded[..]).is_err());
}

#[test]
fn vault_account_rejects_escrow_above_assets() {
    let vault = VaultAccount {
        total_shares: 10,
        total_assets: 100,
        escrowed: 40,
        reserved: 5,
        fee_bps: 250,
    };
    let encoded = vault.encode();
    let decoded = VaultAccount::read(&mut &encoded[..]).unwrap();
    assert_eq!(vault, decoded);
    assert_eq!(decoded.liquid(), 60);
    assert_eq!(decoded.free(), 55);

    let broken = VaultAccount {
        escrowed: 200,
        ..vault
    };
    let encoded = broken.encode();
    assert!(VaultAccount::read(&mut &encoded[..]).is_err());
}

#[test]
fn table_config_validation() {
    assert!(TableConfig::default().validate().is_ok());
    let zero_min = TableConfig {
        min_bet: 0,
        ..TableConfig::default()
    };
    assert!(zero_min.validate().is_err());
    let inverted = TableConfig {
        min_bet: 100,
        max_bet: 10,
        ..TableConfig::default()
    };
    assert!(inverted.validate().is_err());
    let confiscatory = TableConfig {
        fee_bps: 10_000,
        ..TableConfig::default()
    };
    assert!(confiscatory.validate().is_err());
}

#[test]
fn table_state_roundtrip() {
    let mut table = TableState::default();
    table.series = Some(Series::new(3, test_key(5)));
    table.next_series = 4;
    table.next_bet = 17;
    table.next_token = 9;
    table.last_roll = Some(Roll {
        die1: 6,
        die2: 6,
        series_id: 3,
        sequence: 11,
    });
    table.pending = vec![RequestToken(7), RequestToken(8)];

    let encoded = table.encode();
    let decoded = TableState::read(&mut &encoded[..]).unwrap();
    assert_eq!(table, decoded);
    assert_eq!(decoded.phase(), Phase::ComeOut);
}

#[test]
fn event_settled_roundtrip() {
    let event = Event::BetSettled {
        bet_id: 9,
        series_id: 2,
        status: BetStatus::Won,
        funding: Funding::Chips,
        amount: 50,
        payout: 90,
        fee: 0,
        resolved_at_roll: 3,
    };
    let encoded = event.encode();
    assert_eq!(encoded[0], 6); // tag
    let decoded = Event::read(&mut &encoded[..]).unwrap();
    assert_eq!(event, decoded);
}

#[test]
fn key_value_roundtrip() {
    let entries = vec![
        (Key::Table, Value::Table(TableState::default())),
        (
            Key::Vault(VaultId::Bot(2)),
            Value::Vault(VaultAccount::new(250)),
        ),
        (
            Key::Shares(VaultId::Players, test_key(8)),
            Value::Shares(1_000),
        ),
        (Key::Treasury, Value::Treasury(TreasuryState::default())),
        (Key::BetBook, Value::BetBook(BetBook::default())),
    ];
    for (key, value) in entries {
        let encoded = key.encode();
        assert_eq!(Key::read(&mut &encoded[..]).unwrap(), key);
        let encoded = value.encode();
        assert_eq!(Value::read(&mut &encoded[..]).unwrap(), value);
    }
}

#[test]
fn vault_id_rejects_out_of_range_bot() {
    let encoded = vec![1u8, NUM_BOTS];
    assert!(VaultId::read(&mut &encoded[..]).is_err());
}
