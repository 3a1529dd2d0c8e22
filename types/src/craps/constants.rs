/// Number of house bots, each banked by its own sub-vault.
pub const NUM_BOTS: u8 = 10;

/// Default minimum bet accepted by the table.
pub const DEFAULT_MIN_BET: u64 = 10;

/// Default maximum bet accepted by the table.
pub const DEFAULT_MAX_BET: u64 = 100_000;

/// Default treasury skim on net house winnings, in basis points.
pub const DEFAULT_FEE_BPS: u16 = 250; // 2.50%

/// Basis-point denominator for fee math.
pub const BASIS_POINTS_SCALE: u64 = 10_000;

/// Point numbers a come-out roll can establish.
pub const POINT_NUMBERS: [u8; 6] = [4, 5, 6, 8, 9, 10];

/// Numbers a hard-way bet can target (even points rolled as pairs).
pub const HARDWAY_NUMBERS: [u8; 4] = [4, 6, 8, 10];

/// Length of an RNG commitment or reveal value in bytes.
pub const RNG_COMMIT_LEN: usize = 32;

// Line bets pay even money.
pub const LINE_PAYOUT_NUM: u64 = 1;
pub const LINE_PAYOUT_DEN: u64 = 1;

// Field pays even money, double on 2 and 12.
pub const FIELD_PAYOUT_NORMAL_NUM: u64 = 1;
pub const FIELD_PAYOUT_NORMAL_DEN: u64 = 1;
pub const FIELD_PAYOUT_2_12_NUM: u64 = 2;
pub const FIELD_PAYOUT_2_12_DEN: u64 = 1;

// One-roll propositions.
pub const ANY_SEVEN_PAYOUT_NUM: u64 = 4;
pub const ANY_SEVEN_PAYOUT_DEN: u64 = 1;
pub const ANY_CRAPS_PAYOUT_NUM: u64 = 7;
pub const ANY_CRAPS_PAYOUT_DEN: u64 = 1;
pub const YO_ELEVEN_PAYOUT_NUM: u64 = 15;
pub const YO_ELEVEN_PAYOUT_DEN: u64 = 1;
pub const ACES_PAYOUT_NUM: u64 = 30;
pub const ACES_PAYOUT_DEN: u64 = 1;
pub const TWELVE_PAYOUT_NUM: u64 = 30;
pub const TWELVE_PAYOUT_DEN: u64 = 1;

// Place bets.
pub const PLACE_4_10_PAYOUT_NUM: u64 = 9;
pub const PLACE_4_10_PAYOUT_DEN: u64 = 5;
pub const PLACE_5_9_PAYOUT_NUM: u64 = 7;
pub const PLACE_5_9_PAYOUT_DEN: u64 = 5;
pub const PLACE_6_8_PAYOUT_NUM: u64 = 7;
pub const PLACE_6_8_PAYOUT_DEN: u64 = 6;

// True odds behind the line.
pub const TRUE_ODDS_4_10_NUM: u64 = 2;
pub const TRUE_ODDS_4_10_DEN: u64 = 1;
pub const TRUE_ODDS_5_9_NUM: u64 = 3;
pub const TRUE_ODDS_5_9_DEN: u64 = 2;
pub const TRUE_ODDS_6_8_NUM: u64 = 6;
pub const TRUE_ODDS_6_8_DEN: u64 = 5;

// Hard ways.
pub const HARD_4_10_PAYOUT_NUM: u64 = 7;
pub const HARD_4_10_PAYOUT_DEN: u64 = 1;
pub const HARD_6_8_PAYOUT_NUM: u64 = 9;
pub const HARD_6_8_PAYOUT_DEN: u64 = 1;

/// True if the total is a come-out natural.
pub fn is_natural(total: u8) -> bool {
    total == 7 || total == 11
}

/// True if the total is craps.
pub fn is_craps(total: u8) -> bool {
    total == 2 || total == 3 || total == 12
}

/// True if the total can be established as a point.
pub fn is_point_number(total: u8) -> bool {
    POINT_NUMBERS.contains(&total)
}

/// True if the total wins a field bet.
pub fn is_field_winner(total: u8) -> bool {
    matches!(total, 2 | 3 | 4 | 9 | 10 | 11 | 12)
}

/// Place-bet payout ratio for a point number.
pub fn place_payout(target: u8) -> Option<(u64, u64)> {
    match target {
        4 | 10 => Some((PLACE_4_10_PAYOUT_NUM, PLACE_4_10_PAYOUT_DEN)),
        5 | 9 => Some((PLACE_5_9_PAYOUT_NUM, PLACE_5_9_PAYOUT_DEN)),
        6 | 8 => Some((PLACE_6_8_PAYOUT_NUM, PLACE_6_8_PAYOUT_DEN)),
        _ => None,
    }
}

/// True-odds payout ratio for pass-side odds on a point number.
pub fn true_odds_payout(target: u8) -> Option<(u64, u64)> {
    match target {
        4 | 10 => Some((TRUE_ODDS_4_10_NUM, TRUE_ODDS_4_10_DEN)),
        5 | 9 => Some((TRUE_ODDS_5_9_NUM, TRUE_ODDS_5_9_DEN)),
        6 | 8 => Some((TRUE_ODDS_6_8_NUM, TRUE_ODDS_6_8_DEN)),
        _ => None,
    }
}

/// Lay-odds payout ratio for don't-side odds (the inverse of true odds).
pub fn lay_odds_payout(target: u8) -> Option<(u64, u64)> {
    true_odds_payout(target).map(|(num, den)| (den, num))
}

/// Hard-way payout ratio for a hard number.
pub fn hardway_payout(target: u8) -> Option<(u64, u64)> {
    match target {
        4 | 10 => Some((HARD_4_10_PAYOUT_NUM, HARD_4_10_PAYOUT_DEN)),
        6 | 8 => Some((HARD_6_8_PAYOUT_NUM, HARD_6_8_PAYOUT_DEN)),
        _ => None,
    }
}
