//! The house bot roster.
//!
//! Ten autonomous bettors with distinct risk personalities wager against the
//! table, each staking from its own sub-vault. Planning is deterministic:
//! given the same table state and RNG stream, a bot produces the same bets.

use boxcars_types::caller::Capability;
use boxcars_types::craps::{BetType, Phase, TableConfig, VaultId, NUM_BOTS};
use commonware_cryptography::{ed25519::PrivateKey, ed25519::PublicKey, Signer};
use commonware_math::algebra::Random;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Key-derivation namespace for bot identities.
const BOT_SEED_BASE: u64 = 0xB07;

/// One bet a bot wants on the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BetIntent {
    pub bet_type: BetType,
    pub target: Option<u8>,
    pub amount: u64,
}

/// How a bot plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetStyle {
    /// Pass line, flat, every come-out. Nothing else.
    LineGrinder,
    /// Don't pass, flat, every come-out.
    DarkSider,
    /// Pass line plus double odds behind every point.
    OddsMaximalist,
    /// Pass line, then come bets while a point is on.
    ComeStacker,
    /// Don't pass, then lays don't-come behind it.
    DontComeLayer,
    /// The field, every single roll.
    FieldRider,
    /// Place the 6 and 8 whenever a point is on.
    InsideGrinder,
    /// Hard ways, pressed toward the point number.
    HardwayChaser,
    /// A different one-roll proposition every roll.
    PropShotgun,
    /// Big line bets, occasional thirty-to-one shots at the 2 and 12.
    HighRoller,
}

/// A bot identity, its sub-vault, and its playing style.
#[derive(Clone, Copy, Debug)]
pub struct BotProfile {
    pub id: u8,
    pub name: &'static str,
    pub style: BetStyle,
    pub base_bet: u64,
}

/// The ten house bots.
pub fn roster() -> Vec<BotProfile> {
    vec![
        BotProfile { id: 0, name: "flat-frankie", style: BetStyle::LineGrinder, base_bet: 25 },
        BotProfile { id: 1, name: "wrong-way-wanda", style: BetStyle::DarkSider, base_bet: 25 },
        BotProfile { id: 2, name: "odds-otto", style: BetStyle::OddsMaximalist, base_bet: 20 },
        BotProfile { id: 3, name: "comeback-cass", style: BetStyle::ComeStacker, base_bet: 15 },
        BotProfile { id: 4, name: "lay-low-lou", style: BetStyle::DontComeLayer, base_bet: 15 },
        BotProfile { id: 5, name: "meadow-mel", style: BetStyle::FieldRider, base_bet: 10 },
        BotProfile { id: 6, name: "inside-iris", style: BetStyle::InsideGrinder, base_bet: 12 },
        BotProfile { id: 7, name: "hardway-hank", style: BetStyle::HardwayChaser, base_bet: 10 },
        BotProfile { id: 8, name: "prop-pete", style: BetStyle::PropShotgun, base_bet: 10 },
        BotProfile { id: 9, name: "midnight-max", style: BetStyle::HighRoller, base_bet: 200 },
    ]
}

impl BotProfile {
    pub fn vault(&self) -> VaultId {
        VaultId::Bot(self.id)
    }

    /// Deterministic signing identity for this bot.
    pub fn keypair(&self) -> (PrivateKey, PublicKey) {
        let mut rng = StdRng::seed_from_u64(BOT_SEED_BASE.wrapping_add(self.id as u64));
        let private = PrivateKey::random(&mut rng);
        let public = private.public_key();
        (private, public)
    }

    pub fn identity(&self) -> PublicKey {
        self.keypair().1
    }

    pub fn capability(&self) -> Capability {
        Capability::bettor(self.identity())
    }

    /// Plan this roll's bets from the visible table state and the bot's free
    /// bankroll. Deterministic in `rng`.
    pub fn plan(
        &self,
        phase: Phase,
        point: Option<u8>,
        bankroll: u64,
        config: &TableConfig,
        rng: &mut impl Rng,
    ) -> Vec<BetIntent> {
        let mut intents = Vec::new();
        let mut budget = bankroll;
        let mut push = |intents: &mut Vec<BetIntent>, budget: &mut u64, bet_type, target, amount| {
            let amount = clamp_bet(amount, *budget, config);
            if amount > 0 {
                *budget -= amount;
                intents.push(BetIntent {
                    bet_type,
                    target,
                    amount,
                });
            }
        };

        match self.style {
            BetStyle::LineGrinder => {
                if phase == Phase::ComeOut {
                    push(&mut intents, &mut budget, BetType::PassLine, None, self.base_bet);
                }
            }
            BetStyle::DarkSider => {
                if phase == Phase::ComeOut {
                    push(&mut intents, &mut budget, BetType::DontPass, None, self.base_bet);
                }
            }
            BetStyle::OddsMaximalist => match phase {
                Phase::ComeOut => {
                    push(&mut intents, &mut budget, BetType::PassLine, None, self.base_bet)
                }
                Phase::Point => push(
                    &mut intents,
                    &mut budget,
                    BetType::PassOdds,
                    point,
                    self.base_bet * 2,
                ),
                Phase::Idle => {}
            },
            BetStyle::ComeStacker => match phase {
                Phase::ComeOut => {
                    push(&mut intents, &mut budget, BetType::PassLine, None, self.base_bet)
                }
                Phase::Point => {
                    push(&mut intents, &mut budget, BetType::Come, None, self.base_bet)
                }
                Phase::Idle => {}
            },
            BetStyle::DontComeLayer => match phase {
                Phase::ComeOut => {
                    push(&mut intents, &mut budget, BetType::DontPass, None, self.base_bet)
                }
                Phase::Point => {
                    push(&mut intents, &mut budget, BetType::DontCome, None, self.base_bet)
                }
                Phase::Idle => {}
            },
            BetStyle::FieldRider => {
                if phase != Phase::Idle {
                    push(&mut intents, &mut budget, BetType::Field, None, self.base_bet);
                }
            }
            BetStyle::InsideGrinder => {
                if phase == Phase::Point {
                    push(
                        &mut intents,
                        &mut budget,
                        BetType::Place,
                        Some(6),
                        self.base_bet,
                    );
                    push(
                        &mut intents,
                        &mut budget,
                        BetType::Place,
                        Some(8),
                        self.base_bet,
                    );
                }
            }
            BetStyle::HardwayChaser => {
                if phase != Phase::Idle {
                    // Chase the point when it is a hard number, else the 8.
                    let target = match point {
                        Some(p) if p % 2 == 0 => p,
                        _ => 8,
                    };
                    push(
                        &mut intents,
                        &mut budget,
                        BetType::HardWay,
                        Some(target),
                        self.base_bet,
                    );
                }
            }
            BetStyle::PropShotgun => {
                if phase != Phase::Idle {
                    let bet_type = match rng.gen_range(0..5) {
                        0 => BetType::AnySeven,
                        1 => BetType::AnyCraps,
                        2 => BetType::YoEleven,
                        3 => BetType::Aces,
                        _ => BetType::Twelve,
                    };
                    push(&mut intents, &mut budget, bet_type, None, self.base_bet);
                }
            }
            BetStyle::HighRoller => {
                if phase == Phase::ComeOut {
                    push(&mut intents, &mut budget, BetType::PassLine, None, self.base_bet);
                }
                // One shot in eight at the rail numbers.
                if phase != Phase::Idle && rng.gen_range(0..8) == 0 {
                    let bet_type = if rng.gen_bool(0.5) {
                        BetType::Aces
                    } else {
                        BetType::Twelve
                    };
                    push(&mut intents, &mut budget, bet_type, None, self.base_bet / 10);
                }
            }
        }

        intents
    }
}

/// Clamp a desired stake into the table limits and remaining bankroll.
/// Returns zero when the bankroll cannot cover the table minimum.
fn clamp_bet(desired: u64, budget: u64, config: &TableConfig) -> u64 {
    let amount = desired.min(config.max_bet).min(budget);
    if amount < config.min_bet {
        0
    } else {
        amount
    }
}
