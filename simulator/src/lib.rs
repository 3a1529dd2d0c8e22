//! Bot-roster simulation over the boxcars engine.
//!
//! Seeds the vault arena, runs the ten house bots plus a reference chip
//! player for a configured number of series, and reports per-bot and house
//! PnL. Dice come from an in-process hash chain, so a run is reproducible
//! byte-for-byte from its seed.

use anyhow::{Context, Result};
use boxcars_engine::bots::{roster, BotProfile};
use boxcars_engine::rng::HashChain;
use boxcars_engine::{BetPlacement, Engine, EngineError, Memory};
use boxcars_types::caller::Capability;
use boxcars_types::craps::{BetType, Funding, Phase, TableConfig, VaultId};
use boxcars_types::Event;
use commonware_cryptography::{ed25519::PrivateKey, ed25519::PublicKey, Signer};
use commonware_math::algebra::Random;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

/// Safety valve: no realistic series runs this long.
const MAX_ROLLS_PER_SERIES: u32 = 500;

#[derive(Clone, Copy, Debug)]
pub struct SimulationConfig {
    pub series: u32,
    pub seed: u64,
    /// Capital seeded into the shared players vault.
    pub house_liquidity: u64,
    /// Capital seeded into each bot sub-vault.
    pub bot_bankroll: u64,
    /// Chips credited to the reference player.
    pub player_chips: u64,
    pub table: TableConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            series: 100,
            seed: 7,
            house_liquidity: 5_000_000,
            bot_bankroll: 50_000,
            player_chips: 100_000,
            table: TableConfig::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BotSummary {
    pub name: &'static str,
    pub starting_bankroll: u64,
    pub final_bankroll: u64,
}

impl BotSummary {
    pub fn pnl(&self) -> i64 {
        self.final_bankroll as i64 - self.starting_bankroll as i64
    }
}

#[derive(Clone, Debug)]
pub struct SimulationReport {
    pub series_run: u32,
    pub rolls: u64,
    pub total_wagered: u64,
    pub house_assets_start: u64,
    pub house_assets_final: u64,
    pub treasury_fees: u64,
    pub player_chips_final: u64,
    pub bots: Vec<BotSummary>,
}

impl SimulationReport {
    /// House profit (including the treasury skim) over total handle.
    pub fn realized_house_edge(&self) -> f64 {
        if self.total_wagered == 0 {
            return 0.0;
        }
        let profit = self.house_assets_final as i128 + self.treasury_fees as i128
            - self.house_assets_start as i128;
        profit as f64 / self.total_wagered as f64
    }
}

pub struct Simulation {
    engine: Engine<Memory>,
    operator: Capability,
    player: Capability,
    player_key: PublicKey,
    bots: Vec<BotProfile>,
    chain: HashChain,
    rng: StdRng,
    reveal_index: u64,
    config: SimulationConfig,
}

fn derive_key(seed: u64) -> PublicKey {
    let mut rng = StdRng::seed_from_u64(seed);
    PrivateKey::random(&mut rng).public_key()
}

/// Errors a bettor may legitimately hit mid-run (an empty pocket or a table
/// that cannot cover the action). Anything else aborts the simulation.
fn recoverable(err: &EngineError) -> bool {
    matches!(
        err,
        EngineError::InsufficientFunds { .. }
            | EngineError::InsufficientLiquidity { .. }
            | EngineError::AmountOutOfRange { .. }
    )
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let operator = Capability::operator(derive_key(config.seed.wrapping_add(1)));
        let player_key = derive_key(config.seed.wrapping_add(2));
        let player = Capability::bettor(player_key.clone());

        let mut engine = Engine::new(Memory::new(), config.table).context("construct engine")?;
        engine
            .deposit_liquidity(&operator, VaultId::Players, config.house_liquidity)
            .context("seed players vault")?;
        let bots = roster();
        for bot in &bots {
            engine
                .deposit_liquidity(&operator, bot.vault(), config.bot_bankroll)
                .with_context(|| format!("seed vault for {}", bot.name))?;
        }
        engine
            .credit_player(&operator, &player_key, config.player_chips)
            .context("fund player")?;

        let mut label = b"boxcars-simulator".to_vec();
        label.extend_from_slice(&config.seed.to_be_bytes());
        Ok(Self {
            engine,
            operator,
            player,
            player_key,
            bots,
            chain: HashChain::from_label(&label),
            rng: StdRng::seed_from_u64(config.seed),
            reveal_index: 0,
            config,
        })
    }

    pub fn run(mut self) -> Result<SimulationReport> {
        let house_assets_start = self
            .engine
            .vault_stats(VaultId::Players)
            .context("stats")?
            .total_assets;
        let mut rolls: u64 = 0;

        for series in 0..self.config.series {
            self.engine
                .start_series(&self.operator, self.player_key.clone())
                .context("start series")?;
            debug!(series, "series started");

            let mut series_rolls = 0u32;
            while self.engine.current_phase().context("phase")? != Phase::Idle {
                self.place_bot_bets()?;
                self.place_player_bet()?;

                let token = self
                    .engine
                    .request_dice_roll(&self.operator, Some(self.chain.commit(self.reveal_index)))
                    .context("request roll")?;
                self.engine
                    .submit_roll(token, self.chain.reveal(self.reveal_index))
                    .context("submit roll")?;
                self.reveal_index += 1;
                rolls += 1;
                series_rolls += 1;

                if series_rolls > MAX_ROLLS_PER_SERIES {
                    self.engine
                        .end_series(&self.operator)
                        .context("end stuck series")?;
                }
            }
        }

        let total_wagered = self
            .engine
            .events()
            .iter()
            .filter_map(|event| match event {
                Event::BetPlaced { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum();

        let mut bots = Vec::new();
        for bot in &self.bots {
            let stats = self.engine.vault_stats(bot.vault()).context("bot stats")?;
            bots.push(BotSummary {
                name: bot.name,
                starting_bankroll: self.config.bot_bankroll,
                final_bankroll: stats.total_assets,
            });
        }

        let report = SimulationReport {
            series_run: self.config.series,
            rolls,
            total_wagered,
            house_assets_start,
            house_assets_final: self
                .engine
                .vault_stats(VaultId::Players)
                .context("stats")?
                .total_assets,
            treasury_fees: self.engine.treasury_fees().context("treasury")?,
            player_chips_final: self.engine.player_chips(&self.player_key).context("chips")?,
            bots,
        };
        info!(
            series = report.series_run,
            rolls = report.rolls,
            handle = report.total_wagered,
            edge = report.realized_house_edge(),
            "simulation complete"
        );
        Ok(report)
    }

    fn place_bot_bets(&mut self) -> Result<()> {
        let phase = self.engine.current_phase().context("phase")?;
        let point = self.engine.current_point().context("point")?;
        for bot in &self.bots {
            let stats = self.engine.vault_stats(bot.vault()).context("stats")?;
            let free = stats.total_assets.saturating_sub(stats.escrowed);
            for intent in bot.plan(phase, point, free, &self.config.table, &mut self.rng) {
                let result = self.engine.place_bet(
                    &bot.capability(),
                    BetPlacement {
                        player: bot.identity(),
                        funding: Funding::BotVault(bot.id),
                        bet_type: intent.bet_type,
                        amount: intent.amount,
                        target: intent.target,
                    },
                );
                match result {
                    Ok(_) => {}
                    Err(err) if recoverable(&err) => {
                        debug!(bot = bot.name, %err, "bet skipped")
                    }
                    Err(err) => return Err(err).context("bot bet"),
                }
            }
        }
        Ok(())
    }

    fn place_player_bet(&mut self) -> Result<()> {
        let phase = self.engine.current_phase().context("phase")?;
        let bet_type = match phase {
            Phase::ComeOut => BetType::PassLine,
            Phase::Point if self.rng.gen_bool(0.3) => BetType::Field,
            _ => return Ok(()),
        };
        let amount = self
            .rng
            .gen_range(self.config.table.min_bet..=self.config.table.min_bet * 5);
        let result = self.engine.place_bet(
            &self.player,
            BetPlacement {
                player: self.player_key.clone(),
                funding: Funding::Chips,
                bet_type,
                amount,
                target: None,
            },
        );
        match result {
            Ok(_) => Ok(()),
            Err(err) if recoverable(&err) => Ok(()),
            Err(err) => Err(err).context("player bet"),
        }
    }
}
