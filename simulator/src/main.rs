use anyhow::Result;
use boxcars_simulator::{Simulation, SimulationConfig};
use boxcars_types::craps::TableConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Run the house bot roster against the boxcars table and report PnL.
#[derive(Parser, Debug)]
#[command(name = "boxcars-simulator", version, about)]
struct Args {
    /// Number of shooter series to run.
    #[arg(long, default_value_t = 100)]
    series: u32,

    /// Seed for dice and bot decisions; identical seeds reproduce runs.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Capital seeded into the shared players vault.
    #[arg(long, default_value_t = 5_000_000)]
    house_liquidity: u64,

    /// Capital seeded into each bot sub-vault.
    #[arg(long, default_value_t = 50_000)]
    bot_bankroll: u64,

    /// Chips credited to the reference player.
    #[arg(long, default_value_t = 100_000)]
    player_chips: u64,

    /// Table minimum bet.
    #[arg(long, default_value_t = 10)]
    min_bet: u64,

    /// Table maximum bet.
    #[arg(long, default_value_t = 100_000)]
    max_bet: u64,

    /// Treasury skim on net house winnings, in basis points.
    #[arg(long, default_value_t = 250)]
    fee_bps: u16,

    /// Keep place and hard-way bets working on come-out rolls.
    #[arg(long, default_value_t = false)]
    working_on_come_out: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = SimulationConfig {
        series: args.series,
        seed: args.seed,
        house_liquidity: args.house_liquidity,
        bot_bankroll: args.bot_bankroll,
        player_chips: args.player_chips,
        table: TableConfig {
            min_bet: args.min_bet,
            max_bet: args.max_bet,
            fee_bps: args.fee_bps,
            working_on_come_out: args.working_on_come_out,
        },
    };

    let report = Simulation::new(config)?.run()?;

    println!(
        "ran {} series / {} rolls, handle {}",
        report.series_run, report.rolls, report.total_wagered
    );
    println!(
        "house: {} -> {} (treasury {}), realized edge {:.3}%",
        report.house_assets_start,
        report.house_assets_final,
        report.treasury_fees,
        report.realized_house_edge() * 100.0
    );
    println!("player chips: {}", report.player_chips_final);
    println!("bots:");
    for bot in &report.bots {
        println!(
            "  {:<16} {:>8} -> {:>8} ({:+})",
            bot.name,
            bot.starting_bankroll,
            bot.final_bankroll,
            bot.pnl()
        );
    }
    Ok(())
}
