use std::collections::BTreeMap;

use boxcars_types::caller::Capability;
use boxcars_types::craps::{
    BetStatus, BetType, Funding, Phase, Roll, SeriesEndReason, TableConfig, VaultId,
};
use boxcars_types::{Event, Key, Value};
use commonware_cryptography::ed25519::PublicKey;

use crate::bots;
use crate::engine::{BetPlacement, Engine};
use crate::error::EngineError;
use crate::mocks::{create_account_keypair, funded_engine, reveal_for_dice, reveal_for_total};
use crate::replay::replay;
use crate::rng::compute_commit;
use crate::state::Memory;

fn chips_bet(player: &PublicKey, bet_type: BetType, amount: u64, target: Option<u8>) -> BetPlacement {
    BetPlacement {
        player: player.clone(),
        funding: Funding::Chips,
        bet_type,
        amount,
        target,
    }
}

/// Request a roll and deliver randomness that lands on `total`.
fn roll_total(engine: &mut Engine<Memory>, operator: &Capability, total: u8) -> Roll {
    let token = engine.request_dice_roll(operator, None).expect("request");
    engine
        .submit_roll(token, reveal_for_total(token, total))
        .expect("submit")
}

/// Request a roll and deliver randomness that lands on exact faces.
fn roll_dice(engine: &mut Engine<Memory>, operator: &Capability, die1: u8, die2: u8) -> Roll {
    let token = engine.request_dice_roll(operator, None).expect("request");
    engine
        .submit_roll(token, reveal_for_dice(token, die1, die2))
        .expect("submit")
}

/// Sum live escrow entries by banking vault and cross-check the vault
/// accounts: `escrowed == sum(open stakes)` must hold everywhere.
fn assert_escrow_conservation(engine: &Engine<Memory>) {
    let mut sums: BTreeMap<VaultId, u64> = BTreeMap::new();
    for (key, value) in engine.state().entries() {
        if let (Key::Escrow(_), Value::Escrow(entry)) = (key, value) {
            *sums.entry(entry.vault_id).or_default() += entry.amount;
        }
    }
    for vault_id in Engine::<Memory>::vault_ids() {
        let stats = engine.vault_stats(vault_id).expect("stats");
        assert_eq!(
            stats.escrowed,
            sums.get(&vault_id).copied().unwrap_or(0),
            "escrow conservation broken for {vault_id:?}"
        );
        assert!(stats.escrowed <= stats.total_assets, "vault insolvent");
    }
}

#[test]
fn natural_pays_pass_even_money() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();
    assert_eq!(engine.current_phase().unwrap(), Phase::ComeOut);

    let bet_id = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 10, None))
        .unwrap();
    let roll = roll_dice(&mut engine, &operator, 4, 3);
    assert_eq!(roll.total(), 7);

    assert_eq!(engine.bet_status(bet_id).unwrap(), Some(BetStatus::Won));
    assert_eq!(engine.current_phase().unwrap(), Phase::ComeOut);
    // Even money: stake back plus 10.
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_010);
    assert_escrow_conservation(&engine);
}

#[test]
fn place_bet_stays_working_through_point_establishment() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    let bet_id = engine
        .place_bet(&player, chips_bet(&player_key, BetType::Place, 12, Some(6)))
        .unwrap();
    // Held during the come-out by default house policy.
    assert_eq!(engine.bet_status(bet_id).unwrap(), Some(BetStatus::Working));

    roll_total(&mut engine, &operator, 5);
    assert_eq!(engine.current_phase().unwrap(), Phase::Point);
    assert_eq!(engine.current_point().unwrap(), Some(5));
    // 6 is neither 5 nor 7: no decision, but the bet goes live now.
    assert_eq!(engine.bet_status(bet_id).unwrap(), Some(BetStatus::Working));

    roll_total(&mut engine, &operator, 9);
    assert_eq!(engine.bet_status(bet_id).unwrap(), Some(BetStatus::Open));
    assert_escrow_conservation(&engine);
}

#[test]
fn point_made_decides_both_lines() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    let pass = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 20, None))
        .unwrap();
    let dont = engine
        .place_bet(&player, chips_bet(&player_key, BetType::DontPass, 20, None))
        .unwrap();

    roll_total(&mut engine, &operator, 5);
    assert_eq!(engine.current_point().unwrap(), Some(5));
    roll_total(&mut engine, &operator, 5);

    assert_eq!(engine.bet_status(pass).unwrap(), Some(BetStatus::Won));
    assert_eq!(engine.bet_status(dont).unwrap(), Some(BetStatus::Lost));
    // Shooter keeps the dice.
    assert_eq!(engine.current_phase().unwrap(), Phase::ComeOut);
    assert_eq!(engine.current_point().unwrap(), None);
    // Net: -40 staked, pass returns 40.
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_000);
    assert_escrow_conservation(&engine);
}

#[test]
fn seven_out_ends_the_series() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    let pass = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 20, None))
        .unwrap();
    let dont = engine
        .place_bet(&player, chips_bet(&player_key, BetType::DontPass, 20, None))
        .unwrap();

    roll_total(&mut engine, &operator, 6);
    roll_total(&mut engine, &operator, 7);

    assert_eq!(engine.bet_status(pass).unwrap(), Some(BetStatus::Lost));
    assert_eq!(engine.bet_status(dont).unwrap(), Some(BetStatus::Won));
    assert_eq!(engine.current_phase().unwrap(), Phase::Idle);
    assert!(engine.open_bets().unwrap().is_empty());
    assert!(engine.events().iter().any(|event| matches!(
        event,
        Event::SeriesEnded {
            reason: SeriesEndReason::SevenOut,
            ..
        }
    )));
    assert_escrow_conservation(&engine);
}

#[test]
fn underfunded_house_rejects_bets_untouched() {
    // No liquidity in the players vault at all.
    let (_, operator_key) = create_account_keypair(50);
    let (_, player_key) = create_account_keypair(51);
    let operator = Capability::operator(operator_key);
    let player = Capability::bettor(player_key.clone());
    let mut engine = Engine::new(Memory::new(), TableConfig::default()).unwrap();
    engine.credit_player(&operator, &player_key, 1_000).unwrap();
    engine.start_series(&operator, player_key.clone()).unwrap();

    let before = engine.vault_stats(VaultId::Players).unwrap();
    let events_before = engine.events().len();
    let result = engine.place_bet(&player, chips_bet(&player_key, BetType::PassLine, 10, None));
    assert!(matches!(
        result,
        Err(EngineError::InsufficientLiquidity {
            vault: VaultId::Players
        })
    ));
    // Full rollback: nothing moved.
    assert_eq!(engine.vault_stats(VaultId::Players).unwrap(), before);
    assert_eq!(engine.player_chips(&player_key).unwrap(), 1_000);
    assert!(engine.open_bets().unwrap().is_empty());
    assert_eq!(engine.events().len(), events_before);
}

#[test]
fn bootstrap_shares_mint_one_to_one() {
    let (_, provider_key) = create_account_keypair(60);
    let provider = Capability::provider(provider_key.clone());
    let mut engine = Engine::new(Memory::new(), TableConfig::default()).unwrap();

    let shares = engine
        .deposit_liquidity(&provider, VaultId::Players, 1_000)
        .unwrap();
    assert_eq!(shares, 1_000);

    // No settlement activity in between: same deposit, same shares.
    let shares = engine
        .deposit_liquidity(&provider, VaultId::Players, 1_000)
        .unwrap();
    assert_eq!(shares, 1_000);

    let stats = engine.vault_stats(VaultId::Players).unwrap();
    assert_eq!(stats.total_assets, 2_000);
    assert_eq!(stats.total_shares, 2_000);

    let amount = engine
        .withdraw_liquidity(&provider, VaultId::Players, 500)
        .unwrap();
    assert_eq!(amount, 500);
    assert_eq!(
        engine.share_balance(VaultId::Players, &provider_key).unwrap(),
        1_500
    );
}

#[test]
fn stale_randomness_is_rejected_without_state_change() {
    let (mut engine, operator, _, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();
    let token = engine.request_dice_roll(&operator, None).unwrap();

    // The series the token was issued for dies, a new one starts.
    engine.end_series(&operator).unwrap();
    engine.start_series(&operator, player_key.clone()).unwrap();

    let result = engine.submit_roll(token, reveal_for_total(token, 7));
    assert!(matches!(result, Err(EngineError::StaleRequest)));
    assert_eq!(engine.current_phase().unwrap(), Phase::ComeOut);
    assert_eq!(engine.last_roll().unwrap(), None);

    // A token for the live series still works afterwards.
    let token = engine.request_dice_roll(&operator, None).unwrap();
    engine.submit_roll(token, reveal_for_total(token, 4)).unwrap();
    assert_eq!(engine.current_point().unwrap(), Some(4));
}

#[test]
fn unknown_token_is_stale() {
    let (mut engine, operator, _, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key).unwrap();
    let bogus = boxcars_types::craps::RequestToken(999);
    assert!(matches!(
        engine.submit_roll(bogus, [0u8; 32]),
        Err(EngineError::StaleRequest)
    ));
}

#[test]
fn commit_reveal_gates_delivery() {
    let (mut engine, operator, _, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key).unwrap();

    // Pre-compute the reveal the source will disclose for this request.
    let reveal = [7u8; 32];
    let token = engine
        .request_dice_roll(&operator, Some(compute_commit(&reveal)))
        .unwrap();

    let mut wrong = reveal;
    wrong[0] ^= 1;
    assert!(matches!(
        engine.submit_roll(token, wrong),
        Err(EngineError::CommitMismatch)
    ));
    // The honest reveal is accepted afterwards.
    engine.submit_roll(token, reveal).unwrap();
    assert!(engine.last_roll().unwrap().is_some());
}

#[test]
fn line_bets_lock_once_the_point_is_on() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    let pass = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 50, None))
        .unwrap();
    // Free to come down during the come-out.
    let refund = engine.cancel_bet(&player, pass).unwrap();
    assert_eq!(refund, 50);
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_000);

    let pass = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 50, None))
        .unwrap();
    roll_total(&mut engine, &operator, 8);
    assert!(matches!(
        engine.cancel_bet(&player, pass),
        Err(EngineError::BetNotRemovable { .. })
    ));

    // Place bets come down whenever they like.
    let place = engine
        .place_bet(&player, chips_bet(&player_key, BetType::Place, 30, Some(9)))
        .unwrap();
    engine.cancel_bet(&player, place).unwrap();
    assert_escrow_conservation(&engine);
}

#[test]
fn operator_abort_refunds_every_open_bet() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 40, None))
        .unwrap();
    roll_total(&mut engine, &operator, 10);
    engine
        .place_bet(&player, chips_bet(&player_key, BetType::Place, 30, Some(6)))
        .unwrap();
    let odds = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassOdds, 20, None))
        .unwrap();
    // Odds ride the established point.
    assert_eq!(engine.bet_status(odds).unwrap(), Some(BetStatus::Open));

    engine.end_series(&operator).unwrap();
    assert_eq!(engine.current_phase().unwrap(), Phase::Idle);
    assert!(engine.open_bets().unwrap().is_empty());
    // Stakes all came home.
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_000);
    let stats = engine.vault_stats(VaultId::Players).unwrap();
    assert_eq!(stats.escrowed, 0);
    assert_eq!(stats.reserved, 0);
    assert_eq!(stats.total_assets, 1_000_000);
}

#[test]
fn odds_ride_and_pay_true_odds() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    let pass = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 20, None))
        .unwrap();
    roll_total(&mut engine, &operator, 4);
    let odds = engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassOdds, 30, None))
        .unwrap();

    roll_dice(&mut engine, &operator, 2, 2);
    assert_eq!(engine.bet_status(pass).unwrap(), Some(BetStatus::Won));
    assert_eq!(engine.bet_status(odds).unwrap(), Some(BetStatus::Won));
    // Pass pays 20 even; odds pay 60 at 2:1 on the 4.
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_080);
}

#[test]
fn come_bet_travels_and_wins_its_own_number() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    roll_total(&mut engine, &operator, 6);
    let come = engine
        .place_bet(&player, chips_bet(&player_key, BetType::Come, 10, None))
        .unwrap();

    roll_total(&mut engine, &operator, 5);
    assert_eq!(engine.bet_status(come).unwrap(), Some(BetStatus::Open));
    roll_total(&mut engine, &operator, 5);
    assert_eq!(engine.bet_status(come).unwrap(), Some(BetStatus::Won));
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_010);
}

#[test]
fn dont_pass_pushes_on_come_out_twelve() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    let dont = engine
        .place_bet(&player, chips_bet(&player_key, BetType::DontPass, 25, None))
        .unwrap();
    roll_dice(&mut engine, &operator, 6, 6);
    assert_eq!(engine.bet_status(dont).unwrap(), Some(BetStatus::Push));
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_000);
    assert_escrow_conservation(&engine);
}

#[test]
fn house_loss_skims_treasury_fee() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 1_000, None))
        .unwrap();
    roll_dice(&mut engine, &operator, 1, 2);

    // 2.5% of the 1000 the house won.
    assert_eq!(engine.treasury_fees().unwrap(), 25);
    let stats = engine.vault_stats(VaultId::Players).unwrap();
    assert_eq!(stats.total_assets, 1_000_000 + 1_000 - 25);
    assert_eq!(stats.escrowed, 0);
}

#[test]
fn bots_stake_from_their_own_vaults() {
    let (mut engine, operator, _, player_key) = funded_engine(TableConfig::default());
    let bot = bots::roster()[0];
    let bot_cap = bot.capability();
    engine
        .deposit_liquidity(&operator, bot.vault(), 10_000)
        .unwrap();
    engine.start_series(&operator, player_key.clone()).unwrap();

    let bet_id = engine
        .place_bet(
            &bot_cap,
            BetPlacement {
                player: bot.identity(),
                funding: Funding::BotVault(bot.id),
                bet_type: BetType::PassLine,
                amount: 1_000,
                target: None,
            },
        )
        .unwrap();
    let staked = engine.vault_stats(bot.vault()).unwrap();
    assert_eq!(staked.escrowed, 1_000);
    assert_eq!(staked.total_assets, 10_000);
    assert_escrow_conservation(&engine);

    // Natural: the bot's win drains the players vault.
    roll_dice(&mut engine, &operator, 5, 2);
    assert_eq!(engine.bet_status(bet_id).unwrap(), Some(BetStatus::Won));
    let bot_stats = engine.vault_stats(bot.vault()).unwrap();
    assert_eq!(bot_stats.total_assets, 11_000);
    assert_eq!(bot_stats.escrowed, 0);
    assert_eq!(
        engine.vault_stats(VaultId::Players).unwrap().total_assets,
        999_000
    );

    // And a loss flows back to the house, minus the treasury cut.
    let bet_id = engine
        .place_bet(
            &bot_cap,
            BetPlacement {
                player: bot.identity(),
                funding: Funding::BotVault(bot.id),
                bet_type: BetType::PassLine,
                amount: 1_000,
                target: None,
            },
        )
        .unwrap();
    roll_dice(&mut engine, &operator, 1, 1);
    assert_eq!(engine.bet_status(bet_id).unwrap(), Some(BetStatus::Lost));
    assert_eq!(engine.vault_stats(bot.vault()).unwrap().total_assets, 10_000);
    assert_eq!(
        engine.vault_stats(VaultId::Players).unwrap().total_assets,
        999_000 + 1_000 - 25
    );
    assert_eq!(engine.treasury_fees().unwrap(), 25);
    assert_escrow_conservation(&engine);
}

#[test]
fn working_policy_resolves_number_bets_on_come_out() {
    let config = TableConfig {
        working_on_come_out: true,
        ..TableConfig::default()
    };
    let (mut engine, operator, player, player_key) = funded_engine(config);
    engine.start_series(&operator, player_key.clone()).unwrap();

    let place = engine
        .place_bet(&player, chips_bet(&player_key, BetType::Place, 12, Some(6)))
        .unwrap();
    // Live immediately under this policy.
    assert_eq!(engine.bet_status(place).unwrap(), Some(BetStatus::Open));

    roll_dice(&mut engine, &operator, 2, 4);
    assert_eq!(engine.bet_status(place).unwrap(), Some(BetStatus::Won));
    // 7:6 on 12 staked.
    assert_eq!(engine.player_chips(&player_key).unwrap(), 100_014);
}

#[test]
fn capabilities_gate_every_surface() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    let provider = Capability::provider(player_key.clone());

    // A bettor cannot run the table or move liquidity.
    assert!(matches!(
        engine.start_series(&player, player_key.clone()),
        Err(EngineError::Unauthorized)
    ));
    assert!(matches!(
        engine.deposit_liquidity(&player, VaultId::Players, 100),
        Err(EngineError::Unauthorized)
    ));
    // A liquidity provider cannot wager.
    engine.start_series(&operator, player_key.clone()).unwrap();
    assert!(matches!(
        engine.place_bet(&provider, chips_bet(&player_key, BetType::PassLine, 10, None)),
        Err(EngineError::Unauthorized)
    ));
    // A bettor cannot wager on someone else's identity.
    let (_, stranger) = create_account_keypair(77);
    assert!(matches!(
        engine.place_bet(&player, chips_bet(&stranger, BetType::PassLine, 10, None)),
        Err(EngineError::Unauthorized)
    ));
}

#[test]
fn bet_validation_errors() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    engine.start_series(&operator, player_key.clone()).unwrap();

    assert!(matches!(
        engine.place_bet(&player, chips_bet(&player_key, BetType::Come, 10, None)),
        Err(EngineError::InvalidPhase { .. })
    ));
    assert!(matches!(
        engine.place_bet(&player, chips_bet(&player_key, BetType::Place, 10, Some(7))),
        Err(EngineError::InvalidTarget { .. })
    ));
    assert!(matches!(
        engine.place_bet(&player, chips_bet(&player_key, BetType::PassLine, 5, None)),
        Err(EngineError::AmountOutOfRange { .. })
    ));
    assert!(matches!(
        engine.place_bet(
            &player,
            chips_bet(&player_key, BetType::PassLine, 200_000, None)
        ),
        Err(EngineError::AmountOutOfRange { .. })
    ));
}

#[test]
fn replayed_ledger_matches_live_state() {
    let (mut engine, operator, player, player_key) = funded_engine(TableConfig::default());
    let bot = bots::roster()[1];
    let bot_cap = bot.capability();
    engine
        .deposit_liquidity(&operator, bot.vault(), 20_000)
        .unwrap();
    engine.start_series(&operator, player_key.clone()).unwrap();

    engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 500, None))
        .unwrap();
    engine
        .place_bet(
            &bot_cap,
            BetPlacement {
                player: bot.identity(),
                funding: Funding::BotVault(bot.id),
                bet_type: BetType::DontPass,
                amount: 1_000,
                target: None,
            },
        )
        .unwrap();
    roll_total(&mut engine, &operator, 9);
    engine
        .place_bet(&player, chips_bet(&player_key, BetType::Field, 100, None))
        .unwrap();
    roll_total(&mut engine, &operator, 3);
    roll_total(&mut engine, &operator, 7); // seven-out

    let replayed = replay(engine.events()).expect("replay");
    assert_eq!(replayed.phase, engine.current_phase().unwrap());
    assert_eq!(replayed.point, engine.current_point().unwrap());
    assert_eq!(replayed.last_roll, engine.last_roll().unwrap());
    assert_eq!(
        replayed.chips.get(&player_key).copied().unwrap_or(0),
        engine.player_chips(&player_key).unwrap()
    );
    assert_eq!(replayed.treasury_fees, engine.treasury_fees().unwrap());
    for vault_id in [VaultId::Players, bot.vault()] {
        let live = engine.vault_stats(vault_id).unwrap();
        let rebuilt = replayed.vaults.get(&vault_id).copied().unwrap_or_default();
        assert_eq!(rebuilt.total_assets, live.total_assets, "{vault_id:?}");
        assert_eq!(rebuilt.escrowed, live.escrowed, "{vault_id:?}");
        assert_eq!(rebuilt.total_shares, live.total_shares, "{vault_id:?}");
    }
    assert!(replayed.open.is_empty());
}

#[test]
fn withdrawals_never_undercut_open_bets() {
    let (_, provider_key) = create_account_keypair(90);
    let provider = Capability::provider(provider_key.clone());
    let (_, operator_key) = create_account_keypair(91);
    let operator = Capability::operator(operator_key);
    let (_, player_key) = create_account_keypair(92);
    let player = Capability::bettor(player_key.clone());

    let mut engine = Engine::new(Memory::new(), TableConfig::default()).unwrap();
    engine
        .deposit_liquidity(&provider, VaultId::Players, 1_000)
        .unwrap();
    engine.credit_player(&operator, &player_key, 1_000).unwrap();
    engine.start_series(&operator, player_key.clone()).unwrap();
    engine
        .place_bet(&player, chips_bet(&player_key, BetType::PassLine, 900, None))
        .unwrap();

    // 1900 assets, 900 escrowed, 900 reserved: only 100 is free.
    assert!(matches!(
        engine.withdraw_liquidity(&provider, VaultId::Players, 1_000),
        Err(EngineError::InsufficientFreeLiquidity)
    ));
    // A small withdrawal within free liquidity is fine.
    engine.withdraw_liquidity(&provider, VaultId::Players, 50).unwrap();
    assert_escrow_conservation(&engine);
}
