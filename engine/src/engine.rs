use boxcars_types::caller::{Capability, GRANT_LIQUIDITY, GRANT_TABLE, GRANT_WAGER};
use boxcars_types::craps::{
    Bet, BetId, BetStatus, BetType, EscrowEntry, Funding, PendingRoll, Phase, RequestToken, Roll,
    Series, SeriesEndReason, TableConfig, VaultAccount, VaultId, RNG_COMMIT_LEN,
};
use boxcars_types::{Event, Key, Value};
use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::hex;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::frame::Frame;
use crate::ledger;
use crate::rng::{verify_commit_reveal, DiceRng};
use crate::settlement::{self, Disposition, RollContext};
use crate::state::State;
use crate::table::decide_roll;
use crate::vault;

/// A wager request.
#[derive(Clone, Debug)]
pub struct BetPlacement {
    pub player: PublicKey,
    pub funding: Funding,
    pub bet_type: BetType,
    pub amount: u64,
    pub target: Option<u8>,
}

/// Read-only vault snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultStats {
    pub total_assets: u64,
    pub total_shares: u64,
    pub escrowed: u64,
    pub reserved: u64,
    pub fee_bps: u16,
}

/// The deterministic table engine.
///
/// Owns the state backend and an append-only event log. Every externally
/// triggered operation runs to completion on a pending frame and commits as
/// one atomic unit; a failed operation leaves no trace. There is no
/// interleaving of partial state: callers drive the engine strictly
/// sequentially, and the only asynchronous boundary is randomness delivery,
/// correlated by request token.
pub struct Engine<S: State> {
    state: S,
    config: TableConfig,
    events: Vec<Event>,
}

impl<S: State> Engine<S> {
    /// Build an engine over a backend, seeding the vault arena (the shared
    /// players vault plus one sub-vault per bot) if absent.
    pub fn new(mut state: S, config: TableConfig) -> Result<Self, EngineError> {
        config.validate()?;
        for id in Self::vault_ids() {
            if state.get(&Key::Vault(id))?.is_none() {
                state.insert(Key::Vault(id), Value::Vault(VaultAccount::new(config.fee_bps)))?;
            }
        }
        Ok(Self {
            state,
            config,
            events: Vec::new(),
        })
    }

    /// Every vault in the arena.
    pub fn vault_ids() -> impl Iterator<Item = VaultId> {
        std::iter::once(VaultId::Players)
            .chain((0..boxcars_types::craps::NUM_BOTS).map(VaultId::Bot))
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The audit trail so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drain the audit trail (consumers persist it elsewhere).
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Apply a committed frame's changes and publish its events. Callers
    /// consume the frame first (ending its borrow of the backend) and hand
    /// over the owned change set.
    fn apply_committed(
        &mut self,
        changes: Vec<(Key, crate::state::Status)>,
        events: Vec<Event>,
    ) -> Result<(), EngineError> {
        self.state.apply(changes)?;
        self.events.extend(events);
        Ok(())
    }

    // === Series lifecycle ===

    pub fn start_series(
        &mut self,
        cap: &Capability,
        shooter: PublicKey,
    ) -> Result<u64, EngineError> {
        require(cap, GRANT_TABLE)?;
        let mut frame = Frame::new(&self.state);
        let mut table = frame.table()?;
        if let Some(series) = &table.series {
            return Err(EngineError::InvalidState {
                phase: series.phase,
            });
        }

        // Randomness requested for a previous series can never apply again.
        for token in table.pending.drain(..) {
            frame.delete(Key::PendingRoll(token));
        }

        let series_id = table.next_series;
        table.next_series += 1;
        table.series = Some(Series::new(series_id, shooter.clone()));
        frame.insert(Key::Table, Value::Table(table));
        frame.emit(Event::SeriesStarted {
            series_id,
            shooter: shooter.clone(),
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        info!(series_id, shooter = ?shooter, "series started");
        Ok(series_id)
    }

    /// Operator-forced termination. Open bets are refunded as pushes so no
    /// funds can be stranded.
    pub fn end_series(&mut self, cap: &Capability) -> Result<(), EngineError> {
        require(cap, GRANT_TABLE)?;
        let mut frame = Frame::new(&self.state);
        let mut table = frame.table()?;
        let series = table.series.take().ok_or(EngineError::NoActiveSeries)?;

        let mut book = frame.book()?;
        for bet_id in std::mem::take(&mut book.open) {
            let bet = frame
                .bet(bet_id)?
                .ok_or(EngineError::InvariantViolation("book references unknown bet"))?;
            self.settle_terminal(&mut frame, bet, BetStatus::Push, 0, series.rolls)?;
        }
        frame.insert(Key::BetBook, Value::BetBook(book));

        for token in table.pending.drain(..) {
            frame.delete(Key::PendingRoll(token));
        }
        frame.insert(Key::Table, Value::Table(table));
        frame.emit(Event::SeriesEnded {
            series_id: series.id,
            reason: SeriesEndReason::Operator,
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        info!(series_id = series.id, "series ended by operator");
        Ok(())
    }

    // === Randomness ===

    /// Register a randomness request for the active series. Returns
    /// immediately with a correlation token; the raw value arrives later via
    /// [`Engine::submit_roll`]. A request cannot be canceled.
    pub fn request_dice_roll(
        &mut self,
        cap: &Capability,
        commit: Option<[u8; RNG_COMMIT_LEN]>,
    ) -> Result<RequestToken, EngineError> {
        require(cap, GRANT_TABLE)?;
        let mut frame = Frame::new(&self.state);
        let mut table = frame.table()?;
        let series = table.series.as_ref().ok_or(EngineError::NoActiveSeries)?;
        let series_id = series.id;

        let token = RequestToken(table.next_token);
        table.next_token += 1;
        table.pending.push(token);

        let commit_bytes = commit.map(|c| c.to_vec()).unwrap_or_default();
        frame.insert(
            Key::PendingRoll(token),
            Value::PendingRoll(PendingRoll {
                token,
                series_id,
                commit: commit_bytes.clone(),
            }),
        );
        frame.insert(Key::Table, Value::Table(table));
        frame.emit(Event::RollRequested {
            token,
            series_id,
            commit: commit_bytes.clone(),
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        debug!(
            token = token.0,
            series_id,
            commit = %hex(&commit_bytes),
            "dice roll requested"
        );
        Ok(token)
    }

    /// Randomness callback: map the delivered value onto two dice, settle
    /// every open bet against the pre-roll phase, then advance the table.
    ///
    /// Deliveries for unknown tokens or superseded series fail with
    /// [`EngineError::StaleRequest`] and change nothing.
    pub fn submit_roll(
        &mut self,
        token: RequestToken,
        reveal: [u8; RNG_COMMIT_LEN],
    ) -> Result<Roll, EngineError> {
        let mut frame = Frame::new(&self.state);
        let mut table = frame.table()?;
        let pending = frame.pending_roll(token)?.ok_or(EngineError::StaleRequest)?;
        let mut series = table.series.clone().ok_or(EngineError::StaleRequest)?;
        if pending.series_id != series.id {
            return Err(EngineError::StaleRequest);
        }
        if !pending.commit.is_empty() && !verify_commit_reveal(&pending.commit, &reveal) {
            return Err(EngineError::CommitMismatch);
        }

        let (die1, die2) = DiceRng::new(&reveal, token).roll_pair();
        let roll = Roll {
            die1,
            die2,
            series_id: series.id,
            sequence: series.rolls + 1,
        };
        let decision = decide_roll(series.phase, series.point, roll.total())?;

        // Settlement is keyed by the phase and point before the roll.
        let ctx = RollContext {
            phase: series.phase,
            point: series.point,
            roll,
            working_on_come_out: self.config.working_on_come_out,
        };
        let mut book = frame.book()?;
        for bet_id in book.open.clone() {
            let bet = frame
                .bet(bet_id)?
                .ok_or(EngineError::InvariantViolation("book references unknown bet"))?;
            let disposition = settlement::resolve_bet(&bet, &ctx)?;
            match disposition {
                Disposition::Ride => {
                    if bet.status == BetStatus::Working {
                        let mut bet = bet;
                        bet.status = BetStatus::Open;
                        frame.insert(Key::Bet(bet_id), Value::Bet(bet));
                    }
                }
                Disposition::Held => {
                    if bet.status == BetStatus::Open {
                        let mut bet = bet;
                        bet.status = BetStatus::Working;
                        frame.insert(Key::Bet(bet_id), Value::Bet(bet));
                    }
                }
                Disposition::Travel { target } => {
                    let mut bet = bet;
                    bet.target = Some(target);
                    frame.insert(Key::Bet(bet_id), Value::Bet(bet));
                }
                Disposition::Win { winnings } => {
                    book.remove(bet_id);
                    self.settle_terminal(&mut frame, bet, BetStatus::Won, winnings, roll.sequence)?;
                }
                Disposition::Lose => {
                    book.remove(bet_id);
                    self.settle_terminal(&mut frame, bet, BetStatus::Lost, 0, roll.sequence)?;
                }
                Disposition::Push => {
                    book.remove(bet_id);
                    self.settle_terminal(&mut frame, bet, BetStatus::Push, 0, roll.sequence)?;
                }
            }
        }

        // Advance the table.
        series.rolls += 1;
        series.phase = decision.phase_after;
        series.point = decision.point_after;
        let series_id = series.id;
        if decision.series_ends {
            if !book.open.is_empty() {
                return Err(EngineError::InvariantViolation(
                    "open bets survived a seven-out",
                ));
            }
            for token in table.pending.drain(..) {
                frame.delete(Key::PendingRoll(token));
            }
            table.series = None;
            frame.emit(Event::SeriesEnded {
                series_id,
                reason: SeriesEndReason::SevenOut,
            });
        } else {
            table.series = Some(series);
            table.pending.retain(|&t| t != token);
            frame.delete(Key::PendingRoll(token));
        }
        table.last_roll = Some(roll);

        frame.insert(Key::BetBook, Value::BetBook(book));
        frame.insert(Key::Table, Value::Table(table));
        frame.emit(Event::RollApplied {
            roll,
            outcome: decision.outcome,
            phase_after: decision.phase_after,
            point_after: decision.point_after,
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        info!(
            series_id,
            die1,
            die2,
            outcome = ?decision.outcome,
            "roll applied"
        );
        Ok(roll)
    }

    // === Wagers ===

    pub fn place_bet(
        &mut self,
        cap: &Capability,
        placement: BetPlacement,
    ) -> Result<BetId, EngineError> {
        require(cap, GRANT_WAGER)?;
        if cap.actor != placement.player {
            return Err(EngineError::Unauthorized);
        }

        let mut frame = Frame::new(&self.state);
        let mut table = frame.table()?;
        let series = table.series.as_ref().ok_or(EngineError::NoActiveSeries)?;
        let (series_id, series_point, series_rolls, phase) =
            (series.id, series.point, series.rolls, series.phase);

        ledger::check_phase(placement.bet_type, phase)?;
        // Odds bets ride the established point.
        let target = if placement.bet_type.is_odds() {
            match placement.target {
                None => series_point,
                explicit if explicit == series_point => series_point,
                _ => {
                    return Err(EngineError::InvalidTarget {
                        bet_type: placement.bet_type,
                    })
                }
            }
        } else {
            placement.target
        };
        ledger::check_target(placement.bet_type, target)?;
        ledger::check_amount(placement.amount, &self.config)?;

        let amount = placement.amount;
        let potential = reserve_for(placement.bet_type, target, amount)?;
        let mut players_vault = frame.vault(VaultId::Players)?;

        // The banking vault must be able to cover this bet's worst-case
        // winnings on top of what is already reserved for open bets.
        if players_vault.free() < potential {
            return Err(EngineError::InsufficientLiquidity {
                vault: VaultId::Players,
            });
        }

        // Move the stake.
        let banking = match placement.funding {
            Funding::Chips => {
                let mut player = frame.player(&placement.player)?;
                if player.chips < amount {
                    return Err(EngineError::InsufficientFunds {
                        have: player.chips,
                        need: amount,
                    });
                }
                player.chips -= amount;
                frame.insert(Key::Player(placement.player.clone()), Value::Player(player));

                // Stake enters the banking vault and is immediately escrowed.
                players_vault.total_assets = players_vault
                    .total_assets
                    .checked_add(amount)
                    .ok_or(EngineError::InvariantViolation("vault assets overflow"))?;
                players_vault.escrowed += amount;
                VaultId::Players
            }
            Funding::BotVault(bot) => {
                let id = VaultId::Bot(bot);
                let mut bot_vault = frame.vault(id)?;
                if bot_vault.liquid() < amount {
                    return Err(EngineError::InsufficientLiquidity { vault: id });
                }
                bot_vault.escrowed += amount;
                frame.store_vault(id, bot_vault)?;
                id
            }
        };
        players_vault.reserved = players_vault
            .reserved
            .checked_add(potential)
            .ok_or(EngineError::InvariantViolation("vault reserve overflow"))?;
        frame.store_vault(VaultId::Players, players_vault)?;

        let bet_id = table.next_bet;
        table.next_bet += 1;
        // Number bets placed during come-out start held unless the table
        // works them.
        let status = if placement.bet_type.is_number_bet()
            && phase == Phase::ComeOut
            && !self.config.working_on_come_out
        {
            BetStatus::Working
        } else {
            BetStatus::Open
        };
        let bet = Bet {
            id: bet_id,
            player: placement.player.clone(),
            funding: placement.funding,
            series_id,
            bet_type: placement.bet_type,
            target,
            amount,
            status,
            created_at_roll: series_rolls,
            resolved_at_roll: None,
        };

        let mut book = frame.book()?;
        book.insert(bet_id);
        frame.insert(Key::BetBook, Value::BetBook(book));
        frame.insert(
            Key::Escrow(bet_id),
            Value::Escrow(EscrowEntry {
                bet_id,
                amount,
                vault_id: banking,
            }),
        );
        frame.insert(Key::Bet(bet_id), Value::Bet(bet.clone()));
        frame.insert(Key::Table, Value::Table(table));
        frame.emit(Event::BetPlaced {
            bet_id,
            player: placement.player.clone(),
            funding: placement.funding,
            series_id: bet.series_id,
            bet_type: placement.bet_type,
            target,
            amount,
            created_at_roll: bet.created_at_roll,
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        debug!(
            bet_id,
            bet_type = ?placement.bet_type,
            target = ?target,
            amount,
            funding = ?placement.funding,
            "bet placed"
        );
        Ok(bet_id)
    }

    /// Take down an open bet. Only bet types that allow late removal come
    /// down; line bets are locked once a point is on.
    pub fn cancel_bet(&mut self, cap: &Capability, bet_id: BetId) -> Result<u64, EngineError> {
        require(cap, GRANT_WAGER)?;
        let mut frame = Frame::new(&self.state);
        let bet = frame.bet(bet_id)?.ok_or(EngineError::UnknownBet { bet_id })?;
        if cap.actor != bet.player {
            return Err(EngineError::Unauthorized);
        }
        if bet.status.is_terminal() {
            return Err(EngineError::BetNotOpen { bet_id });
        }
        let table = frame.table()?;
        let series = table.series.as_ref().ok_or(EngineError::NoActiveSeries)?;
        if series.id != bet.series_id {
            return Err(EngineError::InvariantViolation("open bet from dead series"));
        }
        if !ledger::removable(&bet, series.phase) {
            return Err(EngineError::BetNotRemovable { bet_id });
        }

        let refund = bet.amount;
        let series_id = bet.series_id;
        let rolls = series.rolls;
        let mut book = frame.book()?;
        book.remove(bet_id);
        frame.insert(Key::BetBook, Value::BetBook(book));
        self.release_terminal(&mut frame, bet, BetStatus::Push, 0, rolls)?;
        frame.emit(Event::BetCancelled {
            bet_id,
            series_id,
            refund,
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        debug!(bet_id, refund, "bet cancelled");
        Ok(refund)
    }

    // === Liquidity and chips ===

    /// Credit chips to a player account (operator faucet / cashier on-ramp).
    pub fn credit_player(
        &mut self,
        cap: &Capability,
        player: &PublicKey,
        amount: u64,
    ) -> Result<u64, EngineError> {
        require(cap, GRANT_LIQUIDITY)?;
        if amount == 0 {
            return Err(EngineError::AmountOutOfRange {
                amount,
                min: 1,
                max: u64::MAX,
            });
        }
        let mut frame = Frame::new(&self.state);
        let mut account = frame.player(player)?;
        account.chips = account
            .chips
            .checked_add(amount)
            .ok_or(EngineError::InvariantViolation("chip balance overflow"))?;
        let new_chips = account.chips;
        frame.insert(Key::Player(player.clone()), Value::Player(account));
        frame.emit(Event::PlayerCredited {
            player: player.clone(),
            amount,
            new_chips,
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        Ok(new_chips)
    }

    /// Deposit capital into a vault for shares: proportional to current
    /// assets, 1:1 when the vault is empty.
    pub fn deposit_liquidity(
        &mut self,
        cap: &Capability,
        vault_id: VaultId,
        amount: u64,
    ) -> Result<u64, EngineError> {
        require(cap, GRANT_LIQUIDITY)?;
        if amount == 0 {
            return Err(EngineError::AmountOutOfRange {
                amount,
                min: 1,
                max: u64::MAX,
            });
        }
        let mut frame = Frame::new(&self.state);
        let mut account = frame.vault(vault_id)?;
        let shares = vault::shares_for_deposit(&account, amount)?;
        if shares == 0 {
            // Too small to mint a single share at the current share value.
            return Err(EngineError::AmountOutOfRange {
                amount,
                min: 1,
                max: u64::MAX,
            });
        }
        account.total_assets = account
            .total_assets
            .checked_add(amount)
            .ok_or(EngineError::InvariantViolation("vault assets overflow"))?;
        account.total_shares = account
            .total_shares
            .checked_add(shares)
            .ok_or(EngineError::InvariantViolation("vault shares overflow"))?;
        let (total_shares, total_assets) = (account.total_shares, account.total_assets);
        frame.store_vault(vault_id, account)?;

        let balance = frame.shares(vault_id, &cap.actor)?;
        frame.insert(
            Key::Shares(vault_id, cap.actor.clone()),
            Value::Shares(balance + shares),
        );
        frame.emit(Event::LiquidityDeposited {
            vault: vault_id,
            provider: cap.actor.clone(),
            amount,
            shares_minted: shares,
            total_shares,
            total_assets,
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        info!(vault = ?vault_id, amount, shares, "liquidity deposited");
        Ok(shares)
    }

    /// Burn shares for a proportional slice of vault assets. Withdrawals can
    /// never pull funds out from under open bets or their reserved payouts.
    pub fn withdraw_liquidity(
        &mut self,
        cap: &Capability,
        vault_id: VaultId,
        shares: u64,
    ) -> Result<u64, EngineError> {
        require(cap, GRANT_LIQUIDITY)?;
        if shares == 0 {
            return Err(EngineError::AmountOutOfRange {
                amount: shares,
                min: 1,
                max: u64::MAX,
            });
        }
        let mut frame = Frame::new(&self.state);
        let balance = frame.shares(vault_id, &cap.actor)?;
        if balance < shares {
            return Err(EngineError::InsufficientFunds {
                have: balance,
                need: shares,
            });
        }
        let mut account = frame.vault(vault_id)?;
        let amount = vault::assets_for_shares(&account, shares)?;
        if amount > account.free() {
            return Err(EngineError::InsufficientFreeLiquidity);
        }
        account.total_assets -= amount;
        account.total_shares -= shares;
        let (total_shares, total_assets) = (account.total_shares, account.total_assets);
        frame.store_vault(vault_id, account)?;
        frame.insert(
            Key::Shares(vault_id, cap.actor.clone()),
            Value::Shares(balance - shares),
        );
        frame.emit(Event::LiquidityWithdrawn {
            vault: vault_id,
            provider: cap.actor.clone(),
            shares_burned: shares,
            amount,
            total_shares,
            total_assets,
        });
        let (changes, events) = frame.commit();
        self.apply_committed(changes, events)?;
        info!(vault = ?vault_id, shares, amount, "liquidity withdrawn");
        Ok(amount)
    }

    // === Read accessors ===

    pub fn current_phase(&self) -> Result<Phase, EngineError> {
        Ok(Frame::new(&self.state).table()?.phase())
    }

    pub fn current_point(&self) -> Result<Option<u8>, EngineError> {
        Ok(Frame::new(&self.state).table()?.point())
    }

    pub fn last_roll(&self) -> Result<Option<Roll>, EngineError> {
        Ok(Frame::new(&self.state).table()?.last_roll)
    }

    pub fn bet_status(&self, bet_id: BetId) -> Result<Option<BetStatus>, EngineError> {
        Ok(Frame::new(&self.state).bet(bet_id)?.map(|bet| bet.status))
    }

    pub fn open_bets(&self) -> Result<Vec<BetId>, EngineError> {
        Ok(Frame::new(&self.state).book()?.open)
    }

    pub fn player_chips(&self, player: &PublicKey) -> Result<u64, EngineError> {
        Ok(Frame::new(&self.state).player(player)?.chips)
    }

    pub fn vault_stats(&self, vault_id: VaultId) -> Result<VaultStats, EngineError> {
        let account = Frame::new(&self.state).vault(vault_id)?;
        Ok(VaultStats {
            total_assets: account.total_assets,
            total_shares: account.total_shares,
            escrowed: account.escrowed,
            reserved: account.reserved,
            fee_bps: account.fee_bps,
        })
    }

    pub fn share_balance(
        &self,
        vault_id: VaultId,
        provider: &PublicKey,
    ) -> Result<u64, EngineError> {
        Frame::new(&self.state).shares(vault_id, provider)
    }

    pub fn treasury_fees(&self) -> Result<u64, EngineError> {
        Ok(Frame::new(&self.state).treasury()?.accumulated_fees)
    }

    // === Settlement plumbing ===

    fn settle_terminal(
        &self,
        frame: &mut Frame<'_, S>,
        bet: Bet,
        status: BetStatus,
        winnings: u64,
        roll_sequence: u32,
    ) -> Result<(), EngineError> {
        self.release_terminal(frame, bet.clone(), status, winnings, roll_sequence)?;
        // release_terminal stages everything; the settled event references
        // the terminal facts a log consumer needs to rebuild balances.
        let fee = match (status, bet.funding) {
            (BetStatus::Lost, _) => {
                let players = frame.vault(VaultId::Players)?;
                vault::fee_for(bet.amount, players.fee_bps)
            }
            _ => 0,
        };
        frame.emit(Event::BetSettled {
            bet_id: bet.id,
            series_id: bet.series_id,
            status,
            funding: bet.funding,
            amount: bet.amount,
            payout: winnings,
            fee,
            resolved_at_roll: roll_sequence,
        });
        debug!(
            bet_id = bet.id,
            status = ?status,
            winnings,
            "bet settled"
        );
        Ok(())
    }

    /// Apply the double-entry for one terminal bet: destroy its escrow
    /// exactly once, move stake and winnings, skim the treasury fee on house
    /// winnings, and archive the bet.
    fn release_terminal(
        &self,
        frame: &mut Frame<'_, S>,
        mut bet: Bet,
        status: BetStatus,
        winnings: u64,
        roll_sequence: u32,
    ) -> Result<(), EngineError> {
        if bet.status.is_terminal() {
            return Err(EngineError::InvariantViolation("bet settled twice"));
        }
        let escrow = frame
            .escrow(bet.id)?
            .ok_or(EngineError::InvariantViolation("settled bet without escrow"))?;
        if escrow.amount != bet.amount {
            return Err(EngineError::InvariantViolation("escrow does not match stake"));
        }
        let amount = bet.amount;
        let potential = reserve_for(bet.bet_type, bet.target, amount)?;
        let mut players = frame.vault(VaultId::Players)?;

        match bet.funding {
            Funding::Chips => {
                // Stake lives in the players vault; release its escrow first.
                players.escrowed = players
                    .escrowed
                    .checked_sub(amount)
                    .ok_or(EngineError::InvariantViolation("escrow underflow"))?;
                match status {
                    BetStatus::Won => {
                        let due = amount
                            .checked_add(winnings)
                            .ok_or(EngineError::InvariantViolation("payout overflow"))?;
                        players.total_assets = players
                            .total_assets
                            .checked_sub(due)
                            .ok_or(EngineError::InvariantViolation("vault cannot cover payout"))?;
                        let mut account = frame.player(&bet.player)?;
                        account.chips = account
                            .chips
                            .checked_add(due)
                            .ok_or(EngineError::InvariantViolation("chip balance overflow"))?;
                        frame.insert(Key::Player(bet.player.clone()), Value::Player(account));
                    }
                    BetStatus::Lost => {
                        // House retains the stake; the treasury takes its cut.
                        let fee = vault::fee_for(amount, players.fee_bps);
                        players.total_assets = players
                            .total_assets
                            .checked_sub(fee)
                            .ok_or(EngineError::InvariantViolation("fee underflow"))?;
                        self.accrue_fee(frame, fee)?;
                    }
                    BetStatus::Push => {
                        players.total_assets = players
                            .total_assets
                            .checked_sub(amount)
                            .ok_or(EngineError::InvariantViolation("refund underflow"))?;
                        let mut account = frame.player(&bet.player)?;
                        account.chips = account
                            .chips
                            .checked_add(amount)
                            .ok_or(EngineError::InvariantViolation("chip balance overflow"))?;
                        frame.insert(Key::Player(bet.player.clone()), Value::Player(account));
                    }
                    BetStatus::Open | BetStatus::Working => {
                        return Err(EngineError::InvariantViolation("non-terminal settlement"))
                    }
                }
            }
            Funding::BotVault(bot) => {
                let id = VaultId::Bot(bot);
                let mut bot_vault = frame.vault(id)?;
                bot_vault.escrowed = bot_vault
                    .escrowed
                    .checked_sub(amount)
                    .ok_or(EngineError::InvariantViolation("escrow underflow"))?;
                match status {
                    BetStatus::Won => {
                        players.total_assets = players
                            .total_assets
                            .checked_sub(winnings)
                            .ok_or(EngineError::InvariantViolation("vault cannot cover payout"))?;
                        bot_vault.total_assets = bot_vault
                            .total_assets
                            .checked_add(winnings)
                            .ok_or(EngineError::InvariantViolation("vault assets overflow"))?;
                    }
                    BetStatus::Lost => {
                        bot_vault.total_assets = bot_vault
                            .total_assets
                            .checked_sub(amount)
                            .ok_or(EngineError::InvariantViolation("stake underflow"))?;
                        let fee = vault::fee_for(amount, players.fee_bps);
                        players.total_assets = players
                            .total_assets
                            .checked_add(amount - fee)
                            .ok_or(EngineError::InvariantViolation("vault assets overflow"))?;
                        self.accrue_fee(frame, fee)?;
                    }
                    BetStatus::Push => {
                        // Escrow release alone returns the stake to the bot's
                        // liquid assets.
                    }
                    BetStatus::Open | BetStatus::Working => {
                        return Err(EngineError::InvariantViolation("non-terminal settlement"))
                    }
                }
                frame.store_vault(id, bot_vault)?;
            }
        }

        players.reserved = players.reserved.saturating_sub(potential);
        frame.store_vault(VaultId::Players, players)?;

        bet.status = status;
        bet.resolved_at_roll = Some(roll_sequence);
        frame.insert(Key::Bet(bet.id), Value::Bet(bet.clone()));
        frame.delete(Key::Escrow(bet.id));
        Ok(())
    }

    fn accrue_fee(&self, frame: &mut Frame<'_, S>, fee: u64) -> Result<(), EngineError> {
        if fee == 0 {
            return Ok(());
        }
        let mut treasury = frame.treasury()?;
        treasury.accumulated_fees = treasury
            .accumulated_fees
            .checked_add(fee)
            .ok_or(EngineError::InvariantViolation("treasury overflow"))?;
        frame.insert(Key::Treasury, Value::Treasury(treasury));
        Ok(())
    }
}

fn require(cap: &Capability, grant: u8) -> Result<(), EngineError> {
    if cap.allows(grant) {
        Ok(())
    } else {
        Err(EngineError::Unauthorized)
    }
}

/// Worst-case winnings for a bet, reserved against the banking vault while
/// the bet is open.
fn reserve_for(bet_type: BetType, target: Option<u8>, amount: u64) -> Result<u64, EngineError> {
    let (num, den) = bet_type
        .max_win_ratio(target)
        .ok_or(EngineError::InvariantViolation("bet without payout ratio"))?;
    Ok(settlement::payout(amount, num, den))
}
