use std::collections::BTreeMap;

use boxcars_types::craps::{
    Bet, BetBook, BetId, EscrowEntry, PlayerAccount, RequestToken, TableState, TreasuryState,
    VaultAccount, VaultId,
};
use boxcars_types::{Event, Key, Value};
use commonware_cryptography::ed25519::PublicKey;

use crate::error::EngineError;
use crate::state::{State, Status};

/// One atomic operation's staged reads and writes.
///
/// Reads fall through to committed state; writes accumulate in `pending`.
/// A frame only reaches the backend through [`Frame::commit`], so an
/// operation that fails mid-way leaves no trace (full rollback).
pub(crate) struct Frame<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
    events: Vec<Event>,
}

impl<'a, S: State> Frame<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn get(&self, key: &Key) -> Result<Option<Value>, EngineError> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key)?,
        })
    }

    pub fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    pub fn delete(&mut self, key: Key) {
        self.pending.insert(key, Status::Delete);
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn commit(self) -> (Vec<(Key, Status)>, Vec<Event>) {
        (self.pending.into_iter().collect(), self.events)
    }

    // === Typed accessors ===

    pub fn table(&self) -> Result<TableState, EngineError> {
        Ok(match self.get(&Key::Table)? {
            Some(Value::Table(table)) => table,
            Some(_) => return Err(EngineError::InvariantViolation("table key holds foreign value")),
            None => TableState::default(),
        })
    }

    pub fn book(&self) -> Result<BetBook, EngineError> {
        Ok(match self.get(&Key::BetBook)? {
            Some(Value::BetBook(book)) => book,
            Some(_) => return Err(EngineError::InvariantViolation("book key holds foreign value")),
            None => BetBook::default(),
        })
    }

    pub fn bet(&self, id: BetId) -> Result<Option<Bet>, EngineError> {
        Ok(match self.get(&Key::Bet(id))? {
            Some(Value::Bet(bet)) => Some(bet),
            Some(_) => return Err(EngineError::InvariantViolation("bet key holds foreign value")),
            None => None,
        })
    }

    pub fn escrow(&self, id: BetId) -> Result<Option<EscrowEntry>, EngineError> {
        Ok(match self.get(&Key::Escrow(id))? {
            Some(Value::Escrow(entry)) => Some(entry),
            Some(_) => {
                return Err(EngineError::InvariantViolation("escrow key holds foreign value"))
            }
            None => None,
        })
    }

    pub fn pending_roll(
        &self,
        token: RequestToken,
    ) -> Result<Option<boxcars_types::craps::PendingRoll>, EngineError> {
        Ok(match self.get(&Key::PendingRoll(token))? {
            Some(Value::PendingRoll(pending)) => Some(pending),
            Some(_) => {
                return Err(EngineError::InvariantViolation("pending key holds foreign value"))
            }
            None => None,
        })
    }

    pub fn player(&self, public: &PublicKey) -> Result<PlayerAccount, EngineError> {
        Ok(match self.get(&Key::Player(public.clone()))? {
            Some(Value::Player(player)) => player,
            Some(_) => {
                return Err(EngineError::InvariantViolation("player key holds foreign value"))
            }
            None => PlayerAccount::default(),
        })
    }

    /// The vault arena is seeded at engine construction, so a missing vault
    /// is an accounting bug rather than a recoverable condition.
    pub fn vault(&self, id: VaultId) -> Result<VaultAccount, EngineError> {
        match self.get(&Key::Vault(id))? {
            Some(Value::Vault(vault)) => Ok(vault),
            _ => Err(EngineError::InvariantViolation("vault missing from arena")),
        }
    }

    pub fn shares(&self, vault: VaultId, provider: &PublicKey) -> Result<u64, EngineError> {
        Ok(match self.get(&Key::Shares(vault, provider.clone()))? {
            Some(Value::Shares(shares)) => shares,
            _ => 0,
        })
    }

    pub fn treasury(&self) -> Result<TreasuryState, EngineError> {
        Ok(match self.get(&Key::Treasury)? {
            Some(Value::Treasury(treasury)) => treasury,
            _ => TreasuryState::default(),
        })
    }

    /// Persist a vault, re-checking its core invariant first.
    pub fn store_vault(&mut self, id: VaultId, vault: VaultAccount) -> Result<(), EngineError> {
        if vault.escrowed > vault.total_assets {
            return Err(EngineError::InvariantViolation("escrow exceeds vault assets"));
        }
        self.insert(Key::Vault(id), Value::Vault(vault));
        Ok(())
    }
}
