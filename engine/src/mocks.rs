//! Deterministic fixtures for tests and simulations.

use boxcars_types::caller::Capability;
use boxcars_types::craps::{RequestToken, TableConfig, VaultId, RNG_COMMIT_LEN};
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use commonware_math::algebra::Random;
use rand::{rngs::StdRng, SeedableRng};

use crate::engine::Engine;
use crate::rng::DiceRng;
use crate::state::Memory;

/// Deterministic account keypair.
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let mut rng = StdRng::seed_from_u64(seed);
    let private = PrivateKey::random(&mut rng);
    let public = private.public_key();
    (private, public)
}

/// An engine over in-memory state with a funded players vault, a funded
/// player, and an operator capability.
pub fn funded_engine(
    config: TableConfig,
) -> (Engine<Memory>, Capability, Capability, PublicKey) {
    let (_, operator_key) = create_account_keypair(1_000);
    let (_, player_key) = create_account_keypair(1_001);
    let operator = Capability::operator(operator_key);
    let player = Capability::bettor(player_key.clone());

    let mut engine = Engine::new(Memory::new(), config).expect("engine");
    engine
        .deposit_liquidity(&operator, VaultId::Players, 1_000_000)
        .expect("seed players vault");
    engine
        .credit_player(&operator, &player_key, 100_000)
        .expect("fund player");
    (engine, operator, player, player_key)
}

/// Search for a reveal whose dice derivation yields the requested faces for
/// `token`. Exhaustive over a nonce; dice pairs are dense enough that the
/// search ends quickly.
pub fn reveal_for_dice(token: RequestToken, die1: u8, die2: u8) -> [u8; RNG_COMMIT_LEN] {
    assert!((1..=6).contains(&die1) && (1..=6).contains(&die2));
    for nonce in 0u64.. {
        let mut reveal = [0u8; RNG_COMMIT_LEN];
        reveal[..8].copy_from_slice(&nonce.to_be_bytes());
        let (d1, d2) = DiceRng::new(&reveal, token).roll_pair();
        if (d1, d2) == (die1, die2) {
            return reveal;
        }
    }
    unreachable!("dice search is exhaustive")
}

/// Search for a reveal that produces the requested total for `token`.
pub fn reveal_for_total(token: RequestToken, total: u8) -> [u8; RNG_COMMIT_LEN] {
    assert!((2..=12).contains(&total));
    for nonce in 0u64.. {
        let mut reveal = [0u8; RNG_COMMIT_LEN];
        reveal[..8].copy_from_slice(&nonce.to_be_bytes());
        let (d1, d2) = DiceRng::new(&reveal, token).roll_pair();
        if d1 + d2 == total {
            return reveal;
        }
    }
    unreachable!("dice search is exhaustive")
}
