//! Randomness correlation and the dice mapping.
//!
//! The engine never generates randomness. A roll request registers an opaque
//! token (optionally with a commitment published by the randomness source);
//! the raw value arrives later through `submit_roll` and is checked against
//! that commitment before any dice are derived.
//!
//! ## Commit-reveal
//!
//! 1. **Commit** - the source publishes `hash(reveal)` when the request is
//!    issued, before any bets can react to the outcome.
//! 2. **Reveal** - the source later discloses the pre-image.
//! 3. **Verify** - anyone can check `hash(reveal) == commit` from the event
//!    log alone.
//!
//! ## Dice derivation
//!
//! The reveal seeds a ChaCha20 stream (domain-separated by the request
//! token), and each die face is drawn with `gen_range(1..=6)`, which is
//! unbiased. Fairness of this mapping is a tested property.

use boxcars_types::craps::{RequestToken, RNG_COMMIT_LEN};
use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Domain separator for dice-seed derivation.
const DICE_DOMAIN: &[u8] = b"boxcars_dice";

/// Compute a commitment from a reveal value: `commit = hash(reveal)`.
pub fn compute_commit(reveal: &[u8; RNG_COMMIT_LEN]) -> [u8; RNG_COMMIT_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(reveal);
    hasher.finalize().0
}

/// Verify that a registered commitment matches a delivered reveal.
pub fn verify_commit_reveal(commit: &[u8], reveal: &[u8; RNG_COMMIT_LEN]) -> bool {
    if commit.len() != RNG_COMMIT_LEN {
        return false;
    }
    commit == compute_commit(reveal).as_slice()
}

/// Deterministic dice stream derived from one delivered reveal.
pub struct DiceRng {
    inner: ChaCha20Rng,
}

impl DiceRng {
    /// Seed the stream from the reveal, domain-separated by the request
    /// token so distinct requests never share a stream.
    pub fn new(reveal: &[u8; RNG_COMMIT_LEN], token: RequestToken) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(reveal);
        hasher.update(&token.0.to_be_bytes());
        hasher.update(DICE_DOMAIN);
        let seed = hasher.finalize().0;
        Self {
            inner: ChaCha20Rng::from_seed(seed),
        }
    }

    /// Draw one die face, uniformly in [1, 6].
    pub fn roll_die(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }

    /// Draw two independent die faces.
    pub fn roll_pair(&mut self) -> (u8, u8) {
        (self.roll_die(), self.roll_die())
    }
}

/// Hash-chain randomness source for simulations and tests.
///
/// `reveal[n] = hash(master_secret || n)`, `commit[n] = hash(reveal[n])` -
/// commitments can be published ahead of time while each reveal stays
/// unpredictable until disclosed.
#[derive(Clone)]
pub struct HashChain {
    master_secret: [u8; RNG_COMMIT_LEN],
}

impl HashChain {
    pub fn new(master_secret: [u8; RNG_COMMIT_LEN]) -> Self {
        Self { master_secret }
    }

    /// Derive a chain from an arbitrary label (test convenience).
    pub fn from_label(label: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(label);
        hasher.update(b"hash_chain_master");
        Self {
            master_secret: hasher.finalize().0,
        }
    }

    pub fn reveal(&self, index: u64) -> [u8; RNG_COMMIT_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(&self.master_secret);
        hasher.update(&index.to_be_bytes());
        hasher.finalize().0
    }

    pub fn commit(&self, index: u64) -> [u8; RNG_COMMIT_LEN] {
        compute_commit(&self.reveal(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_reveal_roundtrip() {
        let chain = HashChain::from_label(b"test");
        for index in 0..50 {
            let reveal = chain.reveal(index);
            assert!(verify_commit_reveal(&chain.commit(index), &reveal));
        }
    }

    #[test]
    fn tampered_reveal_fails_verification() {
        let chain = HashChain::from_label(b"test");
        let commit = chain.commit(7);
        let mut reveal = chain.reveal(7);
        reveal[0] ^= 0xFF;
        assert!(!verify_commit_reveal(&commit, &reveal));
    }

    #[test]
    fn short_commit_fails_verification() {
        let chain = HashChain::from_label(b"test");
        let reveal = chain.reveal(1);
        assert!(!verify_commit_reveal(&[0u8; 16], &reveal));
    }

    #[test]
    fn dice_are_deterministic_per_token() {
        let chain = HashChain::from_label(b"dice");
        let reveal = chain.reveal(3);
        let pair1 = DiceRng::new(&reveal, RequestToken(9)).roll_pair();
        let pair2 = DiceRng::new(&reveal, RequestToken(9)).roll_pair();
        assert_eq!(pair1, pair2);

        // A different token yields an independent stream.
        let mut a = DiceRng::new(&reveal, RequestToken(9));
        let mut b = DiceRng::new(&reveal, RequestToken(10));
        let seq_a: Vec<(u8, u8)> = (0..8).map(|_| a.roll_pair()).collect();
        let seq_b: Vec<(u8, u8)> = (0..8).map(|_| b.roll_pair()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn die_faces_are_uniform() {
        // Chi-square test on the randomness-to-face mapping, not the source.
        let chain = HashChain::from_label(b"fairness");
        let mut counts = [0u64; 6];
        let trials = 10_000u64;
        for index in 0..trials {
            let reveal = chain.reveal(index);
            let mut rng = DiceRng::new(&reveal, RequestToken(index));
            let (d1, d2) = rng.roll_pair();
            counts[(d1 - 1) as usize] += 1;
            counts[(d2 - 1) as usize] += 1;
        }

        let expected = (trials * 2) as f64 / 6.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&count| {
                let diff = count as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // Critical value for 5 degrees of freedom at p=0.001 is ~20.5.
        assert!(
            chi_square < 20.5,
            "die faces look biased, chi-square = {chi_square}"
        );
    }

    #[test]
    fn totals_cover_full_range() {
        let chain = HashChain::from_label(b"range");
        let mut seen = [false; 13];
        for index in 0..2_000 {
            let reveal = chain.reveal(index);
            let (d1, d2) = DiceRng::new(&reveal, RequestToken(index)).roll_pair();
            assert!((1..=6).contains(&d1));
            assert!((1..=6).contains(&d2));
            seen[(d1 + d2) as usize] = true;
        }
        for total in 2..=12 {
            assert!(seen[total], "total {total} never rolled");
        }
    }
}
