use crate::domain::board::BOARD_SIZE;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Mutex, PoisonError};

/// Draws the one-time digit permutation for a board that has just filled.
///
/// The random source is injected so tests (and `--seed` replays) can
/// reproduce an assignment exactly.
pub struct RandomAssigner {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl RandomAssigner {
    pub fn new<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Deterministic ChaCha8 stream for the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    /// A uniformly random permutation of `0..=9`; `result[i]` is the digit of square `i`.
    pub fn assign(&self) -> [u8; BOARD_SIZE] {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        shuffle_digits(&mut **rng)
    }
}

impl Default for RandomAssigner {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Fisher-Yates over the digits 0..=9.
pub fn shuffle_digits<R: Rng + ?Sized>(rng: &mut R) -> [u8; BOARD_SIZE] {
    let mut digits: [u8; BOARD_SIZE] = std::array::from_fn(|i| i as u8);
    for i in (1..BOARD_SIZE).rev() {
        let j = rng.gen_range(0..=i);
        digits.swap(i, j);
    }
    digits
}
