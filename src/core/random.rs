//! The single source of randomness for the engine
//!
//! Everything random in a game (spawns, event gates, effect picks, shuffles)
//! draws uniform floats in `[0, 1)` from a `RandomSource`. The game owns a
//! serializable `ChaCha12Rng` so snapshots resume the exact same stream;
//! tests substitute `ScriptedRandom` to force specific outcomes.

use rand::Rng;
use rand_chacha::ChaCha12Rng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Uniform float generator in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len` (`len` must be non-zero)
    fn below(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "below() called with empty range");
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl RandomSource for ChaCha12Rng {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl RandomSource for Xoshiro256PlusPlus {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Replays a fixed sequence of floats, cycling when exhausted
///
/// An empty script always yields 0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        ScriptedRandom { values, cursor: 0 }
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
