// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::collections::VecDeque;

use rand::{
    rngs::SmallRng,
    thread_rng,
    Rng,
    SeedableRng,
};

/// Upon insertion of a new key, the key is replicated to higher levels for as
/// long as a `CoinSource` keeps coming up heads. Each flip must be an
/// independent unbiased bit, which yields the geometric level distribution:
/// roughly half the keys reach level 1, a quarter reach level 2, and so on.
pub trait CoinSource {
    /// Draw one bit. `true` (heads) promotes the key another level, `false`
    /// (tails) ends the promotion walk.
    fn flip(&mut self) -> bool;
}

/// The default coin, backed by a fast non-cryptographic generator.
pub struct RngCoin {
    rng: SmallRng, // Fast generator
}

impl RngCoin {
    pub fn new() -> Self {
        RngCoin {
            rng: SmallRng::from_rng(thread_rng()).unwrap(),
        }
    }

    /// A coin with a fixed seed. Two indexes driven by equally seeded coins
    /// and fed the same operations end up with identical level structure.
    pub fn seeded(seed: u64) -> Self {
        RngCoin {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RngCoin {
    fn default() -> Self {
        RngCoin::new()
    }
}

impl CoinSource for RngCoin {
    fn flip(&mut self) -> bool {
        self.rng.gen()
    }
}

/// Replays a scripted flip sequence, then reports tails forever. Tests use
/// this to force an exact shape onto the index.
pub struct ScriptedCoin {
    flips: VecDeque<bool>,
}

impl ScriptedCoin {
    pub fn new<I>(flips: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        ScriptedCoin {
            flips: flips.into_iter().collect(),
        }
    }
}

impl CoinSource for ScriptedCoin {
    fn flip(&mut self) -> bool {
        self.flips.pop_front().unwrap_or(false)
    }
}
