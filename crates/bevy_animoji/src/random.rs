use std::collections::VecDeque;

use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the randomness used when spawning candy.
pub trait RandomSource: Send + Sync + 'static {
    fn coin_flip(&mut self) -> bool;

    /// Uniform sample from the closed range `[min, max]`.
    fn uniform(&mut self, min: f32, max: f32) -> f32;
}

pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn coin_flip(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }

    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.0.gen_range(min..=max)
    }
}

/// Replays scripted values, falling back to `false` and the range midpoint
/// once the script runs out.
#[derive(Debug, Default)]
pub struct SequenceRandom {
    flips: VecDeque<bool>,
    samples: VecDeque<f32>,
}

impl SequenceRandom {
    pub fn new(flips: impl IntoIterator<Item=bool>, samples: impl IntoIterator<Item=f32>) -> Self {
        Self {
            flips: flips.into_iter().collect(),
            samples: samples.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn coin_flip(&mut self) -> bool {
        self.flips.pop_front().unwrap_or(false)
    }

    fn uniform(&mut self, min: f32, max: f32) -> f32 {
        match self.samples.pop_front() {
            Some(sample) => sample.clamp(min, max),
            None => (min + max) * 0.5,
        }
    }
}

#[derive(Resource)]
pub struct Randomness(pub Box<dyn RandomSource>);

impl Randomness {
    pub fn new(source: impl RandomSource) -> Self {
        Self(Box::new(source))
    }
}
