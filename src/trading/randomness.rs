use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use crate::models::Outcome;

/// Source of every random draw the execution simulator makes.
pub trait FillRandomness: Send {
    /// Pick one slippage offset (in points) from `steps`.
    fn slippage(&mut self, steps: &[f64]) -> f64;
    fn outcome(&mut self, win_probability: f64) -> Outcome;
    /// Reward-to-risk multiple applied to a winning trade, in `[min, max]`.
    fn reward_multiple(&mut self, min: f64, max: f64) -> f64;
}

pub struct RngRandomness<R> {
    rng: R,
}

impl RngRandomness<StdRng> {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RngRandomness<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> FillRandomness for RngRandomness<R> {
    fn slippage(&mut self, steps: &[f64]) -> f64 {
        steps.choose(&mut self.rng).copied().unwrap_or(0.0)
    }

    fn outcome(&mut self, win_probability: f64) -> Outcome {
        let p = if win_probability.is_finite() {
            win_probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.rng.gen_bool(p) {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }

    fn reward_multiple(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Replays pre-set draws in order. Once a queue runs dry it falls back to
/// the first slippage step, a WIN, and the minimum reward multiple.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandomness {
    slippage: VecDeque<f64>,
    outcomes: VecDeque<Outcome>,
    multiples: VecDeque<f64>,
}

impl ScriptedRandomness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slippage(mut self, offsets: &[f64]) -> Self {
        self.slippage.extend(offsets.iter().copied());
        self
    }

    pub fn with_outcomes(mut self, outcomes: &[Outcome]) -> Self {
        self.outcomes.extend(outcomes.iter().copied());
        self
    }

    pub fn with_multiples(mut self, multiples: &[f64]) -> Self {
        self.multiples.extend(multiples.iter().copied());
        self
    }
}

impl FillRandomness for ScriptedRandomness {
    fn slippage(&mut self, steps: &[f64]) -> f64 {
        self.slippage
            .pop_front()
            .unwrap_or_else(|| steps.first().copied().unwrap_or(0.0))
    }

    fn outcome(&mut self, _win_probability: f64) -> Outcome {
        self.outcomes.pop_front().unwrap_or(Outcome::Win)
    }

    fn reward_multiple(&mut self, min: f64, _max: f64) -> f64 {
        self.multiples.pop_front().unwrap_or(min)
    }
}
