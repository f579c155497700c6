//! Randomness behind the soda admission gate.
use super::config::{ConfigError, SodaConfig};
use rand::Rng;
use std::collections::VecDeque;

pub trait RandomSource {
    /// `true` admits the caller.
    fn next_bool(&mut self) -> bool;
}

/// Draws uniformly from `[min, max)` on the thread RNG and admits even draws.
#[derive(Debug, Clone)]
pub struct ThreadRandom {
    min: u32,
    max: u32,
}

impl ThreadRandom {
    /// Fails on an empty draw range.
    pub fn new(config: &SodaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            min: config.gate_min,
            max: config.gate_max,
        })
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        let config = SodaConfig::default();
        Self {
            min: config.gate_min,
            max: config.gate_max,
        }
    }
}

impl RandomSource for ThreadRandom {
    fn next_bool(&mut self) -> bool {
        let draw = rand::thread_rng().gen_range(self.min..self.max);
        tracing::debug!(draw, "soda admission draw");
        draw % 2 == 0
    }
}

/// Replays a fixed sequence of outcomes, then answers `fallback`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    outcomes: VecDeque<bool>,
    fallback: bool,
}

impl ScriptedRandom {
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            fallback: false,
        }
    }

    pub fn always(outcome: bool) -> Self {
        Self {
            outcomes: VecDeque::new(),
            fallback: outcome,
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_bool(&mut self) -> bool {
        self.outcomes.pop_front().unwrap_or(self.fallback)
    }
}
