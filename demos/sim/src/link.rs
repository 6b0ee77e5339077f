//! One-way link model: fixed delay, uniform jitter, random loss and marking.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// Link parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Propagation delay in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound of the uniform extra delay in milliseconds.
    pub jitter_ms: u64,
    /// Probability a data segment is dropped.
    pub loss: f64,
    /// Probability a delivered data segment is congestion-marked.
    pub mark: f64,
    /// RNG seed, so runs are reproducible.
    pub seed: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 50,
            jitter_ms: 10,
            loss: 0.0,
            mark: 0.0,
            seed: 1,
        }
    }
}

/// What happened to one packet on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transit {
    /// Delivered after the given delay, possibly marked.
    Delivered { delay: Duration, marked: bool },
    /// Lost.
    Dropped,
}

/// Stateful link with its own RNG.
#[derive(Debug)]
pub struct Link {
    config: LinkConfig,
    rng: StdRng,
}

impl Link {
    /// Create a link seeded from `config.seed`.
    pub fn new(config: LinkConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Send a data segment across the link.
    pub fn data(&mut self) -> Transit {
        if self.rng.gen_bool(self.config.loss.clamp(0.0, 1.0)) {
            return Transit::Dropped;
        }
        let marked = self.rng.gen_bool(self.config.mark.clamp(0.0, 1.0));
        Transit::Delivered {
            delay: self.delay(),
            marked,
        }
    }

    /// Delay for an ack on the reverse path, which never loses packets.
    pub fn ack_delay(&mut self) -> Duration {
        self.delay()
    }

    fn delay(&mut self) -> Duration {
        let jitter = if self.config.jitter_ms == 0 {
            0
        } else {
            self.rng.gen_range(0..=self.config.jitter_ms * 1000)
        };
        Duration::from_millis(self.config.base_delay_ms) + Duration::from_micros(jitter)
    }
}
