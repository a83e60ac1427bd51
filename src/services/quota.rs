// src/services/quota.rs

//! Client-side admission control for the quota-limited relay.
//!
//! The relay enforces a hard monthly call cap and gives no feedback until the
//! cap is hit. Each scheduled run therefore spends a relay call only with a
//! fixed probability, which bounds the expected monthly usage without any
//! coordination between runs.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Draws from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible draws from a seeded generator.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&self) -> f64 {
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random::<f64>()
    }
}

/// Always returns the same value. Useful for forcing a gate decision.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_unit(&self) -> f64 {
        self.0
    }
}

/// Probabilistic gate in front of every relay call.
pub struct QuotaGate {
    threshold: f64,
    source: Box<dyn RandomSource>,
}

impl QuotaGate {
    pub fn new(threshold: f64, source: Box<dyn RandomSource>) -> Self {
        Self { threshold, source }
    }

    /// Gate backed by the thread-local generator.
    pub fn with_thread_rng(threshold: f64) -> Self {
        Self::new(threshold, Box::new(ThreadRandom))
    }

    /// Gate with reproducible draws when `seed` is set.
    pub fn from_seed(threshold: f64, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(threshold, Box::new(SeededRandom::new(seed))),
            None => Self::with_thread_rng(threshold),
        }
    }

    /// Draw once and decide whether this attempt may use the relay.
    pub fn admit(&self) -> bool {
        self.source.next_unit() < self.threshold
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl std::fmt::Debug for QuotaGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGate")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source_forces_both_branches() {
        assert!(QuotaGate::new(0.3188, Box::new(FixedRandom(0.0))).admit());
        assert!(QuotaGate::new(0.3188, Box::new(FixedRandom(0.3187))).admit());
        assert!(!QuotaGate::new(0.3188, Box::new(FixedRandom(0.3188))).admit());
        assert!(!QuotaGate::new(0.3188, Box::new(FixedRandom(0.99))).admit());
    }

    #[test]
    fn test_admission_rate_converges_to_threshold() {
        let gate = QuotaGate::from_seed(0.3188, Some(7));
        let attempts = 100_000;
        let admitted = (0..attempts).filter(|_| gate.admit()).count();
        let rate = admitted as f64 / attempts as f64;

        // Binomial standard deviation is about 0.0015 here.
        assert!((rate - 0.3188).abs() < 0.01, "admission rate {rate}");
    }

    #[test]
    fn test_thread_random_stays_in_unit_interval() {
        let source = ThreadRandom;
        for _ in 0..1_000 {
            let value = source.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let draws_a: Vec<f64> = (0..10).map(|_| a.next_unit()).collect();
        let draws_b: Vec<f64> = (0..10).map(|_| b.next_unit()).collect();
        assert_eq!(draws_a, draws_b);
    }
}
