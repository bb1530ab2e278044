//! Spawn module - weighted element generation for fills and refills
//!
//! A `SpawnPolicy` is the injectable balance knob for what drops into the
//! board: a weight table over the ordinary colors, plus an optional chance
//! of producing a special element directly during cascade refills. Board
//! generation always draws from the ordinary table only.

use tilematch_types::{ElementKind, ORDINARY_KINDS};

use crate::rng::SimpleRng;

/// Default weight for every ordinary color (uniform)
const DEFAULT_WEIGHT: u32 = 20;

/// Default chance of a refill producing a special element
const DEFAULT_SPECIAL_CHANCE: f64 = 0.05;

/// Weighted element distribution with an optional special-element chance
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPolicy {
    weights: Vec<(ElementKind, u32)>,
    special_chance: f64,
    special_kinds: Vec<ElementKind>,
}

impl SpawnPolicy {
    /// Build a policy from a weight table. Non-ordinary kinds and zero
    /// weights are dropped; specials are disabled until `with_special`.
    pub fn new(weights: &[(ElementKind, u32)]) -> Self {
        let weights = weights
            .iter()
            .copied()
            .filter(|(kind, weight)| kind.is_ordinary() && *weight > 0)
            .collect();
        Self {
            weights,
            special_chance: 0.0,
            special_kinds: Vec::new(),
        }
    }

    /// Enable special-element refills with the given chance and kind pool.
    /// The chance is clamped to [0, 1]; non-special kinds are dropped.
    pub fn with_special(mut self, chance: f64, kinds: &[ElementKind]) -> Self {
        self.special_chance = chance.clamp(0.0, 1.0);
        self.special_kinds = kinds.iter().copied().filter(|k| k.is_special()).collect();
        self
    }

    /// The ordinary weight table currently in effect
    pub fn weights(&self) -> &[(ElementKind, u32)] {
        &self.weights
    }

    /// Chance of a refill draw producing a special element
    pub fn special_chance(&self) -> f64 {
        self.special_chance
    }

    /// Refill draw: special kind with the configured chance, else weighted
    /// ordinary. Consumes a fixed number of RNG draws per call.
    pub fn sample(&self, rng: &mut SimpleRng) -> ElementKind {
        let roll = rng.next_f64();
        if !self.special_kinds.is_empty() && roll < self.special_chance {
            let idx = rng.next_range(self.special_kinds.len() as u32) as usize;
            return self.special_kinds[idx];
        }
        self.weighted(rng)
    }

    /// Generation draw: weighted ordinary only, never special
    pub fn sample_ordinary(&self, rng: &mut SimpleRng) -> ElementKind {
        self.weighted(rng)
    }

    fn weighted(&self, rng: &mut SimpleRng) -> ElementKind {
        let total: u32 = self.weights.iter().map(|(_, w)| w).sum();
        if total == 0 {
            // Empty table: fall back to the first color rather than panic.
            return ElementKind::Red;
        }
        let mut roll = rng.next_range(total);
        for &(kind, weight) in &self.weights {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        // Unreachable because roll < total, but keep the compiler honest.
        self.weights.last().map(|(k, _)| *k).unwrap_or(ElementKind::Red)
    }
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        let weights: Vec<(ElementKind, u32)> =
            ORDINARY_KINDS.iter().map(|&k| (k, DEFAULT_WEIGHT)).collect();
        SpawnPolicy::new(&weights).with_special(
            DEFAULT_SPECIAL_CHANCE,
            &[
                ElementKind::Bomb,
                ElementKind::RowClear,
                ElementKind::ColClear,
            ],
        )
    }
}
