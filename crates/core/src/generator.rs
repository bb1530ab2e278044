//! Board generation module - produces playable starting boards
//!
//! Random fills are cheap but often contain a ready-made run, so generation
//! is rejection-based: draw a full board from the spawn policy, throw it
//! away if detection finds anything or if fewer than `MIN_LEGAL_MOVES`
//! swaps are available, and try again. When the attempt budget runs out
//! (tight boards with few kinds can exhaust it), a parity-patterned board
//! is used instead; the pattern never contains a run by construction.

use tracing::{debug, warn};

use tilematch_types::{
    GENERATOR_MAX_ATTEMPTS, MIN_LEGAL_MOVES, NEIGHBOR_OFFSETS, ORDINARY_KINDS,
};

use crate::board::Board;
use crate::detector::MatchDetector;
use crate::rng::SimpleRng;
use crate::scoring::ScoringConfig;
use crate::spawn::SpawnPolicy;
use crate::validator::MoveValidator;

/// Chance that the fallback pattern perturbs a given cell
const PATTERN_NOISE_CHANCE: f64 = 0.3;

/// A generated board plus how it came to be.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedBoard {
    pub board: Board,
    /// Random fills drawn, including the accepted one
    pub attempts: u32,
    /// True when the attempt budget ran out and the parity pattern was used
    pub fallback: bool,
}

/// Builds starting boards that are stable (no initial match) and playable.
#[derive(Debug, Clone)]
pub struct BoardGenerator {
    detector: MatchDetector,
    validator: MoveValidator,
}

impl BoardGenerator {
    pub fn new() -> Self {
        Self {
            detector: MatchDetector::new(),
            validator: MoveValidator::new(),
        }
    }

    /// Generate a `rows x cols` board. Ordinary kinds are drawn from
    /// `policy`'s weights; specials never appear in a starting board.
    /// Deterministic for a given RNG state.
    pub fn generate(
        &self,
        rows: u8,
        cols: u8,
        policy: &SpawnPolicy,
        cfg: &ScoringConfig,
        rng: &mut SimpleRng,
    ) -> GeneratedBoard {
        for attempt in 1..=GENERATOR_MAX_ATTEMPTS {
            let board = self.random_fill(rows, cols, policy, rng);
            if !self.detector.find_matches(&board, cfg).is_empty() {
                debug!(attempt, "random board rejected: initial match");
                continue;
            }
            let moves = self.validator.find_possible_moves(&board, cfg).len();
            if moves < MIN_LEGAL_MOVES {
                debug!(attempt, moves, "random board rejected: not enough moves");
                continue;
            }
            debug!(attempt, moves, "random board accepted");
            return GeneratedBoard {
                board,
                attempts: attempt,
                fallback: false,
            };
        }

        warn!(
            attempts = GENERATOR_MAX_ATTEMPTS,
            "random generation exhausted, using the parity pattern"
        );
        GeneratedBoard {
            board: self.pattern_board(rows, cols, rng),
            attempts: GENERATOR_MAX_ATTEMPTS,
            fallback: true,
        }
    }

    fn random_fill(
        &self,
        rows: u8,
        cols: u8,
        policy: &SpawnPolicy,
        rng: &mut SimpleRng,
    ) -> Board {
        let mut board = Board::new(rows, cols);
        for pos in board.positions().collect::<Vec<_>>() {
            board.set_kind(pos, policy.sample_ordinary(rng));
        }
        board
    }

    /// Deterministic fallback: four shuffled kinds laid out by row/col
    /// parity, so orthogonal neighbors always differ and no run can exist.
    /// A light noise pass keeps repeated fallbacks from looking identical;
    /// a cell may only change to a kind that differs from all four
    /// orthogonal neighbors, which preserves the no-run guarantee.
    fn pattern_board(&self, rows: u8, cols: u8, rng: &mut SimpleRng) -> Board {
        let mut palette = ORDINARY_KINDS;
        rng.shuffle(&mut palette);

        let mut board = Board::new(rows, cols);
        for pos in board.positions().collect::<Vec<_>>() {
            let slot = (pos.row % 2) * 2 + (pos.col % 2);
            board.set_kind(pos, palette[slot as usize]);
        }

        for pos in board.positions().collect::<Vec<_>>() {
            if rng.next_f64() >= PATTERN_NOISE_CHANCE {
                continue;
            }
            let candidate = palette[rng.next_range(palette.len() as u32) as usize];
            let clashes = NEIGHBOR_OFFSETS.iter().any(|&(dr, dc)| match pos.offset(dr, dc) {
                Some(n) if board.in_bounds(n) => board.kind_at(n) == candidate,
                _ => false,
            });
            if !clashes {
                board.set_kind(pos, candidate);
            }
        }
        board
    }
}

impl Default for BoardGenerator {
    fn default() -> Self {
        Self::new()
    }
}
