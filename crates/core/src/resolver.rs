//! Cascade resolution module - settles a board after a legal swap
//!
//! One `resolve` call runs the full elimination/gravity/refill cycle until
//! the board is stable. The cycle is an explicit state machine:
//!
//! ```text
//! Detecting -> Eliminating -> Falling -> Spawning -> Detecting | Stable
//! ```
//!
//! Every pass through the machine is one cascade round. Rounds are recorded
//! as `RoundRecord`s carrying cell ids, so an embedding layer can replay the
//! whole cascade (animations, analytics) without re-running the simulation.
//! Given the same starting board and RNG state, `resolve` is a pure
//! function: identical inputs produce identical records.

use tracing::{error, trace};

use tilematch_types::{
    EliminatedCell, FallenCell, MatchResult, RoundRecord, SpawnedCell, MAX_CASCADE_ROUNDS,
};

use crate::board::Board;
use crate::detector::MatchDetector;
use crate::rng::SimpleRng;
use crate::scoring::{self, ScoringConfig};
use crate::spawn::SpawnPolicy;

/// Phase of the cascade state machine.
///
/// `Falling` and `Spawning` are driven by the same bottom-up column pass
/// (`Board::compact_column` refills as it drops), so the Falling arm
/// collects both record kinds and the Spawning arm seals the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePhase {
    Detecting,
    Eliminating,
    Falling,
    Spawning,
    Stable,
}

/// Everything one `resolve` call did, round by round.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// One record per cascade round, in order
    pub rounds: Vec<RoundRecord>,
    /// Sum of all round scores
    pub total_score: u32,
    /// Highest combo value reached (0 when the cascade ended in one round)
    pub peak_combo: u32,
}

impl Resolution {
    /// True when detection found nothing and the board was left untouched
    pub fn is_quiet(&self) -> bool {
        self.rounds.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeError {
    /// The cascade kept finding matches past `MAX_CASCADE_ROUNDS`. Reached
    /// only with degenerate spawn policies (e.g. a single-kind pool); the
    /// board is left mid-cascade and the caller decides how to recover.
    RoundLimit { rounds: u32 },
}

impl CascadeError {
    pub fn code(self) -> &'static str {
        match self {
            CascadeError::RoundLimit { .. } => "round_limit",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            CascadeError::RoundLimit { .. } => "cascade exceeded the round limit",
        }
    }
}

/// Per-round working set, filled across the phase arms and drained into a
/// `RoundRecord` when the round seals.
#[derive(Default)]
struct RoundScratch {
    matches: Vec<MatchResult>,
    eliminated: Vec<EliminatedCell>,
    fallen: Vec<FallenCell>,
    spawned: Vec<SpawnedCell>,
}

/// Runs cascades to completion over an exclusively borrowed board.
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    detector: MatchDetector,
}

impl CascadeResolver {
    pub fn new() -> Self {
        Self {
            detector: MatchDetector::new(),
        }
    }

    /// Use a detector with a non-default minimum run length.
    pub fn with_detector(detector: MatchDetector) -> Self {
        Self { detector }
    }

    /// Settle the board: eliminate matches, drop cells, refill from the
    /// spawn policy, and repeat until detection finds nothing.
    ///
    /// On a board with no matches this returns a quiet `Resolution` and
    /// changes nothing. Cell refills and the cascade's scoring draw from
    /// `policy`/`rng`/`cfg` only, never from ambient state.
    pub fn resolve(
        &self,
        board: &mut Board,
        policy: &SpawnPolicy,
        cfg: &ScoringConfig,
        rng: &mut SimpleRng,
    ) -> Result<Resolution, CascadeError> {
        let mut rounds: Vec<RoundRecord> = Vec::new();
        let mut total_score: u32 = 0;
        let mut combo: u32 = 0;
        let mut scratch = RoundScratch::default();

        let mut phase = ResolvePhase::Detecting;
        loop {
            phase = match phase {
                ResolvePhase::Detecting => {
                    scratch.matches = self.detector.find_matches(board, cfg);
                    if scratch.matches.is_empty() {
                        ResolvePhase::Stable
                    } else {
                        let round = rounds.len() as u32 + 1;
                        if round > MAX_CASCADE_ROUNDS {
                            error!(
                                rounds = round,
                                "cascade did not settle; aborting resolution"
                            );
                            return Err(CascadeError::RoundLimit { rounds: round });
                        }
                        if round > 1 {
                            combo += 1;
                        }
                        ResolvePhase::Eliminating
                    }
                }

                ResolvePhase::Eliminating => {
                    for m in &scratch.matches {
                        for mc in &m.cells {
                            if let Some(prev) = board.clear_cell(mc.pos) {
                                if !prev.kind.is_empty() {
                                    scratch.eliminated.push(EliminatedCell {
                                        id: prev.id,
                                        pos: mc.pos,
                                        kind: prev.kind,
                                    });
                                }
                            }
                        }
                    }
                    // Special rewards appear at their anchors before gravity,
                    // so they fall with the column like any other cell.
                    for m in &scratch.matches {
                        if let Some(kind) = m.special_reward {
                            if board.set_kind(m.anchor, kind) {
                                if let Some(cell) = board.get(m.anchor) {
                                    scratch.spawned.push(SpawnedCell {
                                        id: cell.id,
                                        pos: m.anchor,
                                        kind,
                                    });
                                }
                            }
                        }
                    }
                    ResolvePhase::Falling
                }

                ResolvePhase::Falling => {
                    for col in 0..board.cols() {
                        let shift = board.compact_column(col, || policy.sample(rng));
                        scratch.fallen.extend(shift.fallen.iter().copied());
                        scratch.spawned.extend(shift.spawned.iter().copied());
                    }
                    ResolvePhase::Spawning
                }

                ResolvePhase::Spawning => {
                    // Refills landed during the Falling pass; seal the round.
                    let round = rounds.len() as u32 + 1;
                    let RoundScratch {
                        matches,
                        eliminated,
                        fallen,
                        spawned,
                    } = std::mem::take(&mut scratch);

                    let match_total = matches
                        .iter()
                        .fold(0u32, |acc, m| acc.saturating_add(m.score));
                    let mut round_score = scoring::combo_score(cfg, combo, match_total);
                    if round > 1 {
                        round_score =
                            round_score.saturating_add(scoring::chain_bonus(cfg, eliminated.len()));
                    }
                    total_score = total_score.saturating_add(round_score);
                    trace!(
                        round,
                        combo,
                        round_score,
                        cells = eliminated.len(),
                        "cascade round settled"
                    );
                    rounds.push(RoundRecord {
                        round,
                        matches,
                        eliminated,
                        fallen,
                        spawned,
                        round_score,
                        combo,
                    });
                    ResolvePhase::Detecting
                }

                ResolvePhase::Stable => break,
            };
        }

        Ok(Resolution {
            rounds,
            total_score,
            peak_combo: combo,
        })
    }
}

impl Default for CascadeResolver {
    fn default() -> Self {
        Self::new()
    }
}
