//! Game session module - one level played move by move
//!
//! `GameSession` owns a board and the level's rules and walks them through
//! the move loop: validate a requested swap, apply it, resolve the cascade,
//! award score, track goals, and settle the session status. The session is
//! the integration surface for embedding layers; everything underneath it
//! (detection, cascades, scoring) stays pure and swappable.
//!
//! Like the core, a session is fully deterministic: construct two sessions
//! with the same rules and seed, feed them the same swaps, and they agree
//! on every record and every point.

use tracing::{debug, info};

use tilematch_core::generator::BoardGenerator;
use tilematch_core::resolver::{CascadeError, CascadeResolver, Resolution};
use tilematch_core::scoring::{self, ScoringConfig};
use tilematch_core::spawn::SpawnPolicy;
use tilematch_core::validator::MoveValidator;
use tilematch_core::{Board, SimpleRng};
use tilematch_types::{ElementKind, GridPos, RoundRecord, SwapMove};

/// A win condition the session tracks during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionGoal {
    /// Reach the given score
    Score { target: u32 },
    /// Eliminate the given number of cells of one kind
    Collect { kind: ElementKind, target: u32 },
}

impl SessionGoal {
    fn satisfied(&self, score: u32, collected: u32) -> bool {
        match self {
            SessionGoal::Score { target } => score >= *target,
            SessionGoal::Collect { target, .. } => collected >= *target,
        }
    }
}

/// One goal's standing, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub goal: SessionGoal,
    /// Score for score goals, eliminated-cell count for collect goals
    pub current: u32,
    pub done: bool,
}

/// Everything a session needs to run one level.
#[derive(Debug, Clone)]
pub struct LevelRules {
    pub rows: u8,
    pub cols: u8,
    /// Swaps the player may spend
    pub moves: u32,
    /// Star-rating base; also the target of the default score goal
    pub target_score: u32,
    /// Absolute star thresholds; derived from `target_score` when `None`
    pub star_thresholds: Option<[u32; 3]>,
    pub goals: Vec<SessionGoal>,
    pub spawn: SpawnPolicy,
    pub scoring: ScoringConfig,
    /// Fixed starting board; generated from the session seed when `None`
    pub preset: Option<Board>,
}

impl LevelRules {
    /// Rules with a single score goal and default spawn/scoring tables.
    pub fn new(rows: u8, cols: u8, moves: u32, target_score: u32) -> Self {
        Self {
            rows,
            cols,
            moves,
            target_score,
            star_thresholds: None,
            goals: vec![SessionGoal::Score {
                target: target_score,
            }],
            spawn: SpawnPolicy::default(),
            scoring: ScoringConfig::default(),
            preset: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    /// All goals met
    Completed,
    /// Moves exhausted with goals unmet
    Failed,
}

/// Lifecycle event raised by the last call that changed the session
/// (consumed by observers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// No legal swap exists; `reshuffle` is the expected recovery
    NoMovesAvailable,
    Reshuffled { attempts: u32, fallback: bool },
    Completed { stars: u8 },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapError {
    /// The session already completed or failed
    NotPlayable,
    OutOfBounds,
    NotAdjacent,
    /// The swap would not produce a match touching a swapped cell
    NoMatch,
    /// The cascade hit the round limit; the move was spent and the board
    /// is mid-cascade, `reshuffle` recovers
    CascadeOverflow { rounds: u32 },
}

impl SwapError {
    pub fn code(self) -> &'static str {
        match self {
            SwapError::NotPlayable => "not_playable",
            SwapError::OutOfBounds | SwapError::NotAdjacent | SwapError::NoMatch => "invalid_swap",
            SwapError::CascadeOverflow { .. } => "cascade_overflow",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SwapError::NotPlayable => "session is not accepting moves",
            SwapError::OutOfBounds => "swap position is off the board",
            SwapError::NotAdjacent => "cells are not orthogonally adjacent",
            SwapError::NoMatch => "swap would not produce a match",
            SwapError::CascadeOverflow { .. } => "cascade exceeded the round limit",
        }
    }
}

/// What one accepted swap did.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapOutcome {
    /// The cascade, round by round, for replay
    pub rounds: Vec<RoundRecord>,
    /// Score gained by this swap's cascade
    pub gained: u32,
    /// Session score after the swap
    pub total: u32,
}

/// One level being played: board, rules, score, and move budget.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    rules: LevelRules,
    rng: SimpleRng,
    validator: MoveValidator,
    resolver: CascadeResolver,
    generator: BoardGenerator,
    seed: u32,
    score: u32,
    moves_remaining: u32,
    /// Accepted swaps this session (monotonic)
    moves_made: u32,
    /// Board regenerations this session (monotonic)
    reshuffles: u32,
    /// Eliminated-cell counters, parallel to `rules.goals`
    collected: Vec<u32>,
    /// Cached legal moves for the current board
    possible_moves: Vec<SwapMove>,
    status: SessionStatus,
    /// Last lifecycle event (consumed by observers)
    last_event: Option<SessionEvent>,
}

impl GameSession {
    /// Start a session. The board comes from `rules.preset` when present,
    /// otherwise it is generated from the seed.
    pub fn new(rules: LevelRules, seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let generator = BoardGenerator::new();
        let board = match &rules.preset {
            Some(preset) => preset.clone(),
            None => {
                generator
                    .generate(rules.rows, rules.cols, &rules.spawn, &rules.scoring, &mut rng)
                    .board
            }
        };
        let validator = MoveValidator::new();
        let possible_moves = validator.find_possible_moves(&board, &rules.scoring);
        let collected = vec![0; rules.goals.len()];

        info!(
            seed,
            rows = board.rows(),
            cols = board.cols(),
            moves = rules.moves,
            target = rules.target_score,
            "session started"
        );

        let mut session = Self {
            board,
            moves_remaining: rules.moves,
            rules,
            rng,
            validator,
            resolver: CascadeResolver::new(),
            generator,
            seed,
            score: 0,
            moves_made: 0,
            reshuffles: 0,
            collected,
            possible_moves,
            status: SessionStatus::Playing,
            last_event: None,
        };
        if session.possible_moves.is_empty() {
            session.last_event = Some(SessionEvent::NoMovesAvailable);
        }
        session
    }

    /// Play one swap. On success the cascade has fully settled and the
    /// outcome carries its records; every error except `CascadeOverflow`
    /// leaves the session untouched.
    pub fn request_swap(&mut self, from: GridPos, to: GridPos) -> Result<SwapOutcome, SwapError> {
        if self.status != SessionStatus::Playing {
            return Err(SwapError::NotPlayable);
        }
        if !self.board.in_bounds(from) || !self.board.in_bounds(to) {
            return Err(SwapError::OutOfBounds);
        }
        if !from.is_adjacent(&to) {
            return Err(SwapError::NotAdjacent);
        }
        if self
            .validator
            .evaluate_swap(&self.board, from, to, &self.rules.scoring)
            .is_none()
        {
            return Err(SwapError::NoMatch);
        }

        self.board.swap(from, to);
        self.moves_made += 1;
        self.moves_remaining = self.moves_remaining.saturating_sub(1);

        let resolution = match self.resolver.resolve(
            &mut self.board,
            &self.rules.spawn,
            &self.rules.scoring,
            &mut self.rng,
        ) {
            Ok(resolution) => resolution,
            Err(CascadeError::RoundLimit { rounds }) => {
                self.refresh_possible_moves();
                return Err(SwapError::CascadeOverflow { rounds });
            }
        };

        let gained = resolution.total_score;
        self.score = self.score.saturating_add(gained);
        self.track_collections(&resolution);
        self.refresh_possible_moves();
        self.update_status();

        debug!(
            ?from,
            ?to,
            gained,
            total = self.score,
            rounds = resolution.rounds.len(),
            "swap resolved"
        );
        Ok(SwapOutcome {
            rounds: resolution.rounds,
            gained,
            total: self.score,
        })
    }

    /// Replace the board with a freshly generated one, keeping score and
    /// remaining moves. The recovery for the no-moves signal and for
    /// cascade overflows.
    pub fn reshuffle(&mut self) {
        if self.status != SessionStatus::Playing {
            return;
        }
        let generated = self.generator.generate(
            self.board.rows(),
            self.board.cols(),
            &self.rules.spawn,
            &self.rules.scoring,
            &mut self.rng,
        );
        self.board = generated.board;
        self.reshuffles += 1;
        self.refresh_possible_moves();
        self.last_event = Some(SessionEvent::Reshuffled {
            attempts: generated.attempts,
            fallback: generated.fallback,
        });
        info!(
            attempts = generated.attempts,
            fallback = generated.fallback,
            "board reshuffled"
        );
    }

    fn refresh_possible_moves(&mut self) {
        self.possible_moves = self
            .validator
            .find_possible_moves(&self.board, &self.rules.scoring);
    }

    fn track_collections(&mut self, resolution: &Resolution) {
        for round in &resolution.rounds {
            for eliminated in &round.eliminated {
                for (i, goal) in self.rules.goals.iter().enumerate() {
                    if let SessionGoal::Collect { kind, .. } = goal {
                        if *kind == eliminated.kind {
                            self.collected[i] = self.collected[i].saturating_add(1);
                        }
                    }
                }
            }
        }
    }

    fn update_status(&mut self) {
        if self.status != SessionStatus::Playing {
            return;
        }
        if self.goals_satisfied() {
            self.status = SessionStatus::Completed;
            let stars = self.stars();
            self.last_event = Some(SessionEvent::Completed { stars });
            info!(score = self.score, stars, "level completed");
            return;
        }
        if self.moves_remaining == 0 {
            self.status = SessionStatus::Failed;
            self.last_event = Some(SessionEvent::Failed);
            info!(
                score = self.score,
                target = self.rules.target_score,
                "out of moves"
            );
            return;
        }
        if self.possible_moves.is_empty() {
            self.last_event = Some(SessionEvent::NoMovesAvailable);
        }
    }

    fn goals_satisfied(&self) -> bool {
        self.rules
            .goals
            .iter()
            .zip(&self.collected)
            .all(|(goal, collected)| goal.satisfied(self.score, *collected))
    }

    /// Stars earned so far (0-3)
    pub fn stars(&self) -> u8 {
        match self.rules.star_thresholds {
            Some(thresholds) => thresholds.iter().filter(|t| self.score >= **t).count() as u8,
            None => scoring::stars_for(&self.rules.scoring, self.score, self.rules.target_score),
        }
    }

    /// Per-goal standing, in the order the rules listed them
    pub fn goal_progress(&self) -> Vec<GoalProgress> {
        self.rules
            .goals
            .iter()
            .zip(&self.collected)
            .map(|(goal, collected)| {
                let current = match goal {
                    SessionGoal::Score { .. } => self.score,
                    SessionGoal::Collect { .. } => *collected,
                };
                GoalProgress {
                    goal: *goal,
                    current,
                    done: goal.satisfied(self.score, *collected),
                }
            })
            .collect()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &LevelRules {
        &self.rules
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn moves_made(&self) -> u32 {
        self.moves_made
    }

    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    /// Legal moves on the current board (both directions of each pair)
    pub fn possible_moves(&self) -> &[SwapMove] {
        &self.possible_moves
    }

    pub fn has_moves(&self) -> bool {
        !self.possible_moves.is_empty()
    }

    pub fn take_last_event(&mut self) -> Option<SessionEvent> {
        self.last_event.take()
    }
}
