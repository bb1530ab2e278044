//! Core simulation logic - pure, deterministic, and testable
//!
//! This module contains the whole tile-matching simulation: match detection,
//! move validation, cascade resolution, scoring, and board generation. It has
//! **zero dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same board and seed produce identical cascades
//! - **Testable**: Every rule is exercised by unit tests on small boards
//! - **Portable**: Can run anywhere (server, tooling, headless simulation)
//! - **Replayable**: Round records carry cell ids so embedding layers can
//!   re-animate a cascade without re-running it
//!
//! # Module Structure
//!
//! - [`board`]: the tile grid with per-cell ids and gravity compaction
//! - [`detector`]: maximal-run scanning and L/T/Cross shape classification
//! - [`validator`]: swap legality and possible-move enumeration
//! - [`resolver`]: the cascade state machine (eliminate, fall, refill)
//! - [`scoring`]: score assembly, combo and chain bonuses, star ratings
//! - [`spawn`]: weighted refill policy with an optional special-kind roll
//! - [`generator`]: starting boards with no ready-made match
//! - [`rng`]: the small deterministic RNG used wherever randomness is needed
//!
//! # Simulation Rules
//!
//! - **Runs**: three or more same-kind cells in a straight line match;
//!   runs are always maximal
//! - **Shapes**: runs crossing at a pivot merge into L, T, or Cross matches
//! - **Rewards**: a five-run leaves a ColorBomb, shaped matches leave a
//!   Bomb, a four-run leaves a RowClear or ColClear along its axis
//! - **Cascades**: eliminated cells make room, cells above fall, refills
//!   spawn at the top, and detection runs again until the board is stable
//! - **Combo**: every cascade round past the first steps the combo counter,
//!   multiplying that round's score
//!
//! # Example
//!
//! ```
//! use tilematch_core::{Board, CascadeResolver, ScoringConfig, SimpleRng, SpawnPolicy};
//! use tilematch_core::types::ElementKind::{Blue, Green, Red, Yellow};
//!
//! let mut board = Board::from_rows(&[
//!     vec![Blue, Red, Red, Red, Yellow],
//!     vec![Green, Yellow, Green, Yellow, Green],
//!     vec![Yellow, Green, Yellow, Green, Yellow],
//! ])
//! .expect("well-formed grid");
//!
//! let resolver = CascadeResolver::new();
//! let resolution = resolver
//!     .resolve(
//!         &mut board,
//!         &SpawnPolicy::default(),
//!         &ScoringConfig::default(),
//!         &mut SimpleRng::new(42),
//!     )
//!     .expect("the cascade settles");
//!
//! assert_eq!(resolution.rounds[0].round, 1);
//! assert!(resolution.total_score >= 300); // the Red three-run, at least
//! ```
//!
//! # Determinism
//!
//! All randomness flows through [`SimpleRng`]; no system entropy, clocks,
//! or thread timing are consulted anywhere. Given the same starting board,
//! spawn policy, scoring config, and RNG seed, every operation in this
//! crate replays bit-for-bit, which is what makes recorded rounds and
//! seeded level files trustworthy.

pub mod board;
pub mod detector;
pub mod generator;
pub mod resolver;
pub mod rng;
pub mod scoring;
pub mod spawn;
pub mod validator;

pub use tilematch_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, ColumnShift};
pub use detector::MatchDetector;
pub use generator::{BoardGenerator, GeneratedBoard};
pub use resolver::{CascadeError, CascadeResolver, ResolvePhase, Resolution};
pub use rng::SimpleRng;
pub use scoring::{chain_bonus, combo_score, match_score, star_thresholds, stars_for, ScoringConfig};
pub use spawn::SpawnPolicy;
pub use validator::MoveValidator;
