//! Engine module - plays a level on top of the core simulation
//!
//! The core crate knows how to detect, validate, and resolve; this crate
//! knows how to *play*: it binds a board to a level's rules (move budget,
//! target score, goals) and exposes the swap-request loop an embedding
//! layer drives.
//!
//! # Session Lifecycle
//!
//! 1. **Construction**: build [`LevelRules`] (usually from a level file)
//!    and a [`GameSession`] with a seed; the board is generated or taken
//!    from the rules' preset
//! 2. **Play**: call [`GameSession::request_swap`] per player move; each
//!    accepted swap returns the settled cascade's [`SwapOutcome`]
//! 3. **Recovery**: when [`GameSession::has_moves`] reports false (or a
//!    swap fails with `cascade_overflow`), call [`GameSession::reshuffle`]
//! 4. **End**: the session flips to `Completed` when every goal is met, or
//!    `Failed` when the move budget runs out first
//!
//! Events worth surfacing (completion, failure, the no-moves signal,
//! reshuffles) are raised through [`GameSession::take_last_event`].
//!
//! Sessions are deterministic: the same rules, seed, and swap sequence
//! replay to the same scores, records, and status.

pub mod session;

pub use tilematch_core as core;
pub use tilematch_types as types;

pub use session::{
    GameSession, GoalProgress, LevelRules, SessionEvent, SessionGoal, SessionStatus, SwapError,
    SwapOutcome,
};
