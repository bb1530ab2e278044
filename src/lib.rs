//! Tilematch (workspace facade crate).
//!
//! This package keeps the `tilematch::{core,engine,level,types}` public API
//! in one place while the implementation lives in dedicated crates under
//! `crates/`.

pub use tilematch_core as core;
pub use tilematch_engine as engine;
pub use tilematch_level as level;
pub use tilematch_types as types;
