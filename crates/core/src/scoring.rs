//! Scoring module - pure score arithmetic over an injectable config
//!
//! Balance note:
//! Default values reproduce the historical balance sheet:
//! - base match score 100 per cell, shape factors 1.0 / 1.5 / 2.0 / 3.0
//!   (line / L / T / cross),
//! - combo multiplier 1.5 per extra cascade round, floored to integer,
//! - chain reaction bonus 200 per eliminated cell from the second round on,
//! - star thresholds at 1.0x / 1.5x / 2.2x of the level target.
//!
//! Everything here is a pure function of (config, inputs); no globals.

use tilematch_types::{ElementKind, Shape};

/// Balance parameters for scoring. Construct once per level and pass by
/// reference; `Default` is the stock balance sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Points per matched cell before shape/combo adjustments
    pub base_match_score: u32,
    /// Per-round multiplier applied from the third cascade round on
    pub combo_multiplier: f64,
    /// Flat bonus per eliminated cell for rounds after the first
    pub chain_reaction_bonus: u32,
    /// Flat bonus when the matched kind is a bomb
    pub bomb_score: u32,
    /// Flat bonus when the matched kind is a row/column clear
    pub line_clear_score: u32,
    /// Flat bonus when the matched kind is a color bomb
    pub color_bomb_score: u32,
    /// Flat bonus when the matched kind is a rainbow
    pub rainbow_score: u32,
    /// Star thresholds as multiples of the level target score
    pub star_multipliers: [f64; 3],
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_match_score: 100,
            combo_multiplier: 1.5,
            chain_reaction_bonus: 200,
            bomb_score: 500,
            line_clear_score: 300,
            color_bomb_score: 1000,
            rainbow_score: 1500,
            star_multipliers: [1.0, 1.5, 2.2],
        }
    }
}

/// Shape factor applied to the base match score
pub fn shape_factor(shape: Shape) -> f64 {
    match shape {
        Shape::Line(_) => 1.0,
        Shape::LShape => 1.5,
        Shape::TShape => 2.0,
        Shape::Cross => 3.0,
    }
}

/// Flat bonus for matching special elements (zero for ordinary kinds)
pub fn special_bonus(cfg: &ScoringConfig, kind: ElementKind) -> u32 {
    match kind {
        ElementKind::Bomb => cfg.bomb_score,
        ElementKind::RowClear | ElementKind::ColClear => cfg.line_clear_score,
        ElementKind::ColorBomb => cfg.color_bomb_score,
        ElementKind::Rainbow => cfg.rainbow_score,
        _ => 0,
    }
}

/// Score one match: base per-cell score times the shape factor, floored,
/// plus the flat special bonus when the matched kind is special.
pub fn match_score(cfg: &ScoringConfig, kind: ElementKind, cell_count: usize, shape: Shape) -> u32 {
    let base = cfg.base_match_score.saturating_mul(cell_count as u32);
    let shaped = (base as f64 * shape_factor(shape)).floor() as u32;
    shaped.saturating_add(special_bonus(cfg, kind))
}

/// Apply the combo multiplier to a round's base score.
///
/// `combo` counts cascade rounds beyond the first: 0 for the opening round,
/// 1 for the next, and so on. Values <= 1 leave the base unchanged; from 2
/// on the base is multiplied by `combo_multiplier^(combo-1)` and floored.
pub fn combo_score(cfg: &ScoringConfig, combo: u32, base: u32) -> u32 {
    if combo <= 1 {
        return base;
    }
    let factor = cfg.combo_multiplier.powi((combo - 1) as i32);
    (base as f64 * factor).floor() as u32
}

/// Chain reaction bonus: flat per-cell bonus, applied by the resolver once
/// per cascade round after the first.
pub fn chain_bonus(cfg: &ScoringConfig, chain_len: usize) -> u32 {
    cfg.chain_reaction_bonus.saturating_mul(chain_len as u32)
}

/// Absolute star thresholds for a level target score (ascending)
pub fn star_thresholds(cfg: &ScoringConfig, target_score: u32) -> [u32; 3] {
    let mut thresholds = [0u32; 3];
    for (slot, &mult) in thresholds.iter_mut().zip(cfg.star_multipliers.iter()) {
        *slot = (target_score as f64 * mult).floor() as u32;
    }
    thresholds
}

/// Stars earned for a final score (0-3); reaching a threshold counts
pub fn stars_for(cfg: &ScoringConfig, score: u32, target_score: u32) -> u8 {
    star_thresholds(cfg, target_score)
        .iter()
        .filter(|&&t| score >= t)
        .count() as u8
}
