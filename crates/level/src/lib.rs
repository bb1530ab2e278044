//! Level module - JSON level files and wire-format round records
//!
//! Levels are small JSON documents validated at load time and converted
//! into [`LevelRules`] for the engine. The DTOs here stay at the boundary;
//! nothing in the core or engine knows about serde or strings.
//!
//! A level file looks like:
//!
//! ```json
//! {
//!   "id": 3,
//!   "name": "Orchard",
//!   "rows": 9,
//!   "cols": 9,
//!   "moves": 25,
//!   "targetScore": 6000,
//!   "starThresholds": [6000, 9000, 13000],
//!   "spawn": { "weights": { "red": 20, "blue": 20, "green": 20 }, "specialChance": 0.05 },
//!   "goals": [
//!     { "kind": "score", "target": 6000 },
//!     { "kind": "collect", "element": "red", "count": 30 }
//!   ]
//! }
//! ```
//!
//! An optional `board` (grid of element names) pins the starting layout;
//! otherwise the engine generates one from the session seed. Element names
//! are matched case-insensitively.
//!
//! The module also carries the wire form of [`RoundRecord`]s
//! ([`RoundRecordDto`]), so embedding layers can stream settled cascade
//! rounds as JSON without touching core types.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use tilematch_core::{Board, MatchDetector, ScoringConfig, SpawnPolicy};
use tilematch_engine::{LevelRules, SessionGoal};
use tilematch_types::{ElementKind, MatchResult, RoundRecord, MAX_BOARD_DIM, MIN_RUN_LEN};

/// Special pool used when a level enables `specialChance` without
/// naming its own `specials`
const DEFAULT_SPECIALS: [ElementKind; 3] = [
    ElementKind::Bomb,
    ElementKind::RowClear,
    ElementKind::ColClear,
];

// ============== Level file DTOs ==============

/// One level definition as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub rows: u8,
    pub cols: u8,
    /// Swaps the player may spend
    pub moves: u32,
    #[serde(rename = "targetScore")]
    pub target_score: u32,
    /// Absolute star thresholds; derived from `targetScore` when absent
    #[serde(
        rename = "starThresholds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub star_thresholds: Option<[u32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn: Option<SpawnSpec>,
    /// Fixed starting board, row 0 first; generated from the seed when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<Vec<Vec<String>>>,
    pub goals: Vec<Goal>,
}

/// A win condition as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Goal {
    Score { target: u32 },
    Collect { element: String, count: u32 },
}

/// Refill distribution override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnSpec {
    /// Element name to weight; only ordinary colors are allowed
    pub weights: BTreeMap<String, u32>,
    #[serde(
        rename = "specialChance",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub special_chance: Option<f64>,
    /// Special kinds the chance draws from; bomb/rowClear/colClear when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specials: Option<Vec<String>>,
}

impl LevelSpec {
    /// A built-in level for when no file is given: 9x9, 20 moves, score goal.
    pub fn default_level() -> Self {
        Self {
            id: 1,
            name: Some("Quick Match".to_string()),
            rows: 9,
            cols: 9,
            moves: 20,
            target_score: 5000,
            star_thresholds: None,
            spawn: None,
            board: None,
            goals: vec![Goal::Score { target: 5000 }],
        }
    }

    /// Validate this spec and convert it into engine rules. Every check a
    /// level file can fail happens here, with the offending field named.
    pub fn rules(&self) -> Result<LevelRules> {
        if self.rows == 0 || self.rows as usize > MAX_BOARD_DIM {
            bail!(
                "level {}: rows must be between 1 and {}, got {}",
                self.id,
                MAX_BOARD_DIM,
                self.rows
            );
        }
        if self.cols == 0 || self.cols as usize > MAX_BOARD_DIM {
            bail!(
                "level {}: cols must be between 1 and {}, got {}",
                self.id,
                MAX_BOARD_DIM,
                self.cols
            );
        }
        if (self.rows as usize) < MIN_RUN_LEN && (self.cols as usize) < MIN_RUN_LEN {
            bail!(
                "level {}: a {}x{} board can never contain a run",
                self.id,
                self.rows,
                self.cols
            );
        }
        if self.moves == 0 {
            bail!("level {}: moves must be positive", self.id);
        }
        if self.target_score == 0 {
            bail!("level {}: targetScore must be positive", self.id);
        }
        if let Some(t) = self.star_thresholds {
            if !(t[0] < t[1] && t[1] < t[2]) {
                bail!(
                    "level {}: starThresholds must be strictly ascending, got {:?}",
                    self.id,
                    t
                );
            }
        }
        if self.goals.is_empty() {
            bail!("level {}: at least one goal is required", self.id);
        }

        let goals = self.session_goals()?;
        let spawn = self.spawn_policy()?;
        let preset = self.preset_board()?;

        Ok(LevelRules {
            rows: self.rows,
            cols: self.cols,
            moves: self.moves,
            target_score: self.target_score,
            star_thresholds: self.star_thresholds,
            goals,
            spawn,
            scoring: ScoringConfig::default(),
            preset,
        })
    }

    fn session_goals(&self) -> Result<Vec<SessionGoal>> {
        let mut goals = Vec::with_capacity(self.goals.len());
        for (i, goal) in self.goals.iter().enumerate() {
            match goal {
                Goal::Score { target } => {
                    if *target == 0 {
                        bail!("level {}: goal {}: score target must be positive", self.id, i);
                    }
                    goals.push(SessionGoal::Score { target: *target });
                }
                Goal::Collect { element, count } => {
                    if *count == 0 {
                        bail!("level {}: goal {}: collect count must be positive", self.id, i);
                    }
                    let kind = ElementKind::from_str(element).with_context(|| {
                        format!("level {}: goal {}: unknown element {:?}", self.id, i, element)
                    })?;
                    if kind.is_empty() {
                        bail!("level {}: goal {}: cannot collect empty cells", self.id, i);
                    }
                    goals.push(SessionGoal::Collect {
                        kind,
                        target: *count,
                    });
                }
            }
        }
        Ok(goals)
    }

    fn spawn_policy(&self) -> Result<SpawnPolicy> {
        let Some(spec) = &self.spawn else {
            return Ok(SpawnPolicy::default());
        };

        let mut weights = Vec::with_capacity(spec.weights.len());
        for (name, weight) in &spec.weights {
            let kind = ElementKind::from_str(name)
                .with_context(|| format!("level {}: spawn weight: unknown element {:?}", self.id, name))?;
            if !kind.is_ordinary() {
                bail!(
                    "level {}: spawn weight for {:?}: only ordinary colors spawn by weight",
                    self.id,
                    name
                );
            }
            weights.push((kind, *weight));
        }
        if weights.iter().all(|(_, w)| *w == 0) {
            bail!(
                "level {}: spawn weights need at least one positive ordinary color",
                self.id
            );
        }
        let mut policy = SpawnPolicy::new(&weights);

        if let Some(chance) = spec.special_chance {
            if !(0.0..=1.0).contains(&chance) {
                bail!(
                    "level {}: specialChance must be within 0..1, got {}",
                    self.id,
                    chance
                );
            }
            let specials = match &spec.specials {
                None => DEFAULT_SPECIALS.to_vec(),
                Some(names) => {
                    let mut kinds = Vec::with_capacity(names.len());
                    for name in names {
                        let kind = ElementKind::from_str(name).with_context(|| {
                            format!("level {}: specials: unknown element {:?}", self.id, name)
                        })?;
                        if !kind.is_special() {
                            bail!(
                                "level {}: specials: {:?} is not a special element",
                                self.id,
                                name
                            );
                        }
                        kinds.push(kind);
                    }
                    kinds
                }
            };
            policy = policy.with_special(chance, &specials);
        }
        Ok(policy)
    }

    fn preset_board(&self) -> Result<Option<Board>> {
        let Some(rows) = &self.board else {
            return Ok(None);
        };

        if rows.len() != self.rows as usize {
            bail!(
                "level {}: board has {} rows, expected {}",
                self.id,
                rows.len(),
                self.rows
            );
        }
        let mut grid = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            if row.len() != self.cols as usize {
                bail!(
                    "level {}: board row {} has {} cells, expected {}",
                    self.id,
                    r,
                    row.len(),
                    self.cols
                );
            }
            let mut kinds = Vec::with_capacity(row.len());
            for (c, name) in row.iter().enumerate() {
                let kind = ElementKind::from_str(name).with_context(|| {
                    format!("level {}: board cell {},{}: unknown element {:?}", self.id, r, c, name)
                })?;
                if kind.is_empty() {
                    bail!(
                        "level {}: board cell {},{}: holes are not supported",
                        self.id,
                        r,
                        c
                    );
                }
                kinds.push(kind);
            }
            grid.push(kinds);
        }

        let board = match Board::from_rows(&grid) {
            Some(board) => board,
            None => bail!("level {}: board grid is not well-formed", self.id),
        };
        let matches = MatchDetector::new().find_matches(&board, &ScoringConfig::default());
        if !matches.is_empty() {
            bail!(
                "level {}: board starts with {} ready-made match(es)",
                self.id,
                matches.len()
            );
        }
        Ok(Some(board))
    }
}

/// Parse and validate one level document.
pub fn parse_level(text: &str) -> Result<LevelSpec> {
    let spec: LevelSpec = serde_json::from_str(text).context("malformed level JSON")?;
    spec.rules()?;
    Ok(spec)
}

/// Load and validate a level file.
pub fn load_level(path: &Path) -> Result<LevelSpec> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read level file {}", path.display()))?;
    parse_level(&text).with_context(|| format!("invalid level file {}", path.display()))
}

// ============== Round record wire format ==============

/// Board coordinate on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosDto {
    pub row: u8,
    pub col: u8,
}

/// A matched cell: id plus where it sat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRefDto {
    pub id: u64,
    pub row: u8,
    pub col: u8,
}

/// One match inside a settled round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDto {
    pub kind: String,
    pub shape: String,
    pub cells: Vec<CellRefDto>,
    pub anchor: PosDto,
    pub score: u32,
    #[serde(
        rename = "specialReward",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub special_reward: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminatedDto {
    pub id: u64,
    pub row: u8,
    pub col: u8,
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallenDto {
    pub id: u64,
    pub from: PosDto,
    pub to: PosDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnedDto {
    pub id: u64,
    pub row: u8,
    pub col: u8,
    pub kind: String,
}

/// Wire form of one settled cascade round, for replay and analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecordDto {
    pub round: u32,
    pub combo: u32,
    #[serde(rename = "roundScore")]
    pub round_score: u32,
    pub matches: Vec<MatchDto>,
    pub eliminated: Vec<EliminatedDto>,
    pub fallen: Vec<FallenDto>,
    pub spawned: Vec<SpawnedDto>,
}

impl From<&MatchResult> for MatchDto {
    fn from(m: &MatchResult) -> Self {
        Self {
            kind: m.kind.as_str().to_string(),
            shape: m.shape.as_str().to_string(),
            cells: m
                .cells
                .iter()
                .map(|c| CellRefDto {
                    id: c.id,
                    row: c.pos.row,
                    col: c.pos.col,
                })
                .collect(),
            anchor: PosDto {
                row: m.anchor.row,
                col: m.anchor.col,
            },
            score: m.score,
            special_reward: m.special_reward.map(|k| k.as_str().to_string()),
        }
    }
}

impl From<&RoundRecord> for RoundRecordDto {
    fn from(r: &RoundRecord) -> Self {
        Self {
            round: r.round,
            combo: r.combo,
            round_score: r.round_score,
            matches: r.matches.iter().map(MatchDto::from).collect(),
            eliminated: r
                .eliminated
                .iter()
                .map(|e| EliminatedDto {
                    id: e.id,
                    row: e.pos.row,
                    col: e.pos.col,
                    kind: e.kind.as_str().to_string(),
                })
                .collect(),
            fallen: r
                .fallen
                .iter()
                .map(|f| FallenDto {
                    id: f.id,
                    from: PosDto {
                        row: f.from.row,
                        col: f.from.col,
                    },
                    to: PosDto {
                        row: f.to.row,
                        col: f.to.col,
                    },
                })
                .collect(),
            spawned: r
                .spawned
                .iter()
                .map(|s| SpawnedDto {
                    id: s.id,
                    row: s.pos.row,
                    col: s.pos.col,
                    kind: s.kind.as_str().to_string(),
                })
                .collect(),
        }
    }
}
