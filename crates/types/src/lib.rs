//! Shared types module - vocabulary for the match-3 simulation
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (core simulation, session driver, level files,
//! replay tooling).
//!
//! # Board Dimensions
//!
//! Standard board dimensions (levels may override within limits):
//!
//! - **Rows**: 9 (indexed 0-8, row 0 is the TOP row)
//! - **Cols**: 9 (indexed 0-8)
//! - Gravity pulls cells toward HIGHER row indices.
//!
//! # Element Kinds
//!
//! Numeric codes are stable and match the historical level data:
//!
//! | Kind | Code | Description |
//! |------|------|-------------|
//! | `Empty` | 0 | Vacant cell |
//! | `Red`..`Orange` | 1-6 | Ordinary matchable colors |
//! | `Bomb` | 10 | Clears a surrounding area |
//! | `RowClear` | 11 | Clears its row |
//! | `ColClear` | 12 | Clears its column |
//! | `ColorBomb` | 13 | Clears every cell of one color |
//! | `Rainbow` | 14 | Clears the whole board |
//!
//! # Structural Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_RUN_LEN` | 3 | Shortest run that counts as a match |
//! | `MAX_CASCADE_ROUNDS` | 64 | Cascade iterations before bailing out |
//! | `GENERATOR_MAX_ATTEMPTS` | 100 | Random fills tried before the pattern fallback |
//! | `MIN_LEGAL_MOVES` | 3 | Moves a generated board must offer |
//!
//! # Examples
//!
//! ```
//! use tilematch_types::{ElementKind, GridPos, Shape, Axis, MIN_RUN_LEN};
//!
//! // Parse from string (case-insensitive)
//! let kind = ElementKind::from_str("red").unwrap();
//! assert_eq!(kind, ElementKind::Red);
//! assert!(kind.is_ordinary());
//!
//! // Stable numeric codes survive round-trips
//! assert_eq!(ElementKind::from_code(13), Some(ElementKind::ColorBomb));
//! assert_eq!(ElementKind::ColorBomb.code(), 13);
//!
//! // Positions are row/col with row 0 on top
//! let pos = GridPos::new(4, 4);
//! assert_eq!(pos.offset(-1, 0), Some(GridPos::new(3, 4)));
//! assert_eq!(GridPos::new(0, 0).offset(-1, 0), None);
//!
//! // Shapes carry the run axis for plain lines
//! let shape = Shape::Line(Axis::Horizontal);
//! assert_eq!(shape.as_str(), "horizontal");
//! assert_eq!(MIN_RUN_LEN, 3);
//! ```

/// Default board rows (9, row 0 on top)
pub const DEFAULT_BOARD_ROWS: u8 = 9;

/// Default board cols (9)
pub const DEFAULT_BOARD_COLS: u8 = 9;

/// Shortest run of same-kind cells that counts as a match
pub const MIN_RUN_LEN: usize = 3;

/// Cascade iterations allowed before the resolver reports a configuration error
pub const MAX_CASCADE_ROUNDS: u32 = 64;

/// Random board fills attempted before falling back to the parity pattern
pub const GENERATOR_MAX_ATTEMPTS: u32 = 100;

/// Legal moves a randomly generated board must offer to be accepted
pub const MIN_LEGAL_MOVES: usize = 3;

/// Largest supported board edge (level files are rejected beyond this)
pub const MAX_BOARD_DIM: usize = 16;

/// The element kinds that can occupy a board cell
///
/// Six ordinary colors match by kind equality; special kinds are rewards
/// spawned by large or shaped matches. Numeric codes are stable (see the
/// module table) so historical board data stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementKind {
    Empty = 0,
    Red = 1,
    Blue = 2,
    Green = 3,
    Yellow = 4,
    Purple = 5,
    Orange = 6,
    Bomb = 10,
    RowClear = 11,
    ColClear = 12,
    ColorBomb = 13,
    Rainbow = 14,
}

/// The six ordinary colors in code order (spawn tables index into this)
pub const ORDINARY_KINDS: [ElementKind; 6] = [
    ElementKind::Red,
    ElementKind::Blue,
    ElementKind::Green,
    ElementKind::Yellow,
    ElementKind::Purple,
    ElementKind::Orange,
];

impl ElementKind {
    /// True for the six matchable colors
    pub fn is_ordinary(&self) -> bool {
        matches!(
            self,
            ElementKind::Red
                | ElementKind::Blue
                | ElementKind::Green
                | ElementKind::Yellow
                | ElementKind::Purple
                | ElementKind::Orange
        )
    }

    /// True for reward kinds (bomb, row/col clear, color bomb, rainbow)
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            ElementKind::Bomb
                | ElementKind::RowClear
                | ElementKind::ColClear
                | ElementKind::ColorBomb
                | ElementKind::Rainbow
        )
    }

    /// True only for `Empty`
    pub fn is_empty(&self) -> bool {
        matches!(self, ElementKind::Empty)
    }

    /// Stable numeric code (see the module table)
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parse a stable numeric code back into a kind
    ///
    /// # Examples
    ///
    /// ```
    /// use tilematch_types::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_code(0), Some(ElementKind::Empty));
    /// assert_eq!(ElementKind::from_code(6), Some(ElementKind::Orange));
    /// assert_eq!(ElementKind::from_code(10), Some(ElementKind::Bomb));
    /// assert_eq!(ElementKind::from_code(7), None);
    /// ```
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ElementKind::Empty),
            1 => Some(ElementKind::Red),
            2 => Some(ElementKind::Blue),
            3 => Some(ElementKind::Green),
            4 => Some(ElementKind::Yellow),
            5 => Some(ElementKind::Purple),
            6 => Some(ElementKind::Orange),
            10 => Some(ElementKind::Bomb),
            11 => Some(ElementKind::RowClear),
            12 => Some(ElementKind::ColClear),
            13 => Some(ElementKind::ColorBomb),
            14 => Some(ElementKind::Rainbow),
            _ => None,
        }
    }

    /// Parse element kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tilematch_types::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_str("red"), Some(ElementKind::Red));
    /// assert_eq!(ElementKind::from_str("COLORBOMB"), Some(ElementKind::ColorBomb));
    /// assert_eq!(ElementKind::from_str("rowClear"), Some(ElementKind::RowClear));
    /// assert_eq!(ElementKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "empty" => Some(ElementKind::Empty),
            "red" => Some(ElementKind::Red),
            "blue" => Some(ElementKind::Blue),
            "green" => Some(ElementKind::Green),
            "yellow" => Some(ElementKind::Yellow),
            "purple" => Some(ElementKind::Purple),
            "orange" => Some(ElementKind::Orange),
            "bomb" => Some(ElementKind::Bomb),
            "rowclear" => Some(ElementKind::RowClear),
            "colclear" => Some(ElementKind::ColClear),
            "colorbomb" => Some(ElementKind::ColorBomb),
            "rainbow" => Some(ElementKind::Rainbow),
            _ => None,
        }
    }

    /// Convert to camelCase string for level files and diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Empty => "empty",
            ElementKind::Red => "red",
            ElementKind::Blue => "blue",
            ElementKind::Green => "green",
            ElementKind::Yellow => "yellow",
            ElementKind::Purple => "purple",
            ElementKind::Orange => "orange",
            ElementKind::Bomb => "bomb",
            ElementKind::RowClear => "rowClear",
            ElementKind::ColClear => "colClear",
            ElementKind::ColorBomb => "colorBomb",
            ElementKind::Rainbow => "rainbow",
        }
    }
}

/// Run axis for straight-line matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Match shape classification
///
/// - **Line**: a single straight run (axis recorded)
/// - **LShape**: two runs joined at an endpoint of at least one of them
/// - **TShape**: two runs joined through interior cells
/// - **Cross**: merged cluster of 5+ cells spanning both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Line(Axis),
    LShape,
    TShape,
    Cross,
}

impl Shape {
    /// Convert to lowercase string for logs and round records
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Line(Axis::Horizontal) => "horizontal",
            Shape::Line(Axis::Vertical) => "vertical",
            Shape::LShape => "l",
            Shape::TShape => "t",
            Shape::Cross => "cross",
        }
    }
}

/// A board position: `row` 0 is the top row, gravity pulls toward higher rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub row: u8,
    pub col: u8,
}

impl GridPos {
    pub fn new(row: u8, col: u8) -> Self {
        GridPos { row, col }
    }

    /// Offset by signed deltas; `None` if the result would leave u8 range.
    ///
    /// Board-level bounds are checked by the board itself; this only guards
    /// the numeric domain so callers can probe neighbors without wrapping.
    pub fn offset(&self, dr: i16, dc: i16) -> Option<GridPos> {
        let row = self.row as i16 + dr;
        let col = self.col as i16 + dc;
        if (0..=u8::MAX as i16).contains(&row) && (0..=u8::MAX as i16).contains(&col) {
            Some(GridPos::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// True when `other` is exactly one step away along one axis
    pub fn is_adjacent(&self, other: &GridPos) -> bool {
        let dr = (self.row as i16 - other.row as i16).abs();
        let dc = (self.col as i16 - other.col as i16).abs();
        dr + dc == 1
    }
}

/// The four axis-aligned neighbor offsets (up, right, down, left)
pub const NEIGHBOR_OFFSETS: [(i16, i16); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Unique cell identity within one board's lifetime (monotonic, never reused)
pub type CellId = u64;

/// One board cell: identity, element kind, and the settled flag
///
/// `stable=false` marks cells the embedding layer is still animating; the
/// detector ignores them completely until they settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub id: CellId,
    pub kind: ElementKind,
    pub stable: bool,
}

/// One matched cell: identity plus where it sat when the match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCell {
    pub id: CellId,
    pub pos: GridPos,
}

/// A detected match: the cells involved, their shared kind, the shape
/// classification, the score it is worth, and the special element (if any)
/// the match leaves behind.
///
/// `anchor` is where a special reward lands: the pivot cell for shaped
/// matches, otherwise the matched cell nearest the cluster centroid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub kind: ElementKind,
    pub shape: Shape,
    pub cells: Vec<MatchCell>,
    pub anchor: GridPos,
    pub score: u32,
    pub special_reward: Option<ElementKind>,
}

impl MatchResult {
    /// True when `pos` is one of the matched cells
    pub fn contains_pos(&self, pos: GridPos) -> bool {
        self.cells.iter().any(|c| c.pos == pos)
    }
}

/// A candidate swap and the matches it would produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapMove {
    pub from: GridPos,
    pub to: GridPos,
    pub expected: Vec<MatchResult>,
}

/// A cell removed during one cascade round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliminatedCell {
    pub id: CellId,
    pub pos: GridPos,
    pub kind: ElementKind,
}

/// A cell that dropped during one cascade round (`from` → `to`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallenCell {
    pub id: CellId,
    pub from: GridPos,
    pub to: GridPos,
}

/// A cell created during one cascade round (refill or special reward)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnedCell {
    pub id: CellId,
    pub pos: GridPos,
    pub kind: ElementKind,
}

/// Complete, replayable description of one cascade iteration.
///
/// The embedding layer (animation, replay, analytics) drives everything from
/// these records; the simulation never calls back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    /// 1-based cascade round index
    pub round: u32,
    pub matches: Vec<MatchResult>,
    pub eliminated: Vec<EliminatedCell>,
    pub fallen: Vec<FallenCell>,
    pub spawned: Vec<SpawnedCell>,
    /// Score for this round after combo multiplier and chain bonus
    pub round_score: u32,
    /// Combo value in effect for this round (0 on the first round)
    pub combo: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_codes_match_historical_data() {
        // Source-of-truth: the original level data's numeric element codes.
        assert_eq!(ElementKind::Empty.code(), 0);
        assert_eq!(ElementKind::Red.code(), 1);
        assert_eq!(ElementKind::Blue.code(), 2);
        assert_eq!(ElementKind::Green.code(), 3);
        assert_eq!(ElementKind::Yellow.code(), 4);
        assert_eq!(ElementKind::Purple.code(), 5);
        assert_eq!(ElementKind::Orange.code(), 6);
        assert_eq!(ElementKind::Bomb.code(), 10);
        assert_eq!(ElementKind::RowClear.code(), 11);
        assert_eq!(ElementKind::ColClear.code(), 12);
        assert_eq!(ElementKind::ColorBomb.code(), 13);
        assert_eq!(ElementKind::Rainbow.code(), 14);
    }

    #[test]
    fn test_code_round_trip() {
        for kind in [
            ElementKind::Empty,
            ElementKind::Red,
            ElementKind::Blue,
            ElementKind::Green,
            ElementKind::Yellow,
            ElementKind::Purple,
            ElementKind::Orange,
            ElementKind::Bomb,
            ElementKind::RowClear,
            ElementKind::ColClear,
            ElementKind::ColorBomb,
            ElementKind::Rainbow,
        ] {
            assert_eq!(
                ElementKind::from_code(kind.code()),
                Some(kind),
                "code {} should round-trip",
                kind.code()
            );
        }
        assert_eq!(ElementKind::from_code(7), None);
        assert_eq!(ElementKind::from_code(255), None);
    }

    #[test]
    fn test_string_round_trip() {
        for kind in ORDINARY_KINDS {
            assert_eq!(ElementKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(
            ElementKind::from_str("ROWCLEAR"),
            Some(ElementKind::RowClear)
        );
        assert_eq!(
            ElementKind::from_str("colorBomb"),
            Some(ElementKind::ColorBomb)
        );
        assert_eq!(ElementKind::from_str(""), None);
        assert_eq!(ElementKind::from_str("teal"), None);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(ElementKind::Red.is_ordinary());
        assert!(!ElementKind::Red.is_special());
        assert!(ElementKind::Bomb.is_special());
        assert!(!ElementKind::Bomb.is_ordinary());
        assert!(ElementKind::Empty.is_empty());
        assert!(!ElementKind::Empty.is_ordinary());
        assert!(!ElementKind::Empty.is_special());
    }

    #[test]
    fn test_grid_pos_offset_and_adjacency() {
        let pos = GridPos::new(3, 3);
        assert_eq!(pos.offset(1, 0), Some(GridPos::new(4, 3)));
        assert_eq!(pos.offset(0, -3), Some(GridPos::new(3, 0)));
        assert_eq!(GridPos::new(0, 5).offset(-1, 0), None);
        assert_eq!(GridPos::new(5, 0).offset(0, -1), None);

        assert!(pos.is_adjacent(&GridPos::new(2, 3)));
        assert!(pos.is_adjacent(&GridPos::new(3, 4)));
        assert!(!pos.is_adjacent(&GridPos::new(2, 2)), "diagonal is not adjacent");
        assert!(!pos.is_adjacent(&pos), "a cell is not adjacent to itself");
        assert!(!pos.is_adjacent(&GridPos::new(3, 5)), "two steps away");
    }

    #[test]
    fn test_shape_strings() {
        assert_eq!(Shape::Line(Axis::Horizontal).as_str(), "horizontal");
        assert_eq!(Shape::Line(Axis::Vertical).as_str(), "vertical");
        assert_eq!(Shape::LShape.as_str(), "l");
        assert_eq!(Shape::TShape.as_str(), "t");
        assert_eq!(Shape::Cross.as_str(), "cross");
    }

    #[test]
    fn test_match_result_contains_pos() {
        let m = MatchResult {
            kind: ElementKind::Red,
            shape: Shape::Line(Axis::Horizontal),
            cells: vec![
                MatchCell { id: 1, pos: GridPos::new(1, 1) },
                MatchCell { id: 2, pos: GridPos::new(1, 2) },
                MatchCell { id: 3, pos: GridPos::new(1, 3) },
            ],
            anchor: GridPos::new(1, 2),
            score: 300,
            special_reward: None,
        };
        assert!(m.contains_pos(GridPos::new(1, 2)));
        assert!(!m.contains_pos(GridPos::new(2, 2)));
    }
}
