//! Match detection module - runs, shapes, merging, rewards
//!
//! Detection walks every settled cell once as a pivot and measures the
//! maximal horizontal and vertical runs of its kind through it. Straight
//! runs of at least `MIN_RUN_LEN` become line matches; a pivot whose runs
//! qualify on both axes becomes a shaped match (L/T/cross). Overlapping
//! results are union-merged until disjoint, then each match is scored and
//! assigned its special-element reward.
//!
//! The detector never mutates the board, so re-running it on an untouched
//! board returns identical results.

use tilematch_types::{
    Axis, ElementKind, GridPos, MatchCell, MatchResult, Shape, MIN_RUN_LEN,
};

use crate::board::Board;
use crate::scoring::{self, ScoringConfig};

/// Merged clusters of at least this many cells classify as a cross
const CROSS_MIN_CELLS: usize = 5;

/// A match under construction: shape and pivot still subject to merging
#[derive(Debug, Clone)]
struct Candidate {
    kind: ElementKind,
    shape: Shape,
    cells: Vec<MatchCell>,
    pivot: Option<GridPos>,
}

impl Candidate {
    fn contains_pos(&self, pos: GridPos) -> bool {
        self.cells.iter().any(|c| c.pos == pos)
    }
}

/// Finds matches on a board. Stateless apart from the minimum run length,
/// which is configurable for forward balance work (the stock game uses 3).
#[derive(Debug, Clone)]
pub struct MatchDetector {
    min_run: usize,
}

impl MatchDetector {
    pub fn new() -> Self {
        Self { min_run: MIN_RUN_LEN }
    }

    /// Detector with a custom minimum run length (clamped to at least 2)
    pub fn with_min_run(min_run: usize) -> Self {
        Self {
            min_run: min_run.max(2),
        }
    }

    /// Scan the whole board and return every match, disjoint and scored.
    ///
    /// Cells that are `Empty` or not `stable` are never scanned and never
    /// extend a run (an unsettled cell breaks runs through it).
    pub fn find_matches(&self, board: &Board, cfg: &ScoringConfig) -> Vec<MatchResult> {
        let mut candidates: Vec<Candidate> = Vec::new();

        for pos in board.positions() {
            let cell = match board.get(pos) {
                Some(c) => *c,
                None => continue,
            };
            if cell.kind.is_empty() || !cell.stable {
                continue;
            }

            let h_run = run_through(board, pos, Axis::Horizontal);
            let v_run = run_through(board, pos, Axis::Vertical);
            let h_ok = h_run.len() >= self.min_run;
            let v_ok = v_run.len() >= self.min_run;

            if h_ok && v_ok {
                // Both axes qualify: merge the runs around this pivot.
                // The runs share exactly the pivot cell.
                let mut cells = h_run.clone();
                cells.extend(v_run.iter().filter(|c| c.pos != pos));
                let shape = classify_shape(cells.len(), pos, &h_run, &v_run);
                candidates.push(Candidate {
                    kind: cell.kind,
                    shape,
                    cells,
                    pivot: Some(pos),
                });
            }

            // Record each straight run once, from its first cell.
            if h_ok && h_run[0].pos == pos {
                candidates.push(Candidate {
                    kind: cell.kind,
                    shape: Shape::Line(Axis::Horizontal),
                    cells: h_run,
                    pivot: None,
                });
            }
            if v_ok && v_run[0].pos == pos {
                candidates.push(Candidate {
                    kind: cell.kind,
                    shape: Shape::Line(Axis::Vertical),
                    cells: v_run,
                    pivot: None,
                });
            }
        }

        let mut results: Vec<MatchResult> = merge_overlapping(candidates)
            .into_iter()
            .map(|c| finish(c, cfg))
            .collect();
        results.sort_by_key(|m| m.cells.first().map(|c| c.pos).unwrap_or(GridPos::new(0, 0)));
        results
    }
}

impl Default for MatchDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Maximal same-kind run through `pos` along `axis`, in ascending order.
/// Runs extend only across settled cells of the same kind.
fn run_through(board: &Board, pos: GridPos, axis: Axis) -> Vec<MatchCell> {
    let kind = board.kind_at(pos);
    let (dr, dc) = match axis {
        Axis::Horizontal => (0i16, 1i16),
        Axis::Vertical => (1i16, 0i16),
    };

    // Walk back to the run start, then collect forward.
    let mut start = pos;
    while let Some(prev) = start.offset(-dr, -dc) {
        if !extends_run(board, prev, kind) {
            break;
        }
        start = prev;
    }

    let mut cells = Vec::new();
    let mut cursor = Some(start);
    while let Some(p) = cursor {
        match board.get(p) {
            Some(c) if c.stable && c.kind == kind => {
                cells.push(MatchCell { id: c.id, pos: p });
            }
            _ => break,
        }
        cursor = p.offset(dr, dc);
    }
    cells
}

fn extends_run(board: &Board, pos: GridPos, kind: ElementKind) -> bool {
    match board.get(pos) {
        Some(c) => c.stable && c.kind == kind,
        None => false,
    }
}

/// Shape rule for a dual-axis pivot: cross at 5+ merged cells, L when the
/// pivot ends at least one run, T when it is interior to both.
fn classify_shape(merged_len: usize, pivot: GridPos, h_run: &[MatchCell], v_run: &[MatchCell]) -> Shape {
    if merged_len >= CROSS_MIN_CELLS {
        return Shape::Cross;
    }
    let ends = |run: &[MatchCell]| {
        run.first().map(|c| c.pos) == Some(pivot) || run.last().map(|c| c.pos) == Some(pivot)
    };
    if ends(h_run) || ends(v_run) {
        Shape::LShape
    } else {
        Shape::TShape
    }
}

/// Union-merge intersecting candidates until no two share a cell
fn merge_overlapping(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    loop {
        let mut merged_any = false;
        'scan: for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                if intersects(&candidates[i], &candidates[j]) {
                    let other = candidates.swap_remove(j);
                    absorb(&mut candidates[i], other);
                    merged_any = true;
                    break 'scan;
                }
            }
        }
        if !merged_any {
            return candidates;
        }
    }
}

fn intersects(a: &Candidate, b: &Candidate) -> bool {
    a.cells.iter().any(|c| b.contains_pos(c.pos))
}

/// Fold `other` into `into`, re-classifying by merged size and pivot
fn absorb(into: &mut Candidate, other: Candidate) {
    let other_shape = other.shape;
    for cell in other.cells {
        if !into.contains_pos(cell.pos) {
            into.cells.push(cell);
        }
    }
    if into.pivot.is_none() {
        into.pivot = other.pivot;
    }

    into.shape = if into.cells.len() >= CROSS_MIN_CELLS {
        Shape::Cross
    } else if !matches!(into.shape, Shape::Line(_)) {
        into.shape
    } else if !matches!(other_shape, Shape::Line(_)) {
        other_shape
    } else {
        into.shape
    };
}

/// Seal a candidate: canonical cell order, anchor, score, reward
fn finish(mut c: Candidate, cfg: &ScoringConfig) -> MatchResult {
    c.cells.sort_by_key(|cell| cell.pos);
    let anchor = c.pivot.unwrap_or_else(|| centroid_cell(&c.cells));
    let score = scoring::match_score(cfg, c.kind, c.cells.len(), c.shape);
    let special_reward = special_reward(c.shape, c.cells.len());
    MatchResult {
        kind: c.kind,
        shape: c.shape,
        cells: c.cells,
        anchor,
        score,
        special_reward,
    }
}

/// The matched cell nearest the floor-averaged centroid (ties by cell order)
fn centroid_cell(cells: &[MatchCell]) -> GridPos {
    let n = cells.len().max(1) as u32;
    let row = cells.iter().map(|c| c.pos.row as u32).sum::<u32>() / n;
    let col = cells.iter().map(|c| c.pos.col as u32).sum::<u32>() / n;
    let target = GridPos::new(row as u8, col as u8);
    cells
        .iter()
        .min_by_key(|c| manhattan(c.pos, target))
        .map(|c| c.pos)
        .unwrap_or(target)
}

fn manhattan(a: GridPos, b: GridPos) -> u16 {
    let dr = (a.row as i16 - b.row as i16).unsigned_abs();
    let dc = (a.col as i16 - b.col as i16).unsigned_abs();
    dr + dc
}

/// Fixed reward table: 5+ in a line leaves a color bomb, shaped matches
/// leave a bomb, exactly 4 in a line leaves a row/column clear by axis.
fn special_reward(shape: Shape, len: usize) -> Option<ElementKind> {
    match shape {
        Shape::Line(_) if len >= 5 => Some(ElementKind::ColorBomb),
        Shape::LShape | Shape::TShape | Shape::Cross => Some(ElementKind::Bomb),
        Shape::Line(Axis::Horizontal) if len == 4 => Some(ElementKind::RowClear),
        Shape::Line(Axis::Vertical) if len == 4 => Some(ElementKind::ColClear),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilematch_types::ElementKind::{Blue, Green, Red, Yellow};

    fn grid(rows: &[&[ElementKind]]) -> Board {
        let rows: Vec<Vec<ElementKind>> = rows.iter().map(|r| r.to_vec()).collect();
        Board::from_rows(&rows).expect("valid test grid")
    }

    // 5x5 board whose only match is the horizontal Red run at row 1, cols 1-3.
    fn single_run_board() -> Board {
        grid(&[
            &[Green, Yellow, Green, Yellow, Green],
            &[Blue, Red, Red, Red, Yellow],
            &[Green, Yellow, Green, Yellow, Green],
            &[Blue, Green, Blue, Green, Blue],
            &[Green, Blue, Green, Blue, Green],
        ])
    }

    #[test]
    fn test_single_horizontal_run() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let matches = detector.find_matches(&single_run_board(), &cfg);

        assert_eq!(matches.len(), 1, "expected exactly one match: {:?}", matches);
        let m = &matches[0];
        assert_eq!(m.kind, Red);
        assert_eq!(m.shape, Shape::Line(Axis::Horizontal));
        assert_eq!(m.cells.len(), 3);
        let positions: Vec<GridPos> = m.cells.iter().map(|c| c.pos).collect();
        assert_eq!(
            positions,
            vec![GridPos::new(1, 1), GridPos::new(1, 2), GridPos::new(1, 3)]
        );
        assert_eq!(m.score, 300);
        assert_eq!(m.special_reward, None);
        assert_eq!(m.anchor, GridPos::new(1, 2), "anchor sits at the centroid");
    }

    #[test]
    fn test_vertical_four_rewards_col_clear() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = grid(&[
            &[Green, Yellow, Blue, Yellow, Green],
            &[Yellow, Green, Blue, Green, Yellow],
            &[Green, Yellow, Blue, Yellow, Green],
            &[Yellow, Green, Blue, Green, Yellow],
            &[Green, Yellow, Red, Yellow, Green],
        ]);
        let matches = detector.find_matches(&board, &cfg);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.shape, Shape::Line(Axis::Vertical));
        assert_eq!(m.cells.len(), 4);
        assert_eq!(m.score, 400);
        assert_eq!(m.special_reward, Some(ElementKind::ColClear));
    }

    #[test]
    fn test_horizontal_five_rewards_color_bomb() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = grid(&[
            &[Green, Yellow, Green, Yellow, Green],
            &[Blue, Green, Blue, Green, Blue],
            &[Red, Red, Red, Red, Red],
            &[Blue, Green, Blue, Green, Blue],
            &[Green, Yellow, Green, Yellow, Green],
        ]);
        let matches = detector.find_matches(&board, &cfg);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.shape, Shape::Line(Axis::Horizontal));
        assert_eq!(m.cells.len(), 5);
        assert_eq!(m.score, 500);
        assert_eq!(m.special_reward, Some(ElementKind::ColorBomb));
    }

    #[test]
    fn test_corner_runs_merge_into_cross_cluster() {
        // 3 horizontal + 3 vertical sharing the corner at (2,2): the merged
        // cluster has five cells, which the shape rule classifies as cross.
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = grid(&[
            &[Green, Yellow, Red, Yellow, Green],
            &[Blue, Green, Red, Green, Blue],
            &[Yellow, Blue, Red, Red, Red],
            &[Blue, Green, Yellow, Green, Blue],
            &[Green, Yellow, Blue, Yellow, Green],
        ]);
        let matches = detector.find_matches(&board, &cfg);

        assert_eq!(matches.len(), 1, "runs must merge into one cluster");
        let m = &matches[0];
        assert_eq!(m.shape, Shape::Cross);
        assert_eq!(m.cells.len(), 5);
        assert_eq!(m.score, 1500, "100 x 5 cells x 3.0 cross factor");
        assert_eq!(m.special_reward, Some(ElementKind::Bomb));
        assert_eq!(m.anchor, GridPos::new(2, 2), "anchor is the pivot");
    }

    #[test]
    fn test_plus_shape_merges_to_single_cross() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = grid(&[
            &[Green, Yellow, Blue, Yellow, Green],
            &[Blue, Green, Red, Green, Blue],
            &[Yellow, Red, Red, Red, Yellow],
            &[Blue, Green, Red, Green, Blue],
            &[Green, Yellow, Blue, Yellow, Green],
        ]);
        let matches = detector.find_matches(&board, &cfg);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.shape, Shape::Cross);
        assert_eq!(m.cells.len(), 5);
        assert_eq!(m.special_reward, Some(ElementKind::Bomb));
    }

    #[test]
    fn test_small_corner_classifies_l_shape() {
        // With min run 2, a 2+2 corner stays under the cross size and the
        // pivot ends both runs, so the L classification is reachable.
        let detector = MatchDetector::with_min_run(2);
        let cfg = ScoringConfig::default();
        let board = grid(&[
            &[Red, Red, Green, Yellow],
            &[Red, Green, Yellow, Green],
            &[Green, Yellow, Green, Blue],
            &[Yellow, Green, Blue, Green],
        ]);
        let matches = detector.find_matches(&board, &cfg);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.shape, Shape::LShape);
        assert_eq!(m.cells.len(), 3);
        assert_eq!(m.score, 450, "floor(100 x 3 x 1.5)");
        assert_eq!(m.special_reward, Some(ElementKind::Bomb));
    }

    #[test]
    fn test_unstable_cell_breaks_runs() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let mut board = single_run_board();
        board.set_stable(GridPos::new(1, 2), false);

        let matches = detector.find_matches(&board, &cfg);
        assert!(
            matches.is_empty(),
            "an unsettled cell must break the run: {:?}",
            matches
        );
    }

    #[test]
    fn test_no_matches_on_clean_board() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = grid(&[
            &[Red, Blue, Red, Blue],
            &[Blue, Red, Blue, Red],
            &[Red, Blue, Red, Blue],
            &[Blue, Red, Blue, Red],
        ]);
        assert!(detector.find_matches(&board, &cfg).is_empty());
    }

    #[test]
    fn test_empty_board_has_no_matches() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = Board::new(6, 6);
        assert!(detector.find_matches(&board, &cfg).is_empty());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = single_run_board();

        let first = detector.find_matches(&board, &cfg);
        let second = detector.find_matches(&board, &cfg);
        assert_eq!(first, second, "detection must not disturb the board");
    }

    #[test]
    fn test_two_disjoint_runs_stay_separate() {
        let detector = MatchDetector::new();
        let cfg = ScoringConfig::default();
        let board = grid(&[
            &[Red, Red, Red, Yellow, Green],
            &[Yellow, Green, Yellow, Green, Yellow],
            &[Green, Yellow, Green, Yellow, Green],
            &[Blue, Blue, Blue, Green, Yellow],
            &[Green, Yellow, Green, Yellow, Green],
        ]);
        let matches = detector.find_matches(&board, &cfg);

        assert_eq!(matches.len(), 2, "disjoint runs must not merge: {:?}", matches);
        assert!(matches.iter().any(|m| m.kind == Red));
        assert!(matches.iter().any(|m| m.kind == Blue));
        assert!(matches.iter().all(|m| m.cells.len() == 3));
    }
}
