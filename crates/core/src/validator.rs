//! Move validation module - decides which swaps are legal
//!
//! A swap is legal when the two cells are orthogonally adjacent and the
//! board that would result contains at least one match touching one of the
//! swapped positions. Legality is always judged on a probe clone; the real
//! board is never mutated here, so validation can run mid-session without
//! disturbing play state.

use tilematch_types::{GridPos, MatchResult, SwapMove, NEIGHBOR_OFFSETS};

use crate::board::Board;
use crate::detector::MatchDetector;
use crate::scoring::ScoringConfig;

/// Validates candidate swaps and enumerates every legal move on a board.
#[derive(Debug, Clone)]
pub struct MoveValidator {
    detector: MatchDetector,
}

impl MoveValidator {
    pub fn new() -> Self {
        Self {
            detector: MatchDetector::new(),
        }
    }

    /// Use a detector with a non-default minimum run length.
    pub fn with_detector(detector: MatchDetector) -> Self {
        Self { detector }
    }

    /// Judge a single swap. Returns the matches the swap would create
    /// (each touching a swapped cell), or `None` when the swap is out of
    /// bounds, not adjacent, involves a hole, or produces nothing.
    ///
    /// Matches already sitting elsewhere on the board do not make a swap
    /// legal; the swap itself has to contribute.
    pub fn evaluate_swap(
        &self,
        board: &Board,
        from: GridPos,
        to: GridPos,
        cfg: &ScoringConfig,
    ) -> Option<Vec<MatchResult>> {
        if !board.in_bounds(from) || !board.in_bounds(to) {
            return None;
        }
        if !from.is_adjacent(&to) {
            return None;
        }

        let mut probe = board.clone();
        if !probe.swap(from, to) {
            return None;
        }

        let touching: Vec<MatchResult> = self
            .detector
            .find_matches(&probe, cfg)
            .into_iter()
            .filter(|m| m.contains_pos(from) || m.contains_pos(to))
            .collect();

        if touching.is_empty() {
            None
        } else {
            Some(touching)
        }
    }

    /// Enumerate every legal swap on the board, in scan order.
    ///
    /// Each legal pair appears twice, once per direction (`a -> b` and
    /// `b -> a`), so callers can look up a move by its grabbed cell without
    /// normalizing. An empty result is the no-moves signal.
    pub fn find_possible_moves(&self, board: &Board, cfg: &ScoringConfig) -> Vec<SwapMove> {
        let mut moves = Vec::new();
        for from in board.positions().collect::<Vec<_>>() {
            for (dr, dc) in NEIGHBOR_OFFSETS {
                let Some(to) = from.offset(dr, dc) else {
                    continue;
                };
                if !board.in_bounds(to) {
                    continue;
                }
                if let Some(expected) = self.evaluate_swap(board, from, to, cfg) {
                    moves.push(SwapMove { from, to, expected });
                }
            }
        }
        moves
    }
}

impl Default for MoveValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilematch_types::ElementKind::{Blue, Green, Red, Yellow};
    use tilematch_types::{Axis, ElementKind, Shape};

    fn grid(rows: &[&[ElementKind]]) -> Board {
        let rows: Vec<Vec<ElementKind>> = rows.iter().map(|r| r.to_vec()).collect();
        Board::from_rows(&rows).expect("valid test grid")
    }

    // 4x4 board whose only legal move is swapping (0,2) and (0,3), which
    // completes the horizontal Red run at row 0, cols 0-2.
    fn one_move_board() -> Board {
        grid(&[
            &[Red, Red, Blue, Red],
            &[Green, Yellow, Green, Yellow],
            &[Yellow, Green, Yellow, Green],
            &[Green, Yellow, Green, Yellow],
        ])
    }

    // Diagonal three-color stripes: no runs and no swap can create one,
    // because every line repeats with period three.
    fn striped_board(rows: u8, cols: u8) -> Board {
        let palette = [Red, Green, Blue];
        let mut grid = Vec::new();
        for r in 0..rows {
            let mut row = Vec::new();
            for c in 0..cols {
                row.push(palette[(r as usize + c as usize) % 3]);
            }
            grid.push(row);
        }
        Board::from_rows(&grid).expect("valid stripe grid")
    }

    #[test]
    fn test_known_legal_swap_is_reported() {
        let validator = MoveValidator::new();
        let cfg = ScoringConfig::default();
        let board = one_move_board();

        let expected = validator
            .evaluate_swap(&board, GridPos::new(0, 2), GridPos::new(0, 3), &cfg)
            .expect("swap completes a run");
        assert_eq!(expected.len(), 1);
        assert_eq!(expected[0].kind, Red);
        assert_eq!(expected[0].shape, Shape::Line(Axis::Horizontal));
        assert!(expected[0].contains_pos(GridPos::new(0, 2)));

        // the reverse direction is the same physical swap
        assert!(validator
            .evaluate_swap(&board, GridPos::new(0, 3), GridPos::new(0, 2), &cfg)
            .is_some());
    }

    #[test]
    fn test_non_adjacent_and_out_of_bounds_are_rejected() {
        let validator = MoveValidator::new();
        let cfg = ScoringConfig::default();
        let board = one_move_board();

        assert!(
            validator
                .evaluate_swap(&board, GridPos::new(0, 0), GridPos::new(1, 1), &cfg)
                .is_none(),
            "diagonal is not adjacent"
        );
        assert!(
            validator
                .evaluate_swap(&board, GridPos::new(0, 0), GridPos::new(2, 0), &cfg)
                .is_none(),
            "distance two is not adjacent"
        );
        assert!(
            validator
                .evaluate_swap(&board, GridPos::new(0, 3), GridPos::new(0, 4), &cfg)
                .is_none(),
            "neighbor off the edge"
        );
        assert!(validator
            .evaluate_swap(&board, GridPos::new(1, 1), GridPos::new(1, 1), &cfg)
            .is_none());
    }

    #[test]
    fn test_preexisting_match_does_not_legalize_a_dead_swap() {
        let validator = MoveValidator::new();
        let cfg = ScoringConfig::default();
        // Blue run already sits at row 3; the (0,0)/(0,1) swap creates nothing.
        let board = grid(&[
            &[Red, Green, Yellow, Red],
            &[Green, Yellow, Red, Green],
            &[Yellow, Red, Green, Yellow],
            &[Blue, Blue, Blue, Green],
        ]);

        assert!(
            validator
                .evaluate_swap(&board, GridPos::new(0, 0), GridPos::new(0, 1), &cfg)
                .is_none(),
            "a match elsewhere must not count for this swap"
        );
    }

    #[test]
    fn test_swaps_involving_holes_are_rejected() {
        let validator = MoveValidator::new();
        let cfg = ScoringConfig::default();
        // col 1 would become a Red run if the hole swap were allowed
        let mut board = grid(&[
            &[Red, Red, Blue],
            &[Red, Yellow, Yellow],
            &[Green, Blue, Yellow],
        ]);
        board.clear_cell(GridPos::new(1, 1));

        assert!(
            validator
                .evaluate_swap(&board, GridPos::new(1, 0), GridPos::new(1, 1), &cfg)
                .is_none(),
            "holes are not swappable"
        );
        let moves = validator.find_possible_moves(&board, &cfg);
        assert!(
            moves
                .iter()
                .all(|m| m.from != GridPos::new(1, 1) && m.to != GridPos::new(1, 1)),
            "no enumerated move may touch the hole: {:?}",
            moves
        );
    }

    #[test]
    fn test_find_possible_moves_lists_both_directions() {
        let validator = MoveValidator::new();
        let cfg = ScoringConfig::default();
        let moves = validator.find_possible_moves(&one_move_board(), &cfg);

        assert_eq!(moves.len(), 2, "one physical move, two directions: {:?}", moves);
        assert!(moves
            .iter()
            .any(|m| m.from == GridPos::new(0, 2) && m.to == GridPos::new(0, 3)));
        assert!(moves
            .iter()
            .any(|m| m.from == GridPos::new(0, 3) && m.to == GridPos::new(0, 2)));
        for m in &moves {
            assert!(!m.expected.is_empty(), "legal moves carry their matches");
        }
    }

    #[test]
    fn test_striped_board_has_no_moves() {
        let validator = MoveValidator::new();
        let cfg = ScoringConfig::default();
        let board = striped_board(5, 5);

        let detector = MatchDetector::new();
        assert!(detector.find_matches(&board, &cfg).is_empty(), "stripes never match");
        assert!(
            validator.find_possible_moves(&board, &cfg).is_empty(),
            "stripes admit no legal swap"
        );
    }

    #[test]
    fn test_validation_leaves_the_board_untouched() {
        let validator = MoveValidator::new();
        let cfg = ScoringConfig::default();
        let board = one_move_board();
        let snapshot = board.clone();

        validator.evaluate_swap(&board, GridPos::new(0, 2), GridPos::new(0, 3), &cfg);
        let _ = validator.find_possible_moves(&board, &cfg);
        assert_eq!(board, snapshot, "validation works on probe clones only");
    }
}
