//! Board module - manages the tile grid
//!
//! The board is a rows x cols grid stored as a flat array for cache locality.
//! Coordinates are (row, col) with row 0 at the TOP; gravity pulls cells
//! toward higher row indices. Every cell carries a unique id that travels
//! with it through swaps and falls, so round records can be replayed.
//!
//! Out-of-bounds access never panics: reads return `None`/`Empty`, writes
//! return `false` and change nothing.

use arrayvec::ArrayVec;

use tilematch_types::{
    Cell, CellId, ElementKind, FallenCell, GridPos, SpawnedCell, MAX_BOARD_DIM,
};

/// Everything one `compact_column` call did to its column: which cells
/// dropped (with their ids) and which cells were spawned into the vacancies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnShift {
    pub fallen: ArrayVec<FallenCell, MAX_BOARD_DIM>,
    pub spawned: ArrayVec<SpawnedCell, MAX_BOARD_DIM>,
}

impl ColumnShift {
    /// True when the column needed no work
    pub fn is_noop(&self) -> bool {
        self.fallen.is_empty() && self.spawned.is_empty()
    }
}

/// The tile grid - flat array storage, row-major order (row * cols + col)
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: u8,
    cols: u8,
    cells: Vec<Cell>,
    /// Next cell id to hand out; ids are unique for this board's lifetime.
    next_id: CellId,
}

impl Board {
    /// Create a new all-empty board. Dimension limits are enforced by the
    /// level loader; a zero-sized board is inert but safe.
    pub fn new(rows: u8, cols: u8) -> Self {
        let mut board = Self {
            rows,
            cols,
            cells: Vec::with_capacity(rows as usize * cols as usize),
            next_id: 0,
        };
        for _ in 0..(rows as usize * cols as usize) {
            let cell = board.fresh_cell(ElementKind::Empty);
            board.cells.push(cell);
        }
        board
    }

    /// Build a board from rows of kinds (row 0 first). Returns `None` when
    /// the grid is empty, ragged, or exceeds `MAX_BOARD_DIM`.
    pub fn from_rows(rows: &[Vec<ElementKind>]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if height == 0 || width == 0 || height > MAX_BOARD_DIM || width > MAX_BOARD_DIM {
            return None;
        }
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }

        let mut board = Board::new(height as u8, width as u8);
        for (row, kinds) in rows.iter().enumerate() {
            for (col, &kind) in kinds.iter().enumerate() {
                board.set_kind(GridPos::new(row as u8, col as u8), kind);
            }
        }
        Some(board)
    }

    /// Dump the grid as rows of kinds (row 0 first), for display and tests
    pub fn to_kind_rows(&self) -> Vec<Vec<ElementKind>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.kind_at(GridPos::new(row, col)))
                    .collect()
            })
            .collect()
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: GridPos) -> Option<usize> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    fn alloc_id(&mut self) -> CellId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn fresh_cell(&mut self, kind: ElementKind) -> Cell {
        Cell {
            id: self.alloc_id(),
            kind,
            stable: true,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Check if a position is on the board
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Get cell at position; `None` if out of bounds
    pub fn get(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    /// Kind at position; `Empty` if out of bounds
    pub fn kind_at(&self, pos: GridPos) -> ElementKind {
        self.get(pos).map(|c| c.kind).unwrap_or(ElementKind::Empty)
    }

    /// Write a kind at position with a FRESH cell id.
    /// Returns false (and writes nothing) if out of bounds.
    pub fn set_kind(&mut self, pos: GridPos, kind: ElementKind) -> bool {
        match self.index(pos) {
            Some(idx) => {
                let cell = self.fresh_cell(kind);
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Exchange two cells; ids travel with their cells.
    /// Returns false (and swaps nothing) if either position is out of bounds
    /// or either cell is empty (holes are not swappable).
    pub fn swap(&mut self, a: GridPos, b: GridPos) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(ia), Some(ib)) => {
                if self.cells[ia].kind.is_empty() || self.cells[ib].kind.is_empty() {
                    return false;
                }
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    /// Mark a cell settled/unsettled (animation-layer hook).
    /// Returns false if out of bounds.
    pub fn set_stable(&mut self, pos: GridPos, stable: bool) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx].stable = stable;
                true
            }
            None => false,
        }
    }

    /// Clear a cell to `Empty` and return what was there.
    /// Returns `None` (and clears nothing) if out of bounds.
    pub fn clear_cell(&mut self, pos: GridPos) -> Option<Cell> {
        let idx = self.index(pos)?;
        let previous = self.cells[idx];
        let empty = self.fresh_cell(ElementKind::Empty);
        self.cells[idx] = empty;
        Some(previous)
    }

    /// True when no cell is `Empty`
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.kind.is_empty())
    }

    /// Iterate all positions in scan order (row-major, top-left first)
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let (rows, cols) = (self.rows, self.cols);
        (0..rows).flat_map(move |row| (0..cols).map(move |col| GridPos::new(row, col)))
    }

    /// Apply gravity to one column in a single bottom-up pass.
    ///
    /// A write cursor starts below the bottom row; every non-empty cell is
    /// moved down to the cursor (preserving relative order and ids), then
    /// every row still above the cursor is filled by invoking `spawn()` with
    /// a fresh id, top to bottom. Returns what moved and what was created.
    ///
    /// An out-of-range `col` is a silent no-op returning an empty shift.
    pub fn compact_column<F>(&mut self, col: u8, mut spawn: F) -> ColumnShift
    where
        F: FnMut() -> ElementKind,
    {
        let mut shift = ColumnShift::default();
        if col >= self.cols {
            return shift;
        }
        let width = self.cols as usize;

        // Two-pointer scan from the bottom: read walks up, write trails at
        // the lowest unfilled row.
        let mut write_row = self.rows;
        for read_row in (0..self.rows).rev() {
            let read_idx = read_row as usize * width + col as usize;
            if self.cells[read_idx].kind.is_empty() {
                continue;
            }

            write_row -= 1;
            if write_row != read_row {
                let write_idx = write_row as usize * width + col as usize;
                let moved = self.cells[read_idx];
                self.cells[write_idx] = moved;
                let vacated = self.fresh_cell(ElementKind::Empty);
                self.cells[read_idx] = vacated;
                shift.fallen.push(FallenCell {
                    id: moved.id,
                    from: GridPos::new(read_row, col),
                    to: GridPos::new(write_row, col),
                });
            }
        }

        // Fill the vacancies above the cursor, top to bottom.
        for row in 0..write_row {
            let idx = row as usize * width + col as usize;
            let cell = self.fresh_cell(spawn());
            self.cells[idx] = cell;
            shift.spawned.push(SpawnedCell {
                id: cell.id,
                pos: GridPos::new(row, col),
                kind: cell.kind,
            });
        }

        shift
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(
            tilematch_types::DEFAULT_BOARD_ROWS,
            tilematch_types::DEFAULT_BOARD_COLS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilematch_types::ElementKind::{Blue, Empty, Green, Red, Yellow};

    #[test]
    fn test_board_new_is_empty() {
        let board = Board::new(5, 4);
        assert_eq!(board.rows(), 5);
        assert_eq!(board.cols(), 4);
        for pos in board.positions() {
            assert_eq!(board.kind_at(pos), Empty, "cell {:?} should start empty", pos);
        }
    }

    #[test]
    fn test_board_out_of_bounds_is_silent() {
        let mut board = Board::new(4, 4);
        let before = board.clone();

        assert_eq!(board.get(GridPos::new(4, 0)), None);
        assert_eq!(board.kind_at(GridPos::new(0, 4)), Empty);
        assert!(!board.set_kind(GridPos::new(9, 9), Red));
        assert!(!board.swap(GridPos::new(0, 0), GridPos::new(0, 4)));
        assert!(!board.set_stable(GridPos::new(4, 0), false));
        assert_eq!(board.clear_cell(GridPos::new(0, 9)), None);

        assert_eq!(board, before, "out-of-bounds writes must not change the board");
    }

    #[test]
    fn test_set_kind_allocates_fresh_ids() {
        let mut board = Board::new(3, 3);
        board.set_kind(GridPos::new(0, 0), Red);
        let first = board.get(GridPos::new(0, 0)).unwrap().id;
        board.set_kind(GridPos::new(0, 0), Blue);
        let second = board.get(GridPos::new(0, 0)).unwrap().id;
        assert_ne!(first, second, "each write is a new cell identity");
    }

    #[test]
    fn test_swap_moves_ids_with_cells() {
        let mut board = Board::new(3, 3);
        let a = GridPos::new(0, 0);
        let b = GridPos::new(0, 1);
        board.set_kind(a, Red);
        board.set_kind(b, Blue);
        let id_a = board.get(a).unwrap().id;
        let id_b = board.get(b).unwrap().id;

        assert!(board.swap(a, b));
        assert_eq!(board.kind_at(a), Blue);
        assert_eq!(board.kind_at(b), Red);
        assert_eq!(board.get(a).unwrap().id, id_b);
        assert_eq!(board.get(b).unwrap().id, id_a);
    }

    #[test]
    fn test_swap_refuses_empty_cells() {
        let mut board = Board::new(3, 3);
        let a = GridPos::new(1, 1);
        let b = GridPos::new(1, 2);
        board.set_kind(a, Red);

        assert!(!board.swap(a, b), "cannot swap into a hole");
        assert_eq!(board.kind_at(a), Red, "refused swap leaves cells in place");
        assert!(board.kind_at(b).is_empty());
    }

    #[test]
    fn test_from_rows_rejects_bad_grids() {
        assert!(Board::from_rows(&[]).is_none(), "empty grid");
        assert!(
            Board::from_rows(&[vec![Red, Blue], vec![Red]]).is_none(),
            "ragged grid"
        );
        let wide = vec![vec![Red; MAX_BOARD_DIM + 1]];
        assert!(Board::from_rows(&wide).is_none(), "too wide");
    }

    #[test]
    fn test_from_rows_round_trip() {
        let rows = vec![
            vec![Red, Blue, Green],
            vec![Yellow, Empty, Red],
            vec![Blue, Green, Yellow],
        ];
        let board = Board::from_rows(&rows).expect("valid grid");
        assert_eq!(board.to_kind_rows(), rows);
    }

    #[test]
    fn test_compact_column_drops_and_fills() {
        // Column 1 (top to bottom): Red, Empty, Blue, Empty -> Red and Blue
        // drop to the bottom two rows, two spawns fill the top.
        let rows = vec![
            vec![Green, Red, Green],
            vec![Green, Empty, Green],
            vec![Green, Blue, Green],
            vec![Green, Empty, Green],
        ];
        let mut board = Board::from_rows(&rows).expect("valid grid");
        let red_id = board.get(GridPos::new(0, 1)).unwrap().id;
        let blue_id = board.get(GridPos::new(2, 1)).unwrap().id;

        let shift = board.compact_column(1, || Yellow);

        assert_eq!(board.kind_at(GridPos::new(2, 1)), Red);
        assert_eq!(board.kind_at(GridPos::new(3, 1)), Blue);
        assert_eq!(board.kind_at(GridPos::new(0, 1)), Yellow);
        assert_eq!(board.kind_at(GridPos::new(1, 1)), Yellow);

        // Relative order preserved: Red stays above Blue, ids travel.
        assert_eq!(board.get(GridPos::new(2, 1)).unwrap().id, red_id);
        assert_eq!(board.get(GridPos::new(3, 1)).unwrap().id, blue_id);

        assert_eq!(shift.fallen.len(), 2);
        assert_eq!(
            shift.fallen[0],
            FallenCell {
                id: blue_id,
                from: GridPos::new(2, 1),
                to: GridPos::new(3, 1),
            }
        );
        assert_eq!(
            shift.fallen[1],
            FallenCell {
                id: red_id,
                from: GridPos::new(0, 1),
                to: GridPos::new(2, 1),
            }
        );

        // Spawns recorded top to bottom with the spawned kind.
        assert_eq!(shift.spawned.len(), 2);
        assert_eq!(shift.spawned[0].pos, GridPos::new(0, 1));
        assert_eq!(shift.spawned[1].pos, GridPos::new(1, 1));
        assert!(shift.spawned.iter().all(|s| s.kind == Yellow));
    }

    #[test]
    fn test_compact_full_column_is_noop() {
        let rows = vec![
            vec![Red, Blue],
            vec![Blue, Red],
            vec![Red, Blue],
        ];
        let mut board = Board::from_rows(&rows).expect("valid grid");
        let before = board.clone();

        let shift = board.compact_column(0, || Green);

        assert!(shift.is_noop(), "full column must not move or spawn");
        assert_eq!(board, before, "gravity on a full column is the identity");
    }

    #[test]
    fn test_compact_out_of_range_column_is_silent() {
        let mut board = Board::new(3, 3);
        let before = board.clone();
        let shift = board.compact_column(3, || Red);
        assert!(shift.is_noop());
        assert_eq!(board, before);
    }

    #[test]
    fn test_compact_empty_column_spawns_everything() {
        let mut board = Board::new(4, 2);
        let shift = board.compact_column(0, || Blue);
        assert!(shift.fallen.is_empty());
        assert_eq!(shift.spawned.len(), 4);
        for row in 0..4 {
            assert_eq!(board.kind_at(GridPos::new(row, 0)), Blue);
        }
        // The other column is untouched.
        for row in 0..4 {
            assert_eq!(board.kind_at(GridPos::new(row, 1)), Empty);
        }
    }

    #[test]
    fn test_stable_flag_round_trip() {
        let mut board = Board::new(3, 3);
        let pos = GridPos::new(1, 1);
        board.set_kind(pos, Red);
        assert!(board.get(pos).unwrap().stable);
        assert!(board.set_stable(pos, false));
        assert!(!board.get(pos).unwrap().stable);
        assert!(board.set_stable(pos, true));
        assert!(board.get(pos).unwrap().stable);
    }

    #[test]
    fn test_clear_cell_returns_previous() {
        let mut board = Board::new(3, 3);
        let pos = GridPos::new(2, 2);
        board.set_kind(pos, Green);
        let old = board.clear_cell(pos).expect("in bounds");
        assert_eq!(old.kind, Green);
        assert_eq!(board.kind_at(pos), Empty);
    }

    #[test]
    fn test_is_full() {
        let mut board = Board::new(2, 2);
        assert!(!board.is_full());
        for pos in board.positions().collect::<Vec<_>>() {
            board.set_kind(pos, Red);
        }
        assert!(board.is_full());
    }
}
