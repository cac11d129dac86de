//! The square marking surface and its win detection.
//!
//! Cells are addressed by a flat index in row-major order. `get_field`
//! resolves an index shifted by a row/column offset, which is what the win
//! check walks along. Unmarked and out-of-bounds are distinct results.

use serde::{Serialize, Serializer};

/// Smallest run length a game may be configured with.
pub const MIN_WIN_RUN_LENGTH: usize = 3;
/// Largest side a grid is ever allocated with.
pub const MAX_SIDE_LENGTH: usize = 64;

/// The four axes as pairs of opposite unit directions `(d_row, d_col)`.
const AXES: [[(isize, isize); 2]; 4] = [
    [(-1, -1), (1, 1)], // ↖ ↘
    [(-1, 0), (1, 0)],  // ↑ ↓
    [(-1, 1), (1, -1)], // ↗ ↙
    [(0, -1), (0, 1)],  // ← →
];

/// Content of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark<O> {
    Unmarked,
    Owner(O),
}

/// Serializes as the owner, or as an empty string when unmarked.
impl<O: Serialize> Serialize for Mark<O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mark::Unmarked => serializer.serialize_str(""),
            Mark::Owner(owner) => owner.serialize(serializer),
        }
    }
}

/// Result of resolving a (possibly shifted) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a, O> {
    Unmarked,
    Owner(&'a O),
    OutOfBounds,
}

#[derive(Debug, Clone)]
pub struct Grid<O> {
    cells: Vec<Mark<O>>,
    side_length: usize,
    win_run_length: usize,
    empty_cells: usize,
}

impl<O: Clone + PartialEq> Grid<O> {
    /// Creates a grid with no cells. It becomes playable after
    /// `reset_and_resize`.
    pub fn new(win_run_length: usize) -> Self {
        Self {
            cells: Vec::new(),
            side_length: 0,
            win_run_length: win_run_length.clamp(MIN_WIN_RUN_LENGTH, MAX_SIDE_LENGTH),
            empty_cells: 0,
        }
    }

    /// Clears every cell and resizes to `side_length`, capped at
    /// [`MAX_SIDE_LENGTH`].
    pub fn reset_and_resize(&mut self, side_length: usize) {
        let side_length = side_length.min(MAX_SIDE_LENGTH);
        let fields = side_length * side_length;
        self.side_length = side_length;
        self.empty_cells = fields;
        self.cells = vec![Mark::Unmarked; fields];
    }

    /// Marks an unmarked cell. Returns `false` without touching the grid if
    /// the cell is already marked or the index is outside the grid.
    pub fn mark(&mut self, index: usize, owner: O) -> bool {
        if !matches!(self.get_field(index, 0, 0), Field::Unmarked) {
            return false;
        }
        self.cells[index] = Mark::Owner(owner);
        self.empty_cells -= 1;
        true
    }

    pub fn get_field(&self, index: usize, row_offset: isize, col_offset: isize) -> Field<'_, O> {
        if self.side_length == 0 || index >= self.cells.len() {
            return Field::OutOfBounds;
        }
        let side = self.side_length as isize;
        let column = (index % self.side_length) as isize + col_offset;
        if column < 0 || column >= side {
            return Field::OutOfBounds;
        }
        let row = (index / self.side_length) as isize + row_offset;
        if row < 0 || row >= side {
            return Field::OutOfBounds;
        }
        match &self.cells[(row * side + column) as usize] {
            Mark::Unmarked => Field::Unmarked,
            Mark::Owner(owner) => Field::Owner(owner),
        }
    }

    /// True once every cell is marked. A draw that is already forced while
    /// cells remain is not detected.
    pub fn is_draw(&self) -> bool {
        self.empty_cells == 0
    }

    /// Whether the mark at `index` completes a run of exactly
    /// `win_run_length` cells owned by `owner` along any axis.
    pub fn is_winning_mark(&self, owner: &O, index: usize) -> bool {
        let longest = AXES
            .iter()
            .map(|[a, b]| {
                self.count_in_direction(owner, index, *a) + self.count_in_direction(owner, index, *b)
            })
            .max()
            .unwrap_or(0);
        longest + 1 == self.win_run_length
    }

    fn count_in_direction(&self, owner: &O, index: usize, (d_row, d_col): (isize, isize)) -> usize {
        let mut count = 0;
        let (mut row_offset, mut col_offset) = (d_row, d_col);
        while let Field::Owner(found) = self.get_field(index, row_offset, col_offset) {
            if found != owner {
                break;
            }
            count += 1;
            row_offset += d_row;
            col_offset += d_col;
        }
        count
    }

    pub fn cells(&self) -> &[Mark<O>] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn side_length(&self) -> usize {
        self.side_length
    }

    pub fn win_run_length(&self) -> usize {
        self.win_run_length
    }

    pub fn empty_cells(&self) -> usize {
        self.empty_cells
    }
}
