use std::fmt;

use super::{BOARD_SIZE, block::Position};

// Bits 0-8 hold the nine columns of a row, bit N corresponds to col=N.
const FULL_ROW_MASK: u16 = (1 << BOARD_SIZE) - 1;

/// Single row of the board, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct BoardRow {
    bits: u16,
}

impl BoardRow {
    const EMPTY: Self = Self { bits: 0 };

    #[inline]
    fn is_filled(self) -> bool {
        self.bits & FULL_ROW_MASK == FULL_ROW_MASK
    }

    #[inline]
    fn is_cell_occupied(self, col: usize) -> bool {
        self.bits & (1 << col) != 0
    }

    #[inline]
    fn set_cell(&mut self, col: usize, occupied: bool) {
        if occupied {
            self.bits |= 1 << col;
        } else {
            self.bits &= !(1 << col);
        }
    }

    #[inline]
    fn occupied_count(self) -> usize {
        self.bits.count_ones() as usize
    }
}

/// The 9×9 occupancy grid.
///
/// Every coordinate access is bounds-checked: reads outside the board report
/// an empty cell and writes outside the board are rejected without touching
/// the grid. Multi-cell operations are all-or-nothing.
///
/// # Example
///
/// ```
/// use blockfit_engine::{Board, Position};
///
/// let mut board = Board::new();
/// let cells: Vec<_> = (0..9).map(|col| Position::new(0, col)).collect();
///
/// assert!(board.place_block(&cells));
/// assert_eq!(board.full_rows(), [0]);
/// assert!(board.full_columns().is_empty());
///
/// board.clear_rows(&board.full_rows());
/// assert_eq!(board.occupied_count(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const SIZE: usize = BOARD_SIZE;

    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; BOARD_SIZE],
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        Self::SIZE
    }

    /// Clears every cell.
    pub fn reset(&mut self) {
        self.rows = [BoardRow::EMPTY; BOARD_SIZE];
    }

    /// Returns `true` if `(row, col)` lies on the board.
    #[must_use]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        Self::index(row, col).is_some()
    }

    fn index(row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok().filter(|&r| r < BOARD_SIZE)?;
        let col = usize::try_from(col).ok().filter(|&c| c < BOARD_SIZE)?;
        Some((row, col))
    }

    /// Returns whether the cell is occupied. Off-board cells are reported empty.
    #[must_use]
    pub fn cell(&self, row: i32, col: i32) -> bool {
        Self::index(row, col).is_some_and(|(r, c)| self.rows[r].is_cell_occupied(c))
    }

    /// Sets the occupancy of a single cell.
    ///
    /// Returns `false` without side effect when the cell is off the board.
    pub fn set_cell(&mut self, row: i32, col: i32, occupied: bool) -> bool {
        let Some((r, c)) = Self::index(row, col) else {
            return false;
        };
        self.rows[r].set_cell(c, occupied);
        true
    }

    /// Returns `true` if every position is on the board and empty.
    ///
    /// An empty slice is trivially placeable.
    #[must_use]
    pub fn can_place_block(&self, positions: &[Position]) -> bool {
        positions
            .iter()
            .all(|pos| self.contains(pos.row, pos.col) && !self.cell(pos.row, pos.col))
    }

    /// Occupies every position, or none of them if any is off the board or
    /// already occupied.
    pub fn place_block(&mut self, positions: &[Position]) -> bool {
        if !self.can_place_block(positions) {
            return false;
        }
        for pos in positions {
            self.set_cell(pos.row, pos.col, true);
        }
        true
    }

    /// Empties every position, or none of them if any is off the board.
    ///
    /// Occupancy is not checked: removing an already empty cell succeeds.
    pub fn remove_block(&mut self, positions: &[Position]) -> bool {
        if !positions.iter().all(|pos| self.contains(pos.row, pos.col)) {
            return false;
        }
        for pos in positions {
            self.set_cell(pos.row, pos.col, false);
        }
        true
    }

    /// Returns the indices of fully occupied rows in ascending order.
    #[must_use]
    pub fn full_rows(&self) -> Vec<usize> {
        (0..BOARD_SIZE)
            .filter(|&r| self.rows[r].is_filled())
            .collect()
    }

    /// Returns the indices of fully occupied columns in ascending order.
    #[must_use]
    pub fn full_columns(&self) -> Vec<usize> {
        let filled = self
            .rows
            .iter()
            .fold(FULL_ROW_MASK, |acc, row| acc & row.bits);
        (0..BOARD_SIZE)
            .filter(|&c| filled & (1 << c) != 0)
            .collect()
    }

    /// Empties every named row. Indices off the board are ignored.
    pub fn clear_rows(&mut self, rows: &[usize]) {
        for &r in rows {
            if let Some(row) = self.rows.get_mut(r) {
                *row = BoardRow::EMPTY;
            }
        }
    }

    /// Empties every named column. Indices off the board are ignored.
    pub fn clear_columns(&mut self, cols: &[usize]) {
        for &c in cols.iter().filter(|&&c| c < BOARD_SIZE) {
            for row in &mut self.rows {
                row.set_cell(c, false);
            }
        }
    }

    /// Returns an owned snapshot of the grid, indexed as `state[row][col]`.
    #[must_use]
    pub fn state(&self) -> [[bool; BOARD_SIZE]; BOARD_SIZE] {
        self.rows
            .map(|row| std::array::from_fn(|c| row.is_cell_occupied(c)))
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().map(|row| row.occupied_count()).sum()
    }

    /// Creates a `Board` from ASCII art.
    ///
    /// `#` is an occupied cell and `.` an empty one; other characters are
    /// ignored. Rows are listed top to bottom, missing rows are empty.
    ///
    /// # Panics
    ///
    /// Panics if a row does not have exactly 9 cells or there are more than
    /// 9 rows.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::EMPTY;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= BOARD_SIZE,
            "Board must have at most {BOARD_SIZE} rows, got {}",
            lines.len()
        );

        for (r, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                BOARD_SIZE,
                "Each row must have exactly {BOARD_SIZE} cells, got {} at row {r}",
                chars.len(),
            );
            for (c, &ch) in chars.iter().enumerate() {
                board.rows[r].set_cell(c, ch == '#');
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for c in 0..BOARD_SIZE {
                f.write_str(if row.is_cell_occupied(c) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
