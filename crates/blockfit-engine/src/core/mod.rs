pub use self::{block::*, board::*};

pub(crate) mod block;
pub(crate) mod board;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: usize = 9;

/// Largest number of cells a single block can occupy (the 3×3 square).
pub const MAX_BLOCK_CELLS: usize = 9;
