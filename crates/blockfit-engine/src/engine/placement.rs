use serde::{Deserialize, Serialize};

use crate::core::{block::Position, board::Board};

/// Why a placement was rejected.
///
/// The display text is the reason reported to the player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::Error,
    derive_more::IsVariant,
)]
pub enum PlacementError {
    #[display("Out of bounds")]
    OutOfBounds,
    #[display("Position occupied")]
    PositionOccupied,
}

/// Result of a successful placement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementOutcome {
    /// Rows cleared by this placement, ascending.
    pub cleared_rows: Vec<usize>,
    /// Columns cleared by this placement, ascending.
    pub cleared_columns: Vec<usize>,
    /// Points earned by this placement. Negative only when the combo
    /// multiplier is below 1.
    pub score: i64,
}

impl PlacementOutcome {
    /// Returns the total number of lines (rows and columns) cleared.
    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.cleared_rows.len() + self.cleared_columns.len()
    }
}

/// Scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Points per placed cell.
    pub cell_placement_score: u32,
    /// Points per cleared row or column.
    pub line_score: u32,
    /// Multiplier driving the bonus for clearing several lines at once.
    pub combo_multiplier: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            cell_placement_score: 1,
            line_score: 10,
            combo_multiplier: 1.5,
        }
    }
}

impl ScoreConfig {
    /// Overwrites the fields set in `update`, keeping the others.
    pub fn apply(&mut self, update: ScoreConfigUpdate) {
        let ScoreConfigUpdate {
            cell_placement_score,
            line_score,
            combo_multiplier,
        } = update;
        if let Some(value) = cell_placement_score {
            self.cell_placement_score = value;
        }
        if let Some(value) = line_score {
            self.line_score = value;
        }
        if let Some(value) = combo_multiplier {
            self.combo_multiplier = value;
        }
    }
}

/// Partial update of a [`ScoreConfig`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfigUpdate {
    pub cell_placement_score: Option<u32>,
    pub line_score: Option<u32>,
    pub combo_multiplier: Option<f64>,
}

/// Runs a single move against a board: validate, place, detect full lines,
/// clear them, and score.
///
/// A rejected move leaves the board untouched.
///
/// # Example
///
/// ```
/// use blockfit_engine::{Board, PlacementError, PlacementManager, Position};
///
/// let mut board = Board::from_ascii("########.");
/// let manager = PlacementManager::new();
///
/// let outcome = manager.place(&mut board, &[Position::new(0, 8)]).unwrap();
/// assert_eq!(outcome.cleared_rows, [0]);
/// assert_eq!(outcome.score, 11);
/// assert_eq!(board.occupied_count(), 0);
///
/// let err = manager.place(&mut board, &[Position::new(0, 9)]).unwrap_err();
/// assert_eq!(err, PlacementError::OutOfBounds);
/// assert_eq!(err.to_string(), "Out of bounds");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlacementManager {
    score_config: ScoreConfig,
}

impl PlacementManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(score_config: ScoreConfig) -> Self {
        Self { score_config }
    }

    /// Checks whether `positions` can be placed on `board`.
    ///
    /// Out-of-bounds positions are reported before occupied ones.
    pub fn validate(board: &Board, positions: &[Position]) -> Result<(), PlacementError> {
        if !positions.iter().all(|pos| board.contains(pos.row, pos.col)) {
            return Err(PlacementError::OutOfBounds);
        }
        if positions.iter().any(|pos| board.cell(pos.row, pos.col)) {
            return Err(PlacementError::PositionOccupied);
        }
        Ok(())
    }

    /// Places the cells, clears every completed row and column, and scores
    /// the move.
    ///
    /// Lines are detected on the grid after placement; a cell shared by a
    /// full row and a full column counts towards both.
    pub fn place(
        &self,
        board: &mut Board,
        positions: &[Position],
    ) -> Result<PlacementOutcome, PlacementError> {
        if let Err(err) = Self::validate(board, positions) {
            tracing::debug!(reason = %err, cells = positions.len(), "placement rejected");
            return Err(err);
        }

        let placed = board.place_block(positions);
        debug_assert!(placed, "validated placement must succeed");

        let cleared_rows = board.full_rows();
        let cleared_columns = board.full_columns();
        board.clear_rows(&cleared_rows);
        board.clear_columns(&cleared_columns);

        let score = self.calculate_score(
            positions.len(),
            cleared_rows.len(),
            cleared_columns.len(),
        );
        tracing::debug!(
            cells = positions.len(),
            ?cleared_rows,
            ?cleared_columns,
            score,
            "placement completed"
        );

        Ok(PlacementOutcome {
            cleared_rows,
            cleared_columns,
            score,
        })
    }

    /// Computes the score for placing `cell_count` cells and clearing the
    /// given number of rows and columns.
    ///
    /// ```text
    /// base  = cells * cell_placement_score
    /// lines = rows + columns
    /// line  = lines * line_score
    /// combo = floor(line * (lines - 1) * (combo_multiplier - 1))   when lines >= 2
    /// score = base + line + combo
    /// ```
    ///
    /// A multiplier below 1 makes the combo term negative and reduces the
    /// score.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    pub fn calculate_score(&self, cell_count: usize, row_count: usize, column_count: usize) -> i64 {
        let ScoreConfig {
            cell_placement_score,
            line_score,
            combo_multiplier,
        } = self.score_config;

        let base_score = cell_count as i64 * i64::from(cell_placement_score);
        let total_lines = (row_count + column_count) as i64;
        if total_lines == 0 {
            return base_score;
        }

        let line_score = total_lines * i64::from(line_score);
        let combo_bonus = if total_lines >= 2 {
            (line_score as f64 * (total_lines - 1) as f64 * (combo_multiplier - 1.0)).floor()
                as i64
        } else {
            0
        };
        base_score + line_score + combo_bonus
    }

    #[must_use]
    pub fn score_config(&self) -> ScoreConfig {
        self.score_config
    }

    /// Updates the fields set in `update`, keeping the others.
    pub fn update_score_config(&mut self, update: ScoreConfigUpdate) {
        self.score_config.apply(update);
    }
}
