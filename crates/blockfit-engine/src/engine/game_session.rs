use serde::{Deserialize, Serialize};

use crate::{
    SessionConfigError,
    core::{
        block::{Block, BlockType},
        board::Board,
    },
};

use super::{
    block_generator::{BlockGenerator, GeneratorConfig},
    candidate_queue::{CandidateQueue, QueueConfig},
    placement::{
        PlacementError, PlacementManager, PlacementOutcome, ScoreConfig, ScoreConfigUpdate,
    },
};

/// Lifecycle of a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    /// Created or reset; moves are rejected until started.
    Ready,
    /// Accepting moves.
    Playing,
    /// No remaining candidate fits on the board.
    GameOver,
}

/// Configuration of a [`GameSession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of candidate slots. Must be at least 1.
    pub queue_capacity: usize,
    /// Seed for reproducible games. `None` draws from system entropy.
    pub seed: Option<u32>,
    /// Block types to draw from. `None` allows every type.
    pub block_types: Option<Vec<BlockType>>,
    pub auto_refill: bool,
    pub score: ScoreConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let queue = QueueConfig::default();
        Self {
            queue_capacity: queue.capacity,
            seed: None,
            block_types: None,
            auto_refill: queue.auto_refill,
            score: ScoreConfig::default(),
        }
    }
}

/// Why a move was rejected.
///
/// The display text is the reason reported to the player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant,
)]
pub enum MoveError {
    #[display("Game not started")]
    GameNotStarted,
    #[display("Invalid candidate index")]
    InvalidCandidateIndex,
    #[display("{_0}")]
    Placement(#[error(not(source))] PlacementError),
}

/// Result of a successful move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub placement: PlacementOutcome,
    /// Whether this move ended the game.
    pub game_over: bool,
}

/// A single game: board, candidate queue, score and move count.
///
/// A new session starts in [`GameState::Ready`]. Moves are accepted only
/// while [`GameState::Playing`], which [`start`](Self::start) enters. After
/// each successful move the session checks whether any remaining candidate
/// still fits somewhere on the board and switches to
/// [`GameState::GameOver`] if none does.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    queue: CandidateQueue,
    placement: PlacementManager,
    total_score: i64,
    move_count: u64,
    game_state: GameState,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates an unseeded session with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(
            BlockGenerator::new(),
            QueueConfig::default(),
            ScoreConfig::default(),
        )
    }

    /// Creates a reproducible session with default settings.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self::from_parts(
            BlockGenerator::with_seed(seed),
            QueueConfig::default(),
            ScoreConfig::default(),
        )
    }

    /// Creates a session from a configuration.
    ///
    /// A zero queue capacity or an empty block type list is rejected.
    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionConfigError> {
        if config.queue_capacity == 0 {
            return Err(SessionConfigError::ZeroQueueCapacity);
        }
        let generator = BlockGenerator::from_config(&GeneratorConfig {
            seed: config.seed,
            block_types: config.block_types.clone(),
        })
        .map_err(SessionConfigError::Generator)?;
        let queue = QueueConfig {
            capacity: config.queue_capacity,
            auto_refill: config.auto_refill,
        };
        Ok(Self::from_parts(generator, queue, config.score))
    }

    fn from_parts(generator: BlockGenerator, queue: QueueConfig, score: ScoreConfig) -> Self {
        Self {
            board: Board::new(),
            queue: CandidateQueue::new(generator, queue),
            placement: PlacementManager::with_config(score),
            total_score: 0,
            move_count: 0,
            game_state: GameState::Ready,
        }
    }

    /// Resets everything and enters [`GameState::Playing`].
    pub fn start(&mut self) {
        self.clear_progress();
        self.game_state = GameState::Playing;
        tracing::info!(capacity = self.queue.capacity(), "game started");
    }

    /// Clears the board, refills the queue, zeroes score and move count and
    /// returns to [`GameState::Ready`].
    pub fn reset(&mut self) {
        self.clear_progress();
        self.game_state = GameState::Ready;
        tracing::info!("game reset");
    }

    fn clear_progress(&mut self) {
        self.board.reset();
        self.queue.reset();
        self.total_score = 0;
        self.move_count = 0;
    }

    /// Places candidate `index` with its top-left cell at (`row`, `col`).
    ///
    /// A rejected move changes nothing.
    pub fn place_candidate(
        &mut self,
        index: usize,
        row: i32,
        col: i32,
    ) -> Result<MoveOutcome, MoveError> {
        if !self.game_state.is_playing() {
            tracing::debug!(index, row, col, "move rejected: game not started");
            return Err(MoveError::GameNotStarted);
        }
        let Some(candidate) = self.queue.candidate(index) else {
            tracing::debug!(index, "move rejected: invalid candidate index");
            return Err(MoveError::InvalidCandidateIndex);
        };

        let positions = candidate.absolute_positions(row, col);
        let placement = self
            .placement
            .place(&mut self.board, &positions)
            .map_err(MoveError::Placement)?;

        self.queue.select_candidate(index);
        self.total_score += placement.score;
        self.move_count += 1;

        let game_over = self.no_candidate_fits();
        if game_over {
            self.game_state = GameState::GameOver;
            tracing::info!(
                total_score = self.total_score,
                move_count = self.move_count,
                "game over"
            );
        }
        tracing::debug!(
            index,
            row,
            col,
            score = placement.score,
            total_score = self.total_score,
            "move applied"
        );

        Ok(MoveOutcome {
            placement,
            game_over,
        })
    }

    /// Returns whether candidate `index` could be placed at (`row`, `col`)
    /// right now, ignoring the game state.
    #[must_use]
    pub fn can_place_candidate(&self, index: usize, row: i32, col: i32) -> bool {
        self.queue
            .candidate(index)
            .is_some_and(|block| self.board.can_place_block(&block.absolute_positions(row, col)))
    }

    fn no_candidate_fits(&self) -> bool {
        !self
            .queue
            .candidates()
            .iter()
            .flatten()
            .any(|block| self.can_place_anywhere(block))
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn can_place_anywhere(&self, block: &Block) -> bool {
        let size = self.board.size();
        let bounds = block.bounds();
        if bounds.height > size || bounds.width > size {
            return false;
        }
        (0..=size - bounds.height).any(|row| {
            (0..=size - bounds.width).any(|col| {
                let positions = block.absolute_positions(row as i32, col as i32);
                self.board.can_place_block(&positions)
            })
        })
    }

    #[must_use]
    pub fn total_score(&self) -> i64 {
        self.total_score
    }

    #[must_use]
    pub fn move_count(&self) -> u64 {
        self.move_count
    }

    #[must_use]
    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_state.is_game_over()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.game_state.is_playing()
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Gives direct access to the board, e.g. to set up a puzzle position.
    ///
    /// Game-over detection only runs after the next successful move.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn candidates(&self) -> &[Option<Block>] {
        self.queue.candidates()
    }

    #[must_use]
    pub fn candidate(&self, index: usize) -> Option<&Block> {
        self.queue.candidate(index)
    }

    #[must_use]
    pub fn candidate_queue(&self) -> &CandidateQueue {
        &self.queue
    }

    pub fn candidate_queue_mut(&mut self) -> &mut CandidateQueue {
        &mut self.queue
    }

    #[must_use]
    pub fn placement_manager(&self) -> &PlacementManager {
        &self.placement
    }

    /// Updates the fields set in `update`, keeping the others.
    pub fn update_score_config(&mut self, update: ScoreConfigUpdate) {
        self.placement.update_score_config(update);
    }
}

#[cfg(test)]
mod tests {
    use crate::GeneratorError;

    use super::*;

    fn single_type_session(kind: BlockType) -> GameSession {
        let config = SessionConfig {
            seed: Some(1),
            block_types: Some(vec![kind]),
            ..SessionConfig::default()
        };
        let mut session = GameSession::from_config(&config).unwrap();
        session.start();
        session
    }

    fn candidate_types(session: &GameSession) -> Vec<BlockType> {
        session
            .candidates()
            .iter()
            .map(|slot| slot.as_ref().unwrap().block_type())
            .collect()
    }

    #[test]
    fn test_new_session_is_ready() {
        let session = GameSession::new();
        assert_eq!(session.game_state(), GameState::Ready);
        assert!(!session.is_playing());
        assert!(!session.is_game_over());
        assert_eq!(session.total_score(), 0);
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.candidates().len(), 3);
        assert_eq!(session.board().occupied_count(), 0);
    }

    #[test]
    fn test_move_before_start_is_rejected() {
        let mut session = GameSession::with_seed(1);
        let err = session.place_candidate(0, 0, 0).unwrap_err();
        assert_eq!(err, MoveError::GameNotStarted);
        assert_eq!(err.to_string(), "Game not started");
        assert_eq!(session.board().occupied_count(), 0);
        assert_eq!(session.move_count(), 0);
    }

    #[test]
    fn test_seeded_sessions_match() {
        let mut a = GameSession::with_seed(12345);
        let mut b = GameSession::with_seed(12345);
        a.start();
        b.start();

        // Construction fills the queue once and start refills it.
        assert_eq!(
            candidate_types(&a),
            [BlockType::TShape, BlockType::Line5, BlockType::LSmall]
        );
        assert_eq!(candidate_types(&a), candidate_types(&b));

        let moves = [(0, 0, 0), (1, 4, 0), (2, 6, 5), (0, 3, 4)];
        for (index, row, col) in moves {
            let ra = a.place_candidate(index, row, col);
            let rb = b.place_candidate(index, row, col);
            assert_eq!(ra, rb);
            assert_eq!(candidate_types(&a), candidate_types(&b));
        }
        assert_eq!(a.board(), b.board());
        assert_eq!(a.total_score(), b.total_score());
        assert_eq!(a.move_count(), b.move_count());
    }

    #[test]
    fn test_invalid_candidate_index() {
        let mut session = GameSession::with_seed(1);
        session.start();
        let err = session.place_candidate(3, 0, 0).unwrap_err();
        assert!(err.is_invalid_candidate_index());
        assert_eq!(err.to_string(), "Invalid candidate index");
        assert!(!session.can_place_candidate(3, 0, 0));
    }

    #[test]
    fn test_empty_slot_is_invalid_index() {
        let config = SessionConfig {
            seed: Some(5),
            block_types: Some(vec![BlockType::Single]),
            auto_refill: false,
            ..SessionConfig::default()
        };
        let mut session = GameSession::from_config(&config).unwrap();
        session.start();
        session.place_candidate(1, 0, 0).unwrap();
        assert!(session.candidate(1).is_none());
        assert_eq!(
            session.place_candidate(1, 0, 1),
            Err(MoveError::InvalidCandidateIndex)
        );
    }

    #[test]
    fn test_failed_move_changes_nothing() {
        let mut session = GameSession::with_seed(42);
        session.start();
        session.board_mut().set_cell(0, 0, true);
        session.board_mut().set_cell(1, 0, true);
        session.board_mut().set_cell(0, 1, true);
        let board = session.board().clone();
        let candidates = session.candidates().to_vec();

        let err = session.place_candidate(0, 9, 9).unwrap_err();
        assert_eq!(err, MoveError::Placement(PlacementError::OutOfBounds));
        assert_eq!(err.to_string(), "Out of bounds");

        let err = session.place_candidate(0, 0, 0).unwrap_err();
        assert_eq!(err.to_string(), "Position occupied");

        assert_eq!(session.board(), &board);
        assert_eq!(session.candidates(), candidates.as_slice());
        assert_eq!(session.total_score(), 0);
        assert_eq!(session.move_count(), 0);
        assert!(session.is_playing());
    }

    #[test]
    fn test_successful_move_refills_and_scores() {
        let mut session = single_type_session(BlockType::Square2x2);
        let outcome = session.place_candidate(1, 3, 3).unwrap();
        assert_eq!(outcome.placement.score, 4);
        assert!(!outcome.game_over);
        assert_eq!(session.total_score(), 4);
        assert_eq!(session.move_count(), 1);
        assert!(session.candidate_queue().is_full());
        assert!(session.board().cell(4, 4));
    }

    #[test]
    fn test_row_clear_adds_line_score() {
        let mut session = single_type_session(BlockType::Single);
        *session.board_mut() = Board::from_ascii("########.");
        let outcome = session.place_candidate(0, 0, 8).unwrap();
        assert_eq!(outcome.placement.cleared_rows, [0]);
        assert_eq!(outcome.placement.score, 11);
        assert_eq!(session.total_score(), 11);
        assert_eq!(session.board().occupied_count(), 0);
    }

    #[test]
    fn test_can_place_candidate() {
        let mut session = single_type_session(BlockType::Line3);
        assert!(session.can_place_candidate(0, 0, 0));
        assert!(session.can_place_candidate(0, 0, 6));
        assert!(!session.can_place_candidate(0, 0, 7));
        session.board_mut().set_cell(0, 2, true);
        assert!(!session.can_place_candidate(0, 0, 0));
    }

    #[test]
    fn test_game_over_after_last_fitting_move() {
        let mut session = single_type_session(BlockType::Square2x2);
        *session.board_mut() = Board::from_ascii(
            "
            ..##.####
            ..####.##
            ##.######
            ###.#####
            .###.####
            #####.###
            #.####.##
            #######.#
            ########.
            ",
        );

        let outcome = session.place_candidate(0, 0, 0).unwrap();
        assert_eq!(outcome.placement.score, 4);
        assert_eq!(outcome.placement.lines_cleared(), 0);
        assert!(outcome.game_over);
        assert!(session.is_game_over());
        assert_eq!(session.game_state(), GameState::GameOver);

        let err = session.place_candidate(1, 2, 2).unwrap_err();
        assert_eq!(err.to_string(), "Game not started");
        assert_eq!(session.move_count(), 1);
    }

    #[test]
    fn test_start_clears_progress() {
        let mut session = single_type_session(BlockType::Square3x3);
        *session.board_mut() = Board::from_ascii(
            "
            ...######
            ...######
            ...######
            ",
        );
        // The rest of the board is empty, so play continues.
        let outcome = session.place_candidate(0, 0, 0).unwrap();
        assert_eq!(outcome.placement.cleared_rows, [0, 1, 2]);
        assert!(!outcome.game_over);

        session.start();
        assert!(session.is_playing());
        assert_eq!(session.total_score(), 0);
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.board().occupied_count(), 0);
    }

    #[test]
    fn test_reset_returns_to_ready() {
        let mut session = GameSession::with_seed(9);
        session.start();
        session.place_candidate(0, 0, 0).unwrap();
        assert_eq!(session.move_count(), 1);

        session.reset();
        assert_eq!(session.game_state(), GameState::Ready);
        assert_eq!(session.total_score(), 0);
        assert_eq!(session.move_count(), 0);
        assert_eq!(session.board().occupied_count(), 0);
        assert!(session.candidate_queue().is_full());
        assert!(session.place_candidate(0, 0, 0).unwrap_err().is_game_not_started());
    }

    #[test]
    fn test_custom_capacity() {
        let config = SessionConfig {
            queue_capacity: 5,
            seed: Some(3),
            ..SessionConfig::default()
        };
        let mut session = GameSession::from_config(&config).unwrap();
        session.start();
        assert_eq!(session.candidates().len(), 5);
        assert!(session.candidate(4).is_some());
        assert!(session.candidate(5).is_none());
    }

    #[test]
    fn test_empty_block_types_rejected() {
        let config = SessionConfig {
            block_types: Some(vec![]),
            ..SessionConfig::default()
        };
        assert_eq!(
            GameSession::from_config(&config).unwrap_err(),
            SessionConfigError::Generator(GeneratorError::EmptyTypeList)
        );
    }

    #[test]
    fn test_zero_queue_capacity_rejected() {
        let config: SessionConfig = serde_json::from_str(r#"{"queue_capacity":0}"#).unwrap();
        let err = GameSession::from_config(&config).unwrap_err();
        assert_eq!(err, SessionConfigError::ZeroQueueCapacity);
        assert_eq!(err.to_string(), "queue capacity must be at least 1");
    }

    #[test]
    fn test_errors_have_no_duplicate_source() {
        use std::error::Error as _;

        let err = MoveError::Placement(PlacementError::OutOfBounds);
        assert_eq!(err.to_string(), "Out of bounds");
        assert!(err.source().is_none());

        let err = SessionConfigError::Generator(GeneratorError::EmptyTypeList);
        assert_eq!(err.to_string(), "available block types cannot be empty");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_low_combo_multiplier_lowers_total() {
        let config = SessionConfig {
            seed: Some(1),
            block_types: Some(vec![BlockType::Single]),
            score: ScoreConfig {
                combo_multiplier: 0.5,
                ..ScoreConfig::default()
            },
            ..SessionConfig::default()
        };
        let mut session = GameSession::from_config(&config).unwrap();
        session.start();
        *session.board_mut() = Board::from_ascii(
            "
            ....#....
            ....#....
            ....#....
            ....#....
            ####.####
            ....#....
            ....#....
            ....#....
            ....#....
            ",
        );
        // 1 + 20 + floor(20 * 1 * -0.5)
        let outcome = session.place_candidate(0, 4, 4).unwrap();
        assert_eq!(outcome.placement.cleared_rows, [4]);
        assert_eq!(outcome.placement.cleared_columns, [4]);
        assert_eq!(outcome.placement.score, 11);
        assert_eq!(session.total_score(), 11);
    }

    #[test]
    fn test_update_score_config() {
        let mut session = single_type_session(BlockType::Single);
        session.update_score_config(ScoreConfigUpdate {
            cell_placement_score: Some(5),
            ..ScoreConfigUpdate::default()
        });
        assert_eq!(session.placement_manager().score_config().cell_placement_score, 5);
        let outcome = session.place_candidate(0, 4, 4).unwrap();
        assert_eq!(outcome.placement.score, 5);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"seed":12345,"score":{"line_score":20}}"#).unwrap();
        assert_eq!(config.seed, Some(12345));
        assert_eq!(config.queue_capacity, 3);
        assert!(config.auto_refill);
        assert_eq!(config.score.line_score, 20);
        assert_eq!(config.score.cell_placement_score, 1);
    }

    #[test]
    fn test_game_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&GameState::GameOver).unwrap(),
            r#""GAME_OVER""#
        );
        assert_eq!(
            serde_json::from_str::<GameState>(r#""PLAYING""#).unwrap(),
            GameState::Playing
        );
    }
}
