//! Game rules built on top of the core board and block types.
//!
//! - [`BlockGenerator`] - Draws random block types from a configurable set
//! - [`CandidateQueue`] - Fixed number of blocks the player chooses from
//! - [`PlacementManager`] - Validates a move, clears full lines and scores it
//! - [`GameSession`] - Ready / playing / game-over state machine tying it all together
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`], optionally seeded for reproducible games
//! 2. Call [`GameSession::start`]
//! 3. Pick a candidate and an origin cell with [`GameSession::place_candidate`]
//! 4. Full rows and columns are cleared and the move is scored
//! 5. Repeat until no remaining candidate fits anywhere on the board
//!
//! # Example
//!
//! ```
//! use blockfit_engine::{GameSession, GameState};
//!
//! let mut session = GameSession::with_seed(7);
//! assert_eq!(session.game_state(), GameState::Ready);
//!
//! session.start();
//! while session.is_playing() && session.move_count() < 5 {
//!     let origin = (0..9)
//!         .flat_map(|row| (0..9).map(move |col| (row, col)))
//!         .find(|&(row, col)| session.can_place_candidate(0, row, col));
//!     let Some((row, col)) = origin else { break };
//!     session.place_candidate(0, row, col).unwrap();
//! }
//! assert!(session.total_score() > 0);
//! ```

pub use self::{block_generator::*, candidate_queue::*, game_session::*, placement::*};

mod block_generator;
mod candidate_queue;
mod game_session;
mod placement;
