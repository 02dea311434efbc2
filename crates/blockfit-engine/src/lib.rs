//! Rules engine for a 9×9 block-placement puzzle.
//!
//! Blocks of fixed shapes are drawn from a [`CandidateQueue`], placed on a
//! [`Board`], and full rows and columns are cleared for score. The
//! [`GameSession`] type ties the pieces together into a playable game.
//!
//! # Example
//!
//! ```
//! use blockfit_engine::GameSession;
//!
//! let mut session = GameSession::with_seed(12345);
//! session.start();
//!
//! // Drop the first candidate into the top-left corner.
//! let outcome = session.place_candidate(0, 0, 0).unwrap();
//! assert!(outcome.placement.score > 0);
//! assert_eq!(session.move_count(), 1);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A block type name that does not match any known [`BlockType`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown block type: {name}")]
pub struct UnknownBlockTypeError {
    #[error(not(source))]
    pub name: String,
}

/// Serialized block data that cannot describe a valid [`Block`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidBlockDataError {
    #[display("block shape is empty")]
    EmptyShape,
    #[display("block shape has {_0} cells, at most {max} are allowed", max = MAX_BLOCK_CELLS)]
    TooManyCells(#[error(not(source))] usize),
    #[display("block shape is not normalized (minimum row and column must be 0)")]
    NotNormalized,
    #[display("invalid rotation: {_0} (must be 0, 90, 180 or 270)")]
    InvalidRotation(#[error(not(source))] u16),
}

/// Invalid configuration of a [`BlockGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GeneratorError {
    #[display("available block types cannot be empty")]
    EmptyTypeList,
    #[display("block type {_0} is not available in this generator")]
    TypeNotAvailable(#[error(not(source))] BlockType),
}

/// Invalid configuration of a [`GameSession`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SessionConfigError {
    #[display("queue capacity must be at least 1")]
    ZeroQueueCapacity,
    #[display("{_0}")]
    Generator(#[error(not(source))] GeneratorError),
}
