use std::fmt;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    GeneratorError,
    core::block::{Block, BlockType},
};

/// Source of random indices used to pick block types.
///
/// The generator only ever asks for a uniformly distributed index, so a
/// source can be swapped for a scripted one in tests or for a seeded one to
/// make games reproducible.
pub trait RandomSource: fmt::Debug {
    /// Returns an index in `0..len`.
    ///
    /// `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Seeded MINSTD linear congruential generator.
///
/// `state = state * 48271 mod (2^31 - 1)`. Each draw yields
/// `state / (2^31 - 1)`, a value in `[0, 1)`, which is scaled to the
/// requested index range. Two sources built from the same seed always
/// produce the same sequence.
#[derive(Debug, Clone)]
pub struct MinStdRandom {
    state: u64,
}

impl MinStdRandom {
    pub const MODULUS: u64 = 2_147_483_647;
    pub const MULTIPLIER: u64 = 48_271;

    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed as u64 }
    }

    /// Advances the generator and returns the new raw state.
    pub fn next_state(&mut self) -> u64 {
        self.state = (self.state * Self::MULTIPLIER) % Self::MODULUS;
        self.state
    }

    /// Advances the generator and returns a value in `[0, 1)`.
    #[expect(clippy::cast_precision_loss)]
    pub fn next_unit(&mut self) -> f64 {
        self.next_state() as f64 / Self::MODULUS as f64
    }
}

impl RandomSource for MinStdRandom {
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn next_index(&mut self, len: usize) -> usize {
        let index = (self.next_unit() * len as f64).floor() as usize;
        index.min(len - 1)
    }
}

/// Non-deterministic source seeded from the thread-local RNG.
#[derive(Debug, Clone)]
pub struct EntropyRandom {
    rng: Pcg32,
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropyRandom {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Pcg32::from_rng(&mut rand::rng()),
        }
    }
}

impl RandomSource for EntropyRandom {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}

/// Configuration of a [`BlockGenerator`].
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed for reproducible generation. `None` draws from system entropy.
    pub seed: Option<u32>,
    /// Block types to draw from. `None` allows every type.
    pub block_types: Option<Vec<BlockType>>,
}

/// Produces blocks with types drawn uniformly from a configurable set.
///
/// # Example
///
/// ```
/// use blockfit_engine::BlockGenerator;
///
/// let mut a = BlockGenerator::with_seed(42);
/// let mut b = BlockGenerator::with_seed(42);
/// for _ in 0..10 {
///     assert_eq!(a.generate().block_type(), b.generate().block_type());
/// }
/// ```
#[derive(Debug)]
pub struct BlockGenerator {
    source: Box<dyn RandomSource>,
    available_types: Vec<BlockType>,
}

impl Default for BlockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGenerator {
    /// Seed used by [`Self::seeded`].
    pub const DEFAULT_SEED: u32 = 12_345;

    /// Creates a generator over every block type, seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: Box::new(EntropyRandom::new()),
            available_types: BlockType::ALL.to_vec(),
        }
    }

    /// Like [`Self::new`], but with a MINSTD source for reproducible sequences.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self {
            source: Box::new(MinStdRandom::new(seed)),
            available_types: BlockType::ALL.to_vec(),
        }
    }

    /// Reproducible generator using [`Self::DEFAULT_SEED`].
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_seed(Self::DEFAULT_SEED)
    }

    /// Creates a generator from a configuration.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let source: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(MinStdRandom::new(seed)),
            None => Box::new(EntropyRandom::new()),
        };
        let types = config.block_types.as_deref().unwrap_or(&BlockType::ALL);
        Self::with_source(source, types)
    }

    /// Creates a generator drawing from `types` with a caller-supplied source.
    pub fn with_source(
        source: Box<dyn RandomSource>,
        types: &[BlockType],
    ) -> Result<Self, GeneratorError> {
        if types.is_empty() {
            return Err(GeneratorError::EmptyTypeList);
        }
        Ok(Self {
            source,
            available_types: types.to_vec(),
        })
    }

    /// Generates a block of a randomly chosen available type.
    pub fn generate(&mut self) -> Block {
        let index = self.source.next_index(self.available_types.len());
        let kind = self.available_types[index];
        tracing::trace!(block_type = %kind, "generated block");
        Block::new(kind)
    }

    /// Generates exactly `count` blocks.
    pub fn generate_multiple(&mut self, count: usize) -> Vec<Block> {
        (0..count).map(|_| self.generate()).collect()
    }

    /// Creates a block of the given type, if the type is available.
    pub fn generate_type(&self, kind: BlockType) -> Result<Block, GeneratorError> {
        if !self.available_types.contains(&kind) {
            return Err(GeneratorError::TypeNotAvailable(kind));
        }
        Ok(Block::new(kind))
    }

    #[must_use]
    pub fn available_types(&self) -> &[BlockType] {
        &self.available_types
    }

    /// Replaces the set of types to draw from.
    ///
    /// An empty set is rejected and leaves the current set unchanged.
    pub fn set_available_types(&mut self, types: &[BlockType]) -> Result<(), GeneratorError> {
        if types.is_empty() {
            return Err(GeneratorError::EmptyTypeList);
        }
        self.available_types = types.to_vec();
        Ok(())
    }

    /// Restarts generation from a fresh MINSTD source seeded with `seed`.
    pub fn reset_seed(&mut self, seed: u32) {
        self.source = Box::new(MinStdRandom::new(seed));
    }
}
