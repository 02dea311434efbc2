use serde::{Deserialize, Serialize};

use crate::core::block::Block;

use super::block_generator::BlockGenerator;

/// Configuration of a [`CandidateQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Number of slots. Must be at least 1.
    pub capacity: usize,
    /// Refill a slot as soon as its block is selected.
    pub auto_refill: bool,
}

impl QueueConfig {
    pub const DEFAULT_CAPACITY: usize = 3;
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            auto_refill: true,
        }
    }
}

/// Fixed-capacity row of candidate blocks the player chooses from.
///
/// Slots are filled from a [`BlockGenerator`]. With auto-refill enabled a
/// selected slot is refilled in the same call, so the queue is always full
/// from the caller's point of view.
///
/// # Example
///
/// ```
/// use blockfit_engine::{BlockGenerator, CandidateQueue, QueueConfig};
///
/// let mut queue = CandidateQueue::new(BlockGenerator::with_seed(1), QueueConfig::default());
/// assert!(queue.is_full());
///
/// let picked = queue.select_candidate(1).unwrap();
/// assert!(queue.is_full());
/// assert!(queue.select_candidate(3).is_none());
/// # let _ = picked;
/// ```
#[derive(Debug)]
pub struct CandidateQueue {
    slots: Vec<Option<Block>>,
    generator: BlockGenerator,
    auto_refill: bool,
}

impl CandidateQueue {
    /// Creates a queue and fills every slot from `generator`.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    #[must_use]
    pub fn new(generator: BlockGenerator, config: QueueConfig) -> Self {
        assert!(config.capacity > 0, "queue capacity must be at least 1");
        let mut this = Self {
            slots: vec![None; config.capacity],
            generator,
            auto_refill: config.auto_refill,
        };
        this.refill_all();
        this
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the block in slot `index`, or `None` if the index is out of
    /// range or the slot is empty.
    #[must_use]
    pub fn candidate(&self, index: usize) -> Option<&Block> {
        self.slots.get(index)?.as_ref()
    }

    /// Returns every slot in order.
    #[must_use]
    pub fn candidates(&self) -> &[Option<Block>] {
        &self.slots
    }

    #[must_use]
    pub fn has_candidate(&self, index: usize) -> bool {
        self.candidate(index).is_some()
    }

    /// Takes the block out of slot `index`.
    ///
    /// Returns `None` for an out-of-range index or an empty slot. With
    /// auto-refill enabled the slot is refilled before returning.
    pub fn select_candidate(&mut self, index: usize) -> Option<Block> {
        let selected = self.slots.get_mut(index)?.take()?;
        if self.auto_refill {
            self.slots[index] = Some(self.generator.generate());
            tracing::trace!(index, "refilled candidate slot");
        }
        Some(selected)
    }

    /// Puts a freshly generated block into slot `index`, replacing any block
    /// already there.
    ///
    /// Returns `false` if the index is out of range.
    pub fn refill_slot(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        self.slots[index] = Some(self.generator.generate());
        true
    }

    /// Fills every empty slot. Occupied slots are left untouched.
    pub fn refill_all(&mut self) {
        for slot in self.slots.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(self.generator.generate());
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Empties every slot and refills them all, regardless of auto-refill.
    pub fn reset(&mut self) {
        self.clear();
        self.refill_all();
    }

    /// Empties every slot without refilling.
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    pub fn set_auto_refill(&mut self, enable: bool) {
        self.auto_refill = enable;
    }

    #[must_use]
    pub fn is_auto_refill_enabled(&self) -> bool {
        self.auto_refill
    }

    /// Replaces the generator used for future refills.
    ///
    /// Blocks already in the queue are kept. Returns the previous generator.
    pub fn set_generator(&mut self, generator: BlockGenerator) -> BlockGenerator {
        std::mem::replace(&mut self.generator, generator)
    }

    #[must_use]
    pub fn generator(&self) -> &BlockGenerator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut BlockGenerator {
        &mut self.generator
    }
}
