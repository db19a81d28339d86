use std::mem;

use crate::strategy::{Placement, SearchMode};

/// Default word size: one machine word.
pub const DEFAULT_WORD_SIZE: usize = mem::size_of::<usize>();

/// Construction settings for a [`MemoryManager`](crate::MemoryManager).
pub struct ManagerConfig {
  /// Allocation granularity in bytes. Zero is treated as one.
  pub word_size: usize,
  pub strategy: Box<dyn Placement>,
}

impl Default for ManagerConfig {
  fn default() -> Self {
    Self {
      word_size: DEFAULT_WORD_SIZE,
      strategy: Box::new(SearchMode::default()),
    }
  }
}

impl ManagerConfig {
  pub fn with_word_size(
    mut self,
    word_size: usize,
  ) -> Self {
    self.word_size = word_size;
    self
  }

  pub fn with_strategy(
    mut self,
    strategy: impl Placement + 'static,
  ) -> Self {
    self.strategy = Box::new(strategy);
    self
  }
}
