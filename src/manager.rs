use std::path::Path;

use crate::{
  arena::Arena,
  config::ManagerConfig,
  error::{DumpError, FreeError, LedgerError},
  index::AllocationIndex,
  ledger::RegionLedger,
  region::Region,
  report::{self, FIELD_LIMIT},
  strategy::{FreeSnapshot, Placement},
  words,
};

/// Word-granular allocator over a private arena.
///
/// Addresses are plain `usize` values pointing into the arena; `0` is the
/// null address and is never handed out.
pub struct MemoryManager {
  word_size: usize,
  strategy: Box<dyn Placement>,
  arena: Option<Arena>,
  ledger: RegionLedger,
  index: AllocationIndex,
}

impl MemoryManager {
  pub fn new(
    word_size: usize,
    strategy: impl Placement + 'static,
  ) -> Self {
    Self::with_config(ManagerConfig::default().with_word_size(word_size).with_strategy(strategy))
  }

  pub fn with_config(config: ManagerConfig) -> Self {
    Self {
      word_size: config.word_size.max(1),
      strategy: config.strategy,
      arena: None,
      ledger: RegionLedger::default(),
      index: AllocationIndex::new(),
    }
  }

  /// Drops any previous arena and starts over with `words` free words.
  pub fn initialize(
    &mut self,
    words: usize,
  ) {
    self.shutdown();

    if words > FIELD_LIMIT {
      log::warn!(
        "{} words exceed what the free list export can describe ({})",
        words,
        FIELD_LIMIT
      );
    }

    let Some(arena) = Arena::new(words, self.word_size) else {
      log::warn!(
        "{} words of {} bytes do not fit in the address space, staying uninitialized",
        words,
        self.word_size
      );
      return;
    };

    self.arena = Some(arena);
    self.ledger = RegionLedger::new(words);

    log::debug!("initialized {} words of {} bytes", words, self.word_size);
  }

  /// Releases the arena and forgets every region and allocation.
  pub fn shutdown(&mut self) {
    self.arena = None;
    self.ledger = RegionLedger::default();
    self.index.clear();
  }

  pub fn is_initialized(&self) -> bool {
    self.arena.is_some()
  }

  /// Returns the address of `byte_size` bytes rounded up to whole words, or
  /// `None` when nothing fits or the manager was never initialized.
  pub fn allocate(
    &mut self,
    byte_size: usize,
  ) -> Option<usize> {
    let Some(arena) = &self.arena else {
      log::debug!("allocate({}) before initialize", byte_size);
      return None;
    };

    let words = words!(byte_size, self.word_size);
    let holes = self.ledger.snapshot_free();

    let Some(position) = self.strategy.select(words, &holes) else {
      log::debug!("no hole fits {} words (largest is {})", words, holes.largest());
      return None;
    };

    if let Err(err) = self.ledger.split(position, words) {
      log::warn!("strategy chose word {}: {}", position, err);
      return None;
    }

    let address = arena.address_of(position);
    self.index.record(address, byte_size);

    log::debug!("allocated {} bytes ({} words) at word {}", byte_size, words, position);
    debug_assert!(self.ledger.check().is_ok());

    Some(address)
  }

  /// Releases `address`. Null, foreign, and already freed addresses are
  /// ignored.
  pub fn free(
    &mut self,
    address: usize,
  ) {
    if let Err(err) = self.try_free(address) {
      log::warn!("ignoring free: {}", err);
    }
  }

  /// Like [`free`](Self::free) but says why nothing happened. Returns the
  /// byte size the allocation was requested with.
  pub fn try_free(
    &mut self,
    address: usize,
  ) -> Result<usize, FreeError> {
    if address == 0 {
      return Err(FreeError::Null);
    }

    let arena = self.arena.as_ref().ok_or(FreeError::OutOfRange(address))?;
    if !arena.contains(address) {
      return Err(FreeError::OutOfRange(address));
    }

    let byte_size = self.index.size_of(address).ok_or(FreeError::NotAllocated(address))?;
    let word = arena.word_of(address).ok_or(FreeError::NotAllocated(address))?;

    if let Err(err) = self.ledger.mark_free(word) {
      log::error!("allocation index and ledger disagree: {}", err);
      return Err(FreeError::Inconsistent(address, word));
    }

    self.index.remove(address);
    self.ledger.merge_adjacent();

    log::debug!("freed {} bytes at word {}", byte_size, word);
    debug_assert!(self.ledger.check().is_ok());

    Ok(byte_size)
  }

  /// Swaps the placement strategy. Applies from the next allocation.
  pub fn set_allocator(
    &mut self,
    strategy: impl Placement + 'static,
  ) {
    self.strategy = Box::new(strategy);
  }

  pub fn word_size(&self) -> usize {
    self.word_size
  }

  pub fn memory_start(&self) -> Option<usize> {
    self.arena.as_ref().map(Arena::base)
  }

  /// Managed bytes: capacity in words times the word size.
  pub fn memory_limit(&self) -> usize {
    self.ledger.capacity() * self.word_size
  }

  pub fn capacity_words(&self) -> usize {
    self.ledger.capacity()
  }

  pub fn allocation_count(&self) -> usize {
    self.index.len()
  }

  pub fn regions(&self) -> &[Region] {
    self.ledger.regions()
  }

  pub fn free_holes(&self) -> FreeSnapshot {
    self.ledger.snapshot_free()
  }

  /// The encoded free list, see [`report::encode_free_list`].
  pub fn free_list(&self) -> Vec<u16> {
    report::encode_free_list(&self.ledger.snapshot_free())
  }

  /// The occupancy bitmap, see [`report::bitmap`].
  pub fn bitmap(&self) -> Vec<u8> {
    report::bitmap(&self.ledger)
  }

  pub fn dump_memory_map(
    &self,
    path: impl AsRef<Path>,
  ) -> Result<(), DumpError> {
    report::dump_memory_map(path.as_ref(), &self.ledger.snapshot_free())
  }

  /// The bytes behind a live allocation.
  pub fn bytes(
    &self,
    address: usize,
  ) -> Option<&[u8]> {
    let size = self.index.size_of(address)?;
    self.arena.as_ref()?.slice(address, size)
  }

  pub fn bytes_mut(
    &mut self,
    address: usize,
  ) -> Option<&mut [u8]> {
    let size = self.index.size_of(address)?;
    self.arena.as_mut()?.slice_mut(address, size)
  }

  pub fn check(&self) -> Result<(), LedgerError> {
    self.ledger.check()
  }
}

impl Default for MemoryManager {
  fn default() -> Self {
    Self::with_config(ManagerConfig::default())
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;
  use crate::strategy::SearchMode;

  fn holes(manager: &MemoryManager) -> Vec<(usize, usize)> {
    manager.free_holes().iter().map(|hole| (hole.position, hole.extent)).collect()
  }

  fn word(
    manager: &MemoryManager,
    address: usize,
  ) -> usize {
    (address - manager.memory_start().unwrap()) / manager.word_size()
  }

  /// Holes of 10, 4 and 7 words at 0, 11 and 16, with occupied words between.
  fn fragmented(strategy: SearchMode) -> MemoryManager {
    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(24);

    let blocks: Vec<_> = [40, 4, 16, 4, 28, 4]
      .into_iter()
      .map(|bytes| manager.allocate(bytes).unwrap())
      .collect();

    manager.free(blocks[0]);
    manager.free(blocks[2]);
    manager.free(blocks[4]);
    manager.set_allocator(strategy);

    assert_eq!(holes(&manager), vec![(0, 10), (11, 4), (16, 7)]);
    manager
  }

  #[test]
  fn test_scenario() {
    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(100);

    let first = manager.allocate(40).unwrap();
    assert_eq!(first, manager.memory_start().unwrap());
    assert_eq!(holes(&manager), vec![(10, 90)]);

    let second = manager.allocate(8).unwrap();
    assert_eq!(word(&manager, second), 10);
    assert_eq!(holes(&manager), vec![(12, 88)]);

    manager.free(first);
    assert_eq!(holes(&manager), vec![(0, 10), (12, 88)]);
    assert_eq!(manager.free_list(), vec![2, 0, 10, 12, 88]);
    assert!(manager.check().is_ok());
  }

  #[test]
  fn test_best_fit_and_worst_fit_pick_different_holes() {
    let mut best = fragmented(SearchMode::BestFit);
    let address = best.allocate(20).unwrap();
    assert_eq!(word(&best, address), 16);
    assert_eq!(holes(&best), vec![(0, 10), (11, 4), (21, 2)]);

    let mut worst = fragmented(SearchMode::WorstFit);
    let address = worst.allocate(20).unwrap();
    assert_eq!(word(&worst, address), 0);
    assert_eq!(holes(&worst), vec![(5, 5), (11, 4), (16, 7)]);
  }

  #[test]
  fn test_round_trip_restores_holes() {
    let mut manager = fragmented(SearchMode::BestFit);
    let before = manager.regions().to_vec();

    let address = manager.allocate(13).unwrap();
    manager.free(address);

    assert_eq!(manager.regions(), before.as_slice());
    assert_eq!(manager.allocation_count(), 3);
  }

  #[test]
  fn test_free_merges_both_neighbours() {
    let mut manager = MemoryManager::new(1, SearchMode::BestFit);
    manager.initialize(30);

    let a = manager.allocate(10).unwrap();
    let b = manager.allocate(10).unwrap();
    let c = manager.allocate(10).unwrap();
    assert!(holes(&manager).is_empty());

    manager.free(a);
    manager.free(c);
    assert_eq!(holes(&manager), vec![(0, 10), (20, 10)]);

    manager.free(b);
    assert_eq!(holes(&manager), vec![(0, 30)]);
    assert_eq!(manager.regions().len(), 1);
  }

  #[test]
  fn test_exhaustion_leaves_state_alone() {
    let mut manager = fragmented(SearchMode::BestFit);
    let regions = manager.regions().to_vec();
    let bitmap = manager.bitmap();

    assert_eq!(manager.allocate(11 * 4), None);

    assert_eq!(manager.regions(), regions.as_slice());
    assert_eq!(manager.bitmap(), bitmap);
    assert_eq!(manager.allocation_count(), 3);
  }

  #[test]
  fn test_fill_exactly() {
    let mut manager = MemoryManager::new(8, SearchMode::WorstFit);
    manager.initialize(4);

    assert!(manager.allocate(32).is_some());
    assert!(manager.allocate(1).is_none());
    assert_eq!(manager.free_list(), vec![0]);
  }

  #[test]
  fn test_invalid_free_is_a_no_op() {
    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(16);

    let address = manager.allocate(8).unwrap();
    let regions = manager.regions().to_vec();

    assert_eq!(manager.try_free(0), Err(FreeError::Null));
    assert_eq!(manager.try_free(address + 4), Err(FreeError::NotAllocated(address + 4)));
    assert_eq!(manager.try_free(address + 64), Err(FreeError::OutOfRange(address + 64)));
    manager.free(address + 1);
    manager.free(usize::MAX);

    assert_eq!(manager.regions(), regions.as_slice());
    assert_eq!(manager.allocation_count(), 1);

    assert_eq!(manager.try_free(address), Ok(8));
    let regions = manager.regions().to_vec();

    assert_eq!(manager.try_free(address), Err(FreeError::NotAllocated(address)));
    manager.free(address);
    assert_eq!(manager.regions(), regions.as_slice());
    assert_eq!(manager.allocation_count(), 0);
  }

  #[test]
  fn test_uninitialized_manager() {
    let mut manager = MemoryManager::default();

    assert!(!manager.is_initialized());
    assert_eq!(manager.allocate(8), None);
    assert_eq!(manager.memory_start(), None);
    assert_eq!(manager.memory_limit(), 0);
    assert_eq!(manager.try_free(0x1000), Err(FreeError::OutOfRange(0x1000)));
    assert_eq!(manager.free_list(), vec![0]);
    assert_eq!(manager.bitmap(), vec![0, 0]);
  }

  #[test]
  fn test_reinitialize_resets_everything() {
    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(10);
    let stale = manager.allocate(12).unwrap();

    manager.initialize(20);

    assert_eq!(manager.memory_limit(), 80);
    assert_eq!(manager.allocation_count(), 0);
    assert_eq!(holes(&manager), vec![(0, 20)]);

    manager.free(stale);
    assert_eq!(holes(&manager), vec![(0, 20)]);
  }

  #[test]
  fn test_initialize_past_address_space_stays_uninitialized() {
    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(10);
    manager.allocate(8).unwrap();

    manager.initialize(usize::MAX / 2);

    assert!(!manager.is_initialized());
    assert_eq!(manager.capacity_words(), 0);
    assert_eq!(manager.memory_limit(), 0);
    assert_eq!(manager.allocation_count(), 0);
    assert_eq!(manager.allocate(4), None);
    assert_eq!(manager.free_list(), vec![0]);

    manager.initialize(10);
    assert!(manager.allocate(4).is_some());
  }

  fn assert_consistent(
    manager: &MemoryManager,
    step: usize,
  ) {
    assert!(manager.check().is_ok(), "step {}: {:?}", step, manager.check());

    let covered: usize = manager.regions().iter().map(|region| region.extent).sum();
    assert_eq!(covered, manager.capacity_words(), "step {}", step);

    for pair in manager.regions().windows(2) {
      assert!(pair[0].occupied || pair[1].occupied, "step {}: {:?}", step, pair);
    }

    let bitmap = manager.bitmap();
    for region in manager.regions() {
      for word in region.position..region.end() {
        let bit = bitmap[2 + word / 8] >> (word % 8) & 1 == 1;
        assert_eq!(bit, region.occupied, "step {}: word {}", step, word);
      }
    }
  }

  enum Step {
    Allocate(usize),
    Free(usize),
    Strategy(SearchMode),
  }

  #[test]
  fn test_invariants_hold_through_mixed_sequence() {
    use Step::*;

    let steps = [
      Allocate(12),
      Allocate(40),
      Allocate(3),
      Allocate(64),
      Free(1),
      Allocate(9),
      Strategy(SearchMode::WorstFit),
      Allocate(20),
      Free(0),
      Free(2),
      Allocate(1),
      Free(3),
      Strategy(SearchMode::BestFit),
      Allocate(30),
      Free(0),
      Free(5),
      Allocate(100),
      Free(4),
      Free(6),
      Free(7),
      Free(8),
      Free(9),
      Free(10),
      Allocate(4),
    ];

    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(50);
    assert_consistent(&manager, 0);

    let mut issued = Vec::new();

    for (step, action) in steps.into_iter().enumerate() {
      match action {
        Allocate(bytes) => issued.push(manager.allocate(bytes)),
        Free(n) => {
          if let Some(&Some(address)) = issued.get(n) {
            manager.free(address);
          }
        },
        Strategy(mode) => manager.set_allocator(mode),
      }

      assert_consistent(&manager, step + 1);
    }

    let live: HashSet<usize> = issued
      .iter()
      .flatten()
      .copied()
      .filter(|&address| manager.bytes(address).is_some())
      .collect();
    assert_eq!(live.len(), manager.allocation_count());
  }

  #[test]
  fn test_shutdown() {
    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(10);
    manager.allocate(4).unwrap();

    manager.shutdown();

    assert!(!manager.is_initialized());
    assert_eq!(manager.memory_limit(), 0);
    assert_eq!(manager.allocation_count(), 0);
    assert!(manager.regions().is_empty());
    assert_eq!(manager.allocate(4), None);
  }

  #[test]
  fn test_sizes_round_up_to_words() {
    let mut manager = MemoryManager::new(8, SearchMode::BestFit);
    manager.initialize(10);

    manager.allocate(0).unwrap();
    manager.allocate(9).unwrap();

    assert_eq!(holes(&manager), vec![(3, 7)]);
    assert_eq!(manager.word_size(), 8);
    assert_eq!(manager.capacity_words(), 10);
  }

  #[test]
  fn test_zero_word_size_is_clamped() {
    let manager = MemoryManager::with_config(ManagerConfig::default().with_word_size(0));

    assert_eq!(manager.word_size(), 1);
  }

  #[test]
  fn test_bitmap_agrees_with_regions() {
    let mut manager = fragmented(SearchMode::BestFit);
    manager.allocate(6).unwrap();

    let bitmap = manager.bitmap();
    assert_eq!(u16::from_le_bytes([bitmap[0], bitmap[1]]), 3);

    for region in manager.regions() {
      for word in region.position..region.end() {
        let bit = bitmap[2 + word / 8] >> (word % 8) & 1 == 1;
        assert_eq!(bit, region.occupied, "word {}", word);
      }
    }
  }

  #[test]
  fn test_custom_strategy_and_bad_choices() {
    let mut manager = MemoryManager::new(1, |_: usize, free: &FreeSnapshot| {
      free.as_slice().last().map(|hole| hole.position)
    });
    manager.initialize(20);
    let a = manager.allocate(5).unwrap();
    manager.allocate(5).unwrap();
    manager.free(a);

    let address = manager.allocate(2).unwrap();
    assert_eq!(word(&manager, address), 10);

    manager.set_allocator(|_: usize, _: &FreeSnapshot| Some(3));
    assert_eq!(manager.allocate(1), None);

    manager.set_allocator(|_: usize, _: &FreeSnapshot| Some(0));
    assert_eq!(manager.allocate(6), None);
    assert!(manager.check().is_ok());
  }

  #[test]
  fn test_memory_is_usable() {
    let mut manager = MemoryManager::new(4, SearchMode::BestFit);
    manager.initialize(8);

    let first = manager.allocate(6).unwrap();
    let second = manager.allocate(4).unwrap();

    manager.bytes_mut(first).unwrap().copy_from_slice(b"abcdef");
    manager.bytes_mut(second).unwrap().copy_from_slice(&42u32.to_le_bytes());

    assert_eq!(manager.bytes(first).unwrap(), b"abcdef");
    assert_eq!(manager.bytes(second).unwrap(), &42u32.to_le_bytes());

    manager.free(first);
    assert!(manager.bytes(first).is_none());
  }

  #[test]
  fn test_dump_memory_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.txt");
    let manager = fragmented(SearchMode::BestFit);

    manager.dump_memory_map(&path).unwrap();

    assert_eq!(
      std::fs::read_to_string(&path).unwrap(),
      "[0, 10] - [11, 4] - [16, 7]"
    );
    assert!(manager.dump_memory_map(dir.path().join("no/such/dir")).is_err());
  }
}
