use std::io;

use thiserror::Error;

/// Failure to write the memory map. The only failure a caller ever sees.
#[derive(Error, Debug)]
pub enum DumpError {
  #[error("cannot write memory map: {0}")]
  Io(#[from] io::Error),
}

/// Why a `free` was ignored.
///
/// [`MemoryManager::free`](crate::MemoryManager::free) swallows these;
/// [`MemoryManager::try_free`](crate::MemoryManager::try_free) hands them back.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeError {
  #[error("null address")]
  Null,

  #[error("address {0:#x} is outside the arena")]
  OutOfRange(usize),

  #[error("address {0:#x} is not allocated")]
  NotAllocated(usize),

  #[error("address {0:#x} is indexed but no occupied region starts at word {1}")]
  Inconsistent(usize, usize),
}

/// A broken ledger invariant or a lookup that hit no region boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
  #[error("region at word {found} should start at word {expected}")]
  Gap { expected: usize, found: usize },

  #[error("regions cover {covered} words, capacity is {capacity}")]
  CoverageMismatch { covered: usize, capacity: usize },

  #[error("free regions at words {0} and {1} are adjacent")]
  AdjacentFree(usize, usize),

  #[error("region at word {0} has zero extent")]
  Empty(usize),

  #[error("region at word {position} holds {extent} words, {needed} needed")]
  TooSmall {
    position: usize,
    extent: usize,
    needed: usize,
  },

  #[error("no {state} region starts at word {position}")]
  NoRegion { position: usize, state: &'static str },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
  #[error("free list declares {declared} holes but carries {available} fields")]
  Truncated { declared: usize, available: usize },

  #[error("free list is empty, the count field is missing")]
  MissingCount,
}
