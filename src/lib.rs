//! # wordalloc - A Simulated Word-Granular Allocator
//!
//! This crate manages a private byte arena the way a heap allocator manages
//! memory: callers ask for bytes, get back an address inside the arena, and
//! hand it back later. The manager tracks which words are free, picks a hole
//! for every request with a pluggable **placement strategy**, and merges
//! neighbouring holes when memory is returned.
//!
//! ## Overview
//!
//! The arena is split into fixed-size words. Every word belongs to exactly
//! one region, and regions alternate between occupied and free:
//!
//! ```text
//!   Region Ledger (word size = 4, capacity = 24 words):
//!
//!   ┌──────────────────────┬───┬──────────┬───┬───────────────┬───┐
//!   │      free (0, 10)    │ A │ free     │ B │  free (16, 7) │ C │
//!   │                      │   │ (11, 4)  │   │               │   │
//!   └──────────────────────┴───┴──────────┴───┴───────────────┴───┘
//!   0                      10  11         15  16              23  24
//!
//!   A request for 20 bytes needs 5 words:
//!     best-fit  -> hole at 16 (2 words left over)
//!     worst-fit -> hole at 0  (biggest hole)
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   wordalloc
//!   ├── align      - Word rounding macros (words!, align_to!)
//!   ├── region     - Region record
//!   ├── ledger     - Ordered regions, split and merge
//!   ├── strategy   - Placement trait, best-fit, worst-fit
//!   ├── index      - Address -> requested size
//!   ├── arena      - Owned backing buffer
//!   ├── report     - Free list, bitmap, memory map dump
//!   ├── config     - ManagerConfig
//!   ├── error      - Error types
//!   └── manager    - MemoryManager facade
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use wordalloc::{MemoryManager, SearchMode};
//!
//! let mut manager = MemoryManager::new(4, SearchMode::BestFit);
//! manager.initialize(100);
//!
//! let first = manager.allocate(40).unwrap(); // 10 words at word 0
//! let second = manager.allocate(8).unwrap(); // 2 words at word 10
//!
//! manager.free(first);
//! assert_eq!(manager.free_list(), vec![2, 0, 10, 12, 88]);
//!
//! manager.free(second);
//! assert_eq!(manager.free_list(), vec![1, 0, 100]);
//! ```
//!
//! ## How It Works
//!
//! ```text
//!   allocate(bytes)
//!     words = ceil(bytes / word size)
//!     ledger ── free snapshot ──> strategy ── word offset ──> ledger.split
//!     index.record(address, bytes)
//!     address = arena base + offset * word size
//!
//!   free(address)
//!     index lookup ──> ledger.mark_free(offset) ──> ledger.merge_adjacent
//! ```
//!
//! Splitting keeps the requested words at the front of the hole and leaves
//! the rest free right after it:
//!
//! ```text
//!   before:  ┌──────────────── free (0, 100) ────────────────┐
//!   after:   ┌── used (0, 10) ──┬──────── free (10, 90) ──────┐
//! ```
//!
//! ## Exports
//!
//! - `free_list()`: `[count, pos0, extent0, ...]` as `u16` fields. The
//!   encoding cannot describe more than 65535 words.
//! - `bitmap()`: little-endian `u16` byte count, then one bit per word,
//!   LSB first, `1` = occupied.
//! - `dump_memory_map(path)`: `[pos, extent] - [pos, extent]` or `No holes`.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: wrap the manager in a mutex to share it
//! - **No compaction**: only neighbouring holes are merged
//! - **Fixed word size**: chosen at construction

pub mod align;
mod arena;
mod config;
mod error;
mod index;
mod ledger;
mod manager;
mod region;
pub mod report;
pub mod strategy;

pub use config::{DEFAULT_WORD_SIZE, ManagerConfig};
pub use error::{DumpError, EncodeError, FreeError, LedgerError};
pub use ledger::RegionLedger;
pub use manager::MemoryManager;
pub use region::Region;
pub use strategy::{FreeSnapshot, Hole, Placement, SearchMode, best_fit, worst_fit};
