//! The region ledger: every word of the arena belongs to exactly one region,
//! and regions are kept in position order with no gaps.

use crate::{
  error::LedgerError,
  region::Region,
  strategy::{FreeSnapshot, Hole},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionLedger {
  regions: Vec<Region>,
  capacity: usize,
}

impl RegionLedger {
  /// A ledger with one free region spanning `[0, capacity)`.
  pub fn new(capacity: usize) -> Self {
    let regions = if capacity == 0 {
      Vec::new()
    } else {
      vec![Region::free(0, capacity)]
    };

    Self { regions, capacity }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn regions(&self) -> &[Region] {
    &self.regions
  }

  fn locate(
    &self,
    position: usize,
    occupied: bool,
  ) -> Result<usize, LedgerError> {
    self
      .regions
      .binary_search_by_key(&position, |region| region.position)
      .ok()
      .filter(|&index| self.regions[index].occupied == occupied)
      .ok_or(LedgerError::NoRegion {
        position,
        state: if occupied { "occupied" } else { "free" },
      })
  }

  /// The region covering `word`, if `word` is inside the ledger.
  pub fn region_at(
    &self,
    word: usize,
  ) -> Option<&Region> {
    let index = self.regions.partition_point(|region| region.end() <= word);

    self.regions.get(index).filter(|region| region.contains(word))
  }

  /// Cuts `words` words off the front of the free region starting at
  /// `position` and marks them occupied. The rest, if any, stays free right
  /// after it.
  pub fn split(
    &mut self,
    position: usize,
    words: usize,
  ) -> Result<Region, LedgerError> {
    let index = self.locate(position, false)?;
    let region = &mut self.regions[index];

    if region.extent < words {
      return Err(LedgerError::TooSmall {
        position,
        extent: region.extent,
        needed: words,
      });
    }

    if region.extent > words {
      let rest = Region::free(region.position + words, region.extent - words);
      region.extent = words;
      self.regions.insert(index + 1, rest);
    }

    self.regions[index].occupied = true;

    Ok(self.regions[index])
  }

  pub fn mark_occupied(
    &mut self,
    position: usize,
  ) -> Result<(), LedgerError> {
    let index = self.locate(position, false)?;
    self.regions[index].occupied = true;
    Ok(())
  }

  pub fn mark_free(
    &mut self,
    position: usize,
  ) -> Result<(), LedgerError> {
    let index = self.locate(position, true)?;
    self.regions[index].occupied = false;
    Ok(())
  }

  /// Folds every run of consecutive free regions into its first region.
  /// Returns how many regions were absorbed.
  pub fn merge_adjacent(&mut self) -> usize {
    let before = self.regions.len();

    self.regions.dedup_by(|next, current| {
      let fold = current.is_free() && next.is_free();
      if fold {
        current.extent += next.extent;
      }
      fold
    });

    let merged = before - self.regions.len();
    if merged > 0 {
      log::trace!("merged {} free regions", merged);
    }

    merged
  }

  pub fn snapshot_free(&self) -> FreeSnapshot {
    self
      .regions
      .iter()
      .filter(|region| region.is_free())
      .map(|region| Hole::new(region.position, region.extent))
      .collect()
  }

  pub fn occupied_words(&self) -> usize {
    self
      .regions
      .iter()
      .filter(|region| region.occupied)
      .map(|region| region.extent)
      .sum()
  }

  /// Verifies ordering, coverage, and that no two free regions touch.
  pub fn check(&self) -> Result<(), LedgerError> {
    let mut expected = 0;

    for (index, region) in self.regions.iter().enumerate() {
      if region.position != expected {
        return Err(LedgerError::Gap {
          expected,
          found: region.position,
        });
      }

      if region.extent == 0 {
        return Err(LedgerError::Empty(region.position));
      }

      if index > 0 {
        let previous = &self.regions[index - 1];
        if previous.is_free() && region.is_free() {
          return Err(LedgerError::AdjacentFree(previous.position, region.position));
        }
      }

      expected = region.end();
    }

    if expected != self.capacity {
      return Err(LedgerError::CoverageMismatch {
        covered: expected,
        capacity: self.capacity,
      });
    }

    Ok(())
  }
}
