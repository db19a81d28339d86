//! Placement strategies.
//!
//! A strategy looks at a copy of the free holes and names the word offset a
//! request should go to. It never sees the ledger itself, and it keeps no
//! state between calls, so it can be swapped on a live manager.

use std::slice;

use crate::report;

/// A free run of words as seen by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hole {
  pub position: usize,
  pub extent: usize,
}

impl Hole {
  pub fn new(
    position: usize,
    extent: usize,
  ) -> Self {
    Self { position, extent }
  }
}

/// Free holes sorted by position. An owned copy, detached from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeSnapshot {
  holes: Vec<Hole>,
}

impl FreeSnapshot {
  pub fn new(mut holes: Vec<Hole>) -> Self {
    holes.sort();
    Self { holes }
  }

  pub fn len(&self) -> usize {
    self.holes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.holes.is_empty()
  }

  pub fn iter(&self) -> slice::Iter<'_, Hole> {
    self.holes.iter()
  }

  pub fn as_slice(&self) -> &[Hole] {
    &self.holes
  }

  /// Packs the holes the way [`report::encode_free_list`] does.
  pub fn encode(&self) -> Vec<u16> {
    report::encode_free_list(self)
  }

  /// Size of the biggest hole, 0 when there is none.
  pub fn largest(&self) -> usize {
    self.holes.iter().map(|hole| hole.extent).max().unwrap_or(0)
  }
}

impl FromIterator<Hole> for FreeSnapshot {
  fn from_iter<I: IntoIterator<Item = Hole>>(iter: I) -> Self {
    Self::new(iter.into_iter().collect())
  }
}

impl<'a> IntoIterator for &'a FreeSnapshot {
  type Item = &'a Hole;
  type IntoIter = slice::Iter<'a, Hole>;

  fn into_iter(self) -> Self::IntoIter {
    self.holes.iter()
  }
}

/// Chooses where a request of `words` words is placed.
///
/// Closures of the shape `Fn(usize, &FreeSnapshot) -> Option<usize>` are
/// strategies too.
pub trait Placement {
  fn select(
    &self,
    words: usize,
    holes: &FreeSnapshot,
  ) -> Option<usize>;
}

impl<F> Placement for F
where
  F: Fn(usize, &FreeSnapshot) -> Option<usize>,
{
  fn select(
    &self,
    words: usize,
    holes: &FreeSnapshot,
  ) -> Option<usize> {
    self(words, holes)
  }
}

/// The built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
  #[default]
  BestFit,
  WorstFit,
}

impl Placement for SearchMode {
  fn select(
    &self,
    words: usize,
    holes: &FreeSnapshot,
  ) -> Option<usize> {
    let position = match self {
      SearchMode::BestFit => best_fit(words, holes),
      SearchMode::WorstFit => worst_fit(words, holes),
    };

    log::trace!("{:?} for {} words -> {:?}", self, words, position);

    position
  }
}

/// The hole leaving the least waste. Ties go to the lowest position.
pub fn best_fit(
  words: usize,
  holes: &FreeSnapshot,
) -> Option<usize> {
  holes
    .iter()
    .filter(|hole| hole.extent >= words)
    .min_by_key(|hole| hole.extent - words)
    .map(|hole| hole.position)
}

/// The biggest hole that fits. A later hole of equal size never wins.
pub fn worst_fit(
  words: usize,
  holes: &FreeSnapshot,
) -> Option<usize> {
  holes
    .iter()
    .filter(|hole| hole.extent >= words)
    .reduce(|biggest, hole| if hole.extent > biggest.extent { hole } else { biggest })
    .map(|hole| hole.position)
}
