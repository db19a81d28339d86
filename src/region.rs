/// A contiguous run of words sharing one occupancy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
  pub position: usize,
  pub extent: usize,
  pub occupied: bool,
}

impl Region {
  pub fn new(
    position: usize,
    extent: usize,
    occupied: bool,
  ) -> Self {
    Self { position, extent, occupied }
  }

  pub fn free(
    position: usize,
    extent: usize,
  ) -> Self {
    Self::new(position, extent, false)
  }

  /// One past the last word of the region.
  pub fn end(&self) -> usize {
    self.position + self.extent
  }

  pub fn is_free(&self) -> bool {
    !self.occupied
  }

  pub fn contains(
    &self,
    word: usize,
  ) -> bool {
    word >= self.position && word < self.end()
  }
}
