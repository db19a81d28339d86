use std::collections::HashMap;

/// Issued address -> requested byte size.
#[derive(Debug, Clone, Default)]
pub struct AllocationIndex {
  entries: HashMap<usize, usize>,
}

impl AllocationIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(
    &mut self,
    address: usize,
    byte_size: usize,
  ) {
    self.entries.insert(address, byte_size);
  }

  pub fn size_of(
    &self,
    address: usize,
  ) -> Option<usize> {
    self.entries.get(&address).copied()
  }

  pub fn remove(
    &mut self,
    address: usize,
  ) -> Option<usize> {
    self.entries.remove(&address)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_record_and_remove() {
    let mut index = AllocationIndex::new();

    index.record(0x1000, 40);
    index.record(0x1028, 8);

    assert_eq!(index.len(), 2);
    assert_eq!(index.size_of(0x1000), Some(40));
    assert_eq!(index.size_of(0x1028), Some(8));

    assert_eq!(index.remove(0x1000), Some(40));
    assert_eq!(index.remove(0x1000), None);
    assert_eq!(index.size_of(0x1000), None);

    index.clear();
    assert_eq!(index.len(), 0);
  }
}
