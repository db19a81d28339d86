//! The backing buffer. Addresses handed to callers are real addresses inside
//! it: `base + word * word_size`. Every conversion back to a buffer index is
//! bounds checked.

use std::ops::Range;

#[derive(Debug)]
pub struct Arena {
  bytes: Box<[u8]>,
  word_size: usize,
}

impl Arena {
  /// A zeroed buffer of `words * word_size` bytes, `None` if that size
  /// overflows `usize`.
  pub fn new(
    words: usize,
    word_size: usize,
  ) -> Option<Self> {
    let len = words.checked_mul(word_size)?;

    Some(Self {
      bytes: vec![0; len].into_boxed_slice(),
      word_size,
    })
  }

  pub fn base(&self) -> usize {
    self.bytes.as_ptr() as usize
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn contains(
    &self,
    address: usize,
  ) -> bool {
    address >= self.base() && address - self.base() < self.len()
  }

  pub fn address_of(
    &self,
    word: usize,
  ) -> usize {
    self.base() + word * self.word_size
  }

  /// Word offset of `address`, if it is inside the buffer and word aligned.
  pub fn word_of(
    &self,
    address: usize,
  ) -> Option<usize> {
    if !self.contains(address) {
      return None;
    }

    let offset = address - self.base();
    (offset % self.word_size == 0).then_some(offset / self.word_size)
  }

  fn range(
    &self,
    address: usize,
    len: usize,
  ) -> Option<Range<usize>> {
    if !self.contains(address) {
      return None;
    }

    let start = address - self.base();
    let end = start.checked_add(len)?;
    (end <= self.len()).then_some(start..end)
  }

  pub fn slice(
    &self,
    address: usize,
    len: usize,
  ) -> Option<&[u8]> {
    let range = self.range(address, len)?;
    Some(&self.bytes[range])
  }

  pub fn slice_mut(
    &mut self,
    address: usize,
    len: usize,
  ) -> Option<&mut [u8]> {
    let range = self.range(address, len)?;
    Some(&mut self.bytes[range])
  }
}
