/// Number of whole words needed to hold `bytes` bytes, never less than one.
///
/// # Examples
///
/// ```rust
/// use wordalloc::words;
///
/// assert_eq!(words!(40, 4), 10);
/// assert_eq!(words!(41, 4), 11);
/// assert_eq!(words!(0, 8), 1); // a zero-length request still takes a word.
/// ```
#[macro_export]
macro_rules! words {
  ($bytes:expr, $word_size:expr) => {{
    let word_size: usize = $word_size;
    let bytes: usize = $bytes;
    if bytes == 0 { 1 } else { bytes.div_ceil(word_size) }
  }};
}

/// Rounds `value` up to the next multiple of `unit`.
///
/// # Examples
///
/// ```rust
/// use wordalloc::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(0, 8), 0);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $unit:expr) => {{
    let unit: usize = $unit;
    let value: usize = $value;
    value.div_ceil(unit) * unit
  }};
}
