//! Read-only exports of the ledger for reporting tools.
//!
//! The free list is packed as `[count, pos0, extent0, pos1, extent1, ...]`
//! with every field a `u16`. This caps what the export can describe at
//! 65535 words; larger values are truncated. The ledger itself has no such
//! limit.

use std::{fs::File, io::Write, path::Path};

use crate::{
  align_to,
  error::{DumpError, EncodeError},
  ledger::RegionLedger,
  strategy::{FreeSnapshot, Hole},
};

/// Largest value a free-list field can carry.
pub const FIELD_LIMIT: usize = u16::MAX as usize;

fn field(value: usize) -> u16 {
  if value > FIELD_LIMIT {
    log::warn!("free list field {} exceeds {}, truncating", value, FIELD_LIMIT);
  }
  value as u16
}

pub fn encode_free_list(holes: &FreeSnapshot) -> Vec<u16> {
  let mut encoded = Vec::with_capacity(holes.len() * 2 + 1);
  encoded.push(field(holes.len()));

  for hole in holes {
    encoded.push(field(hole.position));
    encoded.push(field(hole.extent));
  }

  encoded
}

pub fn decode_free_list(encoded: &[u16]) -> Result<FreeSnapshot, EncodeError> {
  let (&count, fields) = encoded.split_first().ok_or(EncodeError::MissingCount)?;
  let count = count as usize;

  if fields.len() < count * 2 {
    return Err(EncodeError::Truncated {
      declared: count,
      available: fields.len(),
    });
  }

  Ok(
    fields
      .chunks_exact(2)
      .take(count)
      .map(|pair| Hole::new(pair[0] as usize, pair[1] as usize))
      .collect(),
  )
}

/// One bit per word, LSB first, 1 = occupied, behind a little-endian `u16`
/// byte count.
pub fn bitmap(ledger: &RegionLedger) -> Vec<u8> {
  let bytes_needed = align_to!(ledger.capacity(), 8) / 8;

  let mut bitmap = Vec::with_capacity(bytes_needed + 2);
  bitmap.extend_from_slice(&field(bytes_needed).to_le_bytes());
  bitmap.resize(bytes_needed + 2, 0);

  for region in ledger.regions().iter().filter(|region| region.occupied) {
    for word in region.position..region.end() {
      bitmap[2 + word / 8] |= 1 << (word % 8);
    }
  }

  bitmap
}

/// `[position, extent]` pairs joined by `" - "`, or `No holes`.
pub fn format_memory_map(holes: &FreeSnapshot) -> String {
  if holes.is_empty() {
    return String::from("No holes");
  }

  holes
    .iter()
    .map(|hole| format!("[{}, {}]", hole.position, hole.extent))
    .collect::<Vec<_>>()
    .join(" - ")
}

pub fn dump_memory_map(
  path: &Path,
  holes: &FreeSnapshot,
) -> Result<(), DumpError> {
  let mut file = File::create(path)?;
  file.write_all(format_memory_map(holes).as_bytes())?;

  log::debug!("memory map written to {}", path.display());

  Ok(())
}
