use std::io::Read;

use wordalloc::{FreeSnapshot, MemoryManager, SearchMode};

/// Waits until the user presses ENTER, so each step can be looked at.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_state(
  label: &str,
  manager: &MemoryManager,
) {
  println!("[{}] free list = {:?}", label, manager.free_list());
  println!("[{}] bitmap    = {:02x?}", label, manager.bitmap());
}

fn print_alloc(
  manager: &MemoryManager,
  bytes: usize,
  address: Option<usize>,
) {
  match (address, manager.memory_start()) {
    (Some(address), Some(base)) => println!(
      "Allocated {} bytes at word {} (address = {:#x})",
      bytes,
      (address - base) / manager.word_size(),
      address
    ),
    _ => println!("Allocation of {} bytes failed", bytes),
  }
}

fn main() {
  env_logger::Builder::from_default_env().init();

  let mut manager = MemoryManager::new(4, SearchMode::BestFit);
  manager.initialize(24);

  print_state("start", &manager);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Carve the arena into holes of 10, 4 and 7 words.
  // --------------------------------------------------------------------
  let mut blocks = Vec::new();
  for bytes in [40, 4, 16, 4, 28, 4] {
    let address = manager.allocate(bytes);
    print_alloc(&manager, bytes, address);
    blocks.extend(address);
  }

  manager.free(blocks[0]);
  manager.free(blocks[2]);
  manager.free(blocks[4]);

  println!("\n[1] Freed blocks 0, 2 and 4");
  print_state("1", &manager);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Best-fit takes the 7 word hole for a 5 word request.
  // --------------------------------------------------------------------
  let bytes = 20;
  let best = manager.allocate(bytes);
  println!("\n[2] Best fit");
  print_alloc(&manager, bytes, best);
  print_state("2", &manager);

  if let Some(address) = best {
    if let Some(bytes) = manager.bytes_mut(address) {
      bytes.fill(0xAB);
    }
    manager.free(address);
  }

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Worst-fit takes the biggest hole.
  // --------------------------------------------------------------------
  manager.set_allocator(SearchMode::WorstFit);
  let worst = manager.allocate(bytes);
  println!("\n[3] Worst fit");
  print_alloc(&manager, bytes, worst);
  print_state("3", &manager);

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Any closure can be a strategy. This one takes the last hole.
  // --------------------------------------------------------------------
  manager.set_allocator(|_: usize, free: &FreeSnapshot| free.as_slice().last().map(|hole| hole.position));
  let last = manager.allocate(4);
  println!("\n[4] Last hole");
  print_alloc(&manager, 4, last);
  print_state("4", &manager);

  // --------------------------------------------------------------------
  // 5) Write the holes to a file.
  // --------------------------------------------------------------------
  let path = std::env::temp_dir().join("wordalloc-memory-map.txt");
  match manager.dump_memory_map(&path) {
    Ok(()) => println!("\n[5] Memory map written to {}", path.display()),
    Err(err) => println!("\n[5] {}", err),
  }

  println!("\n[6] End of example. Dropping the manager releases the arena.");
}
