//! # arena-heap - fixed-arena allocator with pluggable placement
//!
//! A user-space heap allocator over a single fixed-capacity private
//! arena, built to explore placement strategies and fragmentation
//! behaviour rather than to replace a general-purpose allocator.
//!
//! ## Features
//!
//! - **Dual linked-list block model**: every block sits in an
//!   address-order directory (for coalescing and diagnostics) and, while
//!   free, in a separate free list (the only list searched on allocation)
//! - **Pluggable placement**: first-fit or best-fit, selectable per heap
//!   at any time
//! - **Coalescing release**: freed blocks merge with free physical
//!   neighbours on both sides, so free regions are always maximal
//! - **Fragmentation diagnostics**: aggregate statistics with an
//!   external-fragmentation ratio, plus per-block inspection
//! - **Offset addressing, no `unsafe`**: blocks are identified by byte
//!   offset into the arena the heap exclusively owns, with every access
//!   bounds-checked
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────── Arena ─────────────────────────────┐
//! │ ┌────────┬─────────┬────────┬──────────┬────────┬─────────┐ │
//! │ │ hdr │P │ hdr │ P │ hdr │P │ hdr │ P  │ hdr │P │ hdr │ P │ │
//! │ └────────┴─────────┴────────┴──────────┴────────┴─────────┘ │
//! │   used      FREE      used      FREE      used      FREE    │
//! └─────────────────────────────────────────────────────────────┘
//!     ◄── block directory: every block, in address order ──►
//!               ◄── free list: free blocks only ──►
//! ```
//!
//! ## Example
//!
//! ```rust
//! use arena_heap::{FitStrategy, Heap};
//!
//! let mut heap = Heap::with_capacity(64 * 1024);
//! heap.set_strategy(FitStrategy::BestFit);
//!
//! let greeting = heap.allocate(16)?;
//! heap.payload_mut(greeting)?[..5].copy_from_slice(b"hello");
//!
//! let stats = heap.stats();
//! assert_eq!(stats.used_blocks, 1);
//!
//! heap.release(greeting)?;
//! assert_eq!(heap.stats().used_blocks, 0);
//! # Ok::<(), arena_heap::AllocError>(())
//! ```
//!
//! ## Limitations
//!
//! - The arena never grows and never returns memory to the OS
//! - Single-threaded by construction: every operation borrows the heap
//!   exclusively; wrap a [`Heap`] in a mutex for shared access
//! - Payload alignment is a fixed 8-byte boundary

mod arena;

pub mod block;
pub mod error;
pub mod heap;
pub mod stats;
pub mod strategy;

pub use block::{BlockInfo, ALIGN, HEADER_SIZE};
pub use error::{AllocError, Result};
pub use heap::{Blocks, FreeList, Heap, DEFAULT_CAPACITY};
pub use stats::HeapStats;
pub use strategy::FitStrategy;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
