//! Allocator engine: initialization, allocation with splitting, release
//! with coalescing, and diagnostics.
//!
//! The engine threads two doubly linked lists through the block headers
//! stored in the arena:
//!
//! - the **block directory** (`addr_next`/`addr_prev`) connects every
//!   block in ascending address order and is used for neighbour lookup
//!   during coalescing and for diagnostics;
//! - the **free list** (`free_next`/`free_prev`) connects only free
//!   blocks, in insertion order, and is the only list searched during
//!   allocation.

use crate::arena::Arena;
use crate::block::{align_up, BlockHeader, BlockInfo, ALIGN, HEADER_SIZE};
use crate::error::{AllocError, Result};
use crate::stats::HeapStats;
use crate::strategy::FitStrategy;

/// Default arena capacity: 1 MiB.
pub const DEFAULT_CAPACITY: u32 = 1024 * 1024;

/// Smallest useful arena: one header plus one aligned payload unit.
const MIN_CAPACITY: u32 = HEADER_SIZE + ALIGN;

/// A heap allocator over a single fixed-capacity private arena.
///
/// Each `Heap` is a fully independent instance owning its arena, both
/// list heads, and the active placement strategy; there is no global
/// state. All operations take `&mut self` or `&self`, so the borrow
/// checker enforces the single-caller discipline; wrap the instance in
/// a mutex if shared access is ever needed.
///
/// Payloads are addressed by byte offset into the arena. [`allocate`]
/// returns the offset of the first payload byte; [`payload`] /
/// [`payload_mut`] expose the backing bytes, and [`release`] returns the
/// block to the free list, coalescing with physical neighbours.
///
/// [`allocate`]: Heap::allocate
/// [`payload`]: Heap::payload
/// [`payload_mut`]: Heap::payload_mut
/// [`release`]: Heap::release
#[derive(Debug)]
pub struct Heap {
    arena: Arena,
    /// First block in address order; `None` until initialised.
    dir_head: Option<u32>,
    /// Most recently inserted free block; `None` when nothing is free.
    free_head: Option<u32>,
    strategy: FitStrategy,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    /// Create a heap with the default 1 MiB arena.
    ///
    /// The arena is carved into its initial block lazily, on the first
    /// allocation or an explicit [`init`](Heap::init).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a heap over an arena of `capacity` bytes.
    ///
    /// The capacity is rounded down to a multiple of the 8-byte alignment
    /// boundary and raised to the minimum that can hold one header plus
    /// one aligned payload unit.
    pub fn with_capacity(capacity: u32) -> Self {
        let capacity = (capacity & !(ALIGN - 1)).max(MIN_CAPACITY);
        Heap {
            arena: Arena::new(capacity),
            dir_head: None,
            free_head: None,
            strategy: FitStrategy::default(),
        }
    }

    /// Arena capacity in bytes, headers included.
    pub fn capacity(&self) -> u32 {
        self.arena.capacity()
    }

    /// The active placement strategy.
    pub fn strategy(&self) -> FitStrategy {
        self.strategy
    }

    /// Select the placement strategy for subsequent allocations.
    pub fn set_strategy(&mut self, strategy: FitStrategy) {
        self.strategy = strategy;
    }

    /// Carve the arena into its single initial free block.
    ///
    /// Idempotent: a second call is a no-op. [`allocate`](Heap::allocate)
    /// calls this lazily, so an explicit call is only needed when the
    /// caller wants the initial block visible in diagnostics up front.
    pub fn init(&mut self) {
        if self.dir_head.is_some() {
            return;
        }
        let initial = BlockHeader {
            size: self.arena.capacity() - HEADER_SIZE,
            free: true,
            addr_next: None,
            addr_prev: None,
            free_next: None,
            free_prev: None,
        };
        self.arena.write_header(0, &initial);
        self.dir_head = Some(0);
        self.free_head = Some(0);
        tracing::debug!(
            "heap initialised: {} byte arena, {} byte initial block",
            self.arena.capacity(),
            initial.size
        );
    }

    /// Allocate `size` bytes and return the payload's byte offset.
    ///
    /// The request is rounded up to the next multiple of 8 (a zero-byte
    /// request becomes 8). The active strategy picks a free block; if the
    /// block is large enough to also hold a residual header plus payload,
    /// it is split and the residual stays free, substituted for the
    /// chosen block in its exact free-list position.
    ///
    /// Fails with [`AllocError::OutOfMemory`] when no free block
    /// qualifies; the heap is left untouched.
    pub fn allocate(&mut self, size: u32) -> Result<u32> {
        let requested = align_up(size.max(1));
        self.init();

        let target = match self.strategy.find(&self.arena, self.free_head, requested) {
            Some(offset) => offset,
            None => {
                tracing::debug!("out of memory: no free block fits {} bytes", requested);
                return Err(AllocError::OutOfMemory { requested });
            }
        };
        let mut block = self.arena.header(target);

        // A residual needs a header plus at least one aligned payload
        // unit; a hole of exactly `requested + HEADER_SIZE` is handed
        // over whole so no zero-size block is ever minted.
        if block.size >= requested + HEADER_SIZE + ALIGN {
            // Split: the residual takes the tail of the payload span and
            // replaces `target` in the free list in place, preserving
            // list order without a remove + reinsert round trip.
            let residual = target + HEADER_SIZE + requested;
            let residual_header = BlockHeader {
                size: block.size - requested - HEADER_SIZE,
                free: true,
                addr_next: block.addr_next,
                addr_prev: Some(target),
                free_next: block.free_next,
                free_prev: block.free_prev,
            };
            self.arena.write_header(residual, &residual_header);

            if let Some(next) = block.addr_next {
                let mut next_header = self.arena.header(next);
                next_header.addr_prev = Some(residual);
                self.arena.write_header(next, &next_header);
            }
            match block.free_prev {
                Some(prev) => {
                    let mut prev_header = self.arena.header(prev);
                    prev_header.free_next = Some(residual);
                    self.arena.write_header(prev, &prev_header);
                }
                None => self.free_head = Some(residual),
            }
            if let Some(next) = block.free_next {
                let mut next_header = self.arena.header(next);
                next_header.free_prev = Some(residual);
                self.arena.write_header(next, &next_header);
            }

            block.size = requested;
            block.free = false;
            block.addr_next = Some(residual);
            block.free_next = None;
            block.free_prev = None;
            self.arena.write_header(target, &block);

            tracing::debug!(
                "split block at {}: {} bytes used, {} byte residual at {}",
                target,
                requested,
                residual_header.size,
                residual
            );
        } else {
            // No room for a residual block: hand over the whole block
            self.remove_free(target);
            let mut block = self.arena.header(target);
            block.free = false;
            self.arena.write_header(target, &block);
            tracing::debug!("took whole block at {} ({} bytes)", target, block.size);
        }

        Ok(target + HEADER_SIZE)
    }

    /// Return the allocation at `payload_offset` to the heap.
    ///
    /// The freed block is merged with any free physical neighbour on
    /// either side, so free regions are always maximal and the surviving
    /// region occupies exactly one free-list entry.
    ///
    /// Fails with [`AllocError::InvalidPointer`] when the offset does not
    /// address a live payload, or [`AllocError::DoubleFree`] when the
    /// backing block is already free. Neither failure mutates the heap;
    /// in particular the free list never receives a duplicate entry.
    pub fn release(&mut self, payload_offset: u32) -> Result<()> {
        let (offset, mut block) = self.find_block(payload_offset)?;
        if block.free {
            tracing::debug!("double free detected at offset {}", payload_offset);
            return Err(AllocError::DoubleFree(payload_offset));
        }

        block.free = true;
        self.arena.write_header(offset, &block);
        tracing::debug!("freed block at {} ({} bytes)", offset, block.size);

        // Coalesce with the next physical block: absorb its header and
        // payload and drop it from both lists.
        if let Some(next) = block.addr_next {
            let next_header = self.arena.header(next);
            if next_header.free {
                self.remove_free(next);
                block.size += HEADER_SIZE + next_header.size;
                block.addr_next = next_header.addr_next;
                self.arena.write_header(offset, &block);
                if let Some(after) = next_header.addr_next {
                    let mut after_header = self.arena.header(after);
                    after_header.addr_prev = Some(offset);
                    self.arena.write_header(after, &after_header);
                }
                tracing::debug!("coalesced with next block at {}", next);
            }
        }

        // Coalesce with the previous physical block: the neighbour
        // absorbs this block and stays in the free list, so nothing is
        // reinserted.
        if let Some(prev) = block.addr_prev {
            let mut prev_header = self.arena.header(prev);
            if prev_header.free {
                prev_header.size += HEADER_SIZE + block.size;
                prev_header.addr_next = block.addr_next;
                self.arena.write_header(prev, &prev_header);
                if let Some(after) = block.addr_next {
                    let mut after_header = self.arena.header(after);
                    after_header.addr_prev = Some(prev);
                    self.arena.write_header(after, &after_header);
                }
                tracing::debug!("coalesced into previous block at {}", prev);
                return Ok(());
            }
        }

        self.insert_free(offset);
        Ok(())
    }

    /// Aggregate occupancy and fragmentation over the whole directory.
    ///
    /// Read-only; a single address-order traversal.
    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats {
            total_blocks: 0,
            used_blocks: 0,
            free_blocks: 0,
            used_bytes: 0,
            free_bytes: 0,
            largest_free_bytes: 0,
            fragmentation: 0.0,
        };
        for block in self.blocks() {
            stats.total_blocks += 1;
            if block.free {
                stats.free_blocks += 1;
                stats.free_bytes += block.size as u64;
                stats.largest_free_bytes = stats.largest_free_bytes.max(block.size as u64);
            } else {
                stats.used_blocks += 1;
                stats.used_bytes += block.size as u64;
            }
        }
        stats.fragmentation =
            HeapStats::fragmentation_ratio(stats.largest_free_bytes, stats.free_bytes);
        stats
    }

    /// Iterate over every block in address order.
    ///
    /// Yields nothing before the heap is initialised.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            heap: self,
            cursor: self.dir_head,
        }
    }

    /// Iterate over the free list in its current (insertion) order.
    pub fn free_list(&self) -> FreeList<'_> {
        FreeList {
            heap: self,
            cursor: self.free_head,
        }
    }

    /// Borrow the payload bytes of the live allocation at `payload_offset`.
    ///
    /// Fails with [`AllocError::InvalidPointer`] when the offset does not
    /// address a live payload, including a block that has already been
    /// released.
    pub fn payload(&self, payload_offset: u32) -> Result<&[u8]> {
        let (_, block) = self.find_block(payload_offset)?;
        if block.free {
            return Err(AllocError::InvalidPointer(payload_offset));
        }
        Ok(self.arena.payload(payload_offset, block.size))
    }

    /// Mutably borrow the payload bytes of the live allocation at
    /// `payload_offset`.
    pub fn payload_mut(&mut self, payload_offset: u32) -> Result<&mut [u8]> {
        let (_, block) = self.find_block(payload_offset)?;
        if block.free {
            return Err(AllocError::InvalidPointer(payload_offset));
        }
        Ok(self.arena.payload_mut(payload_offset, block.size))
    }

    /// Recover the block header backing a payload offset.
    ///
    /// One explicit, bounds-checked computation (`payload - HEADER_SIZE`),
    /// then a directory walk confirming the result is a real block start.
    /// The walk keeps arbitrary in-range offsets from being misread as
    /// headers; the directory is address ordered, so it stops early.
    fn find_block(&self, payload_offset: u32) -> Result<(u32, BlockHeader)> {
        if payload_offset < HEADER_SIZE || payload_offset >= self.arena.capacity() {
            tracing::debug!("invalid pointer: offset {} out of bounds", payload_offset);
            return Err(AllocError::InvalidPointer(payload_offset));
        }
        let offset = payload_offset - HEADER_SIZE;
        let mut cursor = self.dir_head;
        while let Some(current) = cursor {
            if current > offset {
                break;
            }
            let header = self.arena.header(current);
            if current == offset {
                return Ok((current, header));
            }
            cursor = header.addr_next;
        }
        tracing::debug!("invalid pointer: offset {} is not a block start", payload_offset);
        Err(AllocError::InvalidPointer(payload_offset))
    }

    /// Unlink a block from the free list and clear its free links.
    ///
    /// O(1); advances the list head when the block was the head.
    fn remove_free(&mut self, offset: u32) {
        let mut block = self.arena.header(offset);
        match block.free_prev {
            Some(prev) => {
                let mut prev_header = self.arena.header(prev);
                prev_header.free_next = block.free_next;
                self.arena.write_header(prev, &prev_header);
            }
            None => self.free_head = block.free_next,
        }
        if let Some(next) = block.free_next {
            let mut next_header = self.arena.header(next);
            next_header.free_prev = block.free_prev;
            self.arena.write_header(next, &next_header);
        }
        block.free_next = None;
        block.free_prev = None;
        self.arena.write_header(offset, &block);
    }

    /// Insert a block at the head of the free list. O(1).
    fn insert_free(&mut self, offset: u32) {
        let mut block = self.arena.header(offset);
        block.free_next = self.free_head;
        block.free_prev = None;
        self.arena.write_header(offset, &block);
        if let Some(head) = self.free_head {
            let mut head_header = self.arena.header(head);
            head_header.free_prev = Some(offset);
            self.arena.write_header(head, &head_header);
        }
        self.free_head = Some(offset);
    }
}

/// Address-order iterator over all blocks, returned by [`Heap::blocks`].
#[derive(Debug)]
pub struct Blocks<'a> {
    heap: &'a Heap,
    cursor: Option<u32>,
}

impl Iterator for Blocks<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        let offset = self.cursor?;
        let header = self.heap.arena.header(offset);
        self.cursor = header.addr_next;
        Some(BlockInfo {
            offset,
            size: header.size,
            free: header.free,
        })
    }
}

/// Insertion-order iterator over free blocks, returned by
/// [`Heap::free_list`].
#[derive(Debug)]
pub struct FreeList<'a> {
    heap: &'a Heap,
    cursor: Option<u32>,
}

impl Iterator for FreeList<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        let offset = self.cursor?;
        let header = self.heap.arena.header(offset);
        self.cursor = header.free_next;
        Some(BlockInfo {
            offset,
            size: header.size,
            free: header.free,
        })
    }
}
