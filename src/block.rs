//! On-arena block header layout
//!
//! Every block begins with a fixed 24-byte little-endian header followed
//! immediately by its payload. Link fields hold arena byte offsets; the
//! sentinel `NIL` encodes an absent neighbour and decodes to `None`.
//!
//! ```text
//!   Block layout within the arena:
//!
//!   ┌──────────────────────────────────────────────┬───────────────┐
//!   │               Header (24 bytes)              │    Payload    │
//!   │ ┌──────┬───────┬──────┬──────┬──────┬──────┐ │               │
//!   │ │ size │ flags │ anxt │ aprv │ fnxt │ fprv │ │ `size` bytes  │
//!   │ └──────┴───────┴──────┴──────┴──────┴──────┘ │               │
//!   └──────────────────────────────────────────────┴───────────────┘
//!   ▲                                              ▲
//!   block offset                                   payload offset
//! ```

use serde::{Deserialize, Serialize};

/// Alignment boundary for payload sizes; every block size is a positive
/// multiple of this.
pub const ALIGN: u32 = 8;

/// Bytes of metadata preceding every payload.
pub const HEADER_SIZE: u32 = 24;

/// Offset sentinel encoding "no neighbour".
pub(crate) const NIL: u32 = u32::MAX;

/// Status bit in the header's flags word.
const FLAG_FREE: u32 = 1;

/// Round a requested size up to the next multiple of [`ALIGN`].
///
/// Saturates near `u32::MAX`; the result can then never match a block,
/// so an absurd request fails as out-of-memory rather than wrapping.
pub(crate) fn align_up(size: u32) -> u32 {
    size.saturating_add(ALIGN - 1) & !(ALIGN - 1)
}

/// Decoded form of the header record stored at a block's start offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    /// Usable payload bytes, excluding the header itself.
    pub size: u32,
    pub free: bool,
    /// Next block in address order; `None` for the physically last block.
    pub addr_next: Option<u32>,
    /// Previous block in address order; `None` for the directory head.
    pub addr_prev: Option<u32>,
    /// Next free block in insertion order; meaningful only while `free`.
    pub free_next: Option<u32>,
    /// Previous free block in insertion order; meaningful only while `free`.
    pub free_prev: Option<u32>,
}

impl BlockHeader {
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut raw = [0u8; HEADER_SIZE as usize];
        raw[0..4].copy_from_slice(&self.size.to_le_bytes());
        let flags = if self.free { FLAG_FREE } else { 0 };
        raw[4..8].copy_from_slice(&flags.to_le_bytes());
        raw[8..12].copy_from_slice(&encode_link(self.addr_next).to_le_bytes());
        raw[12..16].copy_from_slice(&encode_link(self.addr_prev).to_le_bytes());
        raw[16..20].copy_from_slice(&encode_link(self.free_next).to_le_bytes());
        raw[20..24].copy_from_slice(&encode_link(self.free_prev).to_le_bytes());
        raw
    }

    pub fn decode(raw: &[u8; HEADER_SIZE as usize]) -> Self {
        let word = |i: usize| u32::from_le_bytes([raw[i], raw[i + 1], raw[i + 2], raw[i + 3]]);
        BlockHeader {
            size: word(0),
            free: word(4) & FLAG_FREE != 0,
            addr_next: decode_link(word(8)),
            addr_prev: decode_link(word(12)),
            free_next: decode_link(word(16)),
            free_prev: decode_link(word(20)),
        }
    }
}

fn encode_link(link: Option<u32>) -> u32 {
    link.unwrap_or(NIL)
}

fn decode_link(raw: u32) -> Option<u32> {
    (raw != NIL).then_some(raw)
}

/// Read-only description of one block, as yielded by [`Heap::blocks`] in
/// address order.
///
/// [`Heap::blocks`]: crate::Heap::blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Byte offset of the block's header within the arena.
    pub offset: u32,
    /// Payload size in bytes.
    pub size: u32,
    pub free: bool,
}
