//! Fixed-capacity byte region backing all blocks.
//!
//! The arena exclusively owns every byte the allocator manages. Blocks are
//! identified by the byte offset of their header, never by raw pointer;
//! all header and payload access goes through bounds-checked slicing.

use crate::block::{BlockHeader, HEADER_SIZE};

#[derive(Debug)]
pub(crate) struct Arena {
    bytes: Box<[u8]>,
}

impl Arena {
    pub fn new(capacity: u32) -> Self {
        Arena {
            bytes: vec![0u8; capacity as usize].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.bytes.len() as u32
    }

    /// Decode the header stored at `offset`.
    ///
    /// Offsets originate from the heap's own lists; an out-of-range offset
    /// here is a list-corruption bug, not caller input, and panics.
    pub fn header(&self, offset: u32) -> BlockHeader {
        let start = offset as usize;
        let raw: &[u8; HEADER_SIZE as usize] = self.bytes[start..start + HEADER_SIZE as usize]
            .try_into()
            .unwrap();
        BlockHeader::decode(raw)
    }

    pub fn write_header(&mut self, offset: u32, header: &BlockHeader) {
        let start = offset as usize;
        self.bytes[start..start + HEADER_SIZE as usize].copy_from_slice(&header.encode());
    }

    /// Payload bytes of the block whose payload starts at `payload_offset`.
    pub fn payload(&self, payload_offset: u32, size: u32) -> &[u8] {
        &self.bytes[payload_offset as usize..(payload_offset + size) as usize]
    }

    pub fn payload_mut(&mut self, payload_offset: u32, size: u32) -> &mut [u8] {
        &mut self.bytes[payload_offset as usize..(payload_offset + size) as usize]
    }
}
