//! Placement strategies for free-list search.
//!
//! A strategy only ever walks the free list, never the full block
//! directory, so the cost of a search is bounded by the number of free
//! blocks regardless of how many allocations are live.

use serde::{Deserialize, Serialize};

use crate::arena::Arena;

/// Policy choosing which free block satisfies an allocation request.
///
/// The active strategy is a per-heap setting and only affects subsequent
/// allocations; it never reorders or otherwise mutates the free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitStrategy {
    /// Take the first free block large enough, stopping the scan at the
    /// first match.
    #[default]
    FirstFit,
    /// Scan the entire free list and take the tightest qualifying fit.
    /// Ties on size go to the block encountered earliest in list order.
    BestFit,
}

impl FitStrategy {
    /// Walk the free list from `free_head` and pick the offset of a block
    /// with `size >= requested`, or `None` when nothing qualifies.
    pub(crate) fn find(self, arena: &Arena, free_head: Option<u32>, requested: u32) -> Option<u32> {
        match self {
            FitStrategy::FirstFit => {
                let mut cursor = free_head;
                while let Some(offset) = cursor {
                    let header = arena.header(offset);
                    if header.size >= requested {
                        return Some(offset);
                    }
                    cursor = header.free_next;
                }
                None
            }
            FitStrategy::BestFit => {
                let mut best: Option<(u32, u32)> = None;
                let mut cursor = free_head;
                while let Some(offset) = cursor {
                    let header = arena.header(offset);
                    if header.size >= requested {
                        // Strict `<` keeps the earliest block on ties
                        if best.map_or(true, |(_, best_size)| header.size < best_size) {
                            best = Some((offset, header.size));
                        }
                    }
                    cursor = header.free_next;
                }
                best.map(|(offset, _)| offset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockHeader;

    /// Build an arena whose free list is exactly `sizes`, in scan order.
    /// Blocks are laid out 64 bytes apart; directory links are irrelevant
    /// to the search and left unset.
    fn arena_with_free_list(sizes: &[u32]) -> (Arena, Option<u32>) {
        let mut arena = Arena::new(64 * (sizes.len() as u32 + 1));
        for (i, &size) in sizes.iter().enumerate() {
            let offset = 64 * i as u32;
            let header = BlockHeader {
                size,
                free: true,
                addr_next: None,
                addr_prev: None,
                free_next: (i + 1 < sizes.len()).then(|| 64 * (i as u32 + 1)),
                free_prev: (i > 0).then(|| 64 * (i as u32 - 1)),
            };
            arena.write_header(offset, &header);
        }
        let head = (!sizes.is_empty()).then_some(0);
        (arena, head)
    }

    #[test]
    fn test_first_fit_stops_at_first_match() {
        let (arena, head) = arena_with_free_list(&[504, 200]);
        assert_eq!(FitStrategy::FirstFit.find(&arena, head, 152), Some(0));
    }

    #[test]
    fn test_best_fit_prefers_tightest() {
        let (arena, head) = arena_with_free_list(&[504, 200]);
        assert_eq!(FitStrategy::BestFit.find(&arena, head, 152), Some(64));
    }

    #[test]
    fn test_best_fit_tie_goes_to_earliest() {
        let (arena, head) = arena_with_free_list(&[104, 104, 504]);
        assert_eq!(FitStrategy::BestFit.find(&arena, head, 56), Some(0));
    }

    #[test]
    fn test_no_qualifying_block() {
        let (arena, head) = arena_with_free_list(&[104, 200]);
        assert_eq!(FitStrategy::FirstFit.find(&arena, head, 208), None);
        assert_eq!(FitStrategy::BestFit.find(&arena, head, 208), None);
    }

    #[test]
    fn test_empty_free_list() {
        let (arena, _) = arena_with_free_list(&[]);
        assert_eq!(FitStrategy::FirstFit.find(&arena, None, 8), None);
    }
}
