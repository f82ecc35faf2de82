//! Property-based tests for heap invariants
//!
//! Uses proptest to drive random allocate/release sequences and verify
//! the structural invariants hold in every reachable heap state.

use arena_heap::{AllocError, FitStrategy, Heap, HEADER_SIZE};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Allocate(u32),
    Release(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..4096).prop_map(Op::Allocate),
        (0usize..64).prop_map(Op::Release),
    ]
}

/// Assert every structural invariant over the current heap state:
/// the directory tiles the arena exactly, sizes are positive multiples
/// of 8, no two address-adjacent blocks are both free, and the free list
/// is exactly the free-flagged subset of the directory.
fn check_invariants(heap: &Heap) {
    let blocks: Vec<_> = heap.blocks().collect();

    let mut expected_offset = 0u32;
    for block in &blocks {
        assert_eq!(block.offset, expected_offset, "gap or overlap in directory");
        assert!(block.size > 0, "zero-size block");
        assert_eq!(block.size % 8, 0, "unaligned block size");
        expected_offset = block.offset + HEADER_SIZE + block.size;
    }
    if !blocks.is_empty() {
        assert_eq!(expected_offset, heap.capacity(), "directory does not cover arena");
    }

    for pair in blocks.windows(2) {
        assert!(
            !(pair[0].free && pair[1].free),
            "adjacent free blocks at {} and {}",
            pair[0].offset,
            pair[1].offset
        );
    }

    let mut free_from_directory: Vec<u32> =
        blocks.iter().filter(|b| b.free).map(|b| b.offset).collect();
    let mut free_from_list: Vec<u32> = heap.free_list().map(|b| b.offset).collect();
    assert!(heap.free_list().all(|b| b.free));
    free_from_directory.sort_unstable();
    free_from_list.sort_unstable();
    assert_eq!(free_from_list, free_from_directory);
}

proptest! {
    #[test]
    fn prop_invariants_hold_across_random_ops(
        ops in prop::collection::vec(op_strategy(), 1..80),
        best_fit in any::<bool>(),
    ) {
        let mut heap = Heap::with_capacity(64 * 1024);
        if best_fit {
            heap.set_strategy(FitStrategy::BestFit);
        }
        let mut live: Vec<u32> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(size) => match heap.allocate(size) {
                    Ok(payload) => live.push(payload),
                    Err(AllocError::OutOfMemory { .. }) => {}
                    Err(other) => prop_assert!(false, "unexpected error: {other}"),
                },
                Op::Release(index) => {
                    if !live.is_empty() {
                        let payload = live.remove(index % live.len());
                        heap.release(payload).unwrap();
                    }
                }
            }
            check_invariants(&heap);
        }

        // Releasing every live allocation must coalesce the heap back to
        // a single maximal free block.
        for payload in live {
            heap.release(payload).unwrap();
        }
        check_invariants(&heap);

        let blocks: Vec<_> = heap.blocks().collect();
        if !blocks.is_empty() {
            prop_assert_eq!(blocks.len(), 1);
            prop_assert!(blocks[0].free);
            prop_assert_eq!(blocks[0].size, heap.capacity() - HEADER_SIZE);
        }
    }

    #[test]
    fn prop_payload_data_survives_neighbour_churn(
        entries in prop::collection::vec((1u32..512, any::<u8>()), 1..20)
    ) {
        let mut heap = Heap::with_capacity(64 * 1024);

        let mut written = Vec::new();
        for (size, byte) in entries {
            let payload = heap.allocate(size).unwrap();
            heap.payload_mut(payload).unwrap().fill(byte);
            written.push((payload, byte));
        }

        // Release every other allocation so survivors gain freed,
        // coalescing neighbours on both sides.
        let mut kept = Vec::new();
        for (index, entry) in written.into_iter().enumerate() {
            if index % 2 == 0 {
                heap.release(entry.0).unwrap();
            } else {
                kept.push(entry);
            }
        }

        for (payload, byte) in kept {
            let data = heap.payload(payload).unwrap();
            prop_assert!(data.iter().all(|&b| b == byte), "payload at {} corrupted", payload);
        }
    }

    #[test]
    fn prop_released_payloads_always_detect_double_free(
        sizes in prop::collection::vec(1u32..1024, 1..12)
    ) {
        let mut heap = Heap::with_capacity(64 * 1024);

        let payloads: Vec<u32> = sizes
            .iter()
            .map(|&size| heap.allocate(size).unwrap())
            .collect();

        // Free the even-indexed ones; keeping odd neighbours live stops
        // coalescing from destroying the freed blocks, so each second
        // release must hit the double-free path.
        for payload in payloads.iter().step_by(2) {
            heap.release(*payload).unwrap();
            prop_assert_eq!(heap.release(*payload), Err(AllocError::DoubleFree(*payload)));
        }
        check_invariants(&heap);
    }
}
