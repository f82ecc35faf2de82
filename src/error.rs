use thiserror::Error;

/// Errors surfaced by heap operations.
///
/// All three conditions are recoverable: the heap performs no mutation
/// before the precondition of each step is confirmed, so a caller can
/// inspect the error, release other allocations, and retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    #[error("out of memory: no free block fits {requested} bytes")]
    OutOfMemory { requested: u32 },

    #[error("invalid pointer: offset {0} does not address a live payload")]
    InvalidPointer(u32),

    #[error("double free: block backing offset {0} is already free")]
    DoubleFree(u32),
}

pub type Result<T> = std::result::Result<T, AllocError>;
