//! Worker-local generation state.

use crate::cell::BlendScratch;

/// Mutable state owned by exactly one generation worker.
///
/// Created once per worker and passed by `&mut` into every call so the
/// neighborhood search never allocates. Not shared between threads.
#[derive(Debug, Default)]
pub struct WorkerContext {
    /// Scratch for the cell neighborhood search.
    pub scratch: BlendScratch,
    columns: u64,
    chunks: u64,
}

impl WorkerContext {
    /// Create a fresh context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a chunk of `columns` columns was generated with this context.
    pub fn record_chunk(&mut self, columns: usize) {
        self.chunks += 1;
        self.columns += columns as u64;
    }

    /// Chunks generated with this context.
    pub fn chunks_generated(&self) -> u64 {
        self.chunks
    }

    /// Columns generated with this context.
    pub fn columns_generated(&self) -> u64 {
        self.columns
    }
}
