//! Lock-free recycling of costly per-chunk buffers.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::ResourceInvariantError;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Counters describing a pool's current state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Values ever produced by the factory.
    pub created: usize,
    /// Values waiting in the idle set.
    pub idle: usize,
    /// Values acquired and not yet released. Values dropped without release
    /// stay counted here.
    pub outstanding: usize,
}

/// Unbounded, lazily grown pool of reusable values.
///
/// `acquire` hands out an idle value if one exists and otherwise calls the
/// factory. Released values are stored untouched; the next holder is expected
/// to overwrite whatever it reads.
pub struct BufferPool<T> {
    id: u64,
    available_tx: Sender<T>,
    available_rx: Receiver<T>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    created: AtomicUsize,
    outstanding: AtomicUsize,
}

impl<T> BufferPool<T> {
    /// Create an empty pool that builds new values with `factory`.
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        let (tx, rx) = unbounded();
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            available_tx: tx,
            available_rx: rx,
            factory: Box::new(factory),
            created: AtomicUsize::new(0),
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Process-unique id of this pool.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Take a value from the idle set, creating one if the set is empty.
    pub fn acquire(&self) -> Pooled<T> {
        let value = match self.available_rx.try_recv() {
            Ok(value) => value,
            Err(_) => {
                self.created.fetch_add(1, Ordering::Relaxed);
                (self.factory)()
            }
        };
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        Pooled {
            value,
            pool: self.id,
        }
    }

    /// Return a value to the idle set.
    ///
    /// Fails without storing the value if it was acquired from another pool.
    pub fn release(&self, pooled: Pooled<T>) -> Result<(), ResourceInvariantError> {
        if pooled.pool != self.id {
            tracing::warn!(
                pool = self.id,
                origin = pooled.pool,
                "rejected buffer released into the wrong pool"
            );
            return Err(ResourceInvariantError::ForeignBuffer {
                expected: self.id,
                found: pooled.pool,
            });
        }
        let _ = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        // The pool owns the receiver, so the send cannot fail.
        let _ = self.available_tx.send(pooled.value);
        Ok(())
    }

    /// Current counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            idle: self.available_rx.len(),
            outstanding: self.outstanding.load(Ordering::Acquire),
        }
    }
}

impl<T> fmt::Debug for BufferPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("id", &self.id)
            .field("stats", &self.stats())
            .finish()
    }
}

/// A value on loan from a [`BufferPool`].
///
/// Move-only: handing it back to [`BufferPool::release`] consumes it, so a
/// value cannot be released twice or used after release. Dropping it instead
/// of releasing only means the pool allocates a replacement later.
#[derive(Debug)]
pub struct Pooled<T> {
    value: T,
    pool: u64,
}

impl<T> Pooled<T> {
    /// Id of the pool this value was acquired from.
    pub fn pool_id(&self) -> u64 {
        self.pool
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}
