//! Background chunk height generation on a fixed pool of worker threads.
//!
//! Each worker owns one [`WorkerContext`] for its whole lifetime and pulls
//! chunk coordinates from a bounded queue. Finished buffers come back over
//! a bounded result channel and are collected with
//! [`ParallelChunkGenerator::drain_results`].

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::buffer::TerrainHeightBuffer;
use crate::chunk::ChunkCoord;
use crate::context::WorkerContext;
use crate::height_noise::HeightNoise;
use crate::pipeline::TerrainHeightPipeline;
use crate::pool::Pooled;

/// Heights of one chunk, produced by a worker.
#[derive(Debug)]
pub struct GeneratedChunk {
    /// The chunk that was requested.
    pub coord: ChunkCoord,
    /// Pooled heights; release through the generator's pipeline when done.
    pub buffer: Pooled<TerrainHeightBuffer>,
    /// Generation time in microseconds.
    pub generation_time_us: u64,
    cancelled: Arc<AtomicBool>,
}

/// Why a chunk was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The task queue is full; retry after draining results.
    #[error("generation queue is full, chunk {0:?} not queued")]
    QueueFull(ChunkCoord),

    /// The chunk is already queued or being generated.
    #[error("chunk {0:?} is already pending")]
    AlreadyPending(ChunkCoord),
}

impl SubmitError {
    /// The chunk that was not queued.
    pub fn coord(&self) -> ChunkCoord {
        match *self {
            Self::QueueFull(coord) | Self::AlreadyPending(coord) => coord,
        }
    }
}

struct QueuedChunk {
    coord: ChunkCoord,
    cancelled: Arc<AtomicBool>,
}

/// Generates chunk heights across a thread pool.
pub struct ParallelChunkGenerator<G> {
    pipeline: Arc<TerrainHeightPipeline<G>>,
    task_sender: Sender<QueuedChunk>,
    result_receiver: Receiver<GeneratedChunk>,
    pending: Arc<DashMap<ChunkCoord, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicU64>,
}

impl<G: HeightNoise + 'static> ParallelChunkGenerator<G> {
    /// Start `thread_count` workers over `pipeline`.
    ///
    /// At most `max_queued` chunks wait for a worker; further submissions are
    /// rejected. `result_capacity` bounds finished chunks awaiting collection.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(
        pipeline: Arc<TerrainHeightPipeline<G>>,
        thread_count: usize,
        max_queued: usize,
        result_capacity: usize,
    ) -> io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedChunk>(max_queued.max(1));
        let (result_sender, result_receiver) = bounded::<GeneratedChunk>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));

        for worker in 0..thread_count.max(1) {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let pipeline = Arc::clone(&pipeline);
            let in_flight = Arc::clone(&in_flight);

            std::thread::Builder::new()
                .name(format!("terrain-worker-{worker}"))
                .spawn(move || run_worker(worker, &pipeline, &receiver, &sender, &in_flight))?;
        }

        tracing::debug!(
            threads = thread_count.max(1),
            max_queued,
            result_capacity,
            "started chunk height workers"
        );

        Ok(Self {
            pipeline,
            task_sender,
            result_receiver,
            pending: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// Start a generator sized to the machine's CPU count.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn with_defaults(pipeline: Arc<TerrainHeightPipeline<G>>) -> io::Result<Self> {
        let cpus = num_cpus::get().max(2);
        let threads = (cpus - 2).max(1);
        Self::new(pipeline, threads, 256, 256)
    }

    /// Queue a chunk for generation.
    ///
    /// # Errors
    ///
    /// [`SubmitError::AlreadyPending`] if `coord` is queued, running, or
    /// finished but not yet drained. [`SubmitError::QueueFull`] if no queue
    /// slot is free.
    pub fn submit(&self, coord: ChunkCoord) -> Result<(), SubmitError> {
        let cancelled = Arc::new(AtomicBool::new(false));
        match self.pending.entry(coord) {
            Entry::Occupied(_) => return Err(SubmitError::AlreadyPending(coord)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&cancelled));
            }
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        self.task_sender
            .try_send(QueuedChunk { coord, cancelled })
            .map_err(|e| {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                let task = e.into_inner();
                self.pending
                    .remove_if(&task.coord, |_, flag| Arc::ptr_eq(flag, &task.cancelled));
                SubmitError::QueueFull(task.coord)
            })
    }

    /// Cancel a queued or running chunk. No-op if it already finished.
    pub fn cancel(&self, coord: &ChunkCoord) {
        if let Some((_, cancelled)) = self.pending.remove(coord) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Collect every finished chunk without blocking.
    ///
    /// Chunks cancelled after their worker finished are recycled here instead
    /// of being returned.
    pub fn drain_results(&self) -> Vec<GeneratedChunk> {
        let mut results = Vec::new();
        while let Ok(chunk) = self.result_receiver.try_recv() {
            if chunk.cancelled.load(Ordering::Relaxed) {
                if let Err(err) = self.pipeline.release(chunk.buffer) {
                    tracing::warn!(%err, "failed to recycle cancelled chunk buffer");
                }
                continue;
            }
            self.pending
                .remove_if(&chunk.coord, |_, flag| Arc::ptr_eq(flag, &chunk.cancelled));
            results.push(chunk);
        }
        results
    }

    /// Chunks queued or being generated.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if `coord` was submitted and not yet drained or cancelled.
    pub fn is_pending(&self, coord: &ChunkCoord) -> bool {
        self.pending.contains_key(coord)
    }

    /// The pipeline workers generate with. Release drained buffers here.
    pub fn pipeline(&self) -> &Arc<TerrainHeightPipeline<G>> {
        &self.pipeline
    }
}

fn run_worker<G: HeightNoise>(
    worker: usize,
    pipeline: &TerrainHeightPipeline<G>,
    receiver: &Receiver<QueuedChunk>,
    sender: &Sender<GeneratedChunk>,
    in_flight: &AtomicU64,
) {
    let mut ctx = WorkerContext::new();

    while let Ok(task) = receiver.recv() {
        if task.cancelled.load(Ordering::Relaxed) {
            in_flight.fetch_sub(1, Ordering::Relaxed);
            continue;
        }

        let start = Instant::now();
        let buffer = pipeline.generate(task.coord, &mut ctx);
        let generation_time_us = start.elapsed().as_micros() as u64;

        if task.cancelled.load(Ordering::Relaxed) {
            if let Err(err) = pipeline.release(buffer) {
                tracing::warn!(worker, %err, "failed to recycle cancelled chunk buffer");
            }
            in_flight.fetch_sub(1, Ordering::Relaxed);
            continue;
        }

        let delivered = sender
            .send(GeneratedChunk {
                coord: task.coord,
                buffer,
                generation_time_us,
                cancelled: task.cancelled,
            })
            .is_ok();
        in_flight.fetch_sub(1, Ordering::Relaxed);
        if !delivered {
            break;
        }
    }

    tracing::debug!(
        worker,
        chunks = ctx.chunks_generated(),
        columns = ctx.columns_generated(),
        "chunk height worker exiting"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::CHUNK_SIZE;
    use crate::levels::HeightLevels;
    use std::time::Duration;

    struct Diagonal;

    impl HeightNoise for Diagonal {
        fn height_noise(&self, x: f64, z: f64, _ctx: &mut WorkerContext) -> f64 {
            ((x + z) / 1024.0).rem_euclid(1.0)
        }
    }

    fn pipeline() -> Arc<TerrainHeightPipeline<Diagonal>> {
        Arc::new(TerrainHeightPipeline::new(
            Arc::new(HeightLevels::standard()),
            Diagonal,
        ))
    }

    fn drain_until(
        generator: &ParallelChunkGenerator<Diagonal>,
        expected: usize,
    ) -> Vec<GeneratedChunk> {
        let mut results = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(30);
        while results.len() < expected && Instant::now() < deadline {
            results.extend(generator.drain_results());
            if results.len() < expected {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        results
    }

    #[test]
    fn test_concurrent_generation_delivers_every_chunk() {
        let generator = ParallelChunkGenerator::new(pipeline(), 4, 128, 128).unwrap();

        let mut submitted = 0;
        for coord in ChunkCoord::new(0, 0).square(3) {
            if generator.submit(coord).is_ok() {
                submitted += 1;
            }
        }
        assert_eq!(submitted, 49);

        let results = drain_until(&generator, submitted);
        assert_eq!(results.len(), submitted);
        for chunk in results {
            assert!(!generator.is_pending(&chunk.coord));
            generator.pipeline().release(chunk.buffer).unwrap();
        }
        assert_eq!(generator.pipeline().pool_stats().outstanding, 0);
    }

    #[test]
    fn test_parallel_output_matches_sequential() {
        let generator = ParallelChunkGenerator::new(pipeline(), 3, 64, 64).unwrap();
        let coords: Vec<_> = ChunkCoord::new(-5, 7).square(1).collect();
        for &coord in &coords {
            generator.submit(coord).unwrap();
        }

        let reference = pipeline();
        let mut ctx = WorkerContext::new();
        for chunk in drain_until(&generator, coords.len()) {
            let expected = reference.generate(chunk.coord, &mut ctx);
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    assert_eq!(chunk.buffer.get(x, z), expected.get(x, z));
                }
            }
            reference.release(expected).unwrap();
        }
    }

    #[test]
    fn test_full_queue_rejects_submission() {
        // A tiny queue fills up faster than one worker drains it.
        let generator = ParallelChunkGenerator::new(pipeline(), 1, 1, 1).unwrap();
        let rejected = ChunkCoord::new(0, 0)
            .square(10)
            .filter(|&coord| generator.submit(coord).is_err())
            .count();
        assert!(rejected > 0);
    }

    #[test]
    fn test_duplicate_pending_submission_is_rejected() {
        let generator = ParallelChunkGenerator::new(pipeline(), 1, 16, 16).unwrap();
        let coord = ChunkCoord::new(-3, 8);
        generator.submit(coord).unwrap();
        assert_eq!(
            generator.submit(coord),
            Err(SubmitError::AlreadyPending(coord))
        );

        let results = drain_until(&generator, 1);
        assert_eq!(results.len(), 1);
        assert!(!generator.is_pending(&coord));
        for chunk in results {
            generator.pipeline().release(chunk.buffer).unwrap();
        }

        // Once drained the chunk can be requested again.
        generator.submit(coord).unwrap();
        let again = drain_until(&generator, 1);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].coord, coord);
    }

    #[test]
    fn test_cancelled_then_resubmitted_chunk_is_delivered_once() {
        let generator = ParallelChunkGenerator::new(pipeline(), 2, 16, 16).unwrap();
        let coord = ChunkCoord::new(12, -4);
        generator.submit(coord).unwrap();
        generator.cancel(&coord);
        generator.submit(coord).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut results = Vec::new();
        while (generator.in_flight_count() > 0 || results.is_empty()) && Instant::now() < deadline
        {
            results.extend(generator.drain_results());
            std::thread::sleep(Duration::from_millis(5));
        }
        results.extend(generator.drain_results());

        assert_eq!(results.len(), 1);
        assert!(!generator.is_pending(&coord));
        for chunk in results {
            generator.pipeline().release(chunk.buffer).unwrap();
        }
        assert_eq!(generator.pipeline().pool_stats().outstanding, 0);
    }

    #[test]
    fn test_cancel_clears_pending() {
        let generator = ParallelChunkGenerator::new(pipeline(), 1, 16, 16).unwrap();
        let coord = ChunkCoord::new(50, 50);
        generator.submit(coord).unwrap();
        assert!(generator.is_pending(&coord));
        generator.cancel(&coord);
        assert!(!generator.is_pending(&coord));

        // The cancelled chunk may still have been delivered if the worker beat us.
        let deadline = Instant::now() + Duration::from_secs(10);
        while generator.in_flight_count() > 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(generator.in_flight_count(), 0);
    }
}
