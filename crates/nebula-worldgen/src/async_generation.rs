//! Background chunk generation on a worker pool.
//!
//! Workers share one [`WorldGenerator`], pull chunk tasks from a bounded
//! channel, honour cancellation flags and hand finished chunks back through a
//! second bounded channel.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};

use crate::block::ChunkBlockMap;
use crate::generator::WorldGenerator;

/// Chunk coordinates of one generation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkTask {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl ChunkTask {
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        Self { chunk_x, chunk_z }
    }
}

/// A finished chunk.
#[derive(Debug)]
pub struct GeneratedChunk {
    pub task: ChunkTask,
    pub blocks: Arc<ChunkBlockMap>,
    /// Generation time in microseconds (for profiling).
    pub generation_time_us: u64,
}

/// Internal wrapper that carries the task and its cancellation flag.
struct QueuedTask {
    task: ChunkTask,
    cancelled: Arc<AtomicBool>,
}

/// Generates chunks of one world across a thread pool.
pub struct AsyncChunkGenerator {
    task_sender: Sender<QueuedTask>,
    result_receiver: Receiver<GeneratedChunk>,
    /// Cancellation flag per pending task.
    active_tasks: Arc<DashMap<ChunkTask, Arc<AtomicBool>>>,
    /// Tasks queued or executing.
    in_flight: Arc<AtomicU64>,
}

impl AsyncChunkGenerator {
    /// Spawns `thread_count` workers over `generator`.
    ///
    /// At most `max_queued` tasks wait in the queue; further submissions are
    /// rejected until workers catch up.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn new(
        generator: Arc<WorldGenerator>,
        thread_count: usize,
        max_queued: usize,
        result_capacity: usize,
    ) -> io::Result<Self> {
        let (task_sender, task_receiver) = bounded::<QueuedTask>(max_queued.max(1));
        let (result_sender, result_receiver) = bounded::<GeneratedChunk>(result_capacity.max(1));
        let in_flight = Arc::new(AtomicU64::new(0));
        let thread_count = thread_count.max(1);

        for index in 0..thread_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let generator = Arc::clone(&generator);

            std::thread::Builder::new()
                .name(format!("chunk-gen-{index}"))
                .spawn(move || {
                    while let Ok(queued) = receiver.recv() {
                        if queued.cancelled.load(Ordering::Relaxed) {
                            in_flight.fetch_sub(1, Ordering::Relaxed);
                            continue;
                        }

                        let ChunkTask { chunk_x, chunk_z } = queued.task;
                        let start = std::time::Instant::now();
                        let blocks = generator.generate_chunk(chunk_x, chunk_z);
                        let elapsed = start.elapsed().as_micros() as u64;
                        trace!("Generated chunk ({chunk_x}, {chunk_z}) in {elapsed} us");

                        if !queued.cancelled.load(Ordering::Relaxed) {
                            let _ = sender.send(GeneratedChunk {
                                task: queued.task,
                                blocks,
                                generation_time_us: elapsed,
                            });
                        }

                        in_flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
        }
        debug!("Started {thread_count} chunk generation workers");

        Ok(Self {
            task_sender,
            result_receiver,
            active_tasks: Arc::new(DashMap::new()),
            in_flight,
        })
    }

    /// Pool sized by the generator's worker settings. A thread count of `0`
    /// leaves two cores for the caller.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned.
    pub fn from_settings(generator: Arc<WorldGenerator>) -> io::Result<Self> {
        let workers = generator.settings().workers;
        let threads = match workers.threads {
            0 => num_cpus::get().saturating_sub(2).max(1),
            n => n,
        };
        Self::new(
            generator,
            threads,
            workers.max_in_flight,
            workers.result_capacity,
        )
    }

    /// Queues a chunk for background generation.
    ///
    /// Resubmitting a pending task shares its cancellation flag, so one
    /// [`cancel`](Self::cancel) covers every copy.
    ///
    /// Returns `Err(task)` if the queue is full.
    pub fn submit(&self, task: ChunkTask) -> Result<(), ChunkTask> {
        let (cancelled, fresh) = match self.active_tasks.entry(task) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let flag = Arc::new(AtomicBool::new(false));
                entry.insert(Arc::clone(&flag));
                (flag, true)
            }
        };
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        let queued = QueuedTask {
            task,
            cancelled: Arc::clone(&cancelled),
        };
        self.task_sender.try_send(queued).map_err(|e| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            if fresh {
                self.active_tasks
                    .remove_if(&task, |_, flag| Arc::ptr_eq(flag, &cancelled));
            }
            e.into_inner().task
        })
    }

    /// Cancels a pending or running task. Its result, if any, is dropped.
    ///
    /// No-op for tasks that already completed.
    pub fn cancel(&self, task: &ChunkTask) {
        if let Some((_, cancelled)) = self.active_tasks.remove(task) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Drains every completed chunk without blocking.
    pub fn drain_results(&self) -> Vec<GeneratedChunk> {
        let mut results = Vec::new();
        while let Ok(chunk) = self.result_receiver.try_recv() {
            self.active_tasks.remove(&chunk.task);
            results.push(chunk);
        }
        results
    }

    /// Number of tasks currently queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns `true` if a task for `task` is pending.
    pub fn is_pending(&self, task: &ChunkTask) -> bool {
        self.active_tasks.contains_key(task)
    }
}
