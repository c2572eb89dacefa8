// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! One full parallel computation of a plane window into a pixel buffer.
//!
//! The session is where the fan-out and the fan-in live.  Starting a
//! session validates the configuration and spawns a coordinator thread.
//! The coordinator launches one scoped worker per region of the
//! partition and then becomes the single consumer of the session
//! channel: every column lands in the buffer here, and every sink
//! callback fires here.  Because there is exactly one consumer, the
//! sink's callbacks are serialized even though the producers are
//! concurrent, and neither the buffer nor the progress ledger ever
//! needs a lock.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel;

use cancel::CancelFlag;
use pixels::PixelBuffer;
use planes::{GridSize, PlaneMapper, PlaneWindow};
use progress::ProgressTracker;
use regions::{partition, tiles_per_axis};
use worker::{self, ColumnResult, WorkerEvent};

/// Everything one computation needs: what to look at, how finely, how
/// deeply, and with how much parallelism.
#[derive(Copy, Clone, Debug)]
pub struct RenderConfig {
    /// The rectangle of the complex plane to depict.
    pub window: PlaneWindow,
    /// The full output resolution.
    pub grid: GridSize,
    /// Iteration bound per pixel.
    pub max_iterations: u32,
    /// Requested worker count.  The count actually used is the largest
    /// perfect square at or below this.
    pub workers: usize,
}

impl RenderConfig {
    /// The worker count the partition will actually use.
    pub fn effective_workers(&self) -> usize {
        let tiles = tiles_per_axis(self.workers);
        tiles * tiles
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.grid.width,
                height: self.grid.height,
            });
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if !(self.window.width > 0.0) || !(self.window.height > 0.0) {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }
}

/// Configuration rejections, raised synchronously before any worker
/// starts.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// The worker count was zero.
    #[fail(display = "worker count must be at least 1")]
    NoWorkers,
    /// One of the grid axes was zero pixels.
    #[fail(display = "grid resolution {}x{} has an empty axis", width, height)]
    EmptyGrid {
        /// Rejected horizontal resolution.
        width: usize,
        /// Rejected vertical resolution.
        height: usize,
    },
    /// The iteration depth was zero.
    #[fail(display = "iteration depth must be at least 1")]
    ZeroDepth,
    /// The plane window had no area (or a NaN extent).
    #[fail(display = "plane window has no area")]
    EmptyWindow,
}

/// Callbacks the engine drives while a session runs.  All three are
/// invoked from the session's coordinator thread, one at a time.
pub trait RenderSink: Send + Sync {
    /// A column has been applied to the session's buffer.
    fn on_column(&self, column: &ColumnResult);
    /// The overall percentage (the mean over all workers) changed.
    fn on_progress(&self, percent: u32);
    /// Every worker is terminal.  Fired exactly once per session.
    fn on_complete(&self, summary: &SessionSummary);
}

/// What the single completion notification carries.
#[derive(Copy, Clone, Debug)]
pub struct SessionSummary {
    /// Wall-clock time from session start to the last worker's exit.
    pub elapsed: Duration,
    /// Workers that finished their whole region.
    pub completed_workers: usize,
    /// Workers that stopped early, whether cancelled or faulted.
    pub cancelled_workers: usize,
}

impl SessionSummary {
    /// True when every worker ran its region to completion.
    pub fn is_complete(&self) -> bool {
        self.cancelled_workers == 0
    }
}

/// The finished product of a session: the buffer and how it ended.
/// A cancelled session still yields its buffer; the columns delivered
/// before cancellation are consistent and stay in place.
pub struct RenderOutcome {
    /// The output grid.
    pub buffer: PixelBuffer,
    /// The completion summary, exactly as the sink saw it.
    pub summary: SessionSummary,
}

/// A handle over one running computation.
///
/// The handle is the caller's lever on a session: `cancel` to stop it
/// early, `wait` to collect the outcome.  Dropping the handle without
/// waiting cancels the session and blocks until its workers have
/// wound down, so a sink is never called after its session handle is
/// gone.
pub struct SessionComputation {
    cancel: CancelFlag,
    coordinator: Option<JoinHandle<RenderOutcome>>,
}

impl SessionComputation {
    /// Validates the configuration, partitions the grid, launches one
    /// worker per tile, and returns immediately.  Invalid configurations
    /// are rejected here, before any thread exists.
    pub fn start(
        config: RenderConfig,
        sink: Arc<dyn RenderSink>,
    ) -> Result<SessionComputation, ConfigError> {
        config.validate()?;

        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let coordinator = thread::spawn(move || coordinate(config, sink, flag));

        Ok(SessionComputation {
            cancel,
            coordinator: Some(coordinator),
        })
    }

    /// Requests cancellation of every worker in the session.  Idempotent
    /// and fire-and-forget: workers observe the flag at their next
    /// column boundary, so the latency is at most one column's worth of
    /// work per worker.  Columns already delivered are not rolled back.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Blocks until every worker is terminal and yields the outcome.
    pub fn wait(mut self) -> RenderOutcome {
        let handle = self
            .coordinator
            .take()
            .expect("session coordinator already joined");
        handle.join().expect("session coordinator panicked")
    }
}

impl Drop for SessionComputation {
    fn drop(&mut self) {
        if let Some(handle) = self.coordinator.take() {
            self.cancel.cancel();
            let _ = handle.join();
        }
    }
}

fn coordinate(
    config: RenderConfig,
    sink: Arc<dyn RenderSink>,
    cancel: CancelFlag,
) -> RenderOutcome {
    let started = Instant::now();
    let mapper = PlaneMapper::new(config.grid, config.window);
    let regions = partition(config.grid, config.workers);

    let mut buffer = PixelBuffer::new(config.grid);
    let mut tracker = ProgressTracker::new(regions.len());
    let mut reported_overall = 0;

    let (tx, rx) = channel::unbounded();

    crossbeam::scope(|scope| {
        let mapper = &mapper;
        let cancel = &cancel;
        for (index, region) in regions.iter().enumerate() {
            let tx = tx.clone();
            let region = *region;
            let max_iterations = config.max_iterations;
            scope.spawn(move |_| {
                worker::run(index, region, mapper, max_iterations, &tx, cancel);
            });
        }
        drop(tx);

        // Single consumer: buffer writes, progress aggregation and sink
        // callbacks all happen on this thread, in arrival order.
        for event in rx.iter() {
            match event {
                WorkerEvent::Column(column) => {
                    buffer.apply_column(&column);
                    sink.on_column(&column);
                }
                WorkerEvent::Progress { worker, percent } => {
                    tracker.update(worker, percent);
                    let overall = tracker.overall();
                    if overall != reported_overall {
                        reported_overall = overall;
                        sink.on_progress(overall);
                    }
                }
                WorkerEvent::Done { worker, state } => {
                    tracker.mark_terminal(worker, state);
                }
            }
        }
    })
    .expect("worker threads panicked outside their own isolation");

    // The channel only disconnects once every worker has sent its Done
    // event and exited.
    debug_assert!(tracker.all_terminal());

    let summary = SessionSummary {
        elapsed: started.elapsed(),
        completed_workers: tracker.completed_workers(),
        cancelled_workers: tracker.cancelled_workers(),
    };
    sink.on_complete(&summary);

    RenderOutcome { buffer, summary }
}
