// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The region worker: owns one tile of the output grid, walks it column
//! by column, and streams finished columns and progress changes back to
//! the session coordinator over the session channel.

use std::panic::{self, AssertUnwindSafe};

use crossbeam::channel::Sender;

use cancel::CancelFlag;
use escape::evaluate;
use planes::PlaneMapper;
use regions::Region;

/// One computed column of the output grid.  Produced exactly once per
/// column per worker, never revised.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnResult {
    /// Column index, absolute in the full grid.
    pub column: usize,
    /// Row the chunk starts at, absolute in the full grid.
    pub row_origin: usize,
    /// One iteration-derived value per pixel; `region.height` of them,
    /// top to bottom.
    pub values: Vec<u32>,
}

/// Lifecycle state of one worker.  Terminal states are sticky: a worker
/// reports Completed or Cancelled exactly once and emits nothing after.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Still producing columns.
    Running,
    /// Finished every column of its region.
    Completed,
    /// Stopped early: the session flag was set, or the worker hit an
    /// internal fault and was isolated.
    Cancelled,
}

/// Events a worker streams to its session coordinator.
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    /// A finished column.
    Column(ColumnResult),
    /// The worker's own completion percentage changed.
    Progress {
        /// Index of the reporting worker within the session.
        worker: usize,
        /// Percent of the worker's region finished, truncated.
        percent: u32,
    },
    /// The worker reached a terminal state.  Always its last event.
    Done {
        /// Index of the reporting worker within the session.
        worker: usize,
        /// How the worker ended.
        state: WorkerState,
    },
}

/// Runs one worker over its region, streaming events to the session
/// channel, and reports how it ended.
///
/// Columns go left to right, rows top to bottom within each column.
/// The cancel flag is polled between columns, so cancellation latency
/// is at most one column's worth of work.  A panic anywhere in the
/// column loop is caught here and reported as a cancelled worker: a
/// faulty worker leaves its region partially computed but can never
/// take its siblings down.
///
/// `max_iterations` must be at least 1; the session configuration check
/// guarantees this before any worker starts.
pub fn run(
    worker: usize,
    region: Region,
    mapper: &PlaneMapper,
    max_iterations: u32,
    events: &Sender<WorkerEvent>,
    cancel: &CancelFlag,
) -> WorkerState {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_columns(worker, region, mapper, max_iterations, events, cancel)
    }));
    let state = match outcome {
        Ok(state) => state,
        Err(_) => {
            eprintln!(
                "worker {} faulted; its region is left partially computed",
                worker
            );
            WorkerState::Cancelled
        }
    };
    let _ = events.send(WorkerEvent::Done { worker, state });
    state
}

fn run_columns(
    worker: usize,
    region: Region,
    mapper: &PlaneMapper,
    max_iterations: u32,
    events: &Sender<WorkerEvent>,
    cancel: &CancelFlag,
) -> WorkerState {
    let mut reported_percent = 0;

    for ix in 0..region.width {
        if cancel.is_cancelled() {
            return WorkerState::Cancelled;
        }

        let column = region.x + ix;
        let mut values = Vec::with_capacity(region.height);
        for iy in 0..region.height {
            let c = mapper.pixel_to_point(column, region.y + iy);
            // The modulo wraps deep counts back into the palette cycle;
            // it is not a clamp.
            values.push(evaluate(c, max_iterations) % max_iterations);
        }

        let sent = events.send(WorkerEvent::Column(ColumnResult {
            column,
            row_origin: region.y,
            values,
        }));
        if sent.is_err() {
            // Nobody is listening anymore; treat it like cancellation.
            return WorkerState::Cancelled;
        }

        let percent = (100 * (ix + 1) / region.width) as u32;
        if percent != reported_percent {
            reported_percent = percent;
            let _ = events.send(WorkerEvent::Progress { worker, percent });
        }
    }

    WorkerState::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::unbounded;
    use planes::{GridSize, PlaneWindow};

    fn mapper() -> PlaneMapper {
        PlaneMapper::new(
            GridSize {
                width: 8,
                height: 8,
            },
            PlaneWindow {
                x_min: -2.0,
                y_min: -2.0,
                width: 4.0,
                height: 4.0,
            },
        )
    }

    fn region() -> Region {
        Region {
            x: 2,
            y: 4,
            width: 4,
            height: 4,
        }
    }

    #[test]
    fn streams_every_column_in_order_then_reports_done() {
        let (tx, rx) = unbounded();
        let state = run(3, region(), &mapper(), 10, &tx, &CancelFlag::new());
        drop(tx);
        assert_eq!(state, WorkerState::Completed);

        let events: Vec<WorkerEvent> = rx.iter().collect();
        let columns: Vec<&ColumnResult> = events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Column(c) => Some(c),
                _ => None,
            })
            .collect();

        assert_eq!(columns.len(), 4);
        for (i, column) in columns.iter().enumerate() {
            assert_eq!(column.column, 2 + i);
            assert_eq!(column.row_origin, 4);
            assert_eq!(column.values.len(), 4);
        }

        match events.last() {
            Some(&WorkerEvent::Done { worker, state }) => {
                assert_eq!(worker, 3);
                assert_eq!(state, WorkerState::Completed);
            }
            other => panic!("expected a Done event last, got {:?}", other),
        }
    }

    #[test]
    fn column_values_are_the_evaluator_modulo_the_depth() {
        let (tx, rx) = unbounded();
        run(0, region(), &mapper(), 10, &tx, &CancelFlag::new());
        drop(tx);

        let mapper = mapper();
        for event in rx.iter() {
            if let WorkerEvent::Column(column) = event {
                for (iy, value) in column.values.iter().enumerate() {
                    let c = mapper.pixel_to_point(column.column, column.row_origin + iy);
                    assert_eq!(*value, evaluate(c, 10) % 10);
                }
            }
        }
    }

    #[test]
    fn progress_climbs_to_one_hundred_without_repeats() {
        let (tx, rx) = unbounded();
        run(0, region(), &mapper(), 10, &tx, &CancelFlag::new());
        drop(tx);

        let percents: Vec<u32> = rx
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Progress { percent, .. } => Some(percent),
                _ => None,
            })
            .collect();

        assert_eq!(percents, vec![25, 50, 75, 100]);
    }

    #[test]
    fn a_preset_flag_cancels_before_the_first_column() {
        let flag = CancelFlag::new();
        flag.cancel();

        let (tx, rx) = unbounded();
        let state = run(0, region(), &mapper(), 10, &tx, &flag);
        drop(tx);
        assert_eq!(state, WorkerState::Cancelled);

        let events: Vec<WorkerEvent> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        match events[0] {
            WorkerEvent::Done { state, .. } => assert_eq!(state, WorkerState::Cancelled),
            ref other => panic!("expected only a Done event, got {:?}", other),
        }
    }

    #[test]
    fn a_faulting_worker_is_isolated_as_cancelled() {
        // Depth zero trips the modulo in the column loop; the panic must
        // stay inside this worker and surface as a Cancelled report.
        let (tx, rx) = unbounded();
        let state = run(0, region(), &mapper(), 0, &tx, &CancelFlag::new());
        drop(tx);
        assert_eq!(state, WorkerState::Cancelled);

        match rx.iter().last() {
            Some(WorkerEvent::Done { state, .. }) => assert_eq!(state, WorkerState::Cancelled),
            other => panic!("expected a Done event, got {:?}", other),
        }
    }
}
