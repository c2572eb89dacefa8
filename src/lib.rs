#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parallel Mandelbrot field renderer
//!
//! The Mandelbrot set takes a point on the complex plane and repeatedly
//! multiplies it by itself, measuring how quickly that number goes to
//! infinity.  This "velocity" is the number used to render the image.
//! Computing the velocity of one pixel tells you nothing about its
//! neighbors, which makes the whole field embarrassingly parallel: this
//! crate carves the output grid into a square arrangement of tiles and
//! hands each tile to its own worker.  Workers stream finished columns
//! back over a channel to a single coordinator that owns the output
//! buffer.
//!
//! The coordinator is also the only place progress is aggregated and the
//! only place the caller's callbacks are invoked, so nothing on the hot
//! path ever takes a lock.  Cancellation is a shared flag the workers
//! poll between columns; columns already delivered stay delivered.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
#[macro_use]
extern crate itertools;
extern crate num;

pub mod cancel;
pub mod escape;
pub mod export;
pub mod palette;
pub mod pixels;
pub mod planes;
pub mod progress;
pub mod regions;
pub mod session;
pub mod worker;

pub use cancel::CancelFlag;
pub use export::{export_png, ExportOutcome};
pub use palette::Palette;
pub use pixels::PixelBuffer;
pub use planes::{GridSize, PlaneWindow};
pub use session::{RenderConfig, RenderOutcome, RenderSink, SessionComputation, SessionSummary};
