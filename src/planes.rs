//! Contains the PlaneMapper struct, which describes the relationship
//! between the pixel grid (an integral plane with its origin at 0,0)
//! and the window of the complex plane the grid currently depicts.

use num::Complex;

/// The width and height, in pixels, of the full output grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridSize {
    /// Horizontal resolution in pixels.
    pub width: usize,
    /// Vertical resolution in pixels.
    pub height: usize,
}

/// The rectangle of the complex plane mapped onto the pixel grid:
/// the minimum real and imaginary components and the extent along each
/// axis.  A window is replaced wholesale on zoom, pan or reset; it is
/// never mutated while a computation over it is in flight.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneWindow {
    /// Smallest real component visible in the window.
    pub x_min: f64,
    /// Smallest imaginary component visible in the window.
    pub y_min: f64,
    /// Extent along the real axis.
    pub width: f64,
    /// Extent along the imaginary axis.
    pub height: f64,
}

impl PlaneWindow {
    /// The window a session opens with: the classic full view of the
    /// set.
    pub fn home() -> PlaneWindow {
        PlaneWindow {
            x_min: -2.0,
            y_min: -1.2,
            width: 3.2,
            height: 2.4,
        }
    }
}

/// Maps absolute pixel coordinates onto points of the complex plane.
/// One mapper is shared read-only by every worker of a session: the two
/// step factors are fixed by the grid resolution and the window, so two
/// workers asking about the same pixel always get the same point.
///
/// The grid must have been validated non-empty before a mapper is
/// built; the session configuration check guarantees this.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    grid: GridSize,
    window: PlaneWindow,
    real_step: f64,
    imag_step: f64,
}

impl PlaneMapper {
    /// Fixes the scale between a grid resolution and a plane window.
    pub fn new(grid: GridSize, window: PlaneWindow) -> PlaneMapper {
        PlaneMapper {
            grid,
            window,
            real_step: window.width / grid.width as f64,
            imag_step: window.height / grid.height as f64,
        }
    }

    /// The grid resolution this mapper was built for.
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Given the column and row of a pixel on the grid, return the
    /// complex number at the equivalent location inside the window.
    pub fn pixel_to_point(&self, column: usize, row: usize) -> Complex<f64> {
        Complex::new(
            self.window.x_min + column as f64 * self.real_step,
            self.window.y_min + row as f64 * self.imag_step,
        )
    }
}
