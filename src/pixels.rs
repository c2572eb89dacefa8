//! The output buffer a session renders into.

use planes::GridSize;
use worker::ColumnResult;

/// The full-resolution output grid, addressable by (column, row).
///
/// Column results are the only writes the buffer accepts, and because
/// the regions of a session tile the grid disjointly, no two workers'
/// columns ever touch the same cells.  The session coordinator owns the
/// buffer exclusively while the session runs and hands it back to the
/// caller when every worker is terminal.
pub struct PixelBuffer {
    grid: GridSize,
    values: Vec<u32>,
}

impl PixelBuffer {
    /// An all-zero buffer for a grid.
    pub fn new(grid: GridSize) -> PixelBuffer {
        PixelBuffer {
            grid,
            values: vec![0; grid.width * grid.height],
        }
    }

    /// The resolution this buffer was allocated for.
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// The value stored for one pixel.
    pub fn value_at(&self, column: usize, row: usize) -> u32 {
        self.values[row * self.grid.width + column]
    }

    /// Writes one completed column chunk into place.
    pub fn apply_column(&mut self, column: &ColumnResult) {
        for (iy, value) in column.values.iter().enumerate() {
            self.values[(column.row_origin + iy) * self.grid.width + column.column] = *value;
        }
    }

    /// Row-major view of the raw values.
    pub fn values(&self) -> &[u32] {
        &self.values
    }
}
