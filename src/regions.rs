//! Carving the output grid into tiles, one per worker.

use planes::GridSize;

/// A disjoint rectangular tile of the output grid assigned to one
/// worker.  Coordinates are absolute in the full grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Leftmost column of the tile.
    pub x: usize,
    /// Topmost row of the tile.
    pub y: usize,
    /// Tile width in pixels.
    pub width: usize,
    /// Tile height in pixels.
    pub height: usize,
}

/// The number of tiles along each axis for a requested worker count.
/// The grid is always square, so the effective worker count is the
/// largest perfect square at or below the request: asking for 5 workers
/// runs 4 of them in a 2x2 arrangement.  A deliberate simplification,
/// not a bug.
pub fn tiles_per_axis(requested_workers: usize) -> usize {
    let tiles = (requested_workers as f64).sqrt().floor() as usize;
    tiles.max(1)
}

/// Splits the grid into `tiles_per_axis(requested_workers)²` near-equal
/// tiles.  When the grid does not divide evenly, the far-edge row and
/// column of tiles absorb the remainder pixels, so the union of the
/// returned regions is always exactly the grid: every pixel belongs to
/// one region and no two regions overlap.
pub fn partition(grid: GridSize, requested_workers: usize) -> Vec<Region> {
    let tiles = tiles_per_axis(requested_workers);
    let tile_width = grid.width / tiles;
    let tile_height = grid.height / tiles;

    iproduct!(0..tiles, 0..tiles)
        .map(|(ty, tx)| {
            let x = tx * tile_width;
            let y = ty * tile_height;
            Region {
                x,
                y,
                width: if tx == tiles - 1 {
                    grid.width - x
                } else {
                    tile_width
                },
                height: if ty == tiles - 1 {
                    grid.height - y
                } else {
                    tile_height
                },
            }
        })
        .collect()
}
