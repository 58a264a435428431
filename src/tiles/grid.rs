use super::TileIndexRange;
use crate::crs::ReferenceSystem;
use crate::geometry::Envelope;
use crate::pyramid::PyramidLevel;
use tracing::*;

/// Tile-grid geometry of one level anchored at the reference system's
/// top-left corner.
///
/// `res_x`/`res_y` are units per tile cell, `pixel_size_x`/`pixel_size_y` units
/// per pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub res_x: f64,
    pub res_y: f64,
    pub tile_width: u32,
    pub tile_height: u32,
    pub pixel_size_x: f64,
    pub pixel_size_y: f64,
}

impl TileGrid {
    pub fn new(level: &PyramidLevel, crs: &ReferenceSystem) -> Self {
        Self {
            origin_x: crs.origin_x(),
            origin_y: crs.origin_y(),
            res_x: crs.span_x() / level.matrix_width as f64,
            res_y: crs.span_y() / level.matrix_height as f64,
            tile_width: level.tile_width,
            tile_height: level.tile_height,
            pixel_size_x: level.pixel_size_x,
            pixel_size_y: level.pixel_size_y,
        }
    }

    /// Tile range covering `envelope`, clamped to the `available` tiles.
    ///
    /// Returns the range and whether the request is exactly one grid cell at
    /// native resolution.
    pub fn compute_range(
        &self,
        envelope: Option<&Envelope>,
        dimensions: Option<(u32, u32)>,
        available: TileIndexRange,
    ) -> (TileIndexRange, bool) {
        let Some(envelope) = envelope else {
            return (available, false);
        };

        if self.is_single_cell(envelope, dimensions) {
            let col = available
                .left_col
                .max(round_index((envelope.x.min - self.origin_x) / self.res_x));
            let row = available
                .top_row
                .max(round_index((self.origin_y - envelope.y.max) / self.res_y));
            let range = TileIndexRange::single(col, row);
            debug!("Single tile fast path at {range}");
            return (range, true);
        }

        let left_col = clamp_index(
            floor_index((envelope.x.min - self.origin_x) / self.res_x),
            available.left_col,
            available.right_col,
        );
        let right_col = clamp_index(
            floor_index((envelope.x.max - self.origin_x) / self.res_x),
            left_col,
            available.right_col,
        );
        let top_row = clamp_index(
            floor_index((self.origin_y - envelope.y.max) / self.res_y),
            available.top_row,
            available.bottom_row,
        );
        let bottom_row = clamp_index(
            floor_index((self.origin_y - envelope.y.min) / self.res_y),
            top_row,
            available.bottom_row,
        );
        let range = TileIndexRange::new(left_col, right_col, top_row, bottom_row);
        debug!("Tile range {range} within available {available}");
        (range, false)
    }

    fn is_single_cell(&self, envelope: &Envelope, dimensions: Option<(u32, u32)>) -> bool {
        let Some((width, height)) = dimensions else {
            return false;
        };
        // Truncating remainder, so requests left of or above the origin go negative
        let rem_x = (envelope.x.min - self.origin_x) % self.res_x;
        let rem_y = (self.origin_y - envelope.y.max) % self.res_y;
        width == self.tile_width
            && height == self.tile_height
            && (envelope.width() - self.res_x).abs() < self.pixel_size_x
            && (envelope.height() - self.res_y).abs() < self.pixel_size_y
            && rem_x < self.pixel_size_x
            && rem_y < self.pixel_size_y
    }

    /// Envelope actually covered by the tiles of `range`.
    pub fn envelope_of(&self, range: &TileIndexRange) -> Envelope {
        Envelope::new(
            self.origin_x + range.left_col as f64 * self.res_x,
            self.origin_y - (range.bottom_row + 1) as f64 * self.res_y,
            self.origin_x + (range.right_col + 1) as f64 * self.res_x,
            self.origin_y - range.top_row as f64 * self.res_y,
        )
    }
}

fn floor_index(v: f64) -> i64 {
    v.floor() as i64
}

// Halves round up, not away from zero
fn round_index(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

// Never panics on an inverted window, `min` wins
fn clamp_index(v: i64, min: i64, max: i64) -> i64 {
    v.min(max).max(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyramid::PyramidMetadata;

    // One degree cells, 256 pixel tiles
    fn degree_grid() -> TileGrid {
        let crs = ReferenceSystem::wgs84();
        let level = PyramidLevel::for_extent(8, (360, 180), (256, 256), &crs.axes);
        TileGrid::new(&level, &crs)
    }

    fn everything() -> TileIndexRange {
        TileIndexRange::new(0, 359, 0, 179)
    }

    #[test]
    fn aligned_single_tile_takes_fast_path() {
        let grid = degree_grid();
        let envelope = Envelope::new(-10.0, 40.0, -9.0, 41.0);
        let (range, fast) = grid.compute_range(Some(&envelope), Some((256, 256)), everything());
        assert!(fast);
        assert_eq!(range, TileIndexRange::single(170, 49));
        assert_eq!(range.pixel_dimensions(256, 256), Some((256, 256)));
        assert_eq!(grid.envelope_of(&range), envelope);
    }

    #[test]
    fn half_tile_offset_falls_to_general_path() {
        let grid = degree_grid();
        let envelope = Envelope::new(-9.5, 40.0, -8.5, 41.0);
        let (range, fast) = grid.compute_range(Some(&envelope), Some((256, 256)), everything());
        assert!(!fast);
        // Bottom edge sits exactly on a cell boundary and pulls in the next row
        assert_eq!(range, TileIndexRange::new(170, 171, 49, 50));
    }

    #[test]
    fn sub_pixel_offset_still_aligned() {
        let grid = degree_grid();
        let nudge = grid.pixel_size_x / 2.0;
        let envelope = Envelope::new(-10.0 + nudge, 40.0, -9.0 + nudge, 41.0);
        let (range, fast) = grid.compute_range(Some(&envelope), Some((256, 256)), everything());
        assert!(fast);
        assert_eq!(range, TileIndexRange::single(170, 49));
    }

    #[test]
    fn wrong_pixel_size_is_not_fast_path() {
        let grid = degree_grid();
        let envelope = Envelope::new(-10.0, 40.0, -9.0, 41.0);
        let (range, fast) = grid.compute_range(Some(&envelope), Some((512, 512)), everything());
        assert!(!fast);
        assert_eq!(range, TileIndexRange::new(170, 171, 49, 50));
    }

    #[test]
    fn request_larger_than_one_cell_is_not_fast_path() {
        // Two 8 pixel tiles across the world: a pixel is 22.5 degrees wide
        let crs = ReferenceSystem::wgs84();
        let level = PyramidLevel::for_extent(0, (2, 1), (8, 8), &crs.axes);
        let grid = TileGrid::new(&level, &crs);
        let envelope = Envelope::new(-170.0, -80.0, 170.0, 80.0);
        let available = TileIndexRange::new(0, 1, 0, 0);
        let (range, fast) = grid.compute_range(Some(&envelope), Some((8, 8)), available);
        assert!(!fast);
        assert_eq!(range, TileIndexRange::new(0, 1, 0, 0));
        assert!(grid.envelope_of(&range).contains(&envelope));
    }

    #[test]
    fn fast_path_respects_available_minimum() {
        let grid = degree_grid();
        let envelope = Envelope::new(-10.0, 40.0, -9.0, 41.0);
        let available = TileIndexRange::new(175, 200, 60, 70);
        let (range, fast) = grid.compute_range(Some(&envelope), Some((256, 256)), available);
        assert!(fast);
        assert_eq!(range, TileIndexRange::single(175, 60));
    }

    #[test]
    fn no_envelope_uses_available_bounds() {
        let grid = degree_grid();
        let available = TileIndexRange::new(3, 7, 1, 2);
        let (range, fast) = grid.compute_range(None, Some((256, 256)), available);
        assert!(!fast);
        assert_eq!(range, available);
    }

    #[test]
    fn requests_inside_available_stay_inside() {
        let grid = degree_grid();
        let available = TileIndexRange::new(100, 200, 20, 80);
        let requests = [
            Envelope::new(-79.5, 10.2, -0.3, 69.9),
            Envelope::new(-79.9, 10.0, 20.99, 69.95),
            Envelope::new(-50.0, 50.0, -50.0, 50.0),
            Envelope::new(-50.25, 30.5, -50.2, 30.6),
        ];
        for envelope in requests.iter() {
            for dimensions in [(256, 256), (100, 300), (1024, 1024)] {
                let (range, _) = grid.compute_range(Some(envelope), Some(dimensions), available);
                assert!(range.tile_count() > 0, "{envelope}");
                assert!(range.within(&available), "{envelope} -> {range}");
                let covered = grid.envelope_of(&range);
                assert!(covered.contains(envelope), "{covered} !> {envelope}");
            }
        }
    }

    #[test]
    fn requests_outside_available_are_clamped() {
        let grid = degree_grid();
        let available = TileIndexRange::new(100, 200, 20, 80);
        // Entirely east and south of the populated tiles
        let envelope = Envelope::new(60.0, -50.0, 70.0, -40.0);
        let (range, fast) = grid.compute_range(Some(&envelope), Some((300, 300)), available);
        assert!(!fast);
        assert_eq!(range, TileIndexRange::single(200, 80));
    }

    #[test]
    fn degenerate_available_bounds_yield_one_tile() {
        let grid = degree_grid();
        let envelope = Envelope::new(-10.0, 40.0, -5.0, 45.0);
        let (range, _) =
            grid.compute_range(Some(&envelope), Some((640, 640)), TileIndexRange::single(0, 0));
        assert_eq!(range.tile_count(), 1);
    }

    #[test]
    fn recomputed_envelope_is_grid_aligned() {
        let crs = ReferenceSystem::wgs84();
        let pyramid =
            PyramidMetadata::quadtree("world", crs.axes, &crs, (2, 1), 4, 256).unwrap();
        let envelope = Envelope::new(-33.3, -12.7, 48.1, 22.2);
        for level in pyramid.levels() {
            let grid = TileGrid::new(level, &crs);
            let available = TileIndexRange::new(
                0,
                level.matrix_width as i64 - 1,
                0,
                level.matrix_height as i64 - 1,
            );
            let (range, _) = grid.compute_range(Some(&envelope), Some((800, 400)), available);
            let covered = grid.envelope_of(&range);
            assert!(covered.contains(&envelope));
            for edge in [covered.x.min, covered.x.max] {
                let cells = (edge - grid.origin_x) / grid.res_x;
                assert!((cells - cells.round()).abs() < 1e-9);
            }
            for edge in [covered.y.min, covered.y.max] {
                let cells = (grid.origin_y - edge) / grid.res_y;
                assert!((cells - cells.round()).abs() < 1e-9);
            }
        }
    }
}
