use std::fmt::Display;

mod grid;

pub use grid::TileGrid;

/// Inclusive column/row window within one level's tile matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileIndexRange {
    pub left_col: i64,
    pub right_col: i64,
    pub top_row: i64,
    pub bottom_row: i64,
}

impl TileIndexRange {
    pub fn new(left_col: i64, right_col: i64, top_row: i64, bottom_row: i64) -> Self {
        Self {
            left_col,
            right_col,
            top_row,
            bottom_row,
        }
    }

    pub fn single(col: i64, row: i64) -> Self {
        Self::new(col, col, row, row)
    }

    pub fn cols(&self) -> u64 {
        (self.right_col - self.left_col + 1).max(0) as u64
    }

    pub fn rows(&self) -> u64 {
        (self.bottom_row - self.top_row + 1).max(0) as u64
    }

    pub fn tile_count(&self) -> u64 {
        self.cols() * self.rows()
    }

    pub fn is_single_tile(&self) -> bool {
        self.left_col == self.right_col && self.top_row == self.bottom_row
    }

    pub fn contains(&self, col: i64, row: i64) -> bool {
        (self.left_col..=self.right_col).contains(&col)
            && (self.top_row..=self.bottom_row).contains(&row)
    }

    pub fn within(&self, other: &TileIndexRange) -> bool {
        other.contains(self.left_col, self.top_row)
            && other.contains(self.right_col, self.bottom_row)
    }

    /// Pixel size of a mosaic made of every tile in the range, `None` when
    /// either side does not fit in a `u32`
    pub fn pixel_dimensions(&self, tile_width: u32, tile_height: u32) -> Option<(u32, u32)> {
        let width = u32::try_from(self.cols()).ok()?.checked_mul(tile_width)?;
        let height = u32::try_from(self.rows()).ok()?.checked_mul(tile_height)?;
        Some((width, height))
    }

    /// Offset of a tile's top-left pixel inside the mosaic
    pub fn pixel_offset(&self, col: i64, row: i64, tile_width: u32, tile_height: u32) -> (i64, i64) {
        (
            (col - self.left_col) * tile_width as i64,
            (row - self.top_row) * tile_height as i64,
        )
    }
}

impl Display for TileIndexRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cols {}..={}, rows {}..={}",
            self.left_col, self.right_col, self.top_row, self.bottom_row
        )
    }
}

/// Which extreme of the populated tile indices to query from an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileBound {
    MinColumn,
    MaxColumn,
    MinRow,
    MaxRow,
}

impl TileBound {
    pub fn is_max(self) -> bool {
        matches!(self, TileBound::MaxColumn | TileBound::MaxRow)
    }

    pub fn is_row(self) -> bool {
        matches!(self, TileBound::MinRow | TileBound::MaxRow)
    }
}
