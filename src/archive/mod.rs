// Tile archive traits
//   An archive hands out one independent TileSource per read. A source answers
//   catalogue and bound queries and opens forward-only TileCursors over a window
//   of tile indices. Both must be closed by the caller; the cursor borrows the
//   source so the source cannot be closed while a cursor is live.

use crate::error::MosaicResult;
use crate::pyramid::PyramidMetadata;
use crate::tiles::{TileBound, TileIndexRange};
use std::fmt::Display;

mod memory;

pub use memory::{ArchiveStats, MemoryArchive};

/// Stored, still encoded tile
#[derive(Clone, Debug, PartialEq)]
pub struct RawTile {
    pub column: i64,
    pub row: i64,
    pub zoom: u32,
    pub data: Vec<u8>,
}

impl Display for RawTile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tile(z{} c{} r{}, {}Bytes)",
            self.zoom,
            self.column,
            self.row,
            self.data.len()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
    pub zoom_min: u32,
    pub zoom_max: u32,
    pub range: TileIndexRange,
}

impl TileWindow {
    pub fn single_level(zoom: u32, range: TileIndexRange) -> Self {
        Self {
            zoom_min: zoom,
            zoom_max: zoom,
            range,
        }
    }

    pub fn contains(&self, zoom: u32, column: i64, row: i64) -> bool {
        (self.zoom_min..=self.zoom_max).contains(&zoom) && self.range.contains(column, row)
    }
}

pub trait TileArchive {
    /// Open a new, independent handle on the archive.
    fn connect(&self) -> MosaicResult<Box<dyn TileSource + '_>>;
}

pub trait TileSource {
    fn list_pyramids(&self) -> MosaicResult<Vec<PyramidMetadata>>;

    /// Extreme populated column or row of a level, `None` when the level is empty.
    fn tile_bound(&self, pyramid: &str, zoom: u32, bound: TileBound) -> MosaicResult<Option<i64>>;

    fn open_cursor(
        &self,
        pyramid: &str,
        window: &TileWindow,
    ) -> MosaicResult<Box<dyn TileCursor + '_>>;

    fn close(&mut self) -> MosaicResult<()>;
}

/// Lazy, forward-only sequence of tiles backed by an open archive resource.
pub trait TileCursor: Iterator<Item = MosaicResult<RawTile>> {
    /// Release the underlying resource. Further calls are no-ops.
    fn close(&mut self) -> MosaicResult<()>;
}

/// Populated tile indices of one level.
///
/// An empty level gives the degenerate (0, 0, 0, 0) range.
pub fn available_bounds(
    source: &dyn TileSource,
    pyramid: &str,
    zoom: u32,
) -> MosaicResult<TileIndexRange> {
    let bound = |b| -> MosaicResult<i64> { Ok(source.tile_bound(pyramid, zoom, b)?.unwrap_or(0)) };
    Ok(TileIndexRange::new(
        bound(TileBound::MinColumn)?,
        bound(TileBound::MaxColumn)?,
        bound(TileBound::MinRow)?,
        bound(TileBound::MaxRow)?,
    ))
}
