use super::release;
use crate::archive::TileCursor;
use crate::codec::TileDecoder;
use crate::error::{MosaicError, MosaicResult};
use crate::pyramid::PyramidLevel;
use crate::raster::{PixelFormat, Raster};
use crate::tiles::TileIndexRange;
use tracing::*;

/// How decoded tiles are written into the mosaic, chosen once per read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStrategy {
    /// Mosaic takes the first tile's pixel format and samples are copied verbatim.
    PreserveFormat,
    /// Mosaic uses the generic format and every tile is converted into it.
    NormalizeFormat,
}

impl FormatStrategy {
    pub fn for_request(single_tile_fast_path: bool) -> Self {
        if single_tile_fast_path {
            FormatStrategy::PreserveFormat
        } else {
            FormatStrategy::NormalizeFormat
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicCompositor {
    pub generic_format: PixelFormat,
}

impl Default for MosaicCompositor {
    fn default() -> Self {
        Self {
            generic_format: PixelFormat::RGBA8,
        }
    }
}

impl MosaicCompositor {
    pub fn new(generic_format: PixelFormat) -> Self {
        Self { generic_format }
    }

    /// Assemble every tile of `cursor` into one raster covering `range`.
    ///
    /// The cursor is drained and closed exactly once whatever happens. An empty
    /// cursor gives a blank raster in the generic format.
    pub fn composite(
        &self,
        range: &TileIndexRange,
        level: &PyramidLevel,
        cursor: &mut dyn TileCursor,
        decoder: &dyn TileDecoder,
        strategy: FormatStrategy,
    ) -> MosaicResult<Raster> {
        let result = self.blit_tiles(range, level, &mut *cursor, decoder, strategy);
        let closed = cursor.close();
        release(result, closed, "tile cursor")
    }

    fn blit_tiles(
        &self,
        range: &TileIndexRange,
        level: &PyramidLevel,
        cursor: &mut dyn TileCursor,
        decoder: &dyn TileDecoder,
        strategy: FormatStrategy,
    ) -> MosaicResult<Raster> {
        let dimensions = range
            .pixel_dimensions(level.tile_width, level.tile_height)
            .ok_or_else(|| {
                MosaicError::InvalidArgument(format!(
                    "Mosaic of {}x{} tiles of {}x{} pixels is too large",
                    range.cols(),
                    range.rows(),
                    level.tile_width,
                    level.tile_height
                ))
            })?;
        let mut mosaic: Option<Raster> = None;
        let mut count = 0;

        for tile in cursor {
            let tile = tile?;
            let raster = decoder.decode(&tile)?;
            if raster.dimensions != level.tile_dimensions() {
                warn!(
                    "Tile ({}, {}) is {}x{}, level expects {}x{}",
                    tile.column,
                    tile.row,
                    raster.width(),
                    raster.height(),
                    level.tile_width,
                    level.tile_height
                );
            }
            let (x, y) =
                range.pixel_offset(tile.column, tile.row, level.tile_width, level.tile_height);
            match strategy {
                FormatStrategy::PreserveFormat => mosaic
                    .get_or_insert_with(|| Raster::blank(dimensions, raster.format))
                    .set_rect(x, y, &raster)?,
                FormatStrategy::NormalizeFormat => mosaic
                    .get_or_insert_with(|| Raster::blank(dimensions, self.generic_format))
                    .draw(x, y, &raster)?,
            }
            trace!("Placed tile ({}, {}) at ({x}, {y})", tile.column, tile.row);
            count += 1;
        }

        debug!("Composited {count} of {} tiles ({strategy:?})", range.tile_count());
        Ok(mosaic.unwrap_or_else(|| Raster::blank(dimensions, self.generic_format)))
    }
}
