use crate::archive::RawTile;
use crate::error::{MosaicError, MosaicResult};
use crate::raster::Raster;

/// Turns the stored bytes of a tile into pixels.
pub trait TileDecoder {
    fn decode(&self, tile: &RawTile) -> MosaicResult<Raster>;
}

/// Decodes any format the `image` crate recognises from the leading bytes
/// (PNG and JPEG are enabled).
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageDecoder;

impl TileDecoder for ImageDecoder {
    fn decode(&self, tile: &RawTile) -> MosaicResult<Raster> {
        let failure = |reason: String| MosaicError::DecodeFailure {
            column: tile.column,
            row: tile.row,
            zoom: tile.zoom,
            reason,
        };
        let img = image::load_from_memory(&tile.data).map_err(|e| failure(e.to_string()))?;
        Raster::from_image(&img).map_err(|e| failure(format!("{e:?}")))
    }
}
