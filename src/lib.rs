pub mod archive;
pub mod codec;
pub mod crs;
mod error;
pub mod geometry;
pub mod mosaic;
pub mod pyramid;
pub mod raster;
pub mod tiles;

pub use archive::{
    ArchiveStats, MemoryArchive, RawTile, TileArchive, TileCursor, TileSource, TileWindow,
};
pub use codec::{ImageDecoder, TileDecoder};
pub use crs::ReferenceSystem;
pub use error::{MosaicError, MosaicResult};
pub use geometry::{Envelope, Interval, Region};
pub use mosaic::{
    Coverage, FormatStrategy, MosaicCompositor, MosaicConfig, MosaicReader, ReadRequest,
};
pub use pyramid::{select_level, PyramidLevel, PyramidMetadata, DEFAULT_TILE_SIZE};
pub use raster::{ColorModel, PixelFormat, Raster, RasterError};
pub use tiles::{TileBound, TileGrid, TileIndexRange};
