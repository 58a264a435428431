use crate::crs::ReferenceSystem;
use crate::error::MosaicResult;
use crate::geometry::Envelope;
use crate::raster::{PixelFormat, Raster};
use crate::tiles::TileIndexRange;
use std::collections::HashMap;
use std::fmt::Display;
use tracing::*;

mod compositor;
mod reader;
mod request;

pub use compositor::{FormatStrategy, MosaicCompositor};
pub use reader::MosaicReader;
pub use request::ReadRequest;

#[derive(Clone, Debug)]
pub struct MosaicConfig {
    /// Pixel format of every mosaic except single tile fast path reads
    pub generic_format: PixelFormat,
    /// Axis extents to use instead of the EPSG registry, by srid
    pub reference_systems: HashMap<i32, ReferenceSystem>,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            generic_format: PixelFormat::RGBA8,
            reference_systems: HashMap::new(),
        }
    }
}

impl MosaicConfig {
    pub fn with_generic_format(mut self, format: PixelFormat) -> Self {
        self.generic_format = format;
        self
    }

    pub fn with_reference_system(mut self, crs: ReferenceSystem) -> Self {
        self.reference_systems.insert(crs.srid, crs);
        self
    }
}

/// Assembled raster and the envelope it actually covers.
///
/// The envelope is snapped to the tile grid and is generally larger than the
/// one requested.
#[derive(Clone, Debug)]
pub struct Coverage {
    pub name: String,
    pub raster: Raster,
    pub envelope: Envelope,
    pub srid: i32,
    pub zoom_level: u32,
    pub range: TileIndexRange,
}

impl Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Coverage({}, z{}, {}, EPSG:{} {})",
            self.name, self.zoom_level, self.raster, self.srid, self.envelope
        )
    }
}

// Outcome of work done on a resource followed by its release. The work's own
// error wins over a release error.
fn release<T>(result: MosaicResult<T>, closed: MosaicResult<()>, what: &str) -> MosaicResult<T> {
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_error)) => {
            warn!("Failed to close {what} after error: {close_error}");
            Err(e)
        }
    }
}
