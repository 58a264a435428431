#![allow(dead_code)]

use image::{DynamicImage, ImageFormat};
use std::cell::Cell;
use std::io::Cursor;
use tilemosaic::{
    MemoryArchive, MosaicResult, PyramidLevel, PyramidMetadata, RawTile, ReferenceSystem,
    TileArchive, TileBound, TileCursor, TileSource, TileWindow,
};

pub const DEGREES: &str = "degrees";

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn png(img: impl Into<DynamicImage>) -> Vec<u8> {
    let mut data = Vec::new();
    img.into()
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

/// WGS84 pyramid whose finest level has one degree tile cells of 256 pixels
pub fn degree_pyramid() -> PyramidMetadata {
    let crs = ReferenceSystem::wgs84();
    let levels = vec![
        PyramidLevel::for_extent(0, (2, 1), (256, 256), &crs.axes),
        PyramidLevel::for_extent(8, (360, 180), (256, 256), &crs.axes),
    ];
    PyramidMetadata::new(DEGREES, crs.axes, crs.srid, levels).unwrap()
}

fn archive_gone(what: &str) -> tilemosaic::MosaicError {
    std::io::Error::other(format!("archive went away during {what}")).into()
}

/// Where a `FlakyArchive` injects an I/O failure
#[derive(Clone, Copy, Debug, Default)]
pub struct Faults {
    /// Cursors fail after yielding this many tiles
    pub fail_after: Option<usize>,
    pub tile_bound: bool,
    pub open_cursor: bool,
    pub cursor_close: bool,
    /// Only handles that opened a cursor fail to close, so the reader still opens
    pub handle_close: bool,
}

/// Wraps a `MemoryArchive` and fails where its `Faults` say. The inner
/// handles and cursors are always released, failing or not.
pub struct FlakyArchive {
    pub inner: MemoryArchive,
    pub faults: Faults,
}

impl FlakyArchive {
    pub fn new(inner: MemoryArchive, faults: Faults) -> Self {
        Self { inner, faults }
    }
}

impl TileArchive for FlakyArchive {
    fn connect(&self) -> MosaicResult<Box<dyn TileSource + '_>> {
        Ok(Box::new(FlakySource {
            inner: self.inner.connect()?,
            faults: self.faults,
            opened_cursor: Cell::new(false),
        }))
    }
}

struct FlakySource<'a> {
    inner: Box<dyn TileSource + 'a>,
    faults: Faults,
    opened_cursor: Cell<bool>,
}

impl<'a> TileSource for FlakySource<'a> {
    fn list_pyramids(&self) -> MosaicResult<Vec<PyramidMetadata>> {
        self.inner.list_pyramids()
    }

    fn tile_bound(&self, pyramid: &str, zoom: u32, bound: TileBound) -> MosaicResult<Option<i64>> {
        if self.faults.tile_bound {
            return Err(archive_gone("bound query"));
        }
        self.inner.tile_bound(pyramid, zoom, bound)
    }

    fn open_cursor(
        &self,
        pyramid: &str,
        window: &TileWindow,
    ) -> MosaicResult<Box<dyn TileCursor + '_>> {
        if self.faults.open_cursor {
            return Err(archive_gone("cursor open"));
        }
        self.opened_cursor.set(true);
        Ok(Box::new(FlakyCursor {
            inner: self.inner.open_cursor(pyramid, window)?,
            remaining: self.faults.fail_after,
            failed: false,
            fail_close: self.faults.cursor_close,
        }))
    }

    fn close(&mut self) -> MosaicResult<()> {
        self.inner.close()?;
        if self.faults.handle_close && self.opened_cursor.get() {
            return Err(archive_gone("handle close"));
        }
        Ok(())
    }
}

struct FlakyCursor<'a> {
    inner: Box<dyn TileCursor + 'a>,
    remaining: Option<usize>,
    failed: bool,
    fail_close: bool,
}

impl<'a> Iterator for FlakyCursor<'a> {
    type Item = MosaicResult<RawTile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.remaining {
            Some(0) => {
                self.failed = true;
                Some(Err(archive_gone("iteration")))
            }
            Some(n) => {
                self.remaining = Some(n - 1);
                self.inner.next()
            }
            None => self.inner.next(),
        }
    }
}

impl<'a> TileCursor for FlakyCursor<'a> {
    fn close(&mut self) -> MosaicResult<()> {
        self.inner.close()?;
        if self.fail_close {
            return Err(archive_gone("cursor close"));
        }
        Ok(())
    }
}
