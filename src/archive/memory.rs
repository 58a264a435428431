use super::{RawTile, TileArchive, TileCursor, TileSource, TileWindow};
use crate::error::{MosaicError, MosaicResult};
use crate::pyramid::PyramidMetadata;
use crate::tiles::TileBound;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::*;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct TileKey {
    pyramid: String,
    zoom: u32,
    row: i64,
    column: i64,
}

#[derive(Debug, Default)]
struct Counters {
    handles_opened: AtomicUsize,
    handles_closed: AtomicUsize,
    cursors_opened: AtomicUsize,
    cursors_closed: AtomicUsize,
}

/// Snapshot of how many handles and cursors an archive has given out and taken back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArchiveStats {
    pub handles_opened: usize,
    pub handles_closed: usize,
    pub cursors_opened: usize,
    pub cursors_closed: usize,
}

impl ArchiveStats {
    pub fn all_released(&self) -> bool {
        self.handles_opened == self.handles_closed && self.cursors_opened == self.cursors_closed
    }
}

/// Tile archive held entirely in memory.
///
/// Tiles are inserted up front; once shared, any number of threads may connect
/// and read concurrently.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    pyramids: Vec<PyramidMetadata>,
    tiles: BTreeMap<TileKey, Vec<u8>>,
    counters: Counters,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pyramid(&mut self, pyramid: PyramidMetadata) -> &mut Self {
        self.pyramids.push(pyramid);
        self
    }

    pub fn insert_tile(
        &mut self,
        pyramid: &str,
        zoom: u32,
        column: i64,
        row: i64,
        data: Vec<u8>,
    ) -> MosaicResult<&mut Self> {
        if !self.pyramids.iter().any(|p| p.name() == pyramid) {
            return Err(MosaicError::InvalidArgument(format!(
                "Unknown pyramid {pyramid}"
            )));
        }
        let key = TileKey {
            pyramid: pyramid.to_string(),
            zoom,
            row,
            column,
        };
        self.tiles.insert(key, data);
        Ok(self)
    }

    // Keys sort by pyramid, zoom, row, then column, so the rows of one level
    // are a contiguous key range
    fn level_tiles(
        &self,
        pyramid: &str,
        zoom: u32,
        rows: RangeInclusive<i64>,
    ) -> impl Iterator<Item = (&TileKey, &Vec<u8>)> + '_ {
        let key = |row, column| TileKey {
            pyramid: pyramid.to_string(),
            zoom,
            row,
            column,
        };
        let bounds = (!rows.is_empty())
            .then(|| key(*rows.start(), i64::MIN)..=key(*rows.end(), i64::MAX));
        bounds
            .into_iter()
            .flat_map(move |bounds| self.tiles.range(bounds))
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn stats(&self) -> ArchiveStats {
        ArchiveStats {
            handles_opened: self.counters.handles_opened.load(Ordering::SeqCst),
            handles_closed: self.counters.handles_closed.load(Ordering::SeqCst),
            cursors_opened: self.counters.cursors_opened.load(Ordering::SeqCst),
            cursors_closed: self.counters.cursors_closed.load(Ordering::SeqCst),
        }
    }
}

impl TileArchive for MemoryArchive {
    fn connect(&self) -> MosaicResult<Box<dyn TileSource + '_>> {
        self.counters.handles_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySource {
            archive: self,
            closed: false,
        }))
    }
}

struct MemorySource<'a> {
    archive: &'a MemoryArchive,
    closed: bool,
}

impl<'a> MemorySource<'a> {
    fn ensure_open(&self) -> MosaicResult<()> {
        if self.closed {
            Err(MosaicError::InvalidState("Archive handle is closed".into()))
        } else {
            Ok(())
        }
    }
}

impl<'a> TileSource for MemorySource<'a> {
    fn list_pyramids(&self) -> MosaicResult<Vec<PyramidMetadata>> {
        self.ensure_open()?;
        Ok(self.archive.pyramids.clone())
    }

    fn tile_bound(&self, pyramid: &str, zoom: u32, bound: TileBound) -> MosaicResult<Option<i64>> {
        self.ensure_open()?;
        let level = self.archive.level_tiles(pyramid, zoom, i64::MIN..=i64::MAX);
        let values = level.map(|(key, _)| {
            if bound.is_row() {
                key.row
            } else {
                key.column
            }
        });
        Ok(if bound.is_max() {
            values.max()
        } else {
            values.min()
        })
    }

    fn open_cursor(
        &self,
        pyramid: &str,
        window: &TileWindow,
    ) -> MosaicResult<Box<dyn TileCursor + '_>> {
        self.ensure_open()?;
        let archive = self.archive;
        let window = *window;
        let pyramid = pyramid.to_string();
        let rows = window.range.top_row..=window.range.bottom_row;
        let tiles = (window.zoom_min..=window.zoom_max)
            .flat_map(move |zoom| archive.level_tiles(&pyramid, zoom, rows.clone()))
            .filter(move |(key, _)| window.contains(key.zoom, key.column, key.row))
            .map(|(key, data)| RawTile {
                column: key.column,
                row: key.row,
                zoom: key.zoom,
                data: data.clone(),
            });
        archive.counters.cursors_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCursor {
            tiles: Box::new(tiles),
            counters: &archive.counters,
            closed: false,
        }))
    }

    fn close(&mut self) -> MosaicResult<()> {
        if !self.closed {
            self.closed = true;
            self.archive
                .counters
                .handles_closed
                .fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl<'a> Drop for MemorySource<'a> {
    fn drop(&mut self) {
        if !self.closed {
            debug!("Archive handle dropped without close");
            let _ = self.close();
        }
    }
}

struct MemoryCursor<'a> {
    tiles: Box<dyn Iterator<Item = RawTile> + 'a>,
    counters: &'a Counters,
    closed: bool,
}

impl<'a> Iterator for MemoryCursor<'a> {
    type Item = MosaicResult<RawTile>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        self.tiles.next().map(Ok)
    }
}

impl<'a> TileCursor for MemoryCursor<'a> {
    fn close(&mut self) -> MosaicResult<()> {
        if !self.closed {
            self.closed = true;
            self.counters.cursors_closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl<'a> Drop for MemoryCursor<'a> {
    fn drop(&mut self) {
        if !self.closed {
            debug!("Tile cursor dropped without close");
            let _ = TileCursor::close(self);
        }
    }
}
