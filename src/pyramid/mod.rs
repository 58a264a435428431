use crate::crs::ReferenceSystem;
use crate::error::{MosaicError, MosaicResult};
use crate::geometry::Envelope;
use std::fmt::Display;
use tracing::*;

mod level;

pub use level::PyramidLevel;

pub const DEFAULT_TILE_SIZE: u32 = 256;
pub const ZOOM_LEVEL_BASE: u32 = 2;

/// Description of one tile set in an archive.
///
/// Built once when the archive is opened and never mutated afterwards, so a
/// shared reference can be read from any number of concurrent reads.
#[derive(Clone, Debug, PartialEq)]
pub struct PyramidMetadata {
    name: String,
    bounds: Envelope,
    srid: i32,
    levels: Vec<PyramidLevel>,
}

impl PyramidMetadata {
    pub fn new(
        name: impl Into<String>,
        bounds: Envelope,
        srid: i32,
        mut levels: Vec<PyramidLevel>,
    ) -> MosaicResult<Self> {
        let name = name.into();
        if levels.is_empty() {
            return Err(MosaicError::InvalidState(format!(
                "Pyramid {name} has no zoom levels"
            )));
        }
        levels.sort_by_key(|level| level.zoom_level);
        Ok(Self {
            name,
            bounds,
            srid,
            levels,
        })
    }

    /// Power-of-two pyramid over `crs`, `base_matrix` tiles wide/high at zoom 0.
    pub fn quadtree(
        name: impl Into<String>,
        bounds: Envelope,
        crs: &ReferenceSystem,
        base_matrix: (u32, u32),
        max_zoom: u32,
        tile_size: u32,
    ) -> MosaicResult<Self> {
        let levels = (0..=max_zoom)
            .map(|zoom| {
                let factor = ZOOM_LEVEL_BASE.pow(zoom);
                PyramidLevel::for_extent(
                    zoom,
                    (base_matrix.0 * factor, base_matrix.1 * factor),
                    (tile_size, tile_size),
                    &crs.axes,
                )
            })
            .collect();
        Self::new(name, bounds, crs.srid, levels)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &Envelope {
        &self.bounds
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Levels in ascending zoom order
    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    pub fn level(&self, zoom_level: u32) -> Option<&PyramidLevel> {
        self.levels
            .iter()
            .find(|level| level.zoom_level == zoom_level)
    }

    pub fn coarsest_level(&self) -> &PyramidLevel {
        &self.levels[0] // Checked at construction
    }

    pub fn finest_level(&self) -> &PyramidLevel {
        &self.levels[self.levels.len() - 1]
    }

    pub fn highest_resolution(&self) -> (f64, f64) {
        let level = self.finest_level();
        (level.pixel_size_x, level.pixel_size_y)
    }

    /// Pixel dimensions of the finest level
    pub fn original_grid_range(&self) -> (u64, u64) {
        self.finest_level().dimensions()
    }
}

impl Display for PyramidMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pyramid({}, EPSG:{}, {} Levels)",
            self.name,
            self.srid,
            self.levels.len()
        )?;
        for level in self.levels.iter() {
            write!(f, "\n  {level}")?;
        }
        Ok(())
    }
}

/// Pick the level whose horizontal resolution is nearest the requested one.
///
/// Without both an envelope and output dimensions the coarsest level is used.
/// Ties go to the first (coarser) level.
pub fn select_level<'a>(
    levels: &'a [PyramidLevel],
    world_span: f64,
    envelope: Option<&Envelope>,
    dimensions: Option<(u32, u32)>,
) -> MosaicResult<&'a PyramidLevel> {
    let Some(first) = levels.first() else {
        return Err(MosaicError::InvalidState(
            "Cannot select from an empty level list".into(),
        ));
    };
    let (Some(envelope), Some((width, _))) = (envelope, dimensions) else {
        return Ok(first);
    };

    let requested_res_x = envelope.width() / width as f64;
    let mut best = None;
    let mut difference = f64::MAX;
    for level in levels {
        let level_difference = (requested_res_x - level.resolution_x(world_span)).abs();
        if level_difference < difference {
            difference = level_difference;
            best = Some(level);
        }
    }

    let level = best.unwrap_or(first);
    debug!(
        "Selected zoom {} for {requested_res_x:e} units/pixel",
        level.zoom_level
    );
    Ok(level)
}
