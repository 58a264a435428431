use super::{release, Coverage, FormatStrategy, MosaicCompositor, MosaicConfig, ReadRequest};
use crate::archive::{available_bounds, TileArchive, TileSource, TileWindow};
use crate::codec::{ImageDecoder, TileDecoder};
use crate::crs::ReferenceSystem;
use crate::error::{MosaicError, MosaicResult};
use crate::geometry::Envelope;
use crate::pyramid::{select_level, PyramidLevel, PyramidMetadata};
use crate::raster::Raster;
use crate::tiles::{TileGrid, TileIndexRange};
use std::time::Instant;
use tracing::*;

/// Reads mosaics out of the pyramids of one tile archive.
///
/// Pyramid metadata is read once at open. Every read opens its own archive
/// handle, so a shared reader serves concurrent reads.
pub struct MosaicReader<A> {
    archive: A,
    config: MosaicConfig,
    pyramids: Vec<PyramidMetadata>,
    decoder: Box<dyn TileDecoder + Send + Sync>,
}

impl<A: TileArchive> MosaicReader<A> {
    pub fn open(archive: A) -> MosaicResult<Self> {
        Self::open_with_config(archive, MosaicConfig::default())
    }

    pub fn open_with_config(archive: A, config: MosaicConfig) -> MosaicResult<Self> {
        let mut source = archive.connect()?;
        let listed = source.list_pyramids();
        let closed = source.close();
        drop(source);
        let pyramids = release(listed, closed, "archive handle")?;

        for pyramid in pyramids.iter() {
            debug!("{pyramid}");
        }
        Ok(Self {
            archive,
            config,
            pyramids,
            decoder: Box::new(ImageDecoder),
        })
    }

    pub fn with_decoder<D: TileDecoder + Send + Sync + 'static>(mut self, decoder: D) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    pub fn coverage_names(&self) -> Vec<&str> {
        self.pyramids.iter().map(|p| p.name()).collect()
    }

    pub fn coverage_count(&self) -> usize {
        self.pyramids.len()
    }

    /// First pyramid listed by the archive
    pub fn default_coverage(&self) -> Option<&str> {
        self.pyramids.first().map(|p| p.name())
    }

    pub fn metadata(&self, name: &str) -> MosaicResult<&PyramidMetadata> {
        self.pyramids
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| {
                MosaicError::InvalidArgument(format!("The coverage {name} is not supported"))
            })
    }

    pub fn original_envelope(&self, name: &str) -> MosaicResult<Envelope> {
        Ok(*self.metadata(name)?.bounds())
    }

    pub fn highest_resolution(&self, name: &str) -> MosaicResult<(f64, f64)> {
        Ok(self.metadata(name)?.highest_resolution())
    }

    pub fn original_grid_range(&self, name: &str) -> MosaicResult<(u64, u64)> {
        Ok(self.metadata(name)?.original_grid_range())
    }

    pub fn reference_system(&self, name: &str) -> MosaicResult<ReferenceSystem> {
        let srid = self.metadata(name)?.srid();
        match self.config.reference_systems.get(&srid) {
            Some(crs) => Ok(crs.clone()),
            None => ReferenceSystem::from_epsg(srid),
        }
    }

    pub fn request(&self, name: impl Into<String>) -> ReadRequest<'_, A> {
        ReadRequest::new(self, name.into())
    }

    pub fn request_default(&self) -> MosaicResult<ReadRequest<'_, A>> {
        let name = self
            .default_coverage()
            .ok_or_else(|| MosaicError::InvalidArgument("Archive has no coverages".into()))?;
        Ok(self.request(name))
    }

    /// Mosaic of the tiles of `name` best matching `envelope` at `dimensions`.
    ///
    /// Both are optional. Without them the coarsest level is read in full.
    pub fn read(
        &self,
        name: &str,
        envelope: Option<&Envelope>,
        dimensions: Option<(u32, u32)>,
    ) -> MosaicResult<Coverage> {
        let t0 = Instant::now();
        let pyramid = self.metadata(name)?;
        validate_request(envelope, dimensions)?;
        let crs = self.reference_system(name)?;
        let level = select_level(pyramid.levels(), crs.span_x(), envelope, dimensions)?;
        let grid = TileGrid::new(level, &crs);

        let mut source = self.archive.connect()?;
        let result = self.read_level(&*source, pyramid, level, &grid, envelope, dimensions);
        let closed = source.close();
        drop(source);
        let (raster, range) = release(result, closed, "archive handle")?;

        let coverage = Coverage {
            name: pyramid.name().to_string(),
            raster,
            envelope: grid.envelope_of(&range),
            srid: crs.srid,
            zoom_level: level.zoom_level,
            range,
        };
        info!(
            "Read {coverage} in {:.3}ms",
            t0.elapsed().as_micros() as f64 / 1000.0
        );
        Ok(coverage)
    }

    fn read_level(
        &self,
        source: &dyn TileSource,
        pyramid: &PyramidMetadata,
        level: &PyramidLevel,
        grid: &TileGrid,
        envelope: Option<&Envelope>,
        dimensions: Option<(u32, u32)>,
    ) -> MosaicResult<(Raster, TileIndexRange)> {
        let available = available_bounds(source, pyramid.name(), level.zoom_level)?;
        let (range, fast_path) = grid.compute_range(envelope, dimensions, available);

        let window = TileWindow::single_level(level.zoom_level, range);
        let mut cursor = source.open_cursor(pyramid.name(), &window)?;
        let compositor = MosaicCompositor::new(self.config.generic_format);
        let raster = compositor.composite(
            &range,
            level,
            &mut *cursor,
            self.decoder.as_ref(),
            FormatStrategy::for_request(fast_path),
        )?;
        Ok((raster, range))
    }
}

fn validate_request(envelope: Option<&Envelope>, dimensions: Option<(u32, u32)>) -> MosaicResult<()> {
    if let Some(envelope) = envelope {
        if !envelope.is_finite() || envelope.width() < 0.0 || envelope.height() < 0.0 {
            return Err(MosaicError::InvalidArgument(format!(
                "Bad requested envelope {envelope}"
            )));
        }
    }
    if let Some((width, height)) = dimensions {
        if width == 0 || height == 0 {
            return Err(MosaicError::InvalidArgument(format!(
                "Bad requested dimensions {width}x{height}"
            )));
        }
    }
    Ok(())
}
