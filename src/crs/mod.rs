use crate::error::{MosaicError, MosaicResult};
use crate::geometry::Envelope;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use std::fmt::Display;
use tracing::*;

pub const WGS84_SRID: i32 = 4326;

// Latitude at which web mercator becomes square
const MERCATOR_MAX_LATITUDE_DEG: f64 = 85.051_128_779_806_59;

// Web mercator, its deprecated alias, and ellipsoidal world mercator
const WORLD_MERCATOR_SRIDS: [u16; 3] = [3857, 3785, 3395];

/// Reference system of a tile pyramid, reduced to what tile-grid geometry needs:
/// the extents of its two horizontal axes.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceSystem {
    pub srid: i32,
    pub axes: Envelope,
}

impl ReferenceSystem {
    pub fn new(srid: i32, axes: Envelope) -> Self {
        Self { srid, axes }
    }

    pub fn wgs84() -> Self {
        Self::new(WGS84_SRID, Envelope::new(-180.0, -90.0, 180.0, 90.0))
    }

    /// Resolve axis extents from the EPSG registry.
    ///
    /// Geographic systems use the full degree range. Of the projected systems
    /// only the world mercators are accepted, with axes from projecting the
    /// world at web mercator latitude limits. Anything else has no well defined
    /// world extent and needs an explicit `ReferenceSystem::new`.
    pub fn from_epsg(srid: i32) -> MosaicResult<Self> {
        if srid == WGS84_SRID {
            return Ok(Self::wgs84());
        }
        let unavailable = |reason: String| {
            warn!("EPSG:{srid} unavailable: {reason}");
            MosaicError::ReferenceSystemUnavailable(srid)
        };
        let code = u16::try_from(srid).map_err(|_| unavailable("not an EPSG code".into()))?;
        let proj = Proj::from_epsg_code(code).map_err(|e| unavailable(format!("{e:?}")))?;
        if proj.is_latlong() {
            return Ok(Self::new(srid, Self::wgs84().axes));
        }
        if !WORLD_MERCATOR_SRIDS.contains(&code) {
            return Err(unavailable("projection has no world extent".into()));
        }

        let wgs84 = Proj::from_epsg_code(WGS84_SRID as u16)
            .map_err(|e| unavailable(format!("{e:?}")))?;
        let mut lower_left = (
            -180_f64.to_radians(),
            -MERCATOR_MAX_LATITUDE_DEG.to_radians(),
            0.0,
        );
        let mut upper_right = (
            180_f64.to_radians(),
            MERCATOR_MAX_LATITUDE_DEG.to_radians(),
            0.0,
        );
        transform(&wgs84, &proj, &mut lower_left).map_err(|e| unavailable(format!("{e:?}")))?;
        transform(&wgs84, &proj, &mut upper_right).map_err(|e| unavailable(format!("{e:?}")))?;

        let axes = Envelope::from_corners(lower_left.0, lower_left.1, upper_right.0, upper_right.1);
        if !axes.is_finite() || axes.width() <= 0.0 || axes.height() <= 0.0 {
            return Err(unavailable(format!("degenerate axes {axes}")));
        }
        Ok(Self::new(srid, axes))
    }

    pub fn span_x(&self) -> f64 {
        self.axes.width()
    }

    pub fn span_y(&self) -> f64 {
        self.axes.height()
    }

    /// Left edge of the tile grid
    pub fn origin_x(&self) -> f64 {
        self.axes.x.min
    }

    /// Top edge of the tile grid
    pub fn origin_y(&self) -> f64 {
        self.axes.y.max
    }
}

impl Display for ReferenceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{} {}", self.srid, self.axes)
    }
}
