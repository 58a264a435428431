use crate::geometry::Envelope;
use std::fmt::Display;

/// One resolution step of a tile pyramid.
#[derive(Clone, Debug, PartialEq)]
pub struct PyramidLevel {
    pub zoom_level: u32,
    pub matrix_width: u32,
    pub matrix_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub pixel_size_x: f64,
    pub pixel_size_y: f64,
}

impl PyramidLevel {
    /// Level whose pixel sizes are derived from the world extent it tiles.
    pub fn for_extent(
        zoom_level: u32,
        matrix: (u32, u32),
        tile: (u32, u32),
        world: &Envelope,
    ) -> Self {
        let (matrix_width, matrix_height) = matrix;
        let (tile_width, tile_height) = tile;
        Self {
            zoom_level,
            matrix_width,
            matrix_height,
            tile_width,
            tile_height,
            pixel_size_x: world.width() / (matrix_width as f64 * tile_width as f64),
            pixel_size_y: world.height() / (matrix_height as f64 * tile_height as f64),
        }
    }

    /// Pixel dimensions of the full level
    pub fn dimensions(&self) -> (u64, u64) {
        (
            self.matrix_width as u64 * self.tile_width as u64,
            self.matrix_height as u64 * self.tile_height as u64,
        )
    }

    pub fn tile_dimensions(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// Horizontal units per pixel when the level spans `world_span`.
    pub fn resolution_x(&self, world_span: f64) -> f64 {
        world_span / (self.matrix_width as f64 * self.tile_width as f64)
    }

    pub fn tile_count(&self) -> u64 {
        self.matrix_width as u64 * self.matrix_height as u64
    }
}

impl Display for PyramidLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Level(z{}, {}x{} tiles of {}x{}, {:e}x{:e} per pixel)",
            self.zoom_level,
            self.matrix_width,
            self.matrix_height,
            self.tile_width,
            self.tile_height,
            self.pixel_size_x,
            self.pixel_size_y,
        )
    }
}
