use super::{Raster, RasterError};

impl Raster {
    /// Copy `src` into this raster with its top-left corner at (x, y).
    ///
    /// Samples are copied verbatim so both rasters must share a pixel format.
    /// Parts of `src` falling outside this raster are clipped.
    pub fn set_rect(&mut self, x: i64, y: i64, src: &Raster) -> Result<(), RasterError> {
        if src.format != self.format {
            return Err(RasterError::FormatMismatch((src.format, self.format)));
        }
        let bytes_per_pixel = self.format.bytes_per_pixel();

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + src.width() as i64).min(self.width() as i64);
        let y1 = (y + src.height() as i64).min(self.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }
        let n = (x1 - x0) as usize * bytes_per_pixel;
        let dst_row_size = self.row_size();
        let src_row_size = src.row_size();

        for j in y0..y1 {
            let dst = j as usize * dst_row_size + x0 as usize * bytes_per_pixel;
            let src_start =
                (j - y) as usize * src_row_size + (x0 - x) as usize * bytes_per_pixel;
            self.buffer[dst..dst + n].copy_from_slice(&src.buffer[src_start..src_start + n]);
        }
        Ok(())
    }

    /// Draw `src` at (x, y), converting its pixels into this raster's format.
    pub fn draw(&mut self, x: i64, y: i64, src: &Raster) -> Result<(), RasterError> {
        if src.format == self.format {
            self.set_rect(x, y, src)
        } else {
            let converted = src.convert(self.format)?;
            self.set_rect(x, y, &converted)
        }
    }
}
