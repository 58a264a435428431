use std::fmt::Display;

mod format;
mod image;
mod ops;

pub use format::{ColorModel, PixelFormat, SampleFormat};

#[derive(Debug)]
pub enum RasterError {
    BufferSize((usize, (u32, u32), PixelFormat)),
    FormatMismatch((PixelFormat, PixelFormat)),
    NotSupported(String),
}

/// Interleaved pixel buffer with its own format descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    pub dimensions: (u32, u32),
    pub buffer: Vec<u8>,
    pub format: PixelFormat,
}

impl Raster {
    pub fn new(
        dimensions: (u32, u32),
        buffer: Vec<u8>,
        format: PixelFormat,
    ) -> Result<Self, RasterError> {
        if format.bits_per_pixel() % 8 != 0 || format.bits_per_pixel() == 0 {
            return Err(RasterError::NotSupported(format!(
                "Pixel is not byte aligned: {format}"
            )));
        }
        let required_bytes = Self::required_bytes(dimensions, &format);
        if buffer.len() != required_bytes {
            Err(RasterError::BufferSize((buffer.len(), dimensions, format)))
        } else {
            Ok(Self {
                dimensions,
                buffer,
                format,
            })
        }
    }

    /// Zero-filled raster: black, and fully transparent when the format has alpha
    pub fn blank(dimensions: (u32, u32), format: PixelFormat) -> Self {
        let buffer = vec![0; Self::required_bytes(dimensions, &format)];
        Self {
            dimensions,
            buffer,
            format,
        }
    }

    fn required_bytes(dimensions: (u32, u32), format: &PixelFormat) -> usize {
        dimensions.0 as usize * dimensions.1 as usize * format.bytes_per_pixel()
    }

    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    pub fn height(&self) -> u32 {
        self.dimensions.1
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.dimensions.0 || y >= self.dimensions.1 {
            return None;
        }
        let start = self.pixel_offset(x, y);
        Some(&self.buffer[start..start + self.format.bytes_per_pixel()])
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: &[u8]) -> Result<(), String> {
        if x >= self.dimensions.0 || y >= self.dimensions.1 {
            return Err("Bad pixel index".into());
        }
        let n = self.format.bytes_per_pixel();
        if pixel.len() != n {
            return Err("Bad pixel size".into());
        }
        let start = self.pixel_offset(x, y);
        self.buffer[start..start + n].copy_from_slice(pixel);
        Ok(())
    }

    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.row_size() + x as usize * self.format.bytes_per_pixel()
    }

    pub fn row_size(&self) -> usize {
        self.dimensions.0 as usize * self.format.bytes_per_pixel()
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.iter().all(|b| *b == 0)
    }
}

impl Display for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Raster({}x{}, {}, {}Bytes)",
            self.dimensions.0,
            self.dimensions.1,
            self.format,
            self.buffer.len(),
        )
    }
}
