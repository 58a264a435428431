use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt::Display;

/// Discriminants are the number of samples per pixel
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum ColorModel {
    Gray = 1,
    GrayAlpha = 2,
    Rgb = 3,
    Rgba = 4,

    #[num_enum(default)]
    Unknown = 0xFF,
}

impl ColorModel {
    pub fn samples(self) -> u16 {
        match self {
            ColorModel::Unknown => 0,
            known => u8::from(known) as u16,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SampleFormat {
    Unsigned,
    Float,
}

/// Sample layout of a raster buffer. Samples are interleaved and stored in
/// native byte order.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct PixelFormat {
    pub color_model: ColorModel,
    pub sample_format: SampleFormat,
    pub bits_per_sample: u16,
}

impl PixelFormat {
    pub const GRAY8: Self = Self::unsigned(ColorModel::Gray, 8);
    pub const GRAY_ALPHA8: Self = Self::unsigned(ColorModel::GrayAlpha, 8);
    pub const RGB8: Self = Self::unsigned(ColorModel::Rgb, 8);
    pub const RGBA8: Self = Self::unsigned(ColorModel::Rgba, 8);

    pub const fn unsigned(color_model: ColorModel, bits_per_sample: u16) -> Self {
        Self {
            color_model,
            sample_format: SampleFormat::Unsigned,
            bits_per_sample,
        }
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.color_model.samples() as u32 * self.bits_per_sample as u32
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel() as usize + 7) / 8
    }
}

impl Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}{}{}",
            self.color_model,
            self.bits_per_sample,
            match self.sample_format {
                SampleFormat::Float => "F",
                _ => "",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_model_from_channel_count() {
        assert_eq!(ColorModel::from(1), ColorModel::Gray);
        assert_eq!(ColorModel::from(4), ColorModel::Rgba);
        assert_eq!(ColorModel::from(7), ColorModel::Unknown);
        assert_eq!(ColorModel::Rgb.samples(), 3);
        assert_eq!(ColorModel::Unknown.samples(), 0);
    }

    #[test]
    fn pixel_sizes() {
        assert_eq!(PixelFormat::GRAY8.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::RGBA8.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::unsigned(ColorModel::Rgb, 16).bytes_per_pixel(), 6);
        assert_eq!(PixelFormat::RGB8.to_string(), "Rgb8");
    }
}
