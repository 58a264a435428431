use super::{ColorModel, PixelFormat, RasterError, SampleFormat};
use crate::raster::Raster;
use image::{DynamicImage, ImageBuffer};

impl TryInto<DynamicImage> for Raster {
    type Error = RasterError;

    fn try_into(self) -> Result<DynamicImage, Self::Error> {
        let Raster {
            dimensions: (width, height),
            buffer,
            format,
        } = self;

        let unsupported = || RasterError::NotSupported(format!("No image equivalent for {format}"));
        match (
            format.color_model,
            format.sample_format,
            format.bits_per_sample,
        ) {
            (ColorModel::Gray, SampleFormat::Unsigned, 8) => {
                ImageBuffer::from_raw(width, height, buffer).map(DynamicImage::ImageLuma8)
            }
            (ColorModel::GrayAlpha, SampleFormat::Unsigned, 8) => {
                ImageBuffer::from_raw(width, height, buffer).map(DynamicImage::ImageLumaA8)
            }
            (ColorModel::Rgb, SampleFormat::Unsigned, 8) => {
                ImageBuffer::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8)
            }
            (ColorModel::Rgba, SampleFormat::Unsigned, 8) => {
                ImageBuffer::from_raw(width, height, buffer).map(DynamicImage::ImageRgba8)
            }
            (ColorModel::Gray, SampleFormat::Unsigned, 16) => {
                ImageBuffer::from_raw(width, height, decode_u16(&buffer))
                    .map(DynamicImage::ImageLuma16)
            }
            (ColorModel::GrayAlpha, SampleFormat::Unsigned, 16) => {
                ImageBuffer::from_raw(width, height, decode_u16(&buffer))
                    .map(DynamicImage::ImageLumaA16)
            }
            (ColorModel::Rgb, SampleFormat::Unsigned, 16) => {
                ImageBuffer::from_raw(width, height, decode_u16(&buffer))
                    .map(DynamicImage::ImageRgb16)
            }
            (ColorModel::Rgba, SampleFormat::Unsigned, 16) => {
                ImageBuffer::from_raw(width, height, decode_u16(&buffer))
                    .map(DynamicImage::ImageRgba16)
            }
            (ColorModel::Rgb, SampleFormat::Float, 32) => {
                ImageBuffer::from_raw(width, height, decode_f32(&buffer))
                    .map(DynamicImage::ImageRgb32F)
            }
            (ColorModel::Rgba, SampleFormat::Float, 32) => {
                ImageBuffer::from_raw(width, height, decode_f32(&buffer))
                    .map(DynamicImage::ImageRgba32F)
            }
            _ => return Err(unsupported()),
        }
        .ok_or_else(unsupported)
    }
}

impl Raster {
    pub fn into_image(self) -> Result<DynamicImage, RasterError> {
        self.try_into()
    }

    pub fn from_image(img: &DynamicImage) -> Result<Self, RasterError> {
        let dimensions = (img.width(), img.height());
        let buffer = img.as_bytes().to_vec();

        let color = img.color();
        let channels = color.channel_count();
        let color_model = ColorModel::from(channels);
        let bits_per_sample = color.bits_per_pixel() / channels.max(1) as u16;
        let format = match img {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => PixelFormat {
                color_model,
                sample_format: SampleFormat::Float,
                bits_per_sample,
            },
            _ => PixelFormat::unsigned(color_model, bits_per_sample),
        };
        if color_model == ColorModel::Unknown {
            return Err(RasterError::NotSupported(format!("Image color type {color:?}")));
        }

        Self::new(dimensions, buffer, format)
    }

    /// Copy of this raster with every pixel converted to `format`.
    pub fn convert(&self, format: PixelFormat) -> Result<Self, RasterError> {
        if self.format == format {
            return Ok(self.clone());
        }
        let img: DynamicImage = self.clone().try_into()?;
        let converted = match (
            format.color_model,
            format.sample_format,
            format.bits_per_sample,
        ) {
            (ColorModel::Gray, SampleFormat::Unsigned, 8) => DynamicImage::from(img.to_luma8()),
            (ColorModel::GrayAlpha, SampleFormat::Unsigned, 8) => {
                DynamicImage::from(img.to_luma_alpha8())
            }
            (ColorModel::Rgb, SampleFormat::Unsigned, 8) => DynamicImage::from(img.to_rgb8()),
            (ColorModel::Rgba, SampleFormat::Unsigned, 8) => DynamicImage::from(img.to_rgba8()),
            (ColorModel::Gray, SampleFormat::Unsigned, 16) => DynamicImage::from(img.to_luma16()),
            (ColorModel::GrayAlpha, SampleFormat::Unsigned, 16) => {
                DynamicImage::from(img.to_luma_alpha16())
            }
            (ColorModel::Rgb, SampleFormat::Unsigned, 16) => DynamicImage::from(img.to_rgb16()),
            (ColorModel::Rgba, SampleFormat::Unsigned, 16) => DynamicImage::from(img.to_rgba16()),
            (ColorModel::Rgb, SampleFormat::Float, 32) => DynamicImage::from(img.to_rgb32f()),
            (ColorModel::Rgba, SampleFormat::Float, 32) => DynamicImage::from(img.to_rgba32f()),
            _ => {
                return Err(RasterError::NotSupported(format!(
                    "Conversion to {format}"
                )))
            }
        };
        Self::from_image(&converted)
    }
}

fn decode_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|b| u16::from_ne_bytes([b[0], b[1]]))
        .collect()
}

fn decode_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
