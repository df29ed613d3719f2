//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG files (1.5-2x faster than image crate),
//! falls back to image crate for PNG and anything zune-jpeg rejects.

use crate::core::scanner::AssetFormat;
use crate::error::ProcessError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Fast image decoder that uses optimized decoders per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode already-read file bytes using the fastest available decoder.
    ///
    /// `path` is only used for error messages.
    pub fn decode(
        path: &Path,
        bytes: &[u8],
        format: AssetFormat,
    ) -> Result<DynamicImage, ProcessError> {
        match format {
            AssetFormat::Jpeg => Self::decode_jpeg(path, bytes)
                .or_else(|_| Self::decode_fallback(path, bytes, image::ImageFormat::Jpeg)),
            AssetFormat::Png => Self::decode_fallback(path, bytes, image::ImageFormat::Png),
            AssetFormat::Svg => Err(ProcessError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(path: &Path, bytes: &[u8]) -> Result<DynamicImage, ProcessError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| ProcessError::Decode {
            path: path.to_path_buf(),
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| ProcessError::Decode {
            path: path.to_path_buf(),
            reason: "Failed to get image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;

        let buffer_error = |kind: &str| ProcessError::Decode {
            path: path.to_path_buf(),
            reason: format!("Failed to create {} buffer", kind),
        };

        // The decoder may not honour the requested colorspace (e.g. grayscale sources)
        let image = match decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB) {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGB"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("RGBA"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| buffer_error("Luma"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(path, bytes, image::ImageFormat::Jpeg),
        };

        Ok(image)
    }

    /// Fallback to the image crate
    fn decode_fallback(
        path: &Path,
        bytes: &[u8],
        format: image::ImageFormat,
    ) -> Result<DynamicImage, ProcessError> {
        image::load_from_memory_with_format(bytes, format).map_err(|e| ProcessError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
