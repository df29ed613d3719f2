//! JPEG and PNG optimization.

use super::fast_decode::FastDecoder;
use super::fast_resize::FastResizer;
use super::quantize::quantize;
use super::{output_path_for, read_input, write_output, Optimized, Optimizer};
use crate::core::scanner::{AssetFormat, AssetKind};
use crate::error::ProcessError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Settings consumed by the image optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSettings {
    /// Default quality for JPEG and PNG (1-100)
    pub quality: u8,
    /// JPEG-specific quality, overrides `quality` when non-zero
    pub jpeg_quality: u8,
    /// PNG-specific quality, overrides `quality` when non-zero
    pub png_quality: u8,
    /// Resize to this width in pixels (0 = keep size)
    pub width: u32,
    /// Also write a lossless WebP copy next to each output
    pub webp: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            quality: 80,
            jpeg_quality: 0,
            png_quality: 0,
            width: 0,
            webp: false,
        }
    }
}

impl ImageSettings {
    /// Effective quality for a format, clamped to 1-100
    pub fn quality_for(&self, format: AssetFormat) -> u8 {
        let specific = match format {
            AssetFormat::Jpeg => self.jpeg_quality,
            AssetFormat::Png => self.png_quality,
            AssetFormat::Svg => 0,
        };
        let quality = if specific > 0 { specific } else { self.quality };
        quality.clamp(1, 100)
    }
}

/// Re-encodes JPEGs at the configured quality and palette-quantizes PNGs
#[derive(Debug, Clone)]
pub struct ImageOptimizer {
    settings: ImageSettings,
}

impl ImageOptimizer {
    pub fn new(settings: ImageSettings) -> Self {
        Self { settings }
    }

    fn encode(
        &self,
        path: &Path,
        image: &DynamicImage,
        format: AssetFormat,
    ) -> Result<Vec<u8>, ProcessError> {
        let quality = self.settings.quality_for(format);
        let mut buffer = Vec::new();

        let result = match format {
            AssetFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
                DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
            }
            AssetFormat::Png => {
                let quantized = DynamicImage::ImageRgba8(quantize(image, quality));
                let output = if image.color().has_alpha() {
                    quantized
                } else {
                    DynamicImage::ImageRgb8(quantized.to_rgb8())
                };
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                output.write_with_encoder(encoder)
            }
            AssetFormat::Svg => {
                return Err(ProcessError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        result.map_err(|e| ProcessError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(buffer)
    }

    fn encode_webp(&self, path: &Path, image: &DynamicImage) -> Result<Vec<u8>, ProcessError> {
        let mut buffer = Vec::new();
        let encoder = WebPEncoder::new_lossless(&mut buffer);
        DynamicImage::ImageRgba8(image.to_rgba8())
            .write_with_encoder(encoder)
            .map_err(|e| ProcessError::Encode {
                path: path.to_path_buf(),
                reason: format!("WebP: {}", e),
            })?;
        Ok(buffer)
    }
}

impl Optimizer for ImageOptimizer {
    fn kind(&self) -> AssetKind {
        AssetKind::Image
    }

    fn optimize(
        &self,
        path: &Path,
        output_dir: &Path,
        dry_run: bool,
    ) -> Result<Optimized, ProcessError> {
        let format = AssetFormat::from_path(path)
            .filter(|format| format.kind() == AssetKind::Image)
            .ok_or_else(|| ProcessError::UnsupportedFormat {
                path: path.to_path_buf(),
            })?;

        let original = read_input(path)?;
        let mut image = FastDecoder::decode(path, &original, format)?;

        if self.settings.width > 0 {
            image = FastResizer::new().resize_to_width(path, &image, self.settings.width)?;
        }

        let encoded = self.encode(path, &image, format)?;
        let output_path = output_path_for(path, output_dir)?;

        if !dry_run {
            write_output(&output_path, &encoded)?;
        }

        let webp_path = if self.settings.webp {
            let webp = self.encode_webp(path, &image)?;
            let webp_path = output_path.with_extension("webp");
            if !dry_run {
                write_output(&webp_path, &webp)?;
            }
            Some(webp_path)
        } else {
            None
        };

        debug!(
            path = %path.display(),
            %format,
            before = original.len(),
            after = encoded.len(),
            "optimized image"
        );

        Ok(Optimized {
            original_size: original.len() as u64,
            processed_size: encoded.len() as u64,
            output_path,
            webp_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_image(dir: &Path, name: &str, format: image::ImageFormat) -> PathBuf {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 32, |x, y| {
            Rgb([(x * 4) as u8, (y * 8) as u8, ((x + y) * 2) as u8])
        }));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn format_specific_quality_overrides_default() {
        let settings = ImageSettings {
            quality: 70,
            jpeg_quality: 40,
            ..Default::default()
        };
        assert_eq!(settings.quality_for(AssetFormat::Jpeg), 40);
        assert_eq!(settings.quality_for(AssetFormat::Png), 70);
    }

    #[test]
    fn quality_is_clamped() {
        let settings = ImageSettings {
            quality: 0,
            png_quality: 200,
            ..Default::default()
        };
        assert_eq!(settings.quality_for(AssetFormat::Jpeg), 1);
        assert_eq!(settings.quality_for(AssetFormat::Png), 100);
    }

    #[test]
    fn reencodes_jpeg_and_writes_output() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = write_image(input.path(), "photo.jpg", image::ImageFormat::Jpeg);

        let result = ImageOptimizer::new(ImageSettings::default())
            .optimize(&path, output.path(), false)
            .unwrap();

        assert_eq!(result.output_path, output.path().join("photo.jpg"));
        assert_eq!(
            fs::metadata(&result.output_path).unwrap().len(),
            result.processed_size
        );
        let decoded = image::open(&result.output_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn quantizes_png_and_keeps_dimensions() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = write_image(input.path(), "chart.png", image::ImageFormat::Png);

        let result = ImageOptimizer::new(ImageSettings::default())
            .optimize(&path, output.path(), false)
            .unwrap();

        let decoded = image::open(&result.output_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn png_alpha_is_preserved() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(8, 8, |x, _| {
            Rgba([255, 0, 0, (x * 32) as u8])
        }));
        let path = input.path().join("fade.png");
        img.save(&path).unwrap();

        let result = ImageOptimizer::new(ImageSettings::default())
            .optimize(&path, output.path(), false)
            .unwrap();

        let decoded = image::open(&result.output_path).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 0).0[3], 96);
    }

    #[test]
    fn resizes_to_width() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = write_image(input.path(), "wide.png", image::ImageFormat::Png);

        let settings = ImageSettings {
            width: 16,
            ..Default::default()
        };
        let result = ImageOptimizer::new(settings)
            .optimize(&path, output.path(), false)
            .unwrap();

        let decoded = image::open(&result.output_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn writes_webp_sibling() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = write_image(input.path(), "photo.jpg", image::ImageFormat::Jpeg);

        let settings = ImageSettings {
            webp: true,
            ..Default::default()
        };
        let result = ImageOptimizer::new(settings)
            .optimize(&path, output.path(), false)
            .unwrap();

        let webp_path = result.webp_path.unwrap();
        assert_eq!(webp_path, output.path().join("photo.webp"));
        assert!(webp_path.exists());
    }

    #[test]
    fn dry_run_computes_sizes_without_writing() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = write_image(input.path(), "photo.jpg", image::ImageFormat::Jpeg);

        let result = ImageOptimizer::new(ImageSettings::default())
            .optimize(&path, output.path(), true)
            .unwrap();

        assert!(result.processed_size > 0);
        assert!(!result.output_path.exists());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
    }

    #[test]
    fn corrupt_image_is_a_decode_error() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = input.path().join("corrupt.png");
        fs::write(&path, b"fake png").unwrap();

        let result = ImageOptimizer::new(ImageSettings::default()).optimize(&path, output.path(), false);

        assert!(matches!(result, Err(ProcessError::Decode { .. })));
        assert!(!output.path().join("corrupt.png").exists());
    }

    #[test]
    fn svg_is_rejected() {
        let output = TempDir::new().unwrap();
        let result = ImageOptimizer::new(ImageSettings::default()).optimize(
            Path::new("/in/logo.svg"),
            output.path(),
            true,
        );
        assert!(matches!(result, Err(ProcessError::UnsupportedFormat { .. })));
    }
}
