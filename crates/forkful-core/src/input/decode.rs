//! Image loading with format detection, dimension limits, and timeout support.

use image::{ImageFormat, ImageReader};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use super::validate::Validator;
use crate::config::LimitsConfig;
use crate::error::AnalysisError;
use crate::types::FoodImage;

/// Loads images from disk or memory and enforces the configured limits.
pub struct ImageLoader {
    limits: LimitsConfig,
    validator: Validator,
}

impl ImageLoader {
    /// Create a new loader with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            limits,
        }
    }

    /// Validate and read an image file.
    pub async fn load(&self, path: &Path) -> Result<FoodImage, AnalysisError> {
        self.validator.validate(path)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AnalysisError::Decode {
                path: path.to_path_buf(),
                message: format!("Failed to read image: {e}"),
            })?;

        self.load_bytes(bytes, path).await
    }

    /// Validate an image that is already in memory (e.g. an upload).
    ///
    /// `path` is only used as a label in errors and output.
    pub async fn load_bytes(&self, bytes: Vec<u8>, path: &Path) -> Result<FoodImage, AnalysisError> {
        self.validator.check_size(path, bytes.len() as u64)?;
        self.validator.check_header(path, &bytes)?;

        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let probe = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || {
                let probed = Self::probe_sync(&bytes, &path_owned);
                probed.map(|(format, width, height)| (bytes, format, width, height))
            }),
        )
        .await;

        let (bytes, format, width, height) = match probe {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(AnalysisError::Decode {
                    path: path.to_path_buf(),
                    message: format!("Task join error: {e}"),
                })
            }
            Err(_) => {
                return Err(AnalysisError::Timeout {
                    path: path.to_path_buf(),
                    timeout_ms: self.limits.decode_timeout_ms,
                })
            }
        };

        let format = format_to_string(format);
        if !self.limits.is_supported(&format) {
            return Err(AnalysisError::UnsupportedFormat {
                path: path.to_path_buf(),
                format,
            });
        }

        let image = FoodImage {
            path: path.to_path_buf(),
            bytes,
            format,
            width,
            height,
        };
        check_pixel_ceiling(&image, self.limits.max_pixels)?;

        tracing::debug!(
            "Loaded {} ({}x{} {}, {} bytes)",
            image.file_name(),
            image.width,
            image.height,
            image.format,
            image.file_size()
        );
        Ok(image)
    }

    /// Detect the format from content and read dimensions from the header.
    fn probe_sync(bytes: &[u8], path: &Path) -> Result<(ImageFormat, u32, u32), AnalysisError> {
        use std::io::Cursor;

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| AnalysisError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {e}"),
            })?;

        let format = reader.format().ok_or_else(|| AnalysisError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?;

        let (width, height) = reader.into_dimensions().map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok((format, width, height))
    }
}

/// Reject images whose pixel count exceeds `max_pixels`.
pub fn check_pixel_ceiling(image: &FoodImage, max_pixels: u64) -> Result<(), AnalysisError> {
    let pixels = image.pixels();
    if pixels > max_pixels {
        return Err(AnalysisError::ImageTooLarge {
            path: image.path.clone(),
            width: image.width,
            height: image.height,
            pixels,
            max_pixels,
        });
    }
    Ok(())
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::test_png;

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[tokio::test]
    async fn test_load_bytes_reads_dimensions() {
        let loader = ImageLoader::new(LimitsConfig::default());
        let image = loader
            .load_bytes(test_png(32, 16), Path::new("plate.png"))
            .await
            .unwrap();
        assert_eq!(image.format, "png");
        assert_eq!((image.width, image.height), (32, 16));
        assert_eq!(image.file_name(), "plate.png");
    }

    #[tokio::test]
    async fn test_format_detected_by_content() {
        // PNG bytes saved under a .jpg name are still PNG
        let dir = tempfile::tempdir().unwrap();
        let misnamed = dir.path().join("misnamed.jpg");
        std::fs::write(&misnamed, test_png(8, 8)).unwrap();

        let loader = ImageLoader::new(LimitsConfig::default());
        let image = loader.load(&misnamed).await.unwrap();
        assert_eq!(image.format, "png");
    }

    #[tokio::test]
    async fn test_pixel_ceiling_rejects_oversized() {
        let mut limits = LimitsConfig::default();
        limits.max_pixels = 100;
        let loader = ImageLoader::new(limits);

        let ok = loader.load_bytes(test_png(10, 10), Path::new("ok.png")).await;
        assert!(ok.is_ok());

        let err = loader
            .load_bytes(test_png(11, 10), Path::new("big.png"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::ImageTooLarge {
                pixels: 110,
                max_pixels: 100,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_truncated_image_rejected() {
        let mut bytes = test_png(4, 4);
        bytes.truncate(10);
        let loader = ImageLoader::new(LimitsConfig::default());
        let err = loader
            .load_bytes(bytes, Path::new("broken.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_png_rejected_when_not_supported() {
        let mut limits = LimitsConfig::default();
        limits.supported_formats = vec!["jpeg".to_string(), "jpg".to_string()];
        let loader = ImageLoader::new(limits);
        let err = loader
            .load_bytes(test_png(4, 4), Path::new("plate.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFormat { .. }));
    }
}
