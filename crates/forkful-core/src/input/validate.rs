//! Input validation before the image is decoded.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::AnalysisError;

/// Validates files before they are read into memory.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full load.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - Magic bytes belong to an accepted raster format
    pub fn validate(&self, path: &Path) -> Result<(), AnalysisError> {
        if !path.is_file() {
            return Err(AnalysisError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {e}"),
        })?;
        self.check_size(path, metadata.len())?;

        self.check_magic_bytes(path)
    }

    /// Reject byte counts above `limits.max_file_size_mb`.
    pub fn check_size(&self, path: &Path, len: u64) -> Result<(), AnalysisError> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if len > max_bytes {
            return Err(AnalysisError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: len.div_ceil(1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    /// Check the header of an in-memory buffer.
    pub fn check_header(&self, path: &Path, bytes: &[u8]) -> Result<(), AnalysisError> {
        let mut header = [0u8; 12];
        let n = bytes.len().min(12);
        header[..n].copy_from_slice(&bytes[..n]);
        self.check_format(path, &header, n)
    }

    fn check_magic_bytes(&self, path: &Path) -> Result<(), AnalysisError> {
        let mut file = std::fs::File::open(path).map_err(|e| AnalysisError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {e}"),
        })?;

        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);
        self.check_format(path, &header, bytes_read)
    }

    fn check_format(
        &self,
        path: &Path,
        header: &[u8; 12],
        bytes_read: usize,
    ) -> Result<(), AnalysisError> {
        if bytes_read < 4 {
            return Err(AnalysisError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        let Some(format) = Self::detect_format(header, bytes_read) else {
            return Err(AnalysisError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        };

        if !self.limits.is_supported(format) {
            return Err(AnalysisError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: format.to_string(),
            });
        }

        Ok(())
    }

    /// Identify the format from its magic bytes.
    fn detect_format(header: &[u8; 12], bytes_read: usize) -> Option<&'static str> {
        if bytes_read < 4 {
            return None;
        }

        // JPEG: FF D8 FF
        if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
            return Some("jpeg");
        }

        // PNG: 89 50 4E 47
        if header[..4] == [0x89, b'P', b'N', b'G'] {
            return Some("png");
        }

        // WebP: RIFF....WEBP
        if &header[..4] == b"RIFF" && bytes_read >= 12 && &header[8..12] == b"WEBP" {
            return Some("webp");
        }

        // GIF: GIF8
        if &header[..4] == b"GIF8" {
            return Some("gif");
        }

        // BMP: BM
        if &header[..2] == b"BM" {
            return Some("bmp");
        }

        // TIFF: II*\0 or MM\0*
        if header[..4] == [b'I', b'I', 0x2A, 0x00] || header[..4] == [b'M', b'M', 0x00, 0x2A] {
            return Some("tiff");
        }

        // HEIC/HEIF/AVIF: ftyp box at offset 4
        if bytes_read >= 12 && &header[4..8] == b"ftyp" {
            return Some("heic");
        }

        None
    }
}
