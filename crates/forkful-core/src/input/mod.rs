//! Input handling: validating and loading the food photo.
//!
//! Every check here runs before a provider is contacted:
//!
//! ```text
//! File → Validate (exists, size, magic bytes) → Probe (format, dimensions) → Pixel ceiling
//! ```

mod decode;
mod validate;

pub use decode::{check_pixel_ceiling, format_to_string, ImageLoader};
pub use validate::Validator;

/// Encode a solid-colour PNG of the given size for tests.
#[cfg(test)]
pub(crate) fn test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
