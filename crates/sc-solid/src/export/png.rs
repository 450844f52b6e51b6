//! Raster export of the last presented frame.

use crate::error::ExportError;
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

pub const MULTIPLIERS: [u32; 3] = [1, 2, 3];

/// Scale `frame` by `multiplier` and encode it as PNG.
pub fn encode(frame: &RgbaImage, multiplier: u32) -> Result<Vec<u8>, ExportError> {
    if !MULTIPLIERS.contains(&multiplier) {
        return Err(ExportError::BadMultiplier(multiplier));
    }
    if frame.width() == 0 || frame.height() == 0 {
        return Err(ExportError::NoFrame);
    }

    let scaled;
    let image = if multiplier == 1 {
        frame
    } else {
        scaled = imageops::resize(frame, frame.width() * multiplier, frame.height() * multiplier, FilterType::Triangle);
        &scaled
    };

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| ExportError::Serialize(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn multiplier_scales_dimensions() {
        let frame = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        let bytes = encode(&frame, 3).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 9));
    }

    #[test]
    fn unsupported_multiplier_is_rejected() {
        let frame = RgbaImage::new(2, 2);
        assert_eq!(encode(&frame, 4), Err(ExportError::BadMultiplier(4)));
        assert_eq!(encode(&frame, 0), Err(ExportError::BadMultiplier(0)));
    }
}
