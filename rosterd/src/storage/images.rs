//! Image processing for uploads: center-crop to square, resize, re-encode.

use std::io::Cursor;

use image::{DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};

use crate::errors::Error;

/// Target geometry and encoding quality for a processed image.
#[derive(Debug, Clone, Copy)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// Profile avatars: small square thumbnails.
pub const AVATAR: ImageSpec = ImageSpec {
    width: 200,
    height: 200,
    quality: 80,
};

/// Admin gallery photos: larger squares.
pub const ADMIN_PHOTO: ImageSpec = ImageSpec {
    width: 400,
    height: 400,
    quality: 85,
};

/// Decode, center-crop to a square, resize to the target geometry, and
/// encode as JPEG.
///
/// CPU-bound: callers should run this under `spawn_blocking`.
pub fn process_image(input: &[u8], spec: ImageSpec) -> Result<Vec<u8>, Error> {
    let img = image::load_from_memory(input).map_err(|e| Error::BadRequest {
        message: format!("Invalid image: {e}"),
    })?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(Error::BadRequest {
            message: "Invalid image: unable to read dimensions".to_string(),
        });
    }

    // Center crop to square, then scale to the target size
    let crop_size = width.min(height);
    let left = (width - crop_size) / 2;
    let top = (height - crop_size) / 2;

    let img = img
        .crop_imm(left, top, crop_size, crop_size)
        .resize_exact(spec.width, spec.height, FilterType::Lanczos3);

    // JPEG has no alpha channel; flatten before encoding
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), spec.quality);
    img.write_with_encoder(encoder).map_err(|e| Error::Internal {
        operation: format!("encode image: {e}"),
    })?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode fixture");
        bytes
    }

    #[test]
    fn test_landscape_becomes_square_avatar() {
        let input = png_fixture(300, 100);

        let output = process_image(&input, AVATAR).expect("processing should succeed");

        assert_eq!(image::guess_format(&output).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    #[test]
    fn test_portrait_becomes_square_photo() {
        let input = png_fixture(120, 500);

        let output = process_image(&input, ADMIN_PHOTO).expect("processing should succeed");

        let decoded = image::load_from_memory(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (400, 400));
    }

    #[test]
    fn test_garbage_input_rejected() {
        let err = process_image(b"definitely not an image", AVATAR).unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }
}
