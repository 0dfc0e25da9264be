//! End-to-end tests driving the full router through axum-test.

mod auth;
mod invites;
mod profiles;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};

/// A small valid PNG for upload tests.
pub(crate) fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 64]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode fixture");
    bytes
}
