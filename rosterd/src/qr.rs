//! Invite acceptance URLs and QR rendering.
//!
//! The QR payload is just the acceptance URL; anything that can scan a code
//! and open a browser can onboard. Rendering is SVG so the admin UI can embed
//! it at any size without a raster round-trip.

use qrcode::{QrCode, render::svg};
use url::Url;

use crate::errors::Error;

/// Build the acceptance URL for an invite token.
///
/// The token is treated as an opaque string; it is URL-safe by construction
/// (base64url alphabet) so it goes into the query string verbatim.
pub fn invite_url(public_url: &Url, token: &str) -> String {
    let mut url = public_url.clone();
    url.set_path("/invite/accept");
    url.set_query(Some(&format!("token={token}")));
    url.to_string()
}

/// Render data as an SVG QR code.
pub fn qr_svg(data: &str) -> Result<String, Error> {
    let code = QrCode::new(data).map_err(|e| Error::Internal {
        operation: format!("generate QR code: {e}"),
    })?;

    let image = code
        .render::<svg::Color>()
        .min_dimensions(256, 256)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();

    Ok(image)
}
