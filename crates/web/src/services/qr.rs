//! Storefront QR codes, rendered server-side as SVG.

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

/// Minimum edge length of the rendered code, in pixels.
const QR_MIN_SIZE: u32 = 240;

/// The URL could not be encoded.
#[derive(Debug, Error)]
#[error("QR encoding failed: {0}")]
pub struct QrError(#[from] qrcode::types::QrError);

/// Render a QR code pointing at a storefront URL.
///
/// Medium error correction keeps the code readable when printed small.
///
/// # Errors
///
/// Returns `QrError` if the URL is too long for any QR version.
pub fn storefront_qr_svg(url: &str) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)?;
    Ok(code
        .render()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .dark_color(svg::Color("#09090b"))
        .light_color(svg::Color("#ffffff"))
        .build())
}
