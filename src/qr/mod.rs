use log::warn;
use qrcodegen::{QrCode, QrCodeEcc, QrSegment, Version};

use crate::config::QR_VERSION;
use crate::error::{Error, Result};

/// Encode one payload chunk as a byte-mode QR code at ECC High, version
/// pinned to [`QR_VERSION`].
///
/// Fails only if the chunk exceeds the version's byte capacity, which means
/// the chunk size constant was misconfigured.
pub fn encode_chunk(chunk: &[u8]) -> Result<QrCode> {
    let segment = QrSegment::make_bytes(chunk);
    QrCode::encode_segments_advanced(
        &[segment],
        QrCodeEcc::High,
        Version::new(QR_VERSION),
        Version::new(QR_VERSION),
        None,
        true,
    )
    .map_err(|e| {
        Error::Config(format!(
            "chunk of {} bytes does not fit QR version {}: {e}",
            chunk.len(),
            QR_VERSION
        ))
    })
}

/// Scan a tightly-packed 8-bit grayscale image for QR codes and return the
/// recovered payloads in detection order.
///
/// Codes that are found but fail error correction are skipped; an empty
/// result is a valid outcome, not an error.
pub fn scan_frame(gray: &[u8], width: usize, height: usize) -> Vec<Vec<u8>> {
    debug_assert!(gray.len() >= width * height, "grayscale buffer too small");
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| gray[y * width + x]);
    let mut payloads = Vec::new();
    for grid in prepared.detect_grids() {
        let mut payload = Vec::new();
        match grid.decode_to(&mut payload) {
            Ok(_) => payloads.push(payload),
            Err(e) => warn!("QR candidate failed to decode: {e}"),
        }
    }
    payloads
}
