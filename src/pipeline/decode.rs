use std::path::Path;

use indicatif::ProgressBar;
use log::info;

use crate::error::{Error, Result};
use crate::qr;
use crate::video::{self, VideoSource};

/// Full decode pipeline, in memory: container bytes -> frames -> QR scans ->
/// payload.
pub fn decode_bytes(src: Vec<u8>) -> Result<Vec<u8>> {
    let mut source = VideoSource::bytes(src)?;
    decode_from(&mut source)
}

/// Full decode pipeline from a carrier file on disk.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let mut source = VideoSource::file(path.as_ref())?;
    decode_from(&mut source)
}

fn decode_from(source: &mut VideoSource) -> Result<Vec<u8>> {
    let progress = ProgressBar::new_spinner();
    let mut payload = Vec::new();

    // Scanner output is appended in frame arrival order; the decoder
    // guarantees presentation order, which is what makes this a plain
    // concatenation.
    let frames = video::decode_frames(source, |gray, width, height| {
        for piece in qr::scan_frame(gray, width, height) {
            payload.extend_from_slice(&piece);
        }
        progress.inc(1);
        Ok(())
    })?;
    progress.finish_and_clear();

    info!("recovered {} bytes from {} frames", payload.len(), frames);
    if frames > 0 && payload.is_empty() {
        return Err(Error::PayloadEmpty);
    }
    Ok(payload)
}
