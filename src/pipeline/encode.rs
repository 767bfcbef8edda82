use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::chunker;
use crate::config::chunk_count;
use crate::error::Result;
use crate::qr;
use crate::video::{VideoEncoder, VideoSink};

/// Full encode pipeline, in memory: payload -> chunks -> QR codes -> frames
/// -> container bytes.
pub fn encode_bytes(src: &[u8]) -> Result<Vec<u8>> {
    let mut sink = VideoSink::buffer()?;
    encode_into(&mut sink, src)?;
    sink.into_bytes()
}

/// Full encode pipeline to a carrier file on disk.
pub fn encode_file(path: impl AsRef<Path>, src: &[u8]) -> Result<()> {
    let mut sink = VideoSink::file(path.as_ref())?;
    encode_into(&mut sink, src)
}

fn encode_into(sink: &mut VideoSink, src: &[u8]) -> Result<()> {
    let total = chunk_count(src.len());
    info!("splitting {} payload bytes into {} QR frames", src.len(), total);

    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} chunks ({eta})")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut codes = Vec::with_capacity(total);
    for chunk in chunker::chunk_payload(src) {
        codes.push(qr::encode_chunk(chunk)?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    VideoEncoder::new().encode(sink, &codes)?;
    info!("encode complete");
    Ok(())
}
