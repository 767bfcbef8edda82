use thiserror::Error;

/// Errors surfaced by the encode and decode pipelines.
///
/// A frame the QR scanner cannot decode is deliberately *not* represented
/// here: it contributes zero recovered bytes and the pipeline moves on.
#[derive(Error, Debug)]
pub enum Error {
    /// Impossible configuration: missing codec on the host, a chunk that
    /// exceeds the pinned QR version's capacity, and the like.
    #[error("configuration error: {0}")]
    Config(String),

    /// File or directory failure around the carrier.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed container, failed stream probe, missing video stream or
    /// decoder.
    #[error("container error: {0}")]
    Container(String),

    /// Mid-stream failure inside the encoder or decoder.
    #[error("codec error: {0}")]
    Codec(#[from] rsmpeg::error::RsmpegError),

    /// Decode ran to completion and saw video frames, but recovered no
    /// payload bytes.
    #[error("decode completed but recovered no payload bytes")]
    PayloadEmpty,
}

pub type Result<T> = std::result::Result<T, Error>;
