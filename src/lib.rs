//! Hide an arbitrary byte stream inside an ordinary video.
//!
//! The payload is cut into fixed-size chunks, each chunk becomes one QR
//! code, each code becomes one H.264 frame, and the frames are muxed into a
//! standard MP4 that plays anywhere. Decoding reverses every step: demux,
//! decode, scan each frame for a QR code, concatenate the recovered chunks.

pub mod chunker;
pub mod config;
mod error;
pub mod frame;
pub mod pipeline;
pub mod qr;
pub mod video;

pub use error::{Error, Result};
pub use pipeline::decode::{decode_bytes, decode_file};
pub use pipeline::encode::{encode_bytes, encode_file};
pub use pipeline::hook::{CarrierHook, NoopHook};
pub use pipeline::{roundtrip, RoundtripResult};
