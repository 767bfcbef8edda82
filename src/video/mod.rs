pub mod decoder;
pub mod encoder;
pub mod sink;
pub mod source;

pub use decoder::decode_frames;
pub use encoder::VideoEncoder;
pub use sink::VideoSink;
pub use source::VideoSource;

// POSIX whence values as libav passes them to custom I/O callbacks.
pub(crate) const SEEK_SET: i32 = 0;
pub(crate) const SEEK_CUR: i32 = 1;
pub(crate) const SEEK_END: i32 = 2;

pub(crate) fn c_string(s: &str) -> crate::Result<std::ffi::CString> {
    std::ffi::CString::new(s)
        .map_err(|_| crate::Error::Config(format!("path contains an interior NUL: {s:?}")))
}
