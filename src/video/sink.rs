//! Where the encoded carrier goes: a file on disk or a growable in-memory
//! buffer.
//!
//! Both variants hand the muxer the same opaque container context. The
//! in-memory variant backs the muxer's custom I/O callbacks with a shared
//! cursor buffer; MP4 muxers seek backwards to patch header fields after the
//! fact, so the buffer supports full POSIX seek semantics plus libav's
//! size query.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rsmpeg::avformat::{AVFormatContextOutput, AVIOContextContainer, AVIOContextCustom};
use rsmpeg::avutil::AVMem;
use rsmpeg::ffi;

use super::{c_string, SEEK_CUR, SEEK_END, SEEK_SET};
use crate::config::{AVIO_BUFFER_SIZE, VIDEO_FORMAT};
use crate::error::{Error, Result};

/// Growable byte buffer with a write cursor, shared between the sink and the
/// muxer's I/O callbacks.
#[derive(Default)]
struct SharedBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl SharedBuffer {
    /// Write at the cursor, zero-extending first when the cursor was seeked
    /// past the current end.
    fn write(&mut self, buf: &[u8]) -> i32 {
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        buf.len() as i32
    }

    /// POSIX seek within (or past) the written range; `AVSEEK_SIZE` answers
    /// the muxer's length query without moving the cursor.
    fn seek(&mut self, offset: i64, whence: i32) -> i64 {
        if whence & ffi::AVSEEK_SIZE as i32 != 0 {
            return self.data.len() as i64;
        }
        let base = match whence & !(ffi::AVSEEK_FORCE as i32) {
            SEEK_SET => 0,
            SEEK_CUR => self.pos as i64,
            SEEK_END => self.data.len() as i64,
            _ => return -1,
        };
        let target = base + offset;
        if target < 0 {
            return -1;
        }
        self.pos = target as usize;
        target
    }
}

/// An open container output: either a file the muxer writes directly, or an
/// in-memory buffer collected with [`VideoSink::into_bytes`].
pub struct VideoSink {
    format: AVFormatContextOutput,
    buffer: Option<Arc<Mutex<SharedBuffer>>>,
}

impl VideoSink {
    /// Open a file-backed sink. The parent directory must already exist and
    /// be writable; the muxer owns the file handle until the sink is
    /// dropped.
    pub fn file(path: &Path) -> Result<Self> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let meta = fs::metadata(parent)?;
        if meta.permissions().readonly() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot write to {}", parent.display()),
            )));
        }
        let c_path = c_string(&path.to_string_lossy())?;
        let format = AVFormatContextOutput::create(&c_path, None).map_err(|e| {
            Error::Container(format!("could not open container at {}: {e}", path.display()))
        })?;
        Ok(Self {
            format,
            buffer: None,
        })
    }

    /// Open an in-memory sink for the configured container format.
    pub fn buffer() -> Result<Self> {
        let shared = Arc::new(Mutex::new(SharedBuffer::default()));
        let write_state = Arc::clone(&shared);
        let seek_state = Arc::clone(&shared);
        let io_context = AVIOContextCustom::alloc_context(
            AVMem::new(AVIO_BUFFER_SIZE),
            true,
            vec![],
            None,
            Some(Box::new(move |_, buf: &[u8]| {
                write_state.lock().unwrap().write(buf)
            })),
            Some(Box::new(move |_, offset: i64, whence: i32| {
                seek_state.lock().unwrap().seek(offset, whence)
            })),
        );
        // The muxer is picked from this synthetic name, the way it would be
        // from a real output path.
        let name = c_string(&format!("stream.{VIDEO_FORMAT}"))?;
        let format =
            AVFormatContextOutput::create(&name, Some(AVIOContextContainer::Custom(io_context)))
                .map_err(|e| {
                    Error::Container(format!("could not open {VIDEO_FORMAT} muxer: {e}"))
                })?;
        Ok(Self {
            format,
            buffer: Some(shared),
        })
    }

    pub(crate) fn format_mut(&mut self) -> &mut AVFormatContextOutput {
        &mut self.format
    }

    /// Tear down the container context and return the bytes it produced.
    /// Only valid for buffer-backed sinks, and only after the trailer was
    /// written.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let Self { format, buffer } = self;
        // The I/O context (and its handles on the buffer) must go before the
        // buffer is reclaimed.
        drop(format);
        let shared = buffer.ok_or_else(|| {
            Error::Config("file-backed sink holds no in-memory bytes".to_string())
        })?;
        let shared = Arc::try_unwrap(shared)
            .map_err(|_| Error::Config("sink buffer is still referenced".to_string()))?;
        let inner = shared.into_inner().unwrap_or_else(|poison| poison.into_inner());
        Ok(inner.data)
    }
}
