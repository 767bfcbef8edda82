//! Where the encoded carrier comes from: a file on disk or an in-memory
//! byte span, behind the same probed container context.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rsmpeg::avformat::{AVFormatContextInput, AVIOContextContainer, AVIOContextCustom};
use rsmpeg::avutil::AVMem;
use rsmpeg::ffi;

use super::{c_string, SEEK_CUR, SEEK_END, SEEK_SET};
use crate::config::AVIO_BUFFER_SIZE;
use crate::error::{Error, Result};

/// Read cursor over the carrier bytes, shared with the demuxer's callbacks.
struct MemoryCursor {
    data: Vec<u8>,
    pos: usize,
}

impl MemoryCursor {
    fn read(&mut self, buf: &mut [u8]) -> i32 {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 {
            return ffi::AVERROR_EOF;
        }
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n as i32
    }

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
        if target < 0 || target > self.data.len() as i64 {
            return -1;
        }
        self.pos = target as usize;
        target
    }
}

/// An open container input with its stream info already probed.
pub struct VideoSource {
    format: AVFormatContextInput,
}

impl VideoSource {
    /// Open a file-backed source. Missing files are reported before libav is
    /// ever involved.
    pub fn file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("carrier file {} does not exist", path.display()),
            )));
        }
        let c_path = c_string(&path.to_string_lossy())?;
        let format = AVFormatContextInput::open(&c_path, None, &mut None).map_err(|e| {
            Error::Container(format!("could not open carrier {}: {e}", path.display()))
        })?;
        Ok(Self { format })
    }

    /// Open a source over in-memory carrier bytes.
    pub fn bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Arc::new(Mutex::new(MemoryCursor { data, pos: 0 }));
        let read_state = Arc::clone(&cursor);
        let seek_state = Arc::clone(&cursor);
        let io_context = AVIOContextCustom::alloc_context(
            AVMem::new(AVIO_BUFFER_SIZE),
            false,
            vec![],
            Some(Box::new(move |_, buf: &mut [u8]| {
                read_state.lock().unwrap().read(buf)
            })),
            None,
            Some(Box::new(move |_, offset: i64, whence: i32| {
                seek_state.lock().unwrap().seek(offset, whence)
            })),
        );
        let format = AVFormatContextInput::from_io_context(AVIOContextContainer::Custom(
            io_context,
        ))
        .map_err(|e| Error::Container(format!("could not probe in-memory carrier: {e}")))?;
        Ok(Self { format })
    }

    pub(crate) fn format_mut(&mut self) -> &mut AVFormatContextInput {
        &mut self.format
    }
}
