// QR parameters. The version is pinned on both ends of the allowed range so
// every code in a run has the same module count; frame geometry depends on
// it. Version 20 at ECC High holds 382 bytes, CHUNK_SIZE must stay below.
pub const CHUNK_SIZE: usize = 100;
pub const QR_VERSION: u8 = 20;
pub const SCALE: usize = 4;
pub const BORDER: usize = 4;

// Carrier parameters
pub const FPS: i32 = 30;
pub const GOP_SIZE: i32 = 12;
pub const BIT_RATE: i64 = 400_000;
pub const VIDEO_FORMAT: &str = "mp4";

// Scratch buffer size for custom container I/O
pub const AVIO_BUFFER_SIZE: usize = 4096;

/// Module side length of a version-`QR_VERSION` code.
pub const fn qr_side() -> usize {
    4 * QR_VERSION as usize + 17
}

/// Pixel side length of an output frame: scaled modules plus the quiet zone,
/// rounded up to even (4:2:0 chroma planes are half-resolution).
pub const fn frame_side() -> usize {
    let side = qr_side() * SCALE + 2 * BORDER;
    if side % 2 == 0 {
        side
    } else {
        side + 1
    }
}

/// Number of chunks (= QR codes = video frames) a payload of `len` bytes
/// produces.
pub const fn chunk_count(len: usize) -> usize {
    len.div_ceil(CHUNK_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_side_version_20() {
        assert_eq!(qr_side(), 97);
    }

    #[test]
    fn test_frame_side_even() {
        // 97 * 4 + 8 = 396, already even
        assert_eq!(frame_side(), 396);
        assert_eq!(frame_side() % 2, 0);
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0), 0);
        assert_eq!(chunk_count(1), 1);
        assert_eq!(chunk_count(CHUNK_SIZE), 1);
        assert_eq!(chunk_count(CHUNK_SIZE + 1), 2);
        assert_eq!(chunk_count(10_000), 100);
        assert_eq!(chunk_count(10_001), 101);
    }
}
