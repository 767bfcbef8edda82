use qrcodegen::QrCode;
use rayon::prelude::*;

use crate::config::{frame_side, BORDER, SCALE};

/// A reusable planar YUV 4:2:0 frame buffer with tight strides.
///
/// One instance is allocated per encode run and repainted for every QR code.
/// Each module maps to an exact `SCALE`-by-`SCALE` block of luma samples
/// with no interpolation; integer-aligned module edges are what survive the
/// carrier's subsampling and inter-frame prediction.
pub struct PlanarFrame {
    side: usize,
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
}

impl PlanarFrame {
    /// Allocate a frame of [`frame_side`] pixels per side. The chroma planes
    /// are filled with 128 here and never touched again.
    pub fn new() -> Self {
        let side = frame_side();
        debug_assert_eq!(side % 2, 0);
        let chroma = side / 2;
        Self {
            side,
            y: vec![255; side * side],
            u: vec![128; chroma * chroma],
            v: vec![128; chroma * chroma],
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Luma plane, row-major, stride == side.
    pub fn luma(&self) -> &[u8] {
        &self.y
    }

    /// Chroma planes, row-major, stride == side / 2.
    pub fn chroma(&self) -> (&[u8], &[u8]) {
        (&self.u, &self.v)
    }

    /// Paint a QR code into the luma plane: white quiet zone around an
    /// integer-scaled module grid, black modules at 0, background at 255.
    ///
    /// Rows are painted in parallel; the result is independent of row order.
    pub fn paint(&mut self, qr: &QrCode) {
        let computed = qr.size() as usize * SCALE + 2 * BORDER;
        assert_eq!(
            self.side,
            computed + computed % 2,
            "frame side does not match the code's scaled geometry"
        );
        let side = self.side;
        self.y.par_chunks_mut(side).enumerate().for_each(|(y, row)| {
            for (x, sample) in row.iter_mut().enumerate() {
                let in_border = x < BORDER || y < BORDER || x >= side - BORDER || y >= side - BORDER;
                *sample = if in_border {
                    255
                } else {
                    let mx = ((x - BORDER) / SCALE) as i32;
                    let my = ((y - BORDER) / SCALE) as i32;
                    // get_module is white for out-of-range coordinates, which
                    // covers the even-rounding slack pixel when present.
                    if qr.get_module(mx, my) {
                        0
                    } else {
                        255
                    }
                };
            }
        });
    }
}

impl Default for PlanarFrame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::qr_side;
    use crate::qr::encode_chunk;

    fn painted() -> (PlanarFrame, QrCode) {
        let qr = encode_chunk(b"planar frame painter test payload").unwrap();
        let mut frame = PlanarFrame::new();
        frame.paint(&qr);
        (frame, qr)
    }

    #[test]
    fn test_geometry() {
        let (frame, qr) = painted();
        assert_eq!(frame.side(), qr.size() as usize * SCALE + 2 * BORDER);
        assert_eq!(frame.luma().len(), frame.side() * frame.side());
        let (u, v) = frame.chroma();
        assert_eq!(u.len(), (frame.side() / 2) * (frame.side() / 2));
        assert_eq!(v.len(), u.len());
    }

    #[test]
    fn test_border_band_is_white() {
        let (frame, _) = painted();
        let side = frame.side();
        let luma = frame.luma();
        for i in 0..side {
            for b in 0..BORDER {
                assert_eq!(luma[b * side + i], 255); // top rows
                assert_eq!(luma[(side - 1 - b) * side + i], 255); // bottom rows
                assert_eq!(luma[i * side + b], 255); // left columns
                assert_eq!(luma[i * side + side - 1 - b], 255); // right columns
            }
        }
    }

    #[test]
    fn test_chroma_is_uniformly_neutral() {
        let (frame, _) = painted();
        let (u, v) = frame.chroma();
        assert!(u.iter().all(|&s| s == 128));
        assert!(v.iter().all(|&s| s == 128));
    }

    #[test]
    fn test_every_module_is_an_exact_block() {
        let (frame, qr) = painted();
        let side = frame.side();
        let luma = frame.luma();
        for my in 0..qr_side() {
            for mx in 0..qr_side() {
                let expected = if qr.get_module(mx as i32, my as i32) { 0 } else { 255 };
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        let x = BORDER + mx * SCALE + dx;
                        let y = BORDER + my * SCALE + dy;
                        assert_eq!(luma[y * side + x], expected, "module ({mx},{my})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_matches_sequential_reference() {
        let (frame, qr) = painted();
        let side = frame.side();
        let mut reference = vec![0u8; side * side];
        for y in 0..side {
            for x in 0..side {
                let in_border =
                    x < BORDER || y < BORDER || x >= side - BORDER || y >= side - BORDER;
                reference[y * side + x] = if in_border {
                    255
                } else if qr.get_module(((x - BORDER) / SCALE) as i32, ((y - BORDER) / SCALE) as i32)
                {
                    0
                } else {
                    255
                };
            }
        }
        assert_eq!(frame.luma(), &reference[..]);
    }

    #[test]
    fn test_repainting_reuses_the_buffer() {
        let first = encode_chunk(b"first").unwrap();
        let second = encode_chunk(b"second").unwrap();
        let mut frame = PlanarFrame::new();
        frame.paint(&first);
        let snapshot = frame.luma().to_vec();
        frame.paint(&second);
        assert_ne!(frame.luma(), &snapshot[..]);
        let mut back = PlanarFrame::new();
        back.paint(&first);
        frame.paint(&first);
        assert_eq!(frame.luma(), back.luma());
    }
}
