use log::{debug, info};
use rsmpeg::avcodec::AVCodecContext;
use rsmpeg::avutil::AVFrame;
use rsmpeg::error::RsmpegError;
use rsmpeg::ffi;
use rsmpeg::swscale::SwsContext;

use crate::error::{Error, Result};
use crate::video::source::VideoSource;

/// Bilinear YUV-to-grayscale converter, sized once per decode run.
struct GrayConverter {
    sws: SwsContext,
    dst: AVFrame,
    tight: Vec<u8>,
    width: i32,
    height: i32,
}

impl GrayConverter {
    fn new(width: i32, height: i32, src_format: i32) -> Result<Self> {
        let sws = SwsContext::get_context(
            width,
            height,
            src_format,
            width,
            height,
            ffi::AV_PIX_FMT_GRAY8,
            ffi::SWS_BILINEAR,
            None,
            None,
            None,
        )
        .ok_or_else(|| {
            Error::Container("could not create a grayscale converter for the stream".to_string())
        })?;
        let mut dst = AVFrame::new();
        dst.set_width(width);
        dst.set_height(height);
        dst.set_format(ffi::AV_PIX_FMT_GRAY8);
        dst.alloc_buffer()?;
        Ok(Self {
            sws,
            dst,
            tight: vec![0; width as usize * height as usize],
            width,
            height,
        })
    }

    /// Convert a decoded frame and return a tightly-packed grayscale view
    /// (stride == width) valid until the next call.
    fn convert(&mut self, src: &AVFrame) -> Result<(&[u8], usize, usize)> {
        self.sws.scale_frame(src, 0, self.height, &mut self.dst)?;
        let stride = self.dst.linesize[0] as usize;
        let width = self.width as usize;
        for row in 0..self.height as usize {
            unsafe {
                std::ptr::copy_nonoverlapping(
                    self.dst.data[0].add(row * stride),
                    self.tight.as_mut_ptr().add(row * width),
                    width,
                );
            }
        }
        Ok((&self.tight, width, self.height as usize))
    }
}

/// Decode every video frame of the source and hand each one, as grayscale,
/// to `on_frame` in presentation order. Returns the number of frames
/// delivered.
pub fn decode_frames<F>(source: &mut VideoSource, mut on_frame: F) -> Result<u64>
where
    F: FnMut(&[u8], usize, usize) -> Result<()>,
{
    let input = source.format_mut();
    let (stream_index, decoder) = input
        .find_best_stream(ffi::AVMEDIA_TYPE_VIDEO)
        .map_err(|e| Error::Container(format!("video stream selection failed: {e}")))?
        .ok_or_else(|| Error::Container("carrier has no video stream".to_string()))?;
    debug!("selected video stream {stream_index} ({})", decoder.name().to_string_lossy());

    let mut codec_context = AVCodecContext::new(&decoder);
    {
        let stream = &input.streams()[stream_index];
        codec_context.apply_codecpar(&stream.codecpar())?;
    }
    codec_context.open(None)?;

    let mut converter: Option<GrayConverter> = None;
    let mut packet_counter: i64 = 0;
    let mut delivered: u64 = 0;

    while let Some(mut packet) = input.read_packet()? {
        if packet.stream_index as usize != stream_index {
            continue;
        }
        // Some containers hand out packets without timestamps; synthesize a
        // monotonic counter so the decoder's bookkeeping stays ordered.
        if packet.pts == ffi::AV_NOPTS_VALUE {
            packet.set_pts(packet_counter);
            packet.set_dts(packet_counter);
        }
        packet_counter += 1;
        codec_context.send_packet(Some(&packet))?;
        delivered += receive_frames(&mut codec_context, &mut converter, &mut on_frame)?;
    }

    // End of input: flush the decoder and drain the tail.
    codec_context.send_packet(None)?;
    delivered += receive_frames(&mut codec_context, &mut converter, &mut on_frame)?;

    info!("decoded {delivered} video frames");
    Ok(delivered)
}

fn receive_frames<F>(
    codec_context: &mut AVCodecContext,
    converter: &mut Option<GrayConverter>,
    on_frame: &mut F,
) -> Result<u64>
where
    F: FnMut(&[u8], usize, usize) -> Result<()>,
{
    let mut delivered = 0;
    loop {
        let frame = match codec_context.receive_frame() {
            Ok(frame) => frame,
            Err(RsmpegError::DecoderDrainError) | Err(RsmpegError::DecoderFlushedError) => {
                return Ok(delivered)
            }
            Err(e) => return Err(Error::Codec(e)),
        };
        if converter.is_none() {
            *converter = Some(GrayConverter::new(frame.width, frame.height, frame.format)?);
        }
        let conv = converter.as_mut().unwrap();
        let (gray, width, height) = conv.convert(&frame)?;
        on_frame(gray, width, height)?;
        delivered += 1;
    }
}
