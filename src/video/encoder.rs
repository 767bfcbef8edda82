use log::{debug, info};
use qrcodegen::QrCode;
use rsmpeg::avcodec::{AVCodec, AVCodecContext};
use rsmpeg::avformat::AVFormatContextOutput;
use rsmpeg::avutil::AVFrame;
use rsmpeg::error::RsmpegError;
use rsmpeg::ffi;

use crate::config::{frame_side, qr_side, BIT_RATE, FPS, GOP_SIZE, VIDEO_FORMAT};
use crate::error::{Error, Result};
use crate::frame::PlanarFrame;
use crate::video::sink::VideoSink;

/// Encode a sequence of QR codes into an H.264/MP4 carrier, one code per
/// video frame.
///
/// One reusable planar frame is repainted per code, copied into the codec's
/// frame, and pushed through the send/drain cycle.
pub struct VideoEncoder {
    fps: i32,
    gop_size: i32,
    bit_rate: i64,
}

impl VideoEncoder {
    pub fn new() -> Self {
        Self {
            fps: FPS,
            gop_size: GOP_SIZE,
            bit_rate: BIT_RATE,
        }
    }

    /// Encode the codes into the sink, one video frame per code, and finish
    /// the container. An empty code list still produces a structurally valid
    /// carrier with zero frames.
    pub fn encode(&self, sink: &mut VideoSink, codes: &[QrCode]) -> Result<()> {
        if let Some(bad) = codes.iter().find(|qr| qr.size() as usize != qr_side()) {
            return Err(Error::Config(format!(
                "QR code of side {} in a run pinned to side {}",
                bad.size(),
                qr_side()
            )));
        }
        let side = frame_side() as i32;
        let output = sink.format_mut();

        let codec_id = output.oformat().video_codec;
        let encoder = AVCodec::find_encoder(codec_id).ok_or_else(|| {
            Error::Config(format!(
                "no encoder for the {VIDEO_FORMAT} container's default video codec on this host"
            ))
        })?;

        let mut codec_context = AVCodecContext::new(&encoder);
        codec_context.set_width(side);
        codec_context.set_height(side);
        codec_context.set_time_base(ffi::AVRational {
            num: 1,
            den: self.fps,
        });
        codec_context.set_pix_fmt(ffi::AV_PIX_FMT_YUV420P);
        codec_context.set_gop_size(self.gop_size);
        codec_context.set_bit_rate(self.bit_rate);
        if output.oformat().flags & ffi::AVFMT_GLOBALHEADER as i32 != 0 {
            let flags = codec_context.flags;
            codec_context.set_flags(flags | ffi::AV_CODEC_FLAG_GLOBAL_HEADER as i32);
        }
        codec_context.open(None)?;

        {
            let mut stream = output.new_stream();
            stream.set_codecpar(codec_context.extract_codecpar());
        }
        output.write_header(&mut None)?;

        let mut frame = AVFrame::new();
        frame.set_width(side);
        frame.set_height(side);
        frame.set_format(ffi::AV_PIX_FMT_YUV420P);
        frame.alloc_buffer()?;

        let mut planar = PlanarFrame::new();
        info!(
            "encoding {} frames of {side}x{side} at {} fps",
            codes.len(),
            self.fps
        );
        for (index, qr) in codes.iter().enumerate() {
            planar.paint(qr);
            frame.make_writable()?;
            copy_planes(&mut frame, &planar);
            // pts starts at 1; some demuxers special-case 0 on the first frame
            frame.set_pts(index as i64 + 1);
            debug!("sending frame {} / {}", index + 1, codes.len());
            codec_context.send_frame(Some(&frame))?;
            drain_packets(&mut codec_context, output)?;
        }

        // Null frame flushes whatever the codec still buffers.
        codec_context.send_frame(None)?;
        drain_packets(&mut codec_context, output)?;
        output.write_trailer()?;
        Ok(())
    }
}

impl Default for VideoEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull every packet the codec currently has and interleave-write it,
/// rescaling timestamps from codec to stream time base. Returns as soon as
/// the codec wants more input (or is fully flushed).
fn drain_packets(
    codec_context: &mut AVCodecContext,
    output: &mut AVFormatContextOutput,
) -> Result<()> {
    loop {
        let mut packet = match codec_context.receive_packet() {
            Ok(packet) => packet,
            Err(RsmpegError::EncoderDrainError) | Err(RsmpegError::EncoderFlushedError) => {
                return Ok(())
            }
            Err(e) => return Err(Error::Codec(e)),
        };
        let stream_time_base = output.streams()[0].time_base;
        packet.rescale_ts(codec_context.time_base, stream_time_base);
        packet.set_stream_index(0);
        output.interleaved_write_frame(&mut packet)?;
    }
}

/// Copy the painter's tight planes into the codec frame, honoring the
/// frame's per-plane strides.
fn copy_planes(frame: &mut AVFrame, planar: &PlanarFrame) {
    let side = planar.side();
    let (u, v) = planar.chroma();
    copy_plane(frame.data[0], frame.linesize[0] as usize, planar.luma(), side);
    copy_plane(frame.data[1], frame.linesize[1] as usize, u, side / 2);
    copy_plane(frame.data[2], frame.linesize[2] as usize, v, side / 2);
}

fn copy_plane(dst: *mut u8, dst_stride: usize, src: &[u8], width: usize) {
    debug_assert_eq!(src.len() % width, 0);
    for (row, line) in src.chunks_exact(width).enumerate() {
        // Plane buffers are allocated by libav with at least `width` bytes
        // per line; strides may be padded beyond that.
        unsafe {
            std::ptr::copy_nonoverlapping(line.as_ptr(), dst.add(row * dst_stride), width);
        }
    }
}
