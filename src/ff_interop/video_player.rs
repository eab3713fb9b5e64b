use crate::catalog::{ClipInfo, FrameNum};
use anyhow::Context;
use ffmpeg_next::{
    Packet, Rational, Rescale, codec, format, frame, media::Type, rescale, software::scaling,
};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Gaps up to this many frames are decoded through instead of seeking.
const DECODE_THROUGH_LIMIT: u64 = 30;

/// One decoded frame in tightly packed RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Output size for a `width`x`height` source no wider than `max_width`,
/// keeping the aspect ratio and even dimensions.
pub fn display_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 || width <= max_width {
        return (width.max(2) & !1, height.max(2) & !1);
    }
    let scale = f64::from(max_width) / f64::from(width);
    let h = (f64::from(height) * scale).round() as u32;
    (max_width.max(2) & !1, h.max(2) & !1)
}

/// Container timestamp in `AV_TIME_BASE` units for local frame `target` of
/// a stream that begins `start_us` microseconds into the file.
fn seek_timestamp(target: FrameNum, fps: f64, start_us: i64) -> i64 {
    let secs = target.0 as f64 / fps;
    start_us + (secs * f64::from(ffmpeg_next::ffi::AV_TIME_BASE)) as i64
}

/// Index expected after a read. Timestamps within one frame of the
/// expected index are jitter and still advance by exactly one.
fn next_after(expected: FrameNum, decoded: FrameNum) -> FrameNum {
    if decoded.0.abs_diff(expected.0) <= 1 {
        expected + FrameNum(1)
    } else {
        FrameNum(decoded.0.max(expected.0) + 1)
    }
}

/// Sequential reader over one clip with frame-accurate seeking.
pub struct ClipDecoder {
    path: PathBuf,
    stream_index: usize,
    time_base: Rational,
    start_pts: i64,
    start_us: i64,
    fps: f64,
    input_ctx: format::context::Input,

    video_decoder: codec::decoder::Video,
    scaler_ctx: scaling::Context,

    /// Local index of the frame the next read returns.
    next_frame: FrameNum,
    pending: Option<frame::Video>,
    eof_sent: bool,
}

impl ClipDecoder {
    pub fn open(clip: &ClipInfo, max_width: u32) -> anyhow::Result<Self> {
        let input_ctx = format::input(&clip.path)
            .with_context(|| format!("failed to open \"{}\"", clip.path.display()))?;
        let video_stream = input_ctx
            .streams()
            .best(Type::Video)
            .context("failed to locate a video stream")?;
        let stream_index = video_stream.index();
        let time_base = video_stream.time_base();
        let start_pts = match video_stream.start_time() {
            ffmpeg_next::ffi::AV_NOPTS_VALUE => 0,
            start => start,
        };
        let start_us = start_pts.rescale(time_base, rescale::TIME_BASE);
        info!(
            "got video stream at index {stream_index} in \"{}\"",
            clip.file_name()
        );

        let video_decoder = codec::context::Context::from_parameters(video_stream.parameters())
            .context("failed to create video decoder")
            .and_then(|c| {
                c.decoder()
                    .video()
                    .context("failed to get video from decoder context")
            })?;
        debug!("created video decoder");

        let (out_w, out_h) =
            display_size(video_decoder.width(), video_decoder.height(), max_width);
        let scaler_ctx = scaling::context::Context::get(
            video_decoder.format(),
            video_decoder.width(),
            video_decoder.height(),
            format::Pixel::RGBA,
            out_w,
            out_h,
            scaling::flag::Flags::AREA,
        )
        .context("failed to create software scaler for pixel reformatting")?;
        debug!("created software scaler to {out_w}x{out_h}");

        Ok(Self {
            path: clip.path.clone(),
            stream_index,
            time_base,
            start_pts,
            start_us,
            fps: clip.fps(),
            input_ctx,
            video_decoder,
            scaler_ctx,
            next_frame: FrameNum::ZERO,
            pending: None,
            eof_sent: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Positions the decoder so the next read returns local frame `target`.
    pub fn seek(&mut self, target: FrameNum) -> anyhow::Result<()> {
        if target == self.next_frame {
            return Ok(());
        }

        let ahead = target.0.checked_sub(self.next_frame.0);
        if !matches!(ahead, Some(gap) if gap <= DECODE_THROUGH_LIMIT) {
            let ts = seek_timestamp(target, self.fps, self.start_us);
            self.input_ctx
                .seek(ts, ..ts)
                .with_context(|| format!("failed to seek to frame {target}"))?;
            self.video_decoder.flush();
            self.pending = None;
            self.eof_sent = false;
        }

        loop {
            let decoded = match self.pending.take() {
                Some(frame) => frame,
                None => match self.decode_next()? {
                    Some(frame) => frame,
                    None => break,
                },
            };
            let index = self.index_of(&decoded).unwrap_or(target);
            if index >= target {
                self.pending = Some(decoded);
                break;
            }
        }
        self.next_frame = target;
        Ok(())
    }

    /// Next frame of the clip, `None` once the clip is exhausted.
    pub fn read_frame(&mut self) -> anyhow::Result<Option<RgbaFrame>> {
        let decoded = match self.pending.take() {
            Some(frame) => frame,
            None => match self.decode_next()? {
                Some(frame) => frame,
                None => return Ok(None),
            },
        };

        let index = self.index_of(&decoded).unwrap_or(self.next_frame);
        self.next_frame = next_after(self.next_frame, index);
        self.to_rgba(&decoded).map(Some)
    }

    fn next_packet(&mut self) -> Option<Packet> {
        let stream_index = self.stream_index;
        self.input_ctx
            .packets()
            .find(|(stream, _)| stream.index() == stream_index)
            .map(|(_, packet)| packet)
    }

    fn decode_next(&mut self) -> anyhow::Result<Option<frame::Video>> {
        loop {
            let mut decoded = frame::Video::empty();
            if self.video_decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }
            if self.eof_sent {
                return Ok(None);
            }
            match self.next_packet() {
                Some(packet) => self
                    .video_decoder
                    .send_packet(&packet)
                    .context("failed to send packet from input to video decoder")?,
                None => {
                    self.video_decoder
                        .send_eof()
                        .context("failed to flush the video decoder")?;
                    self.eof_sent = true;
                }
            }
        }
    }

    fn index_of(&self, decoded: &frame::Video) -> Option<FrameNum> {
        let ts = decoded.timestamp().or(decoded.pts())?;
        let secs = (ts - self.start_pts) as f64 * f64::from(self.time_base);
        Some(FrameNum((secs * self.fps).round().max(0.0) as u64))
    }

    fn to_rgba(&mut self, decoded: &frame::Video) -> anyhow::Result<RgbaFrame> {
        let mut rgba_frame = frame::Video::empty();
        self.scaler_ctx
            .run(decoded, &mut rgba_frame)
            .context("failed to convert decoded video frame to rgba pixel format")?;

        let (width, height) = (rgba_frame.width(), rgba_frame.height());
        let row = width as usize * 4;
        let stride = rgba_frame.stride(0);
        let plane = rgba_frame.data(0);
        let mut data = Vec::with_capacity(row * height as usize);
        for y in 0..height as usize {
            data.extend_from_slice(&plane[y * stride..y * stride + row]);
        }
        Ok(RgbaFrame {
            width,
            height,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn small_frames_keep_their_size() {
        assert_eq!(display_size(640, 480, 960), (640, 480));
        assert_eq!(display_size(641, 361, 960), (640, 360));
    }

    #[test]
    fn wide_frames_are_scaled_down() {
        assert_eq!(display_size(1920, 1080, 960), (960, 540));
        assert_eq!(display_size(2560, 1080, 960), (960, 404));
    }

    #[test]
    fn seeks_are_offset_by_stream_start() {
        assert_eq!(seek_timestamp(FrameNum(30), 30.0, 0), 1_000_000);
        assert_eq!(seek_timestamp(FrameNum(0), 30.0, 1_400_000), 1_400_000);
        assert_eq!(seek_timestamp(FrameNum(15), 30.0, 1_400_000), 1_900_000);
    }

    #[test]
    fn jittery_timestamps_advance_one_frame() {
        let mut next = FrameNum(5);
        // rounding puts some frames one index early or late
        for decoded in [5, 6, 6, 9, 7] {
            next = next_after(next, FrameNum(decoded));
        }
        assert_eq!(next, FrameNum(10));
        assert_eq!(next_after(FrameNum(10), FrameNum(20)), FrameNum(21));
        assert_eq!(next_after(FrameNum(10), FrameNum(2)), FrameNum(11));
    }
}
