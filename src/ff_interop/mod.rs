pub mod video_player;

use crate::catalog::{ClipProbe, ClipRate};
use anyhow::Context;
use ffmpeg_next::{codec, media::Type};
use std::path::{Path, PathBuf};

pub fn init() -> anyhow::Result<()> {
    ffmpeg_next::init().context("failed to initialize ffmpeg")?;
    ffmpeg_next::util::log::set_level(ffmpeg_next::util::log::Level::Error);
    Ok(())
}

/// Reads frame rate, frame count and dimensions of the best video stream.
pub fn probe_clip(path: &Path) -> anyhow::Result<ClipProbe> {
    let input_ctx = ffmpeg_next::format::input(path)
        .context("failed to get input format context for file from ffmpeg")?;
    let stream = input_ctx
        .streams()
        .best(Type::Video)
        .context("failed to locate a video stream")?;

    let mut rate = ClipRate::from(stream.avg_frame_rate());
    if !rate.is_usable() {
        rate = ClipRate::from(stream.rate());
    }
    if !rate.is_usable() {
        log::warn!("no usable frame rate in \"{}\", assuming 30", path.display());
        rate = ClipRate::FALLBACK;
    }

    let frame_count = if stream.frames() > 0 {
        stream.frames() as u64
    } else {
        // no frame count in the container, estimate it from the duration
        let secs = if stream.duration() > 0 {
            stream.duration() as f64 * f64::from(stream.time_base())
        } else {
            input_ctx.duration().max(0) as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
        };
        (secs * rate.fps()).round().max(0.0) as u64
    };

    let video_decoder = codec::context::Context::from_parameters(stream.parameters())
        .context("failed to create video decoder")
        .and_then(|c| {
            c.decoder()
                .video()
                .context("failed to get video from decoder context")
        })?;

    let probe = ClipProbe {
        path: path.to_path_buf(),
        rate,
        frame_count,
        width: video_decoder.width(),
        height: video_decoder.height(),
    };
    log::debug!(
        "probed \"{}\": {} frames at {:.3} fps, {}x{}",
        path.display(),
        probe.frame_count,
        probe.rate.fps(),
        probe.width,
        probe.height
    );
    Ok(probe)
}

/// Probes every clip, keeping the readable ones in order and returning the
/// rest alongside the reason they were skipped.
pub fn probe_clips(paths: &[PathBuf]) -> (Vec<ClipProbe>, Vec<(PathBuf, anyhow::Error)>) {
    let mut probes = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();
    for path in paths {
        match probe_clip(path) {
            Ok(probe) => probes.push(probe),
            Err(err) => {
                log::warn!("skipping \"{}\": {err:#}", path.display());
                skipped.push((path.clone(), err));
            }
        }
    }
    (probes, skipped)
}
