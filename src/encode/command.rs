use super::SpeedPlan;
use std::{ffi::OsString, path::PathBuf};

/// Everything needed to spell out one ffmpeg concat invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeCommand {
    pub list_file: PathBuf,
    pub output: PathBuf,
    pub plan: SpeedPlan,
    /// Keep the audio track; only honoured if the source has one.
    pub keep_audio: bool,
    pub audio_present: bool,
}

impl EncodeCommand {
    pub fn audio_enabled(&self) -> bool {
        self.keep_audio && self.audio_present
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-y",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(self.list_file.clone().into_os_string());
        args.extend(
            [
                "-pix_fmt",
                "yuv420p",
                "-c:v",
                "libx264",
                "-preset",
                "slow",
                "-crf",
                "22",
                "-movflags",
                "+faststart",
                "-progress",
                "pipe:1",
                "-nostats",
            ]
            .into_iter()
            .map(OsString::from),
        );

        args.push("-vf".into());
        args.push(self.plan.video_filter().into());
        args.push("-r".into());
        args.push(self.plan.output_rate().into());

        if self.audio_enabled() {
            if let Some(filter) = self.plan.audio_filter() {
                args.push("-filter:a".into());
                args.push(filter.into());
            }
            args.extend(["-c:a", "aac", "-b:a", "192k"].map(OsString::from));
        } else {
            args.push("-an".into());
        }

        args.push(self.output.clone().into_os_string());
        args
    }
}
