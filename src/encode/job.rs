use super::{
    ConcatList, EncodeCommand, EncodeError, EncodeEvent, SpeedPlan, Toolchain, probe_media_or_default,
    run_encode,
};
use crate::display::format_clock;
use std::{path::PathBuf, process::ExitStatus};

/// A validated concat request. Probing and encoding happen in [`ConcatJob::run`],
/// which is meant for a worker thread.
#[derive(Debug, Clone)]
pub struct ConcatJob {
    pub tools: Toolchain,
    pub clips: Vec<PathBuf>,
    pub output: PathBuf,
    pub plan: SpeedPlan,
    pub keep_audio: bool,
}

/// Progress of a job, as seen by whoever drives the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Log(String),
    /// Expected output length in seconds; 0 when unknown.
    Total(f64),
    Progress(f64),
}

impl ConcatJob {
    /// Probes the clips, writes the list file and runs ffmpeg. The list file
    /// is removed before this returns.
    pub fn run<F>(&self, on_event: F) -> Result<ExitStatus, EncodeError>
    where
        F: Fn(JobEvent) + Sync,
    {
        on_event(JobEvent::Log("Scanning durations for progress…".into()));
        let summaries: Vec<_> = self
            .clips
            .iter()
            .map(|clip| probe_media_or_default(&self.tools.ffprobe, clip))
            .collect();
        let source_secs: f64 = summaries.iter().map(|s| s.duration_secs).sum();
        let total = self.plan.output_secs(source_secs);
        log::info!(
            "{} clips, {} of footage, {} of output",
            self.clips.len(),
            format_clock(source_secs),
            format_clock(total)
        );
        on_event(JobEvent::Total(total));

        let audio_present = summaries.first().is_some_and(|s| s.has_audio);

        on_event(JobEvent::Log(format!("Found {} MP4 files.", self.clips.len())));
        on_event(JobEvent::Log("Creating ffmpeg concat list…".into()));
        let list = ConcatList::create(&self.clips)?;

        let command = EncodeCommand {
            list_file: list.path().to_path_buf(),
            output: self.output.clone(),
            plan: self.plan,
            keep_audio: self.keep_audio,
            audio_present,
        };

        on_event(JobEvent::Log(self.plan.describe()));
        on_event(JobEvent::Log(format!(
            "Audio: {}",
            if command.audio_enabled() {
                "kept"
            } else {
                "disabled"
            }
        )));
        on_event(JobEvent::Log(format!("Output: {}", self.output.display())));
        on_event(JobEvent::Log("Running ffmpeg…".into()));

        let status = run_encode(&self.tools.ffmpeg, &command, |event| match event {
            EncodeEvent::Progress(secs) => on_event(JobEvent::Progress(secs)),
            EncodeEvent::Log(line) => on_event(JobEvent::Log(line)),
        })?;

        drop(list);
        Ok(status)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{fs, os::unix::fs::PermissionsExt, path::Path, sync::Mutex};

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn job(dir: &Path, ffmpeg_body: &str) -> ConcatJob {
        let ffprobe = script(
            dir,
            "ffprobe",
            r#"echo '{"streams":[{"codec_type":"video"}],"format":{"duration":"30.0"}}'"#,
        );
        let ffmpeg = script(dir, "ffmpeg", ffmpeg_body);
        ConcatJob {
            tools: Toolchain { ffmpeg, ffprobe },
            clips: vec![dir.join("a.mp4"), dir.join("b.mp4")],
            output: dir.join("out.mp4"),
            plan: SpeedPlan::new(20.0, 60, true).unwrap(),
            keep_audio: true,
        }
    }

    #[test]
    fn runs_fake_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(
            dir.path(),
            "echo out_time_ms=1500000\necho progress=end\necho 'muxing done' 1>&2\nexit 0",
        );
        let events = Mutex::new(Vec::new());
        let status = job.run(|e| events.lock().unwrap().push(e)).unwrap();
        assert!(status.success());

        let events = events.into_inner().unwrap();
        assert!(events.contains(&JobEvent::Total(20.0)));
        assert!(events.contains(&JobEvent::Progress(1.5)));
        assert!(events.contains(&JobEvent::Log("muxing done".into())));
        assert!(events.contains(&JobEvent::Log("Audio: disabled".into())));
        assert!(events.contains(&JobEvent::Log(
            "Speed mode ON: fast-forward by 3×, output 60 fps.".into()
        )));
    }

    #[test]
    fn exit_code_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), "exit 3");
        let status = job.run(|_| {}).unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
