use super::{EncodeCommand, EncodeError, ProgressLine, parse_line, tools::hidden_command};
use std::{
    io::{BufRead, BufReader, Read},
    path::Path,
    process::{ExitStatus, Stdio},
    thread,
};

/// What a running encode reports back.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodeEvent {
    /// Output seconds written so far.
    Progress(f64),
    /// A diagnostic line from ffmpeg.
    Log(String),
}

/// Runs ffmpeg to completion, feeding `on_event` from the progress stream on
/// stdout and the diagnostics on stderr. The exit status is the only
/// success signal; a failed run is still `Ok`.
pub fn run_encode<F>(ffmpeg: &Path, command: &EncodeCommand, on_event: F) -> Result<ExitStatus, EncodeError>
where
    F: Fn(EncodeEvent) + Sync,
{
    let args = command.args();
    log::info!(
        "running {} {}",
        ffmpeg.display(),
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut child = hidden_command(ffmpeg)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| EncodeError::Spawn {
            tool: "ffmpeg",
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    thread::scope(|scope| {
        if let Some(stderr) = stderr {
            let on_event = &on_event;
            scope.spawn(move || forward_lines(stderr, on_event));
        }
        if let Some(stdout) = stdout {
            forward_lines(stdout, &on_event);
        }
    });

    let status = child.wait().map_err(|source| EncodeError::Spawn {
        tool: "ffmpeg",
        source,
    })?;
    log::info!("ffmpeg finished with {status}");
    Ok(status)
}

/// Parses every line of `stream` until EOF. Invalid UTF-8 is replaced
/// rather than ending the stream.
pub fn forward_lines<R: Read>(stream: R, on_event: &(impl Fn(EncodeEvent) + ?Sized)) {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                log::warn!("stopped reading ffmpeg output: {err}");
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        match parse_line(&line) {
            Some(ProgressLine::OutTime(secs)) => on_event(EncodeEvent::Progress(secs)),
            Some(ProgressLine::Log(text)) => {
                log::debug!("ffmpeg: {text}");
                on_event(EncodeEvent::Log(text));
            }
            Some(ProgressLine::State(_)) | Some(ProgressLine::Ignored) | None => {}
        }
    }
}
