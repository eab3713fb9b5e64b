use super::{EncodeError, tools::hidden_command};
use serde::Deserialize;
use std::path::Path;

/// The bits of an ffprobe report the concatenator cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaSummary {
    pub duration_secs: f64,
    pub has_audio: bool,
}

impl MediaSummary {
    /// Used when ffprobe fails: no duration, and assume audio so it is not
    /// silently dropped.
    pub const UNKNOWN: MediaSummary = MediaSummary {
        duration_secs: 0.0,
        has_audio: true,
    };

    pub fn from_json(json: &[u8]) -> Result<Self, EncodeError> {
        let report: ProbeReport = serde_json::from_slice(json)?;
        let duration_secs = report
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite())
            .map(|d| d.max(0.0))
            .unwrap_or(0.0);
        let has_audio = report
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));
        Ok(Self {
            duration_secs,
            has_audio,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

pub fn probe_media(ffprobe: &Path, clip: &Path) -> Result<MediaSummary, EncodeError> {
    let output = hidden_command(ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration:stream=codec_type",
            "-of",
            "json",
        ])
        .arg(clip)
        .output()
        .map_err(|source| EncodeError::Spawn {
            tool: "ffprobe",
            source,
        })?;

    if !output.status.success() {
        return Err(EncodeError::ProbeFailed {
            clip: clip.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    MediaSummary::from_json(&output.stdout)
}

/// Like [`probe_media`], but never fails.
pub fn probe_media_or_default(ffprobe: &Path, clip: &Path) -> MediaSummary {
    probe_media(ffprobe, clip).unwrap_or_else(|err| {
        log::warn!("probing \"{}\" failed: {err}", clip.display());
        MediaSummary::UNKNOWN
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_duration_and_audio() {
        let json = br#"{
            "programs": [],
            "streams": [{"codec_type": "video"}, {"codec_type": "audio"}],
            "format": {"duration": "59.993000"}
        }"#;
        let summary = MediaSummary::from_json(json).unwrap();
        assert_eq!(summary.has_audio, true);
        assert!((summary.duration_secs - 59.993).abs() < 1e-9);
    }

    #[test]
    fn video_only() {
        let json = br#"{"streams": [{"codec_type": "video"}], "format": {"duration": "3.0"}}"#;
        let summary = MediaSummary::from_json(json).unwrap();
        assert_eq!(
            summary,
            MediaSummary {
                duration_secs: 3.0,
                has_audio: false
            }
        );
    }

    #[test]
    fn missing_or_bad_duration_is_zero() {
        let summary = MediaSummary::from_json(br#"{"format": {"duration": "N/A"}}"#).unwrap();
        assert_eq!(summary.duration_secs, 0.0);
        let summary = MediaSummary::from_json(br#"{}"#).unwrap();
        assert_eq!(summary.duration_secs, 0.0);
        assert!(!summary.has_audio);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(MediaSummary::from_json(b"not json").is_err());
    }
}
