use super::{ClipRate, FrameNum, FrameSpan};
use std::path::PathBuf;

/// What probing a clip reports, before it is placed in an index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipProbe {
    pub path: PathBuf,
    pub rate: ClipRate,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
}

impl ClipProbe {
    pub fn duration_secs(&self) -> f64 {
        if self.frame_count == 0 {
            0.0
        } else {
            self.frame_count as f64 / self.rate.fps()
        }
    }
}

/// A clip placed in the global frame index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub path: PathBuf,
    pub rate: ClipRate,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
    pub start_frame: FrameNum,
    pub start_secs: f64,
}

impl ClipInfo {
    pub fn fps(&self) -> f64 {
        self.rate.fps()
    }

    pub fn span(&self) -> FrameSpan {
        FrameSpan::starting_at(self.start_frame, self.frame_count)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
