mod command;
mod job;
mod listfile;
mod probe;
mod progress;
mod runner;
mod speed;
pub mod tools;

pub use command::*;
pub use job::*;
pub use listfile::*;
pub use probe::*;
pub use progress::*;
pub use runner::*;
pub use speed::*;
pub use tools::Toolchain;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{0} was not found on your PATH")]
    ToolMissing(&'static str),
    #[error("failed to run {tool}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("ffprobe could not read \"{}\": {stderr}", clip.display())]
    ProbeFailed { clip: PathBuf, stderr: String },
    #[error("unexpected ffprobe output")]
    ProbeOutput(#[from] serde_json::Error),
    #[error("failed to write the concat list file")]
    ListFile(#[source] std::io::Error),
    #[error("FPS must be a positive number, got {0}")]
    InvalidFps(f64),
}
