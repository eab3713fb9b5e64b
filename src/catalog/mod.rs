mod clip;
mod clip_index;
mod framenum;
mod framespan;
mod rational;
mod scan;

pub use clip::*;
pub use clip_index::*;
pub use framenum::*;
pub use framespan::*;
pub use rational::*;
pub use scan::*;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("\"{}\" is not a folder", .0.display())]
    NotAFolder(PathBuf),
    #[error("failed to read folder \"{}\"", folder.display())]
    ReadFolder {
        folder: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no .mp4/.MP4 files found in \"{}\"", .0.display())]
    NoClips(PathBuf),
    #[error("could not read frames from any file")]
    NoFrames,
}
