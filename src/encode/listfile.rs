use super::EncodeError;
use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// The concat demuxer's input list. The backing temp file is removed when
/// this is dropped, so keep it alive until ffmpeg has exited.
#[derive(Debug)]
pub struct ConcatList {
    file: NamedTempFile,
}

impl ConcatList {
    pub fn create(clips: &[PathBuf]) -> Result<Self, EncodeError> {
        let file = tempfile::Builder::new()
            .prefix("dashcam-concat-")
            .suffix(".txt")
            .tempfile()
            .map_err(EncodeError::ListFile)?;

        {
            let mut writer = BufWriter::new(file.as_file());
            for clip in clips {
                writeln!(writer, "{}", list_entry(clip)).map_err(EncodeError::ListFile)?;
            }
            writer.flush().map_err(EncodeError::ListFile)?;
        }

        log::debug!(
            "wrote concat list with {} entries to \"{}\"",
            clips.len(),
            file.path().display()
        );
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// `file '<absolute path>'` with forward slashes and single quotes escaped
/// the way the concat demuxer expects (`'\''`).
pub fn list_entry(clip: &Path) -> String {
    let absolute = std::path::absolute(clip).unwrap_or_else(|_| clip.to_path_buf());
    let posix = absolute.to_string_lossy().replace('\\', "/");
    format!("file '{}'", posix.replace('\'', r"'\''"))
}
