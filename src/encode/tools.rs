use super::EncodeError;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

/// Keeps child processes from flashing a console window on Windows.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x08000000;

pub fn hidden_command<S: AsRef<OsStr>>(program: S) -> Command {
    let mut cmd = Command::new(program);
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

/// Paths of the external ffmpeg binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Toolchain {
    /// Looks next to the running executable first, then on `PATH`.
    pub fn locate() -> Result<Self, EncodeError> {
        let exe = std::env::current_exe().ok();
        let exe_dir = exe.as_deref().and_then(Path::parent);
        let search_path = std::env::var_os("PATH");
        Self::locate_in(exe_dir, search_path.as_deref())
    }

    /// [`Toolchain::locate`] with an explicit executable directory and
    /// search path.
    pub fn locate_in(
        exe_dir: Option<&Path>,
        search_path: Option<&OsStr>,
    ) -> Result<Self, EncodeError> {
        Ok(Self {
            ffmpeg: find_tool("ffmpeg", exe_dir, search_path)?,
            ffprobe: find_tool("ffprobe", exe_dir, search_path)?,
        })
    }

    pub fn available() -> bool {
        Self::locate().is_ok()
    }
}

fn bundled(name: &str, exe_dir: &Path) -> Option<PathBuf> {
    let candidate = exe_dir
        .join(name)
        .with_extension(std::env::consts::EXE_EXTENSION);
    candidate.is_file().then_some(candidate)
}

fn find_tool(
    name: &'static str,
    exe_dir: Option<&Path>,
    search_path: Option<&OsStr>,
) -> Result<PathBuf, EncodeError> {
    if let Some(path) = exe_dir.and_then(|dir| bundled(name, dir)) {
        log::debug!("using bundled {name} at \"{}\"", path.display());
        return Ok(path);
    }
    let search_path = search_path.ok_or(EncodeError::ToolMissing(name))?;
    match which::which_in(name, Some(search_path), Path::new(".")) {
        Ok(path) => {
            log::debug!("using {name} from PATH at \"{}\"", path.display());
            Ok(path)
        }
        Err(_) => Err(EncodeError::ToolMissing(name)),
    }
}

pub fn install_hint() -> &'static str {
    "Install ffmpeg and try again.\n\
     On Windows: choco install ffmpeg\n\
     On macOS: brew install ffmpeg\n\
     On Linux: sudo apt install ffmpeg"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn tool_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name).with_extension(std::env::consts::EXE_EXTENSION);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    #[test]
    fn bundled_tools_win_over_path() {
        let exe_dir = tempfile::tempdir().unwrap();
        let path_dir = tempfile::tempdir().unwrap();
        let ffmpeg = tool_file(exe_dir.path(), "ffmpeg");
        let ffprobe = tool_file(exe_dir.path(), "ffprobe");
        tool_file(path_dir.path(), "ffmpeg");
        tool_file(path_dir.path(), "ffprobe");

        let tools =
            Toolchain::locate_in(Some(exe_dir.path()), Some(path_dir.path().as_os_str())).unwrap();
        assert_eq!(tools, Toolchain { ffmpeg, ffprobe });
    }

    #[cfg(unix)]
    #[test]
    fn falls_back_to_search_path() {
        let exe_dir = tempfile::tempdir().unwrap();
        let path_dir = tempfile::tempdir().unwrap();
        let ffprobe = tool_file(exe_dir.path(), "ffprobe");
        let ffmpeg = tool_file(path_dir.path(), "ffmpeg");

        let tools =
            Toolchain::locate_in(Some(exe_dir.path()), Some(path_dir.path().as_os_str())).unwrap();
        assert_eq!(tools, Toolchain { ffmpeg, ffprobe });
    }

    #[test]
    fn missing_tool_is_reported_by_name() {
        let exe_dir = tempfile::tempdir().unwrap();
        let path_dir = tempfile::tempdir().unwrap();
        tool_file(exe_dir.path(), "ffmpeg");

        let err = Toolchain::locate_in(Some(exe_dir.path()), Some(path_dir.path().as_os_str()))
            .unwrap_err();
        assert!(matches!(err, EncodeError::ToolMissing("ffprobe")), "{err:?}");
        assert!(matches!(
            Toolchain::locate_in(None, None),
            Err(EncodeError::ToolMissing("ffmpeg"))
        ));
    }
}
