mod concat_window;
mod player_window;
mod preview;

pub use concat_window::ConcatWindow;
pub use player_window::PlayerWindow;
pub use preview::*;

use fltk::dialog::{self, FileDialogAction, FileDialogOptions, FileDialogType, NativeFileChooser};
use std::path::{Path, PathBuf};

pub fn show_error(title: &str, message: &str) {
    log::error!("{title}: {message}");
    dialog::message_title(title);
    dialog::alert_default(message);
}

pub fn show_warning(title: &str, message: &str) {
    log::warn!("{title}: {message}");
    dialog::message_title(title);
    dialog::alert_default(message);
}

pub fn show_info(title: &str, message: &str) {
    dialog::message_title(title);
    dialog::message_default(message);
}

/// Native folder picker. `None` when cancelled.
pub fn pick_folder(title: &str, start: Option<&Path>) -> Option<PathBuf> {
    let mut chooser = NativeFileChooser::new(FileDialogType::BrowseDir);
    chooser.set_title(title);
    if let Some(dir) = start.filter(|dir| dir.is_dir()) {
        if let Err(err) = chooser.set_directory(&dir) {
            log::debug!("failed to preselect \"{}\": {err}", dir.display());
        }
    }
    finish_choice(chooser)
}

/// Native save-as picker for an `.mp4` output.
pub fn pick_save_file(title: &str, suggested: &str) -> Option<PathBuf> {
    let mut chooser = NativeFileChooser::new(FileDialogType::BrowseSaveFile);
    chooser.set_title(title);
    chooser.set_option(FileDialogOptions::SaveAsConfirm);
    chooser.set_filter("MP4 video\t*.mp4");
    chooser.set_preset_file(suggested);
    finish_choice(chooser).map(|path| {
        if path.extension().is_none() {
            path.with_extension("mp4")
        } else {
            path
        }
    })
}

fn finish_choice(mut chooser: NativeFileChooser) -> Option<PathBuf> {
    match chooser.try_show() {
        Ok(FileDialogAction::Success) => {
            let path = chooser.filename();
            (!path.as_os_str().is_empty()).then_some(path)
        }
        Ok(_) => None,
        Err(err) => {
            show_error("Dialog failed", &format!("Could not open the file dialog:\n{err}"));
            None
        }
    }
}
