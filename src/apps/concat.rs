use crate::{
    APP_TITLE_AND_VERSION, CONCAT_WINDOW_TITLE,
    catalog::{CatalogError, scan_clips},
    encode::{ConcatJob, JobEvent, ProgressTracker, SpeedPlan, Toolchain, tools::install_hint},
    settings::{ConcatSettings, DEFAULT_OUTPUT_NAME},
    ui::{self, ConcatWindow},
};
use fltk::{
    app::{self, Sender},
    enums::Event,
    prelude::*,
};
use log::{debug, info, warn};
use std::{
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};
use thiserror::Error;

#[derive(Debug, Clone)]
pub enum ConcatEvent {
    PickFolder,
    PickOutput,
    Start,
    Quit,
    CloseRequested,
    Job(JobEvent),
    Finished(JobOutcome),
}

/// How the worker thread ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Exited { success: bool, code: Option<i32> },
    Failed(String),
}

/// Form problems, checked in this order before anything runs.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Please select the folder containing your MP4 clips.")]
    MissingFolder,
    #[error("That path is not a folder.")]
    InvalidFolder,
    #[error("Please choose an output file path.")]
    MissingOutput,
    #[error("Please enter a positive number (e.g., 60 or 20).")]
    InvalidFps,
}

impl FormError {
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingFolder => "Missing folder",
            Self::InvalidFolder => "Invalid folder",
            Self::MissingOutput => "Missing output",
            Self::InvalidFps => "Invalid FPS",
        }
    }
}

/// The form after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatForm {
    pub folder: PathBuf,
    pub output: PathBuf,
    pub fps: f64,
    pub speed_mode: bool,
    pub keep_audio: bool,
}

impl ConcatForm {
    /// An empty FPS field means the base output rate.
    pub fn validate(
        folder: &str,
        output: &str,
        fps: &str,
        speed_mode: bool,
        keep_audio: bool,
        base_output_fps: u32,
    ) -> Result<Self, FormError> {
        let folder = folder.trim();
        if folder.is_empty() {
            return Err(FormError::MissingFolder);
        }
        let folder = PathBuf::from(folder);
        if !folder.is_dir() {
            return Err(FormError::InvalidFolder);
        }
        let output = output.trim();
        if output.is_empty() {
            return Err(FormError::MissingOutput);
        }
        let fps = match fps.trim() {
            "" => f64::from(base_output_fps),
            text => text
                .parse::<f64>()
                .ok()
                .filter(|fps| fps.is_finite() && *fps > 0.0)
                .ok_or(FormError::InvalidFps)?,
        };
        Ok(Self {
            folder,
            output: PathBuf::from(output),
            fps,
            speed_mode,
            keep_audio,
        })
    }
}

pub fn suggested_output(folder: &Path) -> PathBuf {
    folder.join(DEFAULT_OUTPUT_NAME)
}

pub struct ConcatApp {
    fltk_app: app::App,
    event_sender: Sender<ConcatEvent>,
    event_receiver: app::Receiver<ConcatEvent>,
    ui: ConcatWindow,
    base_output_fps: u32,
    tracker: ProgressTracker,
    /// Output path of the run in progress.
    running: Option<PathBuf>,
    worker: Option<JoinHandle<()>>,
}

impl ConcatApp {
    pub fn new(settings: ConcatSettings) -> Self {
        info!("starting up!");
        info!("{APP_TITLE_AND_VERSION}");

        let fltk_app = app::App::default().with_scheme(app::Scheme::Oxy);
        let (event_sender, event_receiver) = app::channel::<ConcatEvent>();

        let mut ui = ConcatWindow::make_window();
        ui.apply(&settings);
        Self::init_main_window(&mut ui, event_sender);
        ui.main_window.show();
        info!("initialized main window");

        if !Toolchain::available() {
            ui::show_warning(
                "ffmpeg/ffprobe not found",
                &format!(
                    "ffmpeg (and ffprobe) are not on your PATH.\n\n{}",
                    install_hint()
                ),
            );
        }

        Self {
            fltk_app,
            event_sender,
            event_receiver,
            ui,
            base_output_fps: settings.base_output_fps,
            tracker: ProgressTracker::default(),
            running: None,
            worker: None,
        }
    }

    fn init_main_window(ui: &mut ConcatWindow, event_sender: Sender<ConcatEvent>) {
        ui.main_window.set_label(CONCAT_WINDOW_TITLE);
        ui.main_window.clone().center_screen();
        ui.main_window.set_callback(move |_| {
            if app::event() == Event::Close {
                event_sender.send(ConcatEvent::CloseRequested);
            }
        });

        ui.folder_button.emit(event_sender, ConcatEvent::PickFolder);
        ui.output_button.emit(event_sender, ConcatEvent::PickOutput);
        ui.start_button.emit(event_sender, ConcatEvent::Start);
        ui.quit_button.emit(event_sender, ConcatEvent::Quit);
    }

    pub fn run_loop(&mut self) {
        while self.fltk_app.wait() {
            while let Some(event) = self.event_receiver.recv() {
                match event {
                    ConcatEvent::PickFolder => self.pick_folder(),
                    ConcatEvent::PickOutput => self.pick_output(),
                    ConcatEvent::Start => self.start(),
                    ConcatEvent::Quit | ConcatEvent::CloseRequested => self.quit(),
                    ConcatEvent::Job(event) => self.on_job_event(event),
                    ConcatEvent::Finished(outcome) => self.on_finished(outcome),
                }
            }
        }
    }

    fn quit(&mut self) {
        if self.running.is_some() {
            debug!("ignoring quit while ffmpeg is running");
            return;
        }
        app::quit();
    }

    fn pick_folder(&mut self) {
        let current = PathBuf::from(self.ui.folder_input.value().trim());
        let Some(folder) = ui::pick_folder("Select folder with MP4 clips", Some(current.as_path())) else {
            return;
        };
        info!("selected folder \"{}\"", folder.display());
        self.ui.folder_input.set_value(&folder.to_string_lossy());
        if self.ui.output_input.value().trim().is_empty() {
            self.ui
                .output_input
                .set_value(&suggested_output(&folder).to_string_lossy());
        }
    }

    fn pick_output(&mut self) {
        if let Some(path) = ui::pick_save_file("Save output video as", DEFAULT_OUTPUT_NAME) {
            self.ui.output_input.set_value(&path.to_string_lossy());
        }
    }

    fn start(&mut self) {
        if self.running.is_some() {
            return;
        }

        let form = match ConcatForm::validate(
            &self.ui.folder_input.value(),
            &self.ui.output_input.value(),
            &self.ui.fps_input.value(),
            self.ui.speed_check.is_checked(),
            self.ui.audio_check.is_checked(),
            self.base_output_fps,
        ) {
            Ok(form) => form,
            Err(err) => return ui::show_error(err.title(), &err.to_string()),
        };
        let tools = match Toolchain::locate() {
            Ok(tools) => tools,
            Err(err) => {
                warn!("{err}");
                return ui::show_error(
                    "ffmpeg not found",
                    "ffmpeg/ffprobe are not on your PATH. Please install and try again.",
                );
            }
        };
        let clips = match scan_clips(&form.folder) {
            Ok(clips) => clips,
            Err(CatalogError::NoClips(_)) => {
                return ui::show_error(
                    "No MP4 files",
                    "No .mp4/.MP4 files found in the selected folder.",
                );
            }
            Err(err) => return ui::show_error("Invalid folder", &format!("{err}")),
        };
        let plan = match SpeedPlan::new(form.fps, self.base_output_fps, form.speed_mode) {
            Ok(plan) => plan,
            Err(err) => return ui::show_error(FormError::InvalidFps.title(), &err.to_string()),
        };

        let job = ConcatJob {
            tools,
            clips,
            output: form.output.clone(),
            plan,
            keep_audio: form.keep_audio,
        };
        info!(
            "concatenating {} clips into \"{}\"",
            job.clips.len(),
            job.output.display()
        );

        self.tracker = ProgressTracker::default();
        self.ui.set_progress(0.0, "0%");
        self.ui.set_busy(true);
        self.running = Some(form.output);

        let sender = self.event_sender;
        self.worker = Some(thread::spawn(move || {
            let outcome = match job.run(|event| sender.send(ConcatEvent::Job(event))) {
                Ok(status) => JobOutcome::Exited {
                    success: status.success(),
                    code: status.code(),
                },
                Err(err) => JobOutcome::Failed(format!("{:#}", anyhow::Error::from(err))),
            };
            sender.send(ConcatEvent::Finished(outcome));
        }));
    }

    fn on_job_event(&mut self, event: JobEvent) {
        match event {
            JobEvent::Log(line) => {
                debug!("{line}");
                self.ui.append_log(&line);
            }
            JobEvent::Total(secs) => {
                self.tracker = ProgressTracker::new(secs);
                self.ui.set_progress(0.0, &self.tracker.label());
            }
            JobEvent::Progress(secs) => {
                self.tracker.record(secs);
                if let Some(percent) = self.tracker.percent() {
                    self.ui.set_progress(percent, &self.tracker.label());
                }
            }
        }
    }

    fn on_finished(&mut self, outcome: JobOutcome) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("concat worker panicked");
            }
        }
        let output = self.running.take().unwrap_or_default();

        self.tracker.finish();
        let label = if self.tracker.is_determinate() {
            self.tracker.label()
        } else {
            "100%".to_string()
        };
        self.ui.set_progress(100.0, &label);
        self.ui.set_busy(false);

        match outcome {
            JobOutcome::Exited { success: true, .. } => {
                info!("wrote \"{}\"", output.display());
                self.ui.append_log("Done!");
                ui::show_info(
                    "Success",
                    &format!("Finished!\nSaved to:\n{}", output.display()),
                );
            }
            JobOutcome::Exited { code, .. } => {
                let line = match code {
                    Some(code) => format!("ffmpeg exited with code {code}. See log above."),
                    None => "ffmpeg was terminated. See log above.".to_string(),
                };
                self.ui.append_log(&line);
                ui::show_error(
                    "Failed",
                    "ffmpeg reported an error. Check the log for details.",
                );
            }
            JobOutcome::Failed(err) => {
                self.ui.append_log(&format!("Error: {err}"));
                ui::show_error("Failed", &format!("The concatenation could not run:\n{err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validation_order() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().to_string_lossy().into_owned();
        let file = dir.path().join("a.mp4");
        std::fs::write(&file, b"").unwrap();

        let check = |folder: &str, output: &str, fps: &str| {
            ConcatForm::validate(folder, output, fps, true, true, 60).map_err(|e| e.title())
        };
        assert_eq!(check(" ", "", "x"), Err("Missing folder"));
        assert_eq!(check(&file.to_string_lossy(), "", "x"), Err("Invalid folder"));
        assert_eq!(check(&folder, "  ", "x"), Err("Missing output"));
        assert_eq!(check(&folder, "out.mp4", "x"), Err("Invalid FPS"));
        assert_eq!(check(&folder, "out.mp4", "0"), Err("Invalid FPS"));
        assert_eq!(check(&folder, "out.mp4", "-5"), Err("Invalid FPS"));
        assert_eq!(check(&folder, "out.mp4", "inf"), Err("Invalid FPS"));
    }

    #[test]
    fn valid_form() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().to_string_lossy().into_owned();
        let form = ConcatForm::validate(&folder, " out.mp4 ", " 20 ", true, false, 60).unwrap();
        assert_eq!(
            form,
            ConcatForm {
                folder: dir.path().to_path_buf(),
                output: PathBuf::from("out.mp4"),
                fps: 20.0,
                speed_mode: true,
                keep_audio: false,
            }
        );
    }

    #[test]
    fn empty_fps_uses_base_rate() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().to_string_lossy().into_owned();
        let form = ConcatForm::validate(&folder, "out.mp4", "", false, true, 60).unwrap();
        assert_eq!(form.fps, 60.0);
    }

    #[test]
    fn output_is_suggested_inside_folder() {
        assert_eq!(
            suggested_output(Path::new("/clips")),
            PathBuf::from("/clips/concatenated_output.mp4")
        );
    }
}
