use crate::{
    APP_TITLE_AND_VERSION, PLAYER_WINDOW_TITLE,
    catalog::{CatalogError, ClipIndex, FrameNum, scan_clips},
    ff_interop::{
        self,
        video_player::{ClipDecoder, RgbaFrame},
    },
    playback::{Playhead, Tick, info_text},
    settings::{MAX_DISPLAY_WIDTH, PlayerOpt, SPEED_CHOICES},
    ui::{self, PlayerWindow, WgpuState},
};
use anyhow::Context;
use fltk::{
    app::{self, Sender},
    enums::{CallbackTrigger, Event, Key},
    prelude::*,
};
use log::{debug, info, warn};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum PlayerEvent {
    ResizePreview(u32, u32),
    RedrawPreview,
    PickFolder,
    LoadFolder(PathBuf),
    TogglePlay,
    Step(i64),
    SetLoop(bool),
    ChooseSpeed(usize),
    NudgeSpeed(i32),
    SliderDrag(u64),
    SliderRelease(u64),
    Tick,
}

/// Key bindings of the player window.
fn key_event(key: Key, text: &str) -> Option<PlayerEvent> {
    if key == Key::Left {
        return Some(PlayerEvent::Step(-1));
    }
    if key == Key::Right {
        return Some(PlayerEvent::Step(1));
    }
    match text {
        " " => Some(PlayerEvent::TogglePlay),
        "[" => Some(PlayerEvent::NudgeSpeed(-1)),
        "]" => Some(PlayerEvent::NudgeSpeed(1)),
        _ => None,
    }
}

pub struct PlayerApp<'a> {
    fltk_app: app::App,
    event_sender: Sender<PlayerEvent>,
    event_receiver: app::Receiver<PlayerEvent>,
    ui: PlayerWindow,
    wgpu_state: WgpuState<'a>,
    index: ClipIndex,
    playhead: Playhead,
    /// Open decoder and the index of the clip it reads.
    decoder: Option<(usize, ClipDecoder)>,
}

impl PlayerApp<'_> {
    pub fn new(opt: &PlayerOpt) -> anyhow::Result<Self> {
        info!("starting up!");
        info!("{APP_TITLE_AND_VERSION}");

        let fltk_app = app::App::default().with_scheme(app::Scheme::Oxy);
        let (event_sender, event_receiver) = app::channel::<PlayerEvent>();
        info!("created fltk app");

        let mut playhead = Playhead::default();
        playhead.set_looping(!opt.no_loop);
        playhead.set_speed(opt.speed);

        let mut ui = PlayerWindow::make_window();
        Self::init_main_window(&mut ui, event_sender);
        ui.loop_check.set_checked(playhead.is_looping());
        ui.speed_choice.set_value(playhead.speed_choice() as i32);
        ui.main_window.show();
        info!("initialized main window");

        let mut preview_subwindow = ui.preview_subwindow.clone();
        preview_subwindow.resize_callback(move |_, _, _, w, h| {
            event_sender.send(PlayerEvent::ResizePreview(w as u32, h as u32));
        });
        preview_subwindow.draw(move |_| event_sender.send(PlayerEvent::RedrawPreview));
        preview_subwindow.show();
        info!("initialized preview subwindow");

        let wgpu_state = futures_lite::future::block_on(WgpuState::new(preview_subwindow))
            .context("failed to set up the preview surface")?;
        wgpu_state.redraw();
        info!("initialized wgpu & preview rendering");

        app::add_timeout3(0.01, move |_| event_sender.send(PlayerEvent::Tick));

        let mut player = Self {
            fltk_app,
            event_sender,
            event_receiver,
            ui,
            wgpu_state,
            index: ClipIndex::default(),
            playhead,
            decoder: None,
        };
        if let Some(folder) = &opt.folder {
            player.load_folder(folder.clone());
        }
        player.refresh_status();
        Ok(player)
    }

    fn init_main_window(ui: &mut PlayerWindow, event_sender: Sender<PlayerEvent>) {
        ui.main_window.set_label(PLAYER_WINDOW_TITLE);
        ui.main_window.clone().center_screen();
        ui.main_window.set_callback(|_| {
            if app::event() == Event::Close {
                app::quit();
            }
        });
        ui.main_window.handle(move |_, event| {
            if event != Event::KeyDown {
                return false;
            }
            match key_event(app::event_key(), &app::event_text()) {
                Some(msg) => {
                    event_sender.send(msg);
                    true
                }
                None => false,
            }
        });

        ui.folder_input.set_trigger(CallbackTrigger::EnterKey);
        ui.folder_input.set_callback(move |input| {
            let text = input.value();
            if !text.trim().is_empty() {
                event_sender.send(PlayerEvent::LoadFolder(PathBuf::from(text.trim())));
            }
        });
        ui.folder_button.emit(event_sender, PlayerEvent::PickFolder);
        ui.play_button.emit(event_sender, PlayerEvent::TogglePlay);
        ui.back_button.emit(event_sender, PlayerEvent::Step(-1));
        ui.forward_button.emit(event_sender, PlayerEvent::Step(1));
        ui.loop_check.set_callback(move |check| {
            event_sender.send(PlayerEvent::SetLoop(check.is_checked()));
        });
        ui.speed_choice.set_callback(move |choice| {
            if let Ok(idx) = usize::try_from(choice.value()) {
                event_sender.send(PlayerEvent::ChooseSpeed(idx));
            }
        });

        ui.slider
            .set_trigger(CallbackTrigger::Changed | CallbackTrigger::Release);
        ui.slider.set_callback(move |slider| {
            let frame = slider.value().round().max(0.0) as u64;
            if app::event() == Event::Released {
                event_sender.send(PlayerEvent::SliderRelease(frame));
            } else {
                event_sender.send(PlayerEvent::SliderDrag(frame));
            }
        });
    }

    pub fn run_loop(&mut self) {
        while self.fltk_app.wait() {
            while let Some(event) = self.event_receiver.recv() {
                match event {
                    PlayerEvent::ResizePreview(width, height) => {
                        self.wgpu_state.resize_surface(width, height);
                        self.wgpu_state.redraw();
                    }
                    PlayerEvent::RedrawPreview => self.wgpu_state.redraw(),
                    PlayerEvent::PickFolder => self.pick_folder(),
                    PlayerEvent::LoadFolder(folder) => self.load_folder(folder),
                    PlayerEvent::TogglePlay => self.toggle_play(),
                    PlayerEvent::Step(delta) => self.step(delta),
                    PlayerEvent::SetLoop(looping) => self.playhead.set_looping(looping),
                    PlayerEvent::ChooseSpeed(idx) => {
                        if let Some(&speed) = SPEED_CHOICES.get(idx) {
                            self.set_speed(speed);
                        }
                    }
                    PlayerEvent::NudgeSpeed(step) => {
                        self.playhead.nudge_speed(step);
                        self.sync_speed();
                    }
                    PlayerEvent::SliderDrag(frame) => self.scrub(FrameNum(frame)),
                    PlayerEvent::SliderRelease(frame) => self.seek(FrameNum(frame)),
                    PlayerEvent::Tick => self.on_tick(),
                }
            }
        }
    }

    fn pick_folder(&mut self) {
        let current = PathBuf::from(self.ui.folder_input.value().trim());
        if let Some(folder) = ui::pick_folder("Select folder with MP4 clips", Some(current.as_path())) {
            self.load_folder(folder);
        }
    }

    fn load_folder(&mut self, folder: PathBuf) {
        info!("loading folder \"{}\"", folder.display());
        self.ui.folder_input.set_value(&folder.to_string_lossy());
        self.decoder = None;

        let paths = match scan_clips(&folder) {
            Ok(paths) => paths,
            Err(CatalogError::NoClips(_)) => {
                return ui::show_error("No videos", "No .mp4/.MP4 files found in that folder.");
            }
            Err(err) => return ui::show_error("Invalid folder", &err.to_string()),
        };
        let (probes, skipped) = ff_interop::probe_clips(&paths);
        if !skipped.is_empty() {
            warn!("{} of {} clips could not be opened", skipped.len(), paths.len());
        }
        self.index = match ClipIndex::build(probes) {
            Ok(index) => index,
            Err(err) => {
                debug!("{err}");
                return ui::show_error("No frames", "Could not read frames from any file.");
            }
        };
        info!("{}", info_text(&self.index));

        self.playhead.reset();
        self.ui.set_playing(false);
        self.ui.set_slider_range(self.index.last_frame().0);
        self.ui.info_label.set_label(&info_text(&self.index));
        self.wgpu_state.clear_frame();
        self.show_frame(FrameNum::ZERO);
    }

    fn toggle_play(&mut self) {
        if !self.index.has_frames() {
            return;
        }
        let playing = self.playhead.toggle_play();
        self.ui.set_playing(playing);
    }

    fn step(&mut self, delta: i64) {
        if !self.index.has_frames() {
            return;
        }
        let frame = self.playhead.step(&self.index, delta);
        self.ui.set_playing(false);
        self.show_frame(frame);
    }

    fn set_speed(&mut self, speed: f64) {
        self.playhead.set_speed(speed);
        self.sync_speed();
    }

    fn sync_speed(&mut self) {
        self.ui
            .speed_choice
            .set_value(self.playhead.speed_choice() as i32);
        self.refresh_status();
    }

    fn scrub(&mut self, frame: FrameNum) {
        if !self.index.has_frames() {
            return;
        }
        self.playhead.set_scrubbing(true);
        let status = self.playhead.status_text(&self.index, Some(frame));
        self.set_status(&status);
    }

    fn seek(&mut self, frame: FrameNum) {
        self.playhead.set_scrubbing(false);
        if !self.index.has_frames() {
            return;
        }
        let frame = self.playhead.seek(&self.index, frame);
        self.show_frame(frame);
    }

    fn on_tick(&mut self) {
        if !self.playhead.is_scrubbing() {
            let tick = self.playhead.tick(&self.index);
            self.apply_tick(tick);
        }
        let delay = self.playhead.tick_delay(&self.index);
        let sender = self.event_sender;
        app::add_timeout3(delay.as_secs_f64(), move |_| sender.send(PlayerEvent::Tick));
    }

    fn apply_tick(&mut self, tick: Tick) {
        match tick {
            Tick::Idle => {}
            Tick::Show(frame) => self.show_frame(frame),
            Tick::Stopped => {
                self.ui.set_playing(false);
                self.refresh_status();
            }
        }
    }

    /// Decodes and displays `frame`, which must be the playhead position.
    /// During playback, clips that run out early hand over to the next clip.
    fn show_frame(&mut self, frame: FrameNum) {
        let mut target = frame;
        for _ in 0..=self.index.clip_count() {
            match self.fetch(target) {
                Ok(Some(rgba)) => {
                    self.wgpu_state.upload_frame(&rgba);
                    self.wgpu_state.redraw();
                    if !self.playhead.is_scrubbing() {
                        self.ui.slider.set_value(target.0 as f64);
                    }
                    self.refresh_status();
                    return;
                }
                Ok(None) => debug!("clip ended before frame {target}"),
                Err(err) => {
                    warn!("failed to read frame {target}: {err:#}");
                    self.decoder = None;
                }
            }
            match self.playhead.frame_missing(&self.index) {
                Tick::Show(next) if next != target => target = next,
                Tick::Stopped => {
                    self.ui.set_playing(false);
                    break;
                }
                _ => break,
            }
        }
        if !self.playhead.is_scrubbing() {
            self.ui.slider.set_value(self.playhead.position().0 as f64);
        }
        self.refresh_status();
    }

    fn fetch(&mut self, frame: FrameNum) -> anyhow::Result<Option<RgbaFrame>> {
        let pos = self.index.locate(frame);
        let clip = self
            .index
            .clip(pos.clip)
            .with_context(|| format!("no clip holds frame {frame}"))?;
        if !matches!(&self.decoder, Some((idx, _)) if *idx == pos.clip) {
            self.decoder = None;
            let decoder = ClipDecoder::open(clip, MAX_DISPLAY_WIDTH)?;
            info!("opened \"{}\"", decoder.path().display());
            self.decoder = Some((pos.clip, decoder));
        }
        let Some((_, decoder)) = self.decoder.as_mut() else {
            return Ok(None);
        };
        decoder.seek(pos.local)?;
        decoder.read_frame()
    }

    fn refresh_status(&mut self) {
        let status = self.playhead.status_text(&self.index, None);
        self.set_status(&status);
    }

    fn set_status(&mut self, status: &str) {
        self.ui.status_label.set_label(status);
        self.ui.main_window.redraw();
    }
}
