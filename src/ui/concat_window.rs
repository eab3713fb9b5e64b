use crate::settings::{BASE_OUTPUT_FPS, ConcatSettings};
use fltk::{
    button::{Button, CheckButton},
    enums::{Align, Color, Font},
    frame::Frame,
    input::Input,
    misc::Progress,
    prelude::*,
    text::{TextBuffer, TextDisplay},
    window::Window,
};

const WIDTH: i32 = 820;
const HEIGHT: i32 = 640;
const LABEL_W: i32 = 150;
const PAD: i32 = 10;
const ROW_H: i32 = 28;

/// Widgets of the concatenator window.
pub struct ConcatWindow {
    pub main_window: Window,
    pub folder_input: Input,
    pub folder_button: Button,
    pub output_input: Input,
    pub output_button: Button,
    pub fps_input: Input,
    pub speed_check: CheckButton,
    pub audio_check: CheckButton,
    pub start_button: Button,
    pub quit_button: Button,
    pub progress: Progress,
    pub progress_label: Frame,
    pub log_display: TextDisplay,
    pub log_buffer: TextBuffer,
}

impl ConcatWindow {
    pub fn make_window() -> Self {
        let mut main_window = Window::new(100, 100, WIDTH, HEIGHT, None);
        let field_x = PAD + LABEL_W;
        let field_w = WIDTH - field_x - 120;
        let button_x = field_x + field_w + PAD;
        let mut y = PAD + 2;

        let mut folder_input = Input::new(field_x, y, field_w, ROW_H, "Folder with MP4 clips:");
        folder_input.set_align(Align::Left);
        let folder_button = Button::new(button_x, y, 100, ROW_H, "Browse…");
        y += ROW_H + 6;

        let mut output_input = Input::new(field_x, y, field_w, ROW_H, "Output video file:");
        output_input.set_align(Align::Left);
        let output_button = Button::new(button_x, y, 100, ROW_H, "Save as…");
        y += ROW_H + 6;

        let mut fps_input = Input::new(field_x, y, 80, ROW_H, "FPS field:");
        fps_input.set_align(Align::Left);
        let mut fps_hint = Frame::new(field_x + 90, y, field_w - 90, ROW_H, None);
        fps_hint.set_label(&format!(
            "Enter e.g. 20 for 3× fast-forward (output stays {BASE_OUTPUT_FPS} fps in speed mode)."
        ));
        fps_hint.set_align(Align::Left | Align::Inside);
        y += ROW_H + 4;

        let speed_check = CheckButton::new(field_x, y, field_w, ROW_H, None).with_label(&format!(
            "Keep output at {BASE_OUTPUT_FPS} fps and adjust speed (fast-forward/slow-mo)"
        ));
        y += ROW_H;
        let audio_check = CheckButton::new(field_x, y, field_w, ROW_H, "Keep audio");
        y += ROW_H + 8;

        let start_button = Button::new(field_x, y, 150, ROW_H + 4, "Concatenate");
        let quit_button = Button::new(field_x + 160, y, 100, ROW_H + 4, "Quit");
        y += ROW_H + 16;

        let mut progress = Progress::new(field_x, y, field_w - 200, 22, "Progress:");
        progress.set_align(Align::Left);
        progress.set_minimum(0.0);
        progress.set_maximum(100.0);
        progress.set_selection_color(Color::from_rgb(0x3c, 0x8d, 0xdc));
        let mut progress_label = Frame::new(field_x + field_w - 190, y, 300, 22, "0%");
        progress_label.set_align(Align::Left | Align::Inside);
        y += 22 + 12;

        let mut log_label = Frame::new(PAD, y, LABEL_W, 20, "Log:");
        log_label.set_align(Align::Left | Align::Inside);
        y += 22;

        let log_buffer = TextBuffer::default();
        let mut log_display = TextDisplay::new(PAD, y, WIDTH - 2 * PAD, HEIGHT - y - PAD, None);
        log_display.set_buffer(log_buffer.clone());
        log_display.set_text_font(Font::Courier);
        log_display.set_text_size(12);

        main_window.end();
        main_window.resizable(&log_display);

        Self {
            main_window,
            folder_input,
            folder_button,
            output_input,
            output_button,
            fps_input,
            speed_check,
            audio_check,
            start_button,
            quit_button,
            progress,
            progress_label,
            log_display,
            log_buffer,
        }
    }

    /// Fills the form from settings.
    pub fn apply(&mut self, settings: &ConcatSettings) {
        if let Some(folder) = &settings.folder {
            self.folder_input.set_value(&folder.to_string_lossy());
        }
        if let Some(output) = &settings.output {
            self.output_input.set_value(&output.to_string_lossy());
        }
        self.fps_input
            .set_value(&crate::display::format_general(settings.fps, 6));
        self.speed_check.set_checked(settings.speed_mode);
        self.audio_check.set_checked(settings.keep_audio);
    }

    pub fn append_log(&mut self, line: &str) {
        self.log_buffer.append(line);
        self.log_buffer.append("\n");
        let lines = self.log_display.count_lines(0, self.log_buffer.length(), true);
        self.log_display.scroll(lines, 0);
    }

    pub fn set_progress(&mut self, percent: f64, label: &str) {
        self.progress.set_value(percent.clamp(0.0, 100.0));
        self.progress_label.set_label(label);
    }

    /// Enables or disables everything that would start or leave a run.
    pub fn set_busy(&mut self, busy: bool) {
        for button in [
            &mut self.start_button,
            &mut self.quit_button,
            &mut self.folder_button,
            &mut self.output_button,
        ] {
            if busy {
                button.deactivate();
            } else {
                button.activate();
            }
        }
    }
}
