use crate::{playback::speed_label, settings::SPEED_CHOICES};
use fltk::{
    button::{Button, CheckButton},
    enums::{Align, Color},
    frame::Frame,
    group::Group,
    input::Input,
    menu::Choice,
    prelude::*,
    valuator::HorNiceSlider,
    window::Window,
};

const WIDTH: i32 = 1000;
const HEIGHT: i32 = 720;
const PAD: i32 = 8;
const ROW_H: i32 = 28;

/// Widgets of the player window.
pub struct PlayerWindow {
    pub main_window: Window,
    pub folder_input: Input,
    pub folder_button: Button,
    pub play_button: Button,
    pub back_button: Button,
    pub forward_button: Button,
    pub loop_check: CheckButton,
    pub speed_choice: Choice,
    pub info_label: Frame,
    pub slider: HorNiceSlider,
    pub preview_group: Group,
    pub preview_subwindow: Window,
    pub status_label: Frame,
}

impl PlayerWindow {
    pub fn make_window() -> Self {
        let mut main_window = Window::new(100, 100, WIDTH, HEIGHT, None);
        let mut y = PAD;

        // folder row
        let mut folder_input = Input::new(PAD + 60, y, 560, ROW_H, "Folder:");
        folder_input.set_align(Align::Left);
        let mut folder_button = Button::new(PAD + 630, y, 100, ROW_H, "Browse…");
        y += ROW_H + PAD;

        // controls
        let mut x = PAD;
        let mut play_button = Button::new(x, y, 80, ROW_H, "Play");
        x += 80 + 4;
        let mut back_button = Button::new(x, y, 64, ROW_H, "<< -1");
        x += 64 + 2;
        let mut forward_button = Button::new(x, y, 64, ROW_H, "+1 >>");
        x += 64 + 12;
        let mut loop_check = CheckButton::new(x, y, 64, ROW_H, "Loop");
        loop_check.set_checked(true);
        x += 64 + 60;
        let mut speed_choice = Choice::new(x, y, 80, ROW_H, "Speed");
        speed_choice.set_align(Align::Left);
        for speed in SPEED_CHOICES {
            speed_choice.add_choice(&format!("{}×", speed_label(speed)));
        }
        x += 80 + 12;
        let mut info_label = Frame::new(x, y, WIDTH - x - PAD, ROW_H, "Open a folder to start");
        info_label.set_align(Align::Right | Align::Inside);
        y += ROW_H + PAD;

        let mut slider = HorNiceSlider::new(PAD, y, WIDTH - 2 * PAD, 22, None);
        slider.set_bounds(0.0, 0.0);
        slider.set_step(1.0, 1);
        slider.deactivate();
        y += 22 + PAD;

        let status_h = 24;
        let preview_h = HEIGHT - y - status_h - 2 * PAD;
        let mut preview_group = Group::new(PAD, y, WIDTH - 2 * PAD, preview_h, None);
        let mut preview_subwindow = Window::new(PAD, y, WIDTH - 2 * PAD, preview_h, None);
        preview_subwindow.set_color(Color::Black);
        preview_subwindow.end();
        preview_group.end();
        preview_group.resizable(&preview_subwindow);
        y += preview_h + PAD;

        let mut status_label = Frame::new(PAD, y, WIDTH - 2 * PAD, status_h, None);
        status_label.set_align(Align::Left | Align::Inside);

        main_window.end();
        main_window.resizable(&preview_group);

        // keys are handled by the window, not by whichever button has focus
        folder_button.clear_visible_focus();
        play_button.clear_visible_focus();
        back_button.clear_visible_focus();
        forward_button.clear_visible_focus();
        loop_check.clear_visible_focus();
        speed_choice.clear_visible_focus();
        slider.clear_visible_focus();

        Self {
            main_window,
            folder_input,
            folder_button,
            play_button,
            back_button,
            forward_button,
            loop_check,
            speed_choice,
            info_label,
            slider,
            preview_group,
            preview_subwindow,
            status_label,
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.play_button
            .set_label(if playing { "Pause" } else { "Play" });
    }

    /// Points the slider at `[0, last]`, disabled while nothing is loaded.
    pub fn set_slider_range(&mut self, last: u64) {
        self.slider.set_bounds(0.0, last as f64);
        self.slider.set_value(0.0);
        if last > 0 {
            self.slider.activate();
        } else {
            self.slider.deactivate();
        }
    }
}
