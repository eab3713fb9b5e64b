use crate::{
    catalog::{ClipIndex, FrameNum},
    display::{format_clock, format_general, group_thousands},
    settings::{IDLE_TICK_MS, SPEED_CHOICES},
};
use std::time::Duration;

/// What the player should do after a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to show; check again after the idle delay.
    Idle,
    /// Fetch and display this global frame.
    Show(FrameNum),
    /// The end was reached without looping; playback paused.
    Stopped,
}

/// Playback position and controls, independent of any decoder or widget.
#[derive(Debug, Clone)]
pub struct Playhead {
    position: FrameNum,
    playing: bool,
    looping: bool,
    speed: f64,
    scrubbing: bool,
}

impl Default for Playhead {
    fn default() -> Self {
        Self {
            position: FrameNum::ZERO,
            playing: false,
            looping: true,
            speed: 1.0,
            scrubbing: false,
        }
    }
}

impl Playhead {
    pub fn position(&self) -> FrameNum {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    pub fn set_scrubbing(&mut self, scrubbing: bool) {
        self.scrubbing = scrubbing;
    }

    /// Back to the first frame, paused. Used when a new folder is loaded.
    pub fn reset(&mut self) {
        self.position = FrameNum::ZERO;
        self.playing = false;
        self.scrubbing = false;
    }

    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Clamps `frame` into the index and makes it the current frame.
    pub fn seek(&mut self, index: &ClipIndex, frame: FrameNum) -> FrameNum {
        self.position = index.clamp(frame);
        self.position
    }

    /// Pauses and moves `delta` frames, staying inside the index.
    pub fn step(&mut self, index: &ClipIndex, delta: i64) -> FrameNum {
        self.playing = false;
        let target = self.position.saturating_offset(delta);
        self.seek(index, target)
    }

    /// Advances playback by one frame when playing.
    pub fn tick(&mut self, index: &ClipIndex) -> Tick {
        if !self.playing || !index.has_frames() {
            return Tick::Idle;
        }
        let next = self.position + FrameNum(1);
        if next.0 < index.total_frames() {
            self.position = next;
            Tick::Show(next)
        } else if self.looping {
            self.position = FrameNum::ZERO;
            Tick::Show(FrameNum::ZERO)
        } else {
            self.playing = false;
            Tick::Stopped
        }
    }

    /// The frame at the playhead could not be decoded. While playing, the
    /// rest of that clip is skipped. A paused playhead stays where the user
    /// put it, so stepping backwards can still reach earlier frames.
    pub fn frame_missing(&mut self, index: &ClipIndex) -> Tick {
        if self.playing {
            self.skip_clip(index)
        } else {
            Tick::Idle
        }
    }

    /// The current clip ran out of frames before its probed count. Moves to
    /// the next clip's first frame, or handles the end of the folder.
    pub fn skip_clip(&mut self, index: &ClipIndex) -> Tick {
        let clip = index.locate(self.position).clip;
        match index.next_clip_start(clip) {
            Some(start) => {
                self.position = start;
                Tick::Show(start)
            }
            None if self.looping && self.playing => {
                self.position = FrameNum::ZERO;
                Tick::Show(FrameNum::ZERO)
            }
            None => {
                self.playing = false;
                Tick::Stopped
            }
        }
    }

    /// Delay until the next tick: one frame of the current clip at the
    /// current speed while playing, the idle period otherwise.
    pub fn tick_delay(&self, index: &ClipIndex) -> Duration {
        if !self.playing || !index.has_frames() {
            return Duration::from_millis(IDLE_TICK_MS);
        }
        let fps = index
            .clip(index.locate(self.position).clip)
            .map(|c| c.fps())
            .unwrap_or(crate::catalog::FALLBACK_FPS);
        let effective = (fps * self.speed.max(0.01)).max(1.0);
        let millis = (1000.0 / effective).round().max(1.0) as u64;
        Duration::from_millis(millis)
    }

    /// Sets the speed, clamped to the offered range.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        let (lo, hi) = (SPEED_CHOICES[0], SPEED_CHOICES[SPEED_CHOICES.len() - 1]);
        self.speed = if speed.is_finite() {
            speed.clamp(lo, hi)
        } else {
            1.0
        };
        self.speed
    }

    /// Index into [`SPEED_CHOICES`] nearest to the current speed.
    pub fn speed_choice(&self) -> usize {
        SPEED_CHOICES
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - self.speed)
                    .abs()
                    .total_cmp(&(*b - self.speed).abs())
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Moves `step` choices away from the nearest one.
    pub fn nudge_speed(&mut self, step: i32) -> f64 {
        let idx = (self.speed_choice() as i64 + i64::from(step))
            .clamp(0, SPEED_CHOICES.len() as i64 - 1) as usize;
        self.set_speed(SPEED_CHOICES[idx])
    }

    /// `Frame 1 / 1,800   |   00:00.00 / 01:00.00   |   1×`
    pub fn status_text(&self, index: &ClipIndex, frame: Option<FrameNum>) -> String {
        if !index.has_frames() {
            return String::new();
        }
        let frame = index.clamp(frame.unwrap_or(self.position));
        format!(
            "Frame {} / {}   |   {} / {}   |   {}×",
            group_thousands(frame.0 + 1),
            group_thousands(index.total_frames()),
            format_clock(index.time_at(frame)),
            format_clock(index.total_secs()),
            speed_label(self.speed)
        )
    }
}

pub fn speed_label(speed: f64) -> String {
    format_general(speed, 3)
}

/// `3 clips | 5,400 frames | 03:00.00 total`
pub fn info_text(index: &ClipIndex) -> String {
    format!(
        "{} clips | {} frames | {} total",
        index.clip_count(),
        group_thousands(index.total_frames()),
        format_clock(index.total_secs())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ClipProbe, ClipRate};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn index() -> ClipIndex {
        ClipIndex::build([
            ClipProbe {
                path: PathBuf::from("a.mp4"),
                rate: ClipRate::new(30, 1),
                frame_count: 3,
                width: 1920,
                height: 1080,
            },
            ClipProbe {
                path: PathBuf::from("b.mp4"),
                rate: ClipRate::new(60, 1),
                frame_count: 2,
                width: 1920,
                height: 1080,
            },
        ])
        .unwrap()
    }

    #[test]
    fn paused_ticks_are_idle() {
        let idx = index();
        let mut head = Playhead::default();
        assert_eq!(head.tick(&idx), Tick::Idle);
        assert_eq!(head.tick_delay(&idx), Duration::from_millis(33));
    }

    #[test]
    fn plays_across_clips_and_loops() {
        let idx = index();
        let mut head = Playhead::default();
        head.toggle_play();
        let shown: Vec<Tick> = (0..5).map(|_| head.tick(&idx)).collect();
        assert_eq!(
            shown,
            vec![
                Tick::Show(FrameNum(1)),
                Tick::Show(FrameNum(2)),
                Tick::Show(FrameNum(3)),
                Tick::Show(FrameNum(4)),
                Tick::Show(FrameNum(0)),
            ]
        );
        assert!(head.is_playing());
    }

    #[test]
    fn stops_at_end_without_loop() {
        let idx = index();
        let mut head = Playhead::default();
        head.set_looping(false);
        head.seek(&idx, FrameNum(4));
        head.toggle_play();
        assert_eq!(head.tick(&idx), Tick::Stopped);
        assert!(!head.is_playing());
        assert_eq!(head.position(), FrameNum(4));
    }

    #[test]
    fn step_pauses_and_clamps() {
        let idx = index();
        let mut head = Playhead::default();
        head.toggle_play();
        assert_eq!(head.step(&idx, -1), FrameNum(0));
        assert!(!head.is_playing());
        assert_eq!(head.step(&idx, 100), FrameNum(4));
        assert_eq!(head.step(&idx, -1), FrameNum(3));
    }

    #[test]
    fn skip_clip_moves_to_next_start() {
        let idx = index();
        let mut head = Playhead::default();
        head.toggle_play();
        head.seek(&idx, FrameNum(1));
        assert_eq!(head.skip_clip(&idx), Tick::Show(FrameNum(3)));
        assert_eq!(head.skip_clip(&idx), Tick::Show(FrameNum(0)));
        head.set_looping(false);
        head.seek(&idx, FrameNum(3));
        assert_eq!(head.skip_clip(&idx), Tick::Stopped);
    }

    #[test]
    fn paused_playhead_stays_on_missing_frames() {
        let idx = ClipIndex::build([
            ClipProbe {
                path: PathBuf::from("short.mp4"),
                rate: ClipRate::new(30, 1),
                frame_count: 10,
                width: 1920,
                height: 1080,
            },
            ClipProbe {
                path: PathBuf::from("next.mp4"),
                rate: ClipRate::new(30, 1),
                frame_count: 10,
                width: 1920,
                height: 1080,
            },
        ])
        .unwrap();
        // the first clip only decodes frames 0..8
        let decodable = |frame: FrameNum| frame.0 < 8 || frame.0 >= 10;

        let mut head = Playhead::default();
        head.seek(&idx, FrameNum(10));
        let mut visited = Vec::new();
        for _ in 0..3 {
            let frame = head.step(&idx, -1);
            if !decodable(frame) {
                assert_eq!(head.frame_missing(&idx), Tick::Idle);
            }
            visited.push(head.position());
        }
        assert_eq!(visited, vec![FrameNum(9), FrameNum(8), FrameNum(7)]);
    }

    #[test]
    fn playing_skips_past_missing_frames() {
        let idx = index();
        let mut head = Playhead::default();
        head.toggle_play();
        head.seek(&idx, FrameNum(2));
        assert_eq!(head.frame_missing(&idx), Tick::Show(FrameNum(3)));
        assert_eq!(head.position(), FrameNum(3));
    }

    #[test]
    fn delay_follows_clip_rate_and_speed() {
        let idx = index();
        let mut head = Playhead::default();
        head.toggle_play();
        assert_eq!(head.tick_delay(&idx), Duration::from_millis(33));
        head.set_speed(2.0);
        assert_eq!(head.tick_delay(&idx), Duration::from_millis(17));
        head.seek(&idx, FrameNum(3));
        assert_eq!(head.tick_delay(&idx), Duration::from_millis(8));
        head.set_speed(0.25);
        assert_eq!(head.tick_delay(&idx), Duration::from_millis(67));
    }

    #[test]
    fn speed_is_clamped_and_nudged() {
        let mut head = Playhead::default();
        assert_eq!(head.set_speed(10.0), 4.0);
        assert_eq!(head.set_speed(0.01), 0.25);
        assert_eq!(head.nudge_speed(-1), 0.25);
        head.set_speed(1.1);
        assert_eq!(head.nudge_speed(1), 1.25);
        assert_eq!(head.nudge_speed(-1), 1.0);
        head.set_speed(4.0);
        assert_eq!(head.nudge_speed(1), 4.0);
    }

    #[test]
    fn status_line() {
        let idx = index();
        let mut head = Playhead::default();
        head.seek(&idx, FrameNum(4));
        assert_eq!(
            head.status_text(&idx, None),
            "Frame 5 / 5   |   00:00.12 / 00:00.13   |   1×"
        );
        assert_eq!(info_text(&idx), "2 clips | 5 frames | 00:00.13 total");
        assert_eq!(head.status_text(&ClipIndex::default(), None), "");
    }
}
