use crate::display::format_clock;

/// One line of ffmpeg output, sorted by what the concatenator does with it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressLine {
    /// Output time reached so far, in seconds.
    OutTime(f64),
    /// `progress=continue` / `progress=end`.
    State(ProgressState),
    /// Some other `-progress` key, e.g. `frame=` or `speed=`.
    Ignored,
    /// Anything that is not part of the progress stream.
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Continue,
    End,
}

/// Keys ffmpeg writes in `-progress` blocks. Matching on these keeps
/// diagnostic lines that happen to contain `=` in the log.
const PROGRESS_KEYS: &[&str] = &[
    "frame",
    "fps",
    "bitrate",
    "total_size",
    "dup_frames",
    "drop_frames",
    "speed",
];

pub fn parse_line(raw: &str) -> Option<ProgressLine> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    let Some((key, value)) = line.split_once('=') else {
        return Some(ProgressLine::Log(line.to_string()));
    };
    let value = value.trim();

    Some(match key.trim() {
        // both carry microseconds despite the name
        "out_time_ms" | "out_time_us" => value
            .parse::<i64>()
            .map(|us| ProgressLine::OutTime(us.max(0) as f64 / 1_000_000.0))
            .unwrap_or(ProgressLine::Ignored),
        "out_time" => parse_clock(value)
            .map(ProgressLine::OutTime)
            .unwrap_or(ProgressLine::Ignored),
        "progress" => match value {
            "end" => ProgressLine::State(ProgressState::End),
            _ => ProgressLine::State(ProgressState::Continue),
        },
        k if PROGRESS_KEYS.contains(&k) || k.starts_with("stream_") => ProgressLine::Ignored,
        _ => ProgressLine::Log(line.to_string()),
    })
}

/// `HH:MM:SS(.ffffff)` -> seconds.
fn parse_clock(value: &str) -> Option<f64> {
    let mut parts = value.trim_start_matches('-').splitn(3, ':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if value.starts_with('-') {
        return Some(0.0);
    }
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Keeps progress samples of a single run from moving backwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressTracker {
    done_secs: f64,
    total_secs: f64,
}

impl ProgressTracker {
    pub fn new(total_secs: f64) -> Self {
        Self {
            done_secs: 0.0,
            total_secs: total_secs.max(0.0),
        }
    }

    /// Records a sample and returns the (non-decreasing) seconds done.
    pub fn record(&mut self, secs: f64) -> f64 {
        if secs.is_finite() && secs > self.done_secs {
            self.done_secs = secs;
        }
        self.done_secs
    }

    pub fn done_secs(&self) -> f64 {
        self.done_secs
    }

    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    pub fn is_determinate(&self) -> bool {
        self.total_secs > 0.0
    }

    /// Percentage done, capped at 100. `None` without a known total.
    pub fn percent(&self) -> Option<f64> {
        self.is_determinate()
            .then(|| (self.done_secs * 100.0 / self.total_secs).min(100.0))
    }

    pub fn finish(&mut self) {
        self.done_secs = self.done_secs.max(self.total_secs);
    }

    /// `12.5% (00:01.25 / 00:10.00)`, or `Working…` without a total.
    pub fn label(&self) -> String {
        match self.percent() {
            Some(pct) => format!(
                "{pct:.1}% ({} / {})",
                format_clock(self.done_secs),
                format_clock(self.total_secs)
            ),
            None => "Working…".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn out_time_ms_is_microseconds() {
        assert_eq!(
            parse_line("out_time_ms=1500000"),
            Some(ProgressLine::OutTime(1.5))
        );
        assert_eq!(
            parse_line("out_time_us=250000\n"),
            Some(ProgressLine::OutTime(0.25))
        );
    }

    #[test]
    fn out_time_clock() {
        assert_eq!(
            parse_line("out_time=01:02:03.500000"),
            Some(ProgressLine::OutTime(3723.5))
        );
        assert_eq!(
            parse_line("out_time=-577014:32:22.775808"),
            Some(ProgressLine::OutTime(0.0))
        );
    }

    #[test]
    fn huge_clock_hours_stay_finite() {
        assert_eq!(
            parse_line("out_time=6000000000000000:00:00.000000"),
            Some(ProgressLine::OutTime(2.16e19))
        );
    }

    #[test]
    fn unusable_times_are_ignored() {
        assert_eq!(parse_line("out_time_ms=N/A"), Some(ProgressLine::Ignored));
        assert_eq!(parse_line("out_time=N/A"), Some(ProgressLine::Ignored));
    }

    #[test]
    fn other_progress_keys_are_swallowed() {
        for line in [
            "frame=120",
            "fps=59.94",
            "bitrate=4000.1kbits/s",
            "total_size=1048576",
            "speed=2.01x",
            "stream_0_0_q=28.0",
            "dup_frames=0",
        ] {
            assert_eq!(parse_line(line), Some(ProgressLine::Ignored), "{line}");
        }
        assert_eq!(
            parse_line("progress=continue"),
            Some(ProgressLine::State(ProgressState::Continue))
        );
        assert_eq!(
            parse_line("progress=end"),
            Some(ProgressLine::State(ProgressState::End))
        );
    }

    #[test]
    fn diagnostics_are_logged() {
        assert_eq!(parse_line("   "), None);
        assert_eq!(
            parse_line("[mp4 @ 0x55] Non-monotonous DTS"),
            Some(ProgressLine::Log("[mp4 @ 0x55] Non-monotonous DTS".into()))
        );
        assert_eq!(
            parse_line("Output #0, mp4, to 'out.mp4':"),
            Some(ProgressLine::Log("Output #0, mp4, to 'out.mp4':".into()))
        );
    }

    #[test]
    fn tracker_never_goes_backwards() {
        let mut tracker = ProgressTracker::new(10.0);
        assert_eq!(tracker.record(2.0), 2.0);
        assert_eq!(tracker.record(1.0), 2.0);
        assert_eq!(tracker.record(f64::NAN), 2.0);
        assert_eq!(tracker.percent(), Some(20.0));
        tracker.record(50.0);
        assert_eq!(tracker.percent(), Some(100.0));
    }

    #[test]
    fn labels() {
        let mut tracker = ProgressTracker::new(10.0);
        tracker.record(1.25);
        assert_eq!(tracker.label(), "12.5% (00:01.25 / 00:10.00)");
        tracker.finish();
        assert_eq!(tracker.label(), "100.0% (00:10.00 / 00:10.00)");
        assert_eq!(ProgressTracker::new(0.0).label(), "Working…");
    }

    #[test]
    fn tracker_without_total() {
        let mut tracker = ProgressTracker::new(0.0);
        tracker.record(5.0);
        assert!(!tracker.is_determinate());
        assert_eq!(tracker.percent(), None);
    }
}
