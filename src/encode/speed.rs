use super::EncodeError;
use crate::display::format_general;

/// Per-stage range of ffmpeg's `atempo` filter.
pub const ATEMPO_MIN: f64 = 0.5;
pub const ATEMPO_MAX: f64 = 2.0;

/// Splits `factor` into `atempo` stages, each within
/// [`ATEMPO_MIN`, `ATEMPO_MAX`], whose product is `factor`. A unit factor
/// needs no stage; non-positive factors have no valid chain.
pub fn atempo_chain(factor: f64) -> Vec<f64> {
    let mut steps = Vec::new();
    if !(factor > 0.0) || !factor.is_finite() {
        return steps;
    }
    let mut rest = factor;
    while rest < ATEMPO_MIN {
        steps.push(ATEMPO_MIN);
        rest /= ATEMPO_MIN;
    }
    while rest > ATEMPO_MAX {
        steps.push(ATEMPO_MAX);
        rest /= ATEMPO_MAX;
    }
    if (rest - 1.0).abs() > 1e-6 {
        steps.push(rest);
    }
    steps
}

/// How the clip timeline maps onto the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedPlan {
    /// Keep `base_fps` output and play `speed` times faster (or slower).
    Speed { speed: f64, base_fps: u32 },
    /// Plain re-encode at `fps`, timeline untouched.
    Reencode { fps: f64 },
}

impl SpeedPlan {
    /// `target_fps` is the FPS field: in speed mode the speed is
    /// `base_fps / target_fps`, so 20 against a base of 60 is 3x.
    pub fn new(target_fps: f64, base_fps: u32, speed_mode: bool) -> Result<Self, EncodeError> {
        if !(target_fps > 0.0) || !target_fps.is_finite() {
            return Err(EncodeError::InvalidFps(target_fps));
        }
        Ok(if speed_mode {
            SpeedPlan::Speed {
                speed: f64::from(base_fps) / target_fps,
                base_fps,
            }
        } else {
            SpeedPlan::Reencode { fps: target_fps }
        })
    }

    pub fn speed(&self) -> f64 {
        match *self {
            SpeedPlan::Speed { speed, .. } => speed,
            SpeedPlan::Reencode { .. } => 1.0,
        }
    }

    /// Length of the output for `source_secs` of input.
    pub fn output_secs(&self, source_secs: f64) -> f64 {
        let speed = self.speed();
        if speed > 0.0 {
            source_secs / speed
        } else {
            source_secs
        }
    }

    pub fn video_filter(&self) -> String {
        match *self {
            SpeedPlan::Speed { speed, .. } => format!("setpts=PTS/{}", format_general(speed, 6)),
            SpeedPlan::Reencode { fps } => format!("fps={}", format_general(fps, 6)),
        }
    }

    pub fn output_rate(&self) -> String {
        match *self {
            SpeedPlan::Speed { base_fps, .. } => base_fps.to_string(),
            SpeedPlan::Reencode { fps } => format_general(fps, 6),
        }
    }

    /// `atempo=…` chain matching the video speed, `None` when the audio
    /// plays at its own pace.
    pub fn audio_filter(&self) -> Option<String> {
        let SpeedPlan::Speed { speed, .. } = *self else {
            return None;
        };
        let steps = atempo_chain(speed);
        if steps.is_empty() {
            return None;
        }
        Some(
            steps
                .iter()
                .map(|s| format!("atempo={}", format_general(*s, 6)))
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Human readable summary for the log pane.
    pub fn describe(&self) -> String {
        match *self {
            SpeedPlan::Speed { speed, base_fps } if speed >= 1.0 => format!(
                "Speed mode ON: fast-forward by {}×, output {base_fps} fps.",
                format_general(speed, 3)
            ),
            SpeedPlan::Speed { speed, base_fps } => format!(
                "Speed mode ON: slow-motion by {}×, output {base_fps} fps.",
                format_general(1.0 / speed, 3)
            ),
            SpeedPlan::Reencode { fps } => format!(
                "Re-encode mode: output frame rate = {} fps.",
                format_general(fps, 6)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn product(steps: &[f64]) -> f64 {
        steps.iter().product()
    }

    #[test]
    fn chain_stays_in_range_and_multiplies_back() {
        let mut factor = 0.01;
        while factor < 100.0 {
            let steps = atempo_chain(factor);
            for s in &steps {
                assert!(
                    (ATEMPO_MIN..=ATEMPO_MAX).contains(s),
                    "{s} out of range for {factor}"
                );
            }
            let total = if steps.is_empty() { 1.0 } else { product(&steps) };
            assert!(
                (total - factor).abs() < 1e-6 * factor.max(1.0),
                "{factor}: {steps:?}"
            );
            factor *= 1.07;
        }
    }

    #[test]
    fn common_chains() {
        assert_eq!(atempo_chain(1.0), Vec::<f64>::new());
        assert_eq!(atempo_chain(3.0), vec![2.0, 1.5]);
        assert_eq!(atempo_chain(8.0), vec![2.0, 2.0, 2.0]);
        assert_eq!(atempo_chain(0.25), vec![0.5, 0.5]);
        assert_eq!(atempo_chain(0.0), Vec::<f64>::new());
        assert_eq!(atempo_chain(-2.0), Vec::<f64>::new());
    }

    #[test]
    fn twenty_fps_is_three_times_faster() {
        let plan = SpeedPlan::new(20.0, 60, true).unwrap();
        assert_eq!(plan.speed(), 3.0);
        assert_eq!(plan.video_filter(), "setpts=PTS/3");
        assert_eq!(plan.output_rate(), "60");
        assert_eq!(plan.audio_filter().as_deref(), Some("atempo=2,atempo=1.5"));
        assert_eq!(plan.output_secs(90.0), 30.0);
        assert_eq!(
            plan.describe(),
            "Speed mode ON: fast-forward by 3×, output 60 fps."
        );
    }

    #[test]
    fn slow_motion() {
        let plan = SpeedPlan::new(120.0, 60, true).unwrap();
        assert_eq!(plan.speed(), 0.5);
        assert_eq!(plan.audio_filter().as_deref(), Some("atempo=0.5"));
        assert_eq!(plan.output_secs(10.0), 20.0);
        assert_eq!(
            plan.describe(),
            "Speed mode ON: slow-motion by 2×, output 60 fps."
        );
    }

    #[test]
    fn unit_speed_has_no_audio_filter() {
        let plan = SpeedPlan::new(60.0, 60, true).unwrap();
        assert_eq!(plan.audio_filter(), None);
    }

    #[test]
    fn reencode_mode() {
        let plan = SpeedPlan::new(29.97, 60, false).unwrap();
        assert_eq!(plan.video_filter(), "fps=29.97");
        assert_eq!(plan.output_rate(), "29.97");
        assert_eq!(plan.audio_filter(), None);
        assert_eq!(plan.output_secs(12.0), 12.0);
    }

    #[test]
    fn bad_fps_is_rejected() {
        for fps in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SpeedPlan::new(fps, 60, true),
                Err(EncodeError::InvalidFps(_))
            ));
        }
    }
}
