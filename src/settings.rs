use clap::Parser;
use std::path::PathBuf;

/// Output frame rate the concatenator keeps in speed mode.
pub const BASE_OUTPUT_FPS: u32 = 60;
pub const DEFAULT_OUTPUT_NAME: &str = "concatenated_output.mp4";

/// Speed multipliers offered by the player, ascending.
pub const SPEED_CHOICES: [f64; 9] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 3.0, 4.0];
/// Timer period while nothing is playing.
pub const IDLE_TICK_MS: u64 = 33;
/// Decoded frames wider than this are scaled down before display.
pub const MAX_DISPLAY_WIDTH: u32 = 960;

/// Concatenator form defaults, possibly prefilled from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatSettings {
    pub folder: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub fps: f64,
    pub speed_mode: bool,
    pub keep_audio: bool,
    pub base_output_fps: u32,
}

impl Default for ConcatSettings {
    fn default() -> Self {
        Self {
            folder: None,
            output: None,
            fps: f64::from(BASE_OUTPUT_FPS),
            speed_mode: true,
            keep_audio: true,
            base_output_fps: BASE_OUTPUT_FPS,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Concatenate a folder of dashcam MP4 clips with ffmpeg")]
pub struct ConcatOpt {
    /// Folder with the MP4 clips to prefill
    pub folder: Option<PathBuf>,
    /// Output video file to prefill
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// FPS field value (e.g. 20 for 3x fast-forward in speed mode)
    #[arg(long, default_value_t = f64::from(BASE_OUTPUT_FPS))]
    pub fps: f64,
    /// Re-encode at the given FPS instead of changing playback speed
    #[arg(long)]
    pub no_speed_mode: bool,
    /// Drop the audio track
    #[arg(long)]
    pub no_audio: bool,
}

impl From<ConcatOpt> for ConcatSettings {
    fn from(opt: ConcatOpt) -> Self {
        let output = opt.output.or_else(|| {
            opt.folder
                .as_ref()
                .map(|folder| folder.join(DEFAULT_OUTPUT_NAME))
        });
        Self {
            folder: opt.folder,
            output,
            fps: opt.fps,
            speed_mode: !opt.no_speed_mode,
            keep_audio: !opt.no_audio,
            ..Self::default()
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Play a folder of dashcam MP4 clips as one video")]
pub struct PlayerOpt {
    /// Folder to open at startup
    pub folder: Option<PathBuf>,
    /// Start with looping disabled
    #[arg(long)]
    pub no_loop: bool,
    /// Initial playback speed, clamped to the offered choices
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn folder_suggests_output() {
        let opt = ConcatOpt::parse_from(["dashcam-concat", "/clips"]);
        let settings = ConcatSettings::from(opt);
        assert_eq!(
            settings.output,
            Some(PathBuf::from("/clips").join(DEFAULT_OUTPUT_NAME))
        );
        assert!(settings.speed_mode);
        assert!(settings.keep_audio);
        assert_eq!(settings.fps, 60.0);
    }

    #[test]
    fn flags_turn_modes_off() {
        let opt = ConcatOpt::parse_from([
            "dashcam-concat",
            "--fps",
            "20",
            "--no-speed-mode",
            "--no-audio",
            "-o",
            "out.mp4",
        ]);
        let settings = ConcatSettings::from(opt);
        assert_eq!(settings.output, Some(PathBuf::from("out.mp4")));
        assert_eq!(settings.fps, 20.0);
        assert!(!settings.speed_mode);
        assert!(!settings.keep_audio);
    }

    #[test]
    fn speed_choices_are_sorted() {
        assert!(SPEED_CHOICES.windows(2).all(|w| w[0] < w[1]));
    }
}
