pub mod apps;
pub mod catalog;
pub mod display;
pub mod encode;
pub mod ff_interop;
pub mod playback;
pub mod settings;
pub mod ui;

pub const APP_TITLE_AND_VERSION: &str =
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));
pub const CONCAT_WINDOW_TITLE: &str =
    concat!("Dashcam MP4 Concatenator v", env!("CARGO_PKG_VERSION"));
pub const PLAYER_WINDOW_TITLE: &str =
    concat!("Dashcam Clip Player v", env!("CARGO_PKG_VERSION"));
