use clap::Parser;
use dashcam_tools::{apps::PlayerApp, ff_interop, settings::PlayerOpt};
use env_logger::Env;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let opt = PlayerOpt::parse();
    ff_interop::init()?;

    PlayerApp::new(&opt)?.run_loop();
    Ok(())
}
