use clap::Parser;
use dashcam_tools::{apps::ConcatApp, settings::ConcatOpt};
use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let opt = ConcatOpt::parse();

    ConcatApp::new(opt.into()).run_loop();
}
