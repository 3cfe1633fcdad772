//! tactus - terminal metronome
//!
//! Run with: cargo run

mod app;
mod ui;

use std::fs::File;

use color_eyre::eyre::{Result as EyreResult, WrapErr};

use tactus::audio::AudioEngine;
use tactus::engine::Metronome;
use tactus::preset::PresetStore;

use app::App;

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("tactus")
        .join("tactus.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path)
        .unwrap_or_else(|_| File::create("/tmp/tactus.log").expect("Cannot create log file"));

    WriteLogger::init(log_level, Config::default(), log_file).expect("Failed to initialize logger");

    log::info!("tactus starting (log level: {log_level:?})");
}

fn main() -> EyreResult<()> {
    let verbose = std::env::args().any(|arg| arg == "--verbose" || arg == "-v");
    init_logging(verbose);
    color_eyre::install()?;

    let engine = AudioEngine::start().wrap_err("failed to open audio output")?;
    let metronome = Metronome::new(engine.handle(), engine.handle());
    let presets = PresetStore::default_path()
        .map(PresetStore::open)
        .unwrap_or_else(|| PresetStore::open("presets.json"));

    let terminal = ratatui::init();
    let res = App::new(metronome, engine, presets).run(terminal);
    ratatui::restore();
    res
}
