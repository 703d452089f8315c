//! Platform logging initialization for pagemate_app.
//!
//! Logs go to `./pagemate.log` so they never interleave with the chat
//! transcript on stdout. Set `PAGEMATE_LOG=term` or `PAGEMATE_LOG=both`
//! to mirror them to the terminal while debugging.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_PATH: &str = "./pagemate.log";

/// Initialize the global logger according to `PAGEMATE_LOG`.
pub fn initialize() {
    let level = LevelFilter::Info;
    let config = build_config();
    let destination = std::env::var("PAGEMATE_LOG").unwrap_or_default();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination.as_str(), "term" | "both") {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if destination != "term" {
        match File::create(PathBuf::from(LOG_PATH)) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => {
                eprintln!("Warning: could not create log file at {LOG_PATH}: {err}");
            }
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}
