//! Log setup for the console binary.
//!
//! Tables and prompts own stdout, so log lines never go there. The terminal
//! sink writes to stderr and is clamped to warnings even under `--verbose`;
//! debug detail (dispatched messages, engine requests) only reaches the log
//! file, which is truncated on every start.

use std::fs::File;
use std::path::PathBuf;

use clap::ValueEnum;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILENAME: &str = "./records_console.log";

/// Where `--log` sends log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// `./records_console.log`, at the full requested level.
    File,
    /// stderr, warnings and errors only.
    Terminal,
    /// Both of the above, each with its own level.
    Both,
}

/// Installs the process logger. A log file that cannot be created is
/// reported on stderr and skipped; the command still runs.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => create_file_logger(level, config).into_iter().collect(),
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::Both => {
            let mut loggers = vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

/// Level for the stderr sink: `level`, but never chattier than warnings.
fn terminal_level(level: LevelFilter) -> LevelFilter {
    level.min(LevelFilter::Warn)
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(
        terminal_level(level),
        config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(level: LevelFilter, config: Config) -> Option<Box<dyn SharedLogger>> {
    let log_path = PathBuf::from(LOG_FILENAME);
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_sink_is_clamped_to_warnings() {
        assert_eq!(terminal_level(LevelFilter::Debug), LevelFilter::Warn);
        assert_eq!(terminal_level(LevelFilter::Info), LevelFilter::Warn);
        assert_eq!(terminal_level(LevelFilter::Error), LevelFilter::Error);
        assert_eq!(terminal_level(LevelFilter::Off), LevelFilter::Off);
    }
}
