/// Log setup.
///
/// The terminal runs in raw mode on the alternate screen, so records go to
/// a file instead of stderr. `MANSION_MAZE_LOG` overrides the configured
/// filter, using the usual env_logger syntax (`debug`, `mansion_maze=trace`).

use std::fs::OpenOptions;
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};
use thiserror::Error;

use crate::config::LogConfig;

const FILTER_ENV: &str = "MANSION_MAZE_LOG";

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("could not open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("logger already installed: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// Install the file logger. With no file configured, logging stays off.
pub fn init(cfg: &LogConfig) -> Result<(), LogInitError> {
    let Some(path) = &cfg.file else {
        log::set_max_level(log::LevelFilter::Off);
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogInitError::Open { path: path.clone(), source })?;

    Builder::new()
        .parse_filters(&cfg.level)
        .parse_env(Env::new().filter(FILTER_ENV))
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;

    Ok(())
}
