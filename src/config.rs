/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing file or missing keys fall back to defaults. A file that exists
/// but cannot be read or parsed is reported as a `ConfigError`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} parse error: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("timing.{0} must be greater than zero")]
    ZeroTiming(&'static str),
}

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
    pub ticket_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    pub narration_tick_ms: u64, // one narration character per tick
    pub clock_tick_ms: u64,     // elapsed-time refresh while in the maze
    pub trap_reset_ms: u64,     // how long a sprung trap stays visible
}

impl TimingConfig {
    pub fn narration_tick(&self) -> Duration { Duration::from_millis(self.narration_tick_ms) }
    pub fn clock_tick(&self) -> Duration { Duration::from_millis(self.clock_tick_ms) }
    pub fn trap_reset(&self) -> Duration { Duration::from_millis(self.trap_reset_ms) }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            narration_tick_ms: default_narration_tick(),
            clock_tick_ms: default_clock_tick(),
            trap_reset_ms: default_trap_reset(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// None disables logging.
    pub file: Option<PathBuf>,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_narration_tick")]
    narration_tick_ms: u64,
    #[serde(default = "default_clock_tick")]
    clock_tick_ms: u64,
    #[serde(default = "default_trap_reset")]
    trap_reset_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_ticket_url")]
    ticket_url: String,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_narration_tick() -> u64 { 40 }
fn default_clock_tick() -> u64 { 1000 }
fn default_trap_reset() -> u64 { 400 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_ticket_url() -> String { "https://tickets.interpark.com/goods/26000875".into() }
fn default_log_file() -> String { "mansion-maze.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            narration_tick_ms: default_narration_tick(),
            clock_tick_ms: default_clock_tick(),
            trap_reset_ms: default_trap_reset(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { confirm: default_confirm(), cancel: default_cancel() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { ticket_url: default_ticket_url() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { file: default_log_file(), level: default_log_level() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            timing: TimingConfig::default(),
            gamepad: GamepadConfig { confirm: default_confirm(), cancel: default_cancel() },
            log: LogConfig {
                file: Some(PathBuf::from(default_log_file())),
                level: default_log_level(),
            },
            ticket_url: default_ticket_url(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    pub fn load() -> Result<Self, ConfigError> {
        let search_dirs = candidate_dirs();
        match find_config(&search_dirs) {
            Some(path) => GameConfig::load_file(&path),
            None => Ok(GameConfig::default()),
        }
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let schema = toml::from_str::<TomlConfig>(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        GameConfig::from_schema(schema, path.parent())
    }

    /// Parse config text directly. Relative log paths stay relative to CWD.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let schema = toml::from_str::<TomlConfig>(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE),
            source,
        })?;
        GameConfig::from_schema(schema, None)
    }

    fn from_schema(cfg: TomlConfig, base_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let timing = TimingConfig {
            narration_tick_ms: cfg.timing.narration_tick_ms,
            clock_tick_ms: cfg.timing.clock_tick_ms,
            trap_reset_ms: cfg.timing.trap_reset_ms,
        };
        if timing.narration_tick_ms == 0 {
            return Err(ConfigError::ZeroTiming("narration_tick_ms"));
        }
        if timing.clock_tick_ms == 0 {
            return Err(ConfigError::ZeroTiming("clock_tick_ms"));
        }
        if timing.trap_reset_ms == 0 {
            return Err(ConfigError::ZeroTiming("trap_reset_ms"));
        }

        // Log file: empty disables, relative paths land next to the config.
        let file = match cfg.log.file.trim() {
            "" => None,
            f if Path::new(f).is_absolute() => Some(PathBuf::from(f)),
            f => Some(base_dir.map_or_else(|| PathBuf::from(f), |d| d.join(f))),
        };

        Ok(GameConfig {
            timing,
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
            log: LogConfig { file, level: cfg.log.level },
            ticket_url: cfg.general.ticket_url,
        })
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter()
        .map(|d| d.join(CONFIG_FILE))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.timing, TimingConfig::default());
        assert_eq!(cfg.timing.narration_tick(), Duration::from_millis(40));
        assert_eq!(cfg.timing.clock_tick(), Duration::from_secs(1));
        assert_eq!(cfg.timing.trap_reset(), Duration::from_millis(400));
        assert_eq!(cfg.gamepad.confirm, vec!["Start", "A"]);
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.log.file, Some(PathBuf::from("mansion-maze.log")));
        assert!(cfg.ticket_url.starts_with("https://"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = GameConfig::from_toml_str("[timing]\ntrap_reset_ms = 750\n").unwrap();
        assert_eq!(cfg.timing.trap_reset_ms, 750);
        assert_eq!(cfg.timing.narration_tick_ms, 40);
        assert_eq!(cfg.timing.clock_tick_ms, 1000);
    }

    #[test]
    fn empty_log_file_disables_logging() {
        let cfg = GameConfig::from_toml_str("[log]\nfile = \"\"\nlevel = \"debug\"\n").unwrap();
        assert_eq!(cfg.log.file, None);
        assert_eq!(cfg.log.level, "debug");
    }

    #[test]
    fn zero_timing_rejected() {
        let err = GameConfig::from_toml_str("[timing]\nclock_tick_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTiming("clock_tick_ms")));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = GameConfig::from_toml_str("[timing\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_section_is_parse_error() {
        let err = GameConfig::from_toml_str("[speed]\ntick_rate_ms = 75\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
