//! Configuration file – reads/writes `~/.tilerunner/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tilerunner_control::{DeviceNames, MotionConfig};
use tilerunner_hal::sim_registry::{DEFAULT_DEGREES_PER_POLL, DEFAULT_TICKS_PER_POLL};
use tilerunner_types::RobotError;

/// Simulator settings for the CLI's in-process robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Devices left out of the simulated robot, as if unplugged.
    #[serde(default)]
    pub missing: Vec<String>,

    /// Encoder ticks moved per busy poll at full power.
    #[serde(default = "default_ticks_per_poll")]
    pub ticks_per_poll: f64,

    /// Degrees rotated per gyro read at full opposite drive power.
    #[serde(default = "default_degrees_per_poll")]
    pub degrees_per_poll: f64,
}

fn default_ticks_per_poll() -> f64 {
    DEFAULT_TICKS_PER_POLL
}
fn default_degrees_per_poll() -> f64 {
    DEFAULT_DEGREES_PER_POLL
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            missing: Vec::new(),
            ticks_per_poll: default_ticks_per_poll(),
            degrees_per_poll: default_degrees_per_poll(),
        }
    }
}

/// Persisted configuration stored in `~/.tilerunner/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub motion: MotionConfig,

    #[serde(default)]
    pub devices: DeviceNames,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Return the path to `~/.tilerunner/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".tilerunner").join("config.toml")
}

/// Load the config from disk and apply environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, RobotError> {
    let Some(mut cfg) = load_from(&config_path())? else {
        return Ok(None);
    };
    apply_env_overrides(&mut cfg);
    cfg.motion.validate()?;
    Ok(Some(cfg))
}

/// Load the config from a specific path and validate it.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, RobotError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        RobotError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| RobotError::Config(format!("failed to parse config: {e}")))?;
    cfg.motion.validate()?;
    Ok(Some(cfg))
}

/// Apply `TILERUNNER_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `TILERUNNER_TURN_CORRECTION_THRESHOLD` | `motion.turn_correction_threshold` |
/// | `TILERUNNER_MAX_TURN_CORRECTIONS` | `motion.max_turn_corrections` |
/// | `TILERUNNER_TURN_SETTLE_MS` | `motion.turn_settle_ms` |
/// | `TILERUNNER_SIM_MISSING` | `simulation.missing` (comma separated) |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TILERUNNER_TURN_CORRECTION_THRESHOLD")
        && let Ok(degrees) = v.parse::<f64>()
    {
        cfg.motion.turn_correction_threshold = degrees;
    }
    if let Ok(v) = std::env::var("TILERUNNER_MAX_TURN_CORRECTIONS")
        && let Ok(n) = v.parse::<u32>()
    {
        cfg.motion.max_turn_corrections = n;
    }
    if let Ok(v) = std::env::var("TILERUNNER_TURN_SETTLE_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.motion.turn_settle_ms = ms;
    }
    if let Ok(v) = std::env::var("TILERUNNER_SIM_MISSING") {
        cfg.simulation.missing = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
}

/// Save the config to disk, creating `~/.tilerunner/` if necessary.
pub fn save(cfg: &Config) -> Result<(), RobotError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), RobotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RobotError::Config(format!("failed to create config directory: {e}")))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RobotError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw).map_err(|e| {
        RobotError::Config(format!("failed to write config at {}: {e}", path.display()))
    })
}
