//! Configuration Vault – reads/writes `~/.graphnav/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use graphnav_types::FloorNumber;

/// Persisted user configuration stored in `~/.graphnav/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Building description listing every floor's rasters.
    #[serde(default = "default_building_file")]
    pub building_file: PathBuf,

    /// Navigation graph JSON produced by the authoring tool.
    #[serde(default = "default_graph_file")]
    pub graph_file: PathBuf,

    /// Floor selected when the shell starts.
    #[serde(default)]
    pub default_floor: FloorNumber,

    /// Skip nodes and edges hidden behind walls in `/nearest` and `/snap`.
    #[serde(default)]
    pub check_walls: bool,
}

fn default_building_file() -> PathBuf {
    PathBuf::from("building.toml")
}
fn default_graph_file() -> PathBuf {
    PathBuf::from("graph.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            building_file: default_building_file(),
            graph_file: default_graph_file(),
            default_floor: 0,
            check_walls: false,
        }
    }
}

/// Return the path to `~/.graphnav/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".graphnav").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    let mut cfg = read_from(path)?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Read and parse the file at `path` without applying any overrides.
fn read_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    toml::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("Failed to parse config: {}", e))
}

/// Apply `GRAPHNAV_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `GRAPHNAV_BUILDING` | `building_file` |
/// | `GRAPHNAV_GRAPH` | `graph_file` |
/// | `GRAPHNAV_FLOOR` | `default_floor` |
/// | `GRAPHNAV_CHECK_WALLS` | `check_walls` (`1`/`true`/`on` or `0`/`false`/`off`) |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

/// Apply overrides from `lookup`, keyed by the `GRAPHNAV_*` variable names.
/// Unparseable floor or switch values are ignored.
pub(crate) fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GRAPHNAV_BUILDING") {
        cfg.building_file = PathBuf::from(v);
    }
    if let Some(v) = lookup("GRAPHNAV_GRAPH") {
        cfg.graph_file = PathBuf::from(v);
    }
    if let Some(v) = lookup("GRAPHNAV_FLOOR")
        && let Ok(floor) = v.trim().parse::<FloorNumber>()
    {
        cfg.default_floor = floor;
    }
    if let Some(v) = lookup("GRAPHNAV_CHECK_WALLS")
        && let Some(flag) = parse_switch(&v)
    {
        cfg.check_walls = flag;
    }
}

/// Parse an on/off switch as accepted by the env overrides and the REPL.
pub fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Save the config to disk, creating `~/.graphnav/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
