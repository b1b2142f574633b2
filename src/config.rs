// Waypoint daemon configuration
//
// Loaded once at startup from waypoint.toml. Every section has defaults so a
// missing file (or a partial one) still yields a usable configuration.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Environment variable pointing at an alternate config file.
pub const CONFIG_ENV_VAR: &str = "WAYPOINT_CONFIG";

/// Fixed grace period between handing the URI to the IDE and restoring
/// window state. Not exposed in the config file.
pub const SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
    pub ide: IdeConfig,
    pub arbiter: ArbiterConfig,
    pub selector: SelectorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. Loopback only is strongly advised.
    pub bind: String,
}

/// Where projects live and how deep discovery walks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding one sub-directory per project name
    pub projects_dir: String,

    /// Explicit project name -> root overrides
    pub projects: BTreeMap<String, String>,

    /// Walk depth when looking for build descriptors
    pub module_scan_depth: usize,

    /// Walk depth when looking for loose `resources`/`webapp` directories
    pub resource_scan_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IdeConfig {
    /// URI scheme registered by the IDE's toolbox
    pub scheme: String,

    /// First WM_CLASS string of IDE windows
    pub process_class: String,

    /// Text between the project name and the rest of an IDE window title
    pub title_separator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArbiterConfig {
    pub enabled: bool,
    pub target_retry_attempts: u32,
    pub target_retry_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Zenity,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub kind: SelectorKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9090".to_string(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            projects_dir: "~/IdeaProjects".to_string(),
            projects: BTreeMap::new(),
            module_scan_depth: 3,
            resource_scan_depth: 4,
        }
    }
}

impl Default for IdeConfig {
    fn default() -> Self {
        Self {
            scheme: "jetbrains".to_string(),
            process_class: "jetbrains-idea".to_string(),
            title_separator: " – ".to_string(),
        }
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_retry_attempts: 20,
            target_retry_interval_ms: 500,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            kind: SelectorKind::Zenity,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "~/.local/state/waypoint/logs".to_string(),
            level: "waypoint=info".to_string(),
        }
    }
}

impl ArbiterConfig {
    pub fn target_retry_interval(&self) -> Duration {
        Duration::from_millis(self.target_retry_interval_ms)
    }
}

impl LoggingConfig {
    pub fn dir_path(&self) -> PathBuf {
        expand_path(&self.dir)
    }
}

impl DaemonConfig {
    /// Resolve the config file location: explicit flag, then env var, then
    /// the per-user default.
    pub fn locate(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return expand_path(&path);
            }
        }
        expand_path("~/.config/waypoint/waypoint.toml")
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        let (config, source) = Self::load_with_source(path)?;
        if source == ConfigSource::Defaults {
            warn!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
        }
        Ok(config)
    }

    /// Same as [`DaemonConfig::load`] but silent, reporting where the values
    /// came from instead. Usable before a subscriber is installed.
    pub fn load_with_source(path: &Path) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok((config, ConfigSource::File))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("Invalid configuration: {}", e))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| anyhow!("Failed to serialize config: {}", e))
    }
}

/// Tilde/env expansion used for every path-valued setting.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}
