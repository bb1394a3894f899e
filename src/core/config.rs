//! # Configuration
//!
//! Settings resolve in one order everywhere:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.logik/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::EngineKind;
use crate::core::tree::TreeError;
use crate::native::DEFAULT_LIBRARY;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LogikConfig {
    #[serde(default)]
    pub native: NativeConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NativeConfig {
    pub engine: Option<EngineKind>,
    pub library: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub sidebar_width: Option<u16>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SIDEBAR_WIDTH: u16 = 32;
pub const MIN_SIDEBAR_WIDTH: u16 = 15;
pub const MAX_SIDEBAR_WIDTH: u16 = 60;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub engine: EngineKind,
    /// Path or logical name of the native simulation library.
    pub library: String,
    /// Workspace description file. `None` shows the demo workspace.
    pub description: Option<PathBuf>,
    pub sidebar_width: u16,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub engine: Option<EngineKind>,
    pub library: Option<String>,
    pub description: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Json(serde_json::Error),
    Description(TreeError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Json(e) => write!(f, "workspace JSON error: {e}"),
            ConfigError::Description(e) => write!(f, "workspace rejected: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.logik/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".logik").join("config.toml"))
}

/// Load config from `~/.logik/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `LogikConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<LogikConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(LogikConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<LogikConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(LogikConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: LogikConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# Logik Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [native]
# engine = "native"                  # "native" or "builtin"
# library = "native/logik_simulation" # Or set LOGIK_NATIVE_LIBRARY

# [workspace]
# description = "workspace.toml"     # Relative to ~/.logik/, or absolute

# [ui]
# sidebar_width = 32                 # 15..=60 columns
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &LogikConfig, cli: &Overrides) -> ResolvedConfig {
    // Engine: CLI → env → config → default
    let engine = cli
        .engine
        .or_else(env_engine)
        .or(config.native.engine)
        .unwrap_or_default();

    // Library: CLI → env → config → default
    let library = cli
        .library
        .clone()
        .or_else(|| std::env::var("LOGIK_NATIVE_LIBRARY").ok())
        .or_else(|| config.native.library.clone())
        .unwrap_or_else(|| DEFAULT_LIBRARY.to_string());

    // Description: CLI → env → config (relative to ~/.logik/)
    let description = cli
        .description
        .clone()
        .or_else(|| std::env::var("LOGIK_DESCRIPTION").ok().map(PathBuf::from))
        .or_else(|| config.workspace.description.as_deref().map(config_relative));

    ResolvedConfig {
        engine,
        library,
        description,
        sidebar_width: resolve_sidebar_width(config.ui.sidebar_width),
    }
}

fn env_engine() -> Option<EngineKind> {
    let raw = std::env::var("LOGIK_ENGINE").ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "native" => Some(EngineKind::Native),
        "builtin" => Some(EngineKind::Builtin),
        other => {
            warn!("Ignoring LOGIK_ENGINE={other}: expected \"native\" or \"builtin\"");
            None
        }
    }
}

/// Paths in the config file are relative to `~/.logik/` unless absolute.
fn config_relative(file: &str) -> PathBuf {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(".logik").join(path),
        None => path,
    }
}

fn resolve_sidebar_width(configured: Option<u16>) -> u16 {
    match configured {
        Some(w) if (MIN_SIDEBAR_WIDTH..=MAX_SIDEBAR_WIDTH).contains(&w) => w,
        Some(w) => {
            let clamped = w.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH);
            warn!("sidebar_width {w} out of range, using {clamped}");
            clamped
        }
        None => DEFAULT_SIDEBAR_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = LogikConfig::default();
        assert!(config.native.engine.is_none());
        assert!(config.workspace.description.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = LogikConfig {
            native: NativeConfig {
                engine: Some(EngineKind::Builtin),
                library: Some("/opt/logik/libsim.so".to_string()),
            },
            workspace: WorkspaceConfig {
                description: Some("/srv/ws.toml".to_string()),
            },
            ui: UiConfig {
                sidebar_width: Some(40),
            },
        };
        let resolved = resolve(&config, &Overrides::default());
        assert_eq!(resolved.sidebar_width, 40);
        assert_eq!(resolved.description, Some(PathBuf::from("/srv/ws.toml")));
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = LogikConfig {
            native: NativeConfig {
                engine: Some(EngineKind::Native),
                library: Some("from-config".to_string()),
            },
            ..Default::default()
        };
        let cli = Overrides {
            engine: Some(EngineKind::Builtin),
            library: Some("from-cli".to_string()),
            description: Some(PathBuf::from("cli.toml")),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.engine, EngineKind::Builtin);
        assert_eq!(resolved.library, "from-cli");
        assert_eq!(resolved.description, Some(PathBuf::from("cli.toml")));
    }

    #[test]
    fn test_sidebar_width_is_clamped() {
        assert_eq!(resolve_sidebar_width(None), DEFAULT_SIDEBAR_WIDTH);
        assert_eq!(resolve_sidebar_width(Some(3)), MIN_SIDEBAR_WIDTH);
        assert_eq!(resolve_sidebar_width(Some(200)), MAX_SIDEBAR_WIDTH);
        assert_eq!(resolve_sidebar_width(Some(20)), 20);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[native]
engine = "builtin"
"#;
        let config: LogikConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.native.engine, Some(EngineKind::Builtin));
        assert!(config.native.library.is_none());
        assert!(config.ui.sidebar_width.is_none());
    }

    #[test]
    fn test_unknown_engine_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[native]\nengine = \"quantum\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.native.library.is_none());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Logik Configuration"));
        // every setting is commented out, so the generated file parses empty
        let reparsed: LogikConfig = toml::from_str(&written).unwrap();
        assert!(reparsed.native.engine.is_none());
    }

    #[test]
    fn test_relative_description_is_under_config_dir() {
        assert_eq!(config_relative("/abs/ws.toml"), PathBuf::from("/abs/ws.toml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config_relative("ws.toml"), home.join(".logik").join("ws.toml"));
        }
    }
}
