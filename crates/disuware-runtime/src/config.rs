//! Run configuration loading.
//!
//! A run is described by a TOML or JSON file (picked by extension):
//!
//! ```toml
//! module_dirs = ["modules", "/opt/disuware/shared"]
//! log_level = "info"
//! keep_alive = false
//!
//! [modules.http]
//! port = 8888
//! ```
//!
//! Relative module directories are resolved against the directory holding
//! the configuration file.

use crate::error::{RuntimeError, RuntimeResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Read access to the run configuration.
pub trait ConfigProvider {
    /// The value stored under a top-level key.
    fn get_key(&self, name: &str) -> Option<Value>;

    /// Resolve a path relative to the configuration's location.
    fn resolve_path(&self, path: &Path) -> PathBuf;
}

/// Configuration for one run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Directories scanned for modules.
    #[serde(alias = "moduleDirs")]
    pub module_dirs: Vec<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default, alias = "logLevel")]
    pub log_level: Option<String>,

    /// Keep the process alive after startup until interrupted.
    #[serde(default, alias = "keepAlive")]
    pub keep_alive: bool,

    /// Per-interface settings handed to initialization hooks.
    #[serde(default)]
    pub modules: HashMap<String, Value>,

    /// Any other keys, readable through [`ConfigProvider::get_key`].
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

impl RunConfig {
    /// Create a configuration scanning the given directories.
    pub fn new(module_dirs: Vec<PathBuf>) -> Self {
        Self {
            module_dirs,
            log_level: None,
            keep_alive: false,
            modules: HashMap::new(),
            extra: Map::new(),
            base_dir: PathBuf::from("."),
        }
    }

    /// Set the directory relative paths are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigurationInvalid(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let base_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content, base_dir)
        } else {
            Self::from_toml_str(&content, base_dir)
        }
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str, base_dir: impl Into<PathBuf>) -> RuntimeResult<Self> {
        let config: RunConfig = toml::from_str(content)
            .map_err(|e| RuntimeError::ConfigurationInvalid(e.to_string()))?;
        config.with_base_dir(base_dir).validated()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(content: &str, base_dir: impl Into<PathBuf>) -> RuntimeResult<Self> {
        let config: RunConfig = serde_json::from_str(content)
            .map_err(|e| RuntimeError::ConfigurationInvalid(e.to_string()))?;
        config.with_base_dir(base_dir).validated()
    }

    fn validated(self) -> RuntimeResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> RuntimeResult<()> {
        if self.module_dirs.is_empty() {
            return Err(RuntimeError::ConfigurationInvalid(
                "module_dirs must list at least one directory".to_string(),
            ));
        }

        if self.module_dirs.iter().any(|dir| dir.as_os_str().is_empty()) {
            return Err(RuntimeError::ConfigurationInvalid(
                "module_dirs cannot contain empty paths".to_string(),
            ));
        }

        if let Some(level) = &self.log_level {
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(RuntimeError::ConfigurationInvalid(format!(
                    "invalid log_level: {}. Must be one of: {}",
                    level,
                    VALID_LOG_LEVELS.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Module directories, resolved against the configuration's location.
    pub fn resolved_module_dirs(&self) -> Vec<PathBuf> {
        self.module_dirs
            .iter()
            .map(|dir| self.resolve_path(dir))
            .collect()
    }

    /// Directory relative paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl ConfigProvider for RunConfig {
    /// Known keys answer under both their snake_case and camelCase spellings.
    fn get_key(&self, name: &str) -> Option<Value> {
        match name {
            "module_dirs" | "moduleDirs" => serde_json::to_value(&self.module_dirs).ok(),
            "log_level" | "logLevel" => self.log_level.clone().map(Value::String),
            "keep_alive" | "keepAlive" => Some(Value::Bool(self.keep_alive)),
            "modules" => serde_json::to_value(&self.modules).ok(),
            _ => self.extra.get(name).cloned(),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_load_toml_config() {
        let content = r#"
module_dirs = ["modules", "/opt/shared"]
log_level = "debug"
greeting = "hi"

[modules.http]
port = 8888
"#;

        let config = RunConfig::from_toml_str(content, "/etc/app").unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(!config.keep_alive);
        assert_eq!(
            config.resolved_module_dirs(),
            vec![PathBuf::from("/etc/app/modules"), PathBuf::from("/opt/shared")]
        );
        assert_eq!(config.modules["http"]["port"], 8888);
        assert_eq!(config.get_key("greeting"), Some(Value::from("hi")));
        assert_eq!(config.get_key("keep_alive"), Some(Value::Bool(false)));
        assert_eq!(config.get_key("missing"), None);
    }

    #[test]
    fn test_get_key_accepts_either_spelling() {
        let content = r#"{"moduleDirs": ["modules"], "keepAlive": true, "logLevel": "info"}"#;
        let config = RunConfig::from_json_str(content, "/srv").unwrap();

        assert_eq!(config.get_key("moduleDirs"), Some(serde_json::json!(["modules"])));
        assert_eq!(config.get_key("moduleDirs"), config.get_key("module_dirs"));
        assert_eq!(config.get_key("keepAlive"), Some(Value::Bool(true)));
        assert_eq!(config.get_key("keep_alive"), Some(Value::Bool(true)));
        assert_eq!(config.get_key("logLevel"), Some(Value::from("info")));
        assert_eq!(config.get_key("log_level"), config.get_key("logLevel"));

        let bare = RunConfig::new(vec![PathBuf::from("modules")]);
        assert_eq!(bare.get_key("logLevel"), None);
    }

    #[test]
    fn test_load_json_config_with_camel_case() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"moduleDirs": ["./modules"], "keepAlive": true}"#)
            .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert!(config.keep_alive);
        assert_eq!(
            config.resolved_module_dirs(),
            vec![temp_dir.path().join("./modules")]
        );
    }

    #[test]
    fn test_missing_module_dirs() {
        let err = RunConfig::from_toml_str("log_level = \"info\"", ".").unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigurationInvalid(_)));
    }

    #[test]
    fn test_validate_empty_module_dirs() {
        let err = RunConfig::from_toml_str("module_dirs = []", ".").unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigurationInvalid(_)));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = RunConfig::new(vec![PathBuf::from("modules")]);
        assert!(config.validate().is_ok());

        config.log_level = Some("loud".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = RunConfig::load(temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
