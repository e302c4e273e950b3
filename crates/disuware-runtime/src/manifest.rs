//! Module manifest parsing.
//!
//! Each module directory carries a `disuwaremodule.json` file declaring the
//! interface it provides, its version and the interfaces it requires:
//!
//! ```json
//! {
//!     "interface": "module1",
//!     "version": "1.0.0",
//!     "requires": { "dict": "~1.0.0" },
//!     "disabled": false
//! }
//! ```

use crate::descriptor::{default_entry, ModuleDescriptor, Requirement};
use crate::error::{RuntimeError, RuntimeResult};
use nodejs_semver::{Range, Version};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// File name of the manifest inside a module directory.
pub const MANIFEST_FILE: &str = "disuwaremodule.json";

/// Module manifest structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleManifest {
    /// Provided interface name.
    pub interface: String,

    /// Version string.
    pub version: String,

    /// Required interfaces mapped to npm-style version ranges.
    #[serde(default)]
    pub requires: Map<String, Value>,

    /// Whether the module is switched off. Must be a JSON boolean.
    #[serde(default)]
    pub disabled: bool,

    /// Name of the compiled-in entry point (defaults to `interface@version`).
    #[serde(default)]
    pub entry: Option<String>,
}

impl ModuleManifest {
    /// Parse a manifest from a JSON string read from `path`.
    ///
    /// Returns `Ok(None)` for a disabled module. `disabled: true` is honored
    /// before any schema check, so a disabled manifest is dropped even if the
    /// rest of it is invalid.
    pub fn from_str(path: &Path, content: &str) -> RuntimeResult<Option<Self>> {
        let invalid = |reason: String| RuntimeError::ManifestInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let raw: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

        if raw.get("disabled").and_then(Value::as_bool) == Some(true) {
            return Ok(None);
        }

        let manifest: ModuleManifest =
            serde_json::from_value(raw).map_err(|e| invalid(e.to_string()))?;
        manifest.validate().map_err(invalid)?;
        Ok(Some(manifest))
    }

    /// Validate the manifest.
    fn validate(&self) -> Result<(), String> {
        if self.interface.is_empty() {
            return Err("interface cannot be empty".to_string());
        }

        Version::parse(&self.version)
            .map_err(|e| format!("version '{}' is not a valid version: {e}", self.version))?;

        for (name, range) in &self.requires {
            if name.is_empty() {
                return Err("required interface names cannot be empty".to_string());
            }
            let Some(range) = range.as_str() else {
                return Err(format!("range for required interface '{name}' must be a string"));
            };
            Range::parse(range)
                .map_err(|e| format!("range '{range}' for '{name}' is invalid: {e}"))?;
        }

        if matches!(self.entry.as_deref(), Some("")) {
            return Err("entry cannot be empty".to_string());
        }

        Ok(())
    }

    /// Convert a validated manifest into a descriptor for the module at `source`.
    pub fn into_descriptor(self, source: &Path) -> RuntimeResult<ModuleDescriptor> {
        let invalid = |reason: String| RuntimeError::ManifestInvalid {
            path: source.join(MANIFEST_FILE),
            reason,
        };

        let version = Version::parse(&self.version).map_err(|e| invalid(e.to_string()))?;

        let mut requires = Vec::with_capacity(self.requires.len());
        for (name, range) in self.requires {
            let range = range
                .as_str()
                .ok_or_else(|| invalid(format!("range for '{name}' must be a string")))?;
            requires.push(Requirement::parse(name, range).map_err(|e| invalid(e.to_string()))?);
        }

        let entry = self
            .entry
            .unwrap_or_else(|| default_entry(&self.interface, &version));

        Ok(ModuleDescriptor {
            source: source.to_path_buf(),
            interface: self.interface,
            version,
            requires,
            entry,
        })
    }
}
