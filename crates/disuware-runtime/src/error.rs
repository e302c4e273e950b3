//! Error types for the disuware runtime.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering, linking or executing modules.
///
/// Every variant is terminal for a run: no stage retries or recovers locally.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The run configuration failed validation.
    #[error("Disuware configuration is invalid: {0}")]
    ConfigurationInvalid(String),

    /// A module manifest failed to parse or validate.
    #[error("Module manifest for {} is invalid: {reason}", .path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    /// A configured module directory could not be scanned.
    #[error("Failed to read module directory {}: {source}", .path.display())]
    ModuleDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two modules provide the same interface at the same version.
    #[error("Found module with same interface and same version already: {0}")]
    DuplicateRegistration(String),

    /// A linking round could not link anything.
    #[error("Found modules that can't be linked: {}", .0.join(", "))]
    UnsatisfiableDependency(Vec<String>),

    /// No entry point was compiled in for a discovered module.
    #[error("No entry point '{entry}' registered for module {module}")]
    ModuleNotRegistered { module: String, entry: String },

    /// A module's entry point failed while loading.
    #[error("Failed to load module {module}: {source}")]
    LoadFailure {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    /// A module's initialization hook failed.
    #[error("Module {module} failed to initialize: {source}")]
    InitializationFailure {
        module: String,
        #[source]
        source: anyhow::Error,
    },

    /// No live instance satisfies a requirement the linker accepted.
    #[error("No registered instance of {interface}@{range} for module {module}")]
    MissingBinding {
        module: String,
        interface: String,
        range: String,
    },

    /// A module asked for an interface it never declared.
    #[error("Module {module} did not declare a requirement on '{interface}'")]
    UndeclaredCapability { module: String, interface: String },

    /// A bound instance is not of the type the module asked for.
    #[error("Capability '{interface}' is not a {expected}")]
    CapabilityTypeMismatch {
        interface: String,
        expected: &'static str,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
