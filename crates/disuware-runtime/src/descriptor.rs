//! The module descriptor model shared by discovery, linker and executor.

use nodejs_semver::{Range, SemverError, Version};
use std::fmt;
use std::path::{Path, PathBuf};

/// A requirement on another interface, as declared in a manifest.
///
/// Ranges follow npm's range grammar: a bare `1.0.0` matches exactly that
/// version, and `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0` and `1.x || 3.x` are all
/// accepted.
#[derive(Debug, Clone)]
pub struct Requirement {
    /// Name of the required interface.
    pub interface: String,

    /// Parsed version range.
    pub range: Range,

    /// The range exactly as written in the manifest.
    pub raw: String,
}

impl Requirement {
    /// Parse a requirement from an interface name and a range expression.
    pub fn parse(interface: impl Into<String>, raw: impl Into<String>) -> Result<Self, SemverError> {
        let raw = raw.into();
        let range = Range::parse(&raw)?;
        Ok(Self {
            interface: interface.into(),
            range,
            raw,
        })
    }

    /// Check whether a version satisfies this requirement.
    pub fn matches(&self, version: &Version) -> bool {
        self.range.satisfies(version)
    }
}

// Two ranges written the same way are the same range.
impl PartialEq for Requirement {
    fn eq(&self, other: &Self) -> bool {
        self.interface == other.interface && self.raw == other.raw
    }
}

impl Eq for Requirement {}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.interface, self.raw)
    }
}

/// One discovered module.
///
/// Built once during discovery and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Directory the module was discovered in.
    pub source: PathBuf,

    /// The interface this module provides.
    pub interface: String,

    /// The version of the provided interface.
    pub version: Version,

    /// Required interfaces, in manifest order.
    pub requires: Vec<Requirement>,

    /// Name of the compiled-in entry point that implements this module.
    pub entry: String,
}

impl ModuleDescriptor {
    /// Create a descriptor without requirements, using the default entry name.
    pub fn new(source: impl Into<PathBuf>, interface: impl Into<String>, version: Version) -> Self {
        let interface = interface.into();
        let entry = default_entry(&interface, &version);
        Self {
            source: source.into(),
            interface,
            version,
            requires: Vec::new(),
            entry,
        }
    }

    /// Add a requirement.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requires.push(requirement);
        self
    }

    /// Override the entry point name.
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    /// The directory the module was discovered in.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// `interface@version`, used in logs and errors.
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// Look up the declared requirement on an interface.
    pub fn requirement(&self, interface: &str) -> Option<&Requirement> {
        self.requires.iter().find(|r| r.interface == interface)
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.interface, self.version)
    }
}

/// The entry name used when a manifest doesn't name one.
pub fn default_entry(interface: &str, version: &Version) -> String {
    format!("{interface}@{version}")
}
