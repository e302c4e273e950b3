//! Live capability instances and how modules reach them.
//!
//! The [`CapabilityRegistry`] holds every initialized module's exported
//! [`Instance`] per interface, newest version first. When a module is loaded
//! the executor picks, for each declared requirement, the highest registered
//! version inside the declared range and hands the picks to the module as
//! its [`Capabilities`].

use crate::descriptor::Requirement;
use crate::error::{RuntimeError, RuntimeResult};
use nodejs_semver::Version;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased value exported by a module.
///
/// Modules usually export a shared handle to a trait object, e.g.
/// `Instance::new(Arc::new(MyDict) as Arc<dyn Dictionary>)`, and consumers
/// ask for `Arc<dyn Dictionary>`.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wrap a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// An instance carrying nothing, for modules that only run side effects.
    pub fn empty() -> Self {
        Self::new(())
    }

    /// Borrow the value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Check if the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_name)
            .finish()
    }
}

/// One registered version of an interface.
#[derive(Debug, Clone)]
pub struct RegisteredCapability {
    /// Version the providing module registered under.
    pub version: Version,

    /// The providing module's exports.
    pub instance: Instance,
}

/// Live instances per interface, each list sorted by descending version.
///
/// Append-only: entries are added as modules finish initializing and are
/// never replaced or removed.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<String, Vec<RegisteredCapability>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance, keeping the interface's versions in descending order.
    pub fn register(&mut self, interface: &str, version: Version, instance: Instance) {
        let versions = self.entries.entry(interface.to_string()).or_default();
        let position = versions.partition_point(|existing| existing.version > version);
        versions.insert(position, RegisteredCapability { version, instance });
    }

    /// The highest registered version matching `requirement`.
    pub fn resolve(&self, requirement: &Requirement) -> Option<&RegisteredCapability> {
        self.entries
            .get(&requirement.interface)?
            .iter()
            .find(|entry| requirement.matches(&entry.version))
    }

    /// All registered versions of an interface, newest first.
    pub fn versions(&self, interface: &str) -> &[RegisteredCapability] {
        self.entries
            .get(interface)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Check if any version of an interface is registered.
    pub fn contains(&self, interface: &str) -> bool {
        self.entries.contains_key(interface)
    }

    /// Names of all registered interfaces.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Total number of registered instances.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The capabilities bound for one module: required interface name to instance.
///
/// Only interfaces the module declared in its manifest can be looked up.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    module: String,
    bindings: HashMap<String, Instance>,
}

impl Capabilities {
    /// Create an empty binding table for a module.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            bindings: HashMap::new(),
        }
    }

    /// Bind an interface name to an instance.
    pub fn bind(&mut self, interface: impl Into<String>, instance: Instance) {
        self.bindings.insert(interface.into(), instance);
    }

    /// The raw instance bound to `interface`.
    pub fn instance(&self, interface: &str) -> RuntimeResult<&Instance> {
        self.bindings
            .get(interface)
            .ok_or_else(|| RuntimeError::UndeclaredCapability {
                module: self.module.clone(),
                interface: interface.to_string(),
            })
    }

    /// The value bound to `interface`, as a `T`.
    pub fn get<T: Any + Clone>(&self, interface: &str) -> RuntimeResult<T> {
        self.instance(interface)?
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| RuntimeError::CapabilityTypeMismatch {
                interface: interface.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Check if `interface` is bound.
    pub fn has(&self, interface: &str) -> bool {
        self.bindings.contains_key(interface)
    }

    /// Names of all bound interfaces.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
