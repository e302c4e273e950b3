//! The contract every module implements, and the catalog that holds them.
//!
//! Module code is compiled into the host binary and registered in a
//! [`ModuleCatalog`] under an entry name. A manifest on disk selects an
//! entry (by default `interface@version`); at load time the entry receives a
//! [`ModuleContext`] carrying the capabilities bound for exactly that load,
//! and returns the [`Module`] whose exports get registered for later modules.
//!
//! ```rust,ignore
//! let mut catalog = ModuleCatalog::new();
//! catalog.register("reader@1.0.0", |ctx| {
//!     let dict: Arc<dyn Dictionary> = ctx.capabilities().get("dict")?;
//!     Ok(Box::new(Reader::new(dict)) as Box<dyn Module>)
//! });
//! ```

use crate::capability::{Capabilities, Instance};
use crate::completion::CompletionSignal;
use crate::descriptor::ModuleDescriptor;
use async_trait::async_trait;
use nodejs_semver::Version;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of one module load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    /// A fresh, unique context id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything a module's entry point sees while it is loaded.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    id: ContextId,
    interface: String,
    version: Version,
    capabilities: Arc<Capabilities>,
}

impl ModuleContext {
    /// Create a context for loading `descriptor` with the given bindings.
    pub fn new(descriptor: &ModuleDescriptor, capabilities: Arc<Capabilities>) -> Self {
        Self {
            id: ContextId::new(),
            interface: descriptor.interface.clone(),
            version: descriptor.version.clone(),
            capabilities,
        }
    }

    /// Identity of this load.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The interface being loaded.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// The version being loaded.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The capabilities bound for this module.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

/// What an initialization hook receives.
#[derive(Debug, Clone)]
pub struct InitContext {
    /// Pending until every module has initialized.
    pub completion: CompletionSignal,

    /// This interface's settings from the run configuration, or `Null`.
    pub settings: serde_json::Value,
}

/// A loaded module.
#[async_trait]
pub trait Module: Send + Sync {
    /// The value registered under this module's interface.
    fn exports(&self) -> Instance;

    /// Initialization hook. Startup waits for it before loading the next module.
    ///
    /// The default does nothing, for modules without initialization.
    async fn init(&self, _ctx: InitContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A compiled-in module entry point.
pub trait ModuleEntry: Send + Sync {
    /// Load the module with its bound capabilities.
    fn load(&self, ctx: &ModuleContext) -> anyhow::Result<Box<dyn Module>>;
}

impl<F> ModuleEntry for F
where
    F: Fn(&ModuleContext) -> anyhow::Result<Box<dyn Module>> + Send + Sync,
{
    fn load(&self, ctx: &ModuleContext) -> anyhow::Result<Box<dyn Module>> {
        self(ctx)
    }
}

/// Registry of compiled-in module entry points by name.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    entries: HashMap<String, Arc<dyn ModuleEntry>>,
}

impl ModuleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader function. A later registration under the same name replaces it.
    pub fn register<F>(&mut self, name: impl Into<String>, load: F) -> &mut Self
    where
        F: Fn(&ModuleContext) -> anyhow::Result<Box<dyn Module>> + Send + Sync + 'static,
    {
        self.register_entry(name, load)
    }

    /// Register any [`ModuleEntry`] implementation.
    pub fn register_entry<E>(&mut self, name: impl Into<String>, entry: E) -> &mut Self
    where
        E: ModuleEntry + 'static,
    {
        self.entries.insert(name.into(), Arc::new(entry));
        self
    }

    /// Get an entry point by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ModuleEntry>> {
        self.entries.get(name).cloned()
    }

    /// Check if an entry point is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered entry names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered entry points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCatalog")
            .field("entries", &self.names())
            .finish()
    }
}
