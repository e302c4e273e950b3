//! # disuware-runtime
//!
//! Runtime for independently authored modules that provide and require
//! versioned interfaces.
//!
//! This crate provides:
//! - Module discovery from configured directories
//! - Manifest parsing and validation
//! - Dependency linking over npm-style version ranges
//! - Sequential loading with capability injection
//! - A completion signal shared by every module's initialization
//!
//! ## Module Structure
//!
//! Modules are directories containing a `disuwaremodule.json` manifest. The
//! code behind a manifest is compiled into the host binary and registered in
//! a [`ModuleCatalog`] under the manifest's entry name.
//!
//! ## Load Order
//!
//! A module is only loaded once every interface it requires has a live
//! instance in a matching version; it is then handed the highest such
//! version of each.

pub mod capability;
pub mod completion;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod linker;
pub mod manifest;
pub mod module;
pub mod runtime;

pub use capability::{Capabilities, CapabilityRegistry, Instance, RegisteredCapability};
pub use completion::{
    completion_channel, CompletionResolver, CompletionSignal, CompletionState, StartupAborted,
};
pub use config::{ConfigProvider, RunConfig};
pub use descriptor::{ModuleDescriptor, Requirement};
pub use discovery::{discover_in_directory, discover_module, discover_modules};
pub use error::{RuntimeError, RuntimeResult};
pub use executor::{Execution, Executor, LoadedModule};
pub use linker::{link, LinkedSequence};
pub use manifest::{ModuleManifest, MANIFEST_FILE};
pub use module::{ContextId, InitContext, Module, ModuleCatalog, ModuleContext, ModuleEntry};
pub use runtime::{Runtime, StartedRuntime};

// Re-exported for module authors.
pub use async_trait::async_trait;
pub use nodejs_semver::{Range, Version};
