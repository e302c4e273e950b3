//! The discover → link → execute pipeline.

use crate::completion::CompletionSignal;
use crate::config::RunConfig;
use crate::descriptor::ModuleDescriptor;
use crate::discovery::discover_modules;
use crate::error::RuntimeResult;
use crate::executor::{Execution, Executor};
use crate::linker::{link, LinkedSequence};
use crate::module::ModuleCatalog;
use tracing::info;

/// A configured runtime, ready to discover and start modules.
#[derive(Debug)]
pub struct Runtime {
    config: RunConfig,
    catalog: ModuleCatalog,
}

/// A runtime whose modules have all initialized.
#[derive(Debug)]
pub struct StartedRuntime {
    /// Live modules and their instances.
    pub execution: Execution,

    /// The (resolved) completion signal of the run.
    pub completion: CompletionSignal,
}

impl Runtime {
    /// Create a runtime from a validated configuration and a catalog of entry points.
    pub fn new(config: RunConfig, catalog: ModuleCatalog) -> Self {
        Self { config, catalog }
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The catalog of compiled-in entry points.
    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Discover modules in every configured directory.
    pub async fn discover(&self) -> RuntimeResult<Vec<ModuleDescriptor>> {
        discover_modules(&self.config.resolved_module_dirs()).await
    }

    /// Discover and link modules.
    pub async fn link(&self) -> RuntimeResult<LinkedSequence> {
        let modules = self.discover().await?;
        link(modules)
    }

    /// Discover, link, then load and initialize every module.
    pub async fn start(self) -> RuntimeResult<StartedRuntime> {
        let sequence = self.link().await?;

        let executor = Executor::new(self.catalog).with_settings(self.config.modules);
        let completion = executor.completion();
        let execution = executor.execute(sequence).await?;

        info!(
            "Started {} modules: {}",
            execution.modules.len(),
            execution.load_order().join(", ")
        );

        Ok(StartedRuntime {
            execution,
            completion,
        })
    }
}
