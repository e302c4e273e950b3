//! Sequential loading and initialization of linked modules.
//!
//! For each module in link order the executor:
//!
//! 1. binds every requirement to the highest registered version in range,
//! 2. loads the module's entry point with those bindings,
//! 3. runs its initialization hook and waits for it to finish,
//! 4. registers the module's exports under its interface.
//!
//! The next module only starts once the previous one is fully registered,
//! so a module can never observe a provider that is still initializing.
//! Any failure stops the loop and rejects the completion signal; modules
//! already initialized are left as they are.

use crate::capability::{Capabilities, CapabilityRegistry};
use crate::completion::{completion_channel, CompletionResolver, CompletionSignal};
use crate::descriptor::ModuleDescriptor;
use crate::error::{RuntimeError, RuntimeResult};
use crate::linker::LinkedSequence;
use crate::module::{ContextId, InitContext, Module, ModuleCatalog, ModuleContext};
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A module that made it through initialization.
pub struct LoadedModule {
    /// The module's descriptor.
    pub descriptor: ModuleDescriptor,

    /// The context it was loaded in.
    pub context: ModuleContext,

    module: Box<dyn Module>,
}

impl LoadedModule {
    /// The loaded module.
    pub fn module(&self) -> &dyn Module {
        self.module.as_ref()
    }
}

impl std::fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("descriptor", &self.descriptor)
            .field("context", &self.context.id())
            .finish()
    }
}

/// The result of a successful execution. Keeps every module alive.
#[derive(Debug, Default)]
pub struct Execution {
    /// Live instances per interface.
    pub registry: CapabilityRegistry,

    /// Initialized modules in load order.
    pub modules: Vec<LoadedModule>,

    bindings: HashMap<ContextId, Arc<Capabilities>>,
}

impl Execution {
    /// The capabilities that were bound for a given load context.
    pub fn capabilities_for(&self, id: ContextId) -> Option<&Capabilities> {
        self.bindings.get(&id).map(Arc::as_ref)
    }

    /// Load order as `interface@version` strings.
    pub fn load_order(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.descriptor.id()).collect()
    }
}

/// Loads and initializes a linked sequence of modules.
pub struct Executor {
    catalog: ModuleCatalog,
    settings: HashMap<String, serde_json::Value>,
    resolver: CompletionResolver,
    signal: CompletionSignal,
}

impl Executor {
    /// Create an executor loading modules from `catalog`.
    pub fn new(catalog: ModuleCatalog) -> Self {
        let (resolver, signal) = completion_channel();
        Self {
            catalog,
            settings: HashMap::new(),
            resolver,
            signal,
        }
    }

    /// Per-interface settings passed to initialization hooks.
    pub fn with_settings(mut self, settings: HashMap<String, serde_json::Value>) -> Self {
        self.settings = settings;
        self
    }

    /// The completion signal for this run. Pending until `execute` finishes.
    pub fn completion(&self) -> CompletionSignal {
        self.signal.clone()
    }

    /// Load and initialize every module in order.
    ///
    /// Resolves the completion signal after the last module initialized, or
    /// rejects it with the error that stopped the run.
    pub async fn execute(self, sequence: LinkedSequence) -> RuntimeResult<Execution> {
        let Executor {
            catalog,
            settings,
            resolver,
            signal,
        } = self;

        info!("Start executing {} modules", sequence.len());

        let mut run = Run {
            catalog: &catalog,
            settings: &settings,
            signal: &signal,
            execution: Execution::default(),
        };

        let mut outcome = Ok(());
        for descriptor in sequence {
            if let Err(e) = run.step(descriptor).await {
                outcome = Err(e);
                break;
            }
        }

        match outcome {
            Ok(()) => {
                resolver.resolve();
                info!("Finished executing modules, everything is up and running");
                Ok(run.execution)
            }
            Err(e) => {
                warn!("Startup failed, rejecting completion: {}", e);
                resolver.reject(e.to_string());
                Err(e)
            }
        }
    }
}

/// Mutable state of one execution.
struct Run<'a> {
    catalog: &'a ModuleCatalog,
    settings: &'a HashMap<String, serde_json::Value>,
    signal: &'a CompletionSignal,
    execution: Execution,
}

impl Run<'_> {
    async fn step(&mut self, descriptor: ModuleDescriptor) -> RuntimeResult<()> {
        let module_id = descriptor.id();
        debug!("Loading module {}", module_id);

        let capabilities = Arc::new(self.bind(&descriptor)?);
        let context = ModuleContext::new(&descriptor, Arc::clone(&capabilities));
        self.execution.bindings.insert(context.id(), capabilities);

        let entry = self
            .catalog
            .get(&descriptor.entry)
            .ok_or_else(|| RuntimeError::ModuleNotRegistered {
                module: module_id.clone(),
                entry: descriptor.entry.clone(),
            })?;

        let module = std::panic::catch_unwind(AssertUnwindSafe(|| entry.load(&context)))
            .map_err(|panic| anyhow::anyhow!("panicked: {}", panic_message(panic.as_ref())))
            .and_then(|loaded| loaded)
            .map_err(|source| RuntimeError::LoadFailure {
                module: module_id.clone(),
                source,
            })?;

        let init = InitContext {
            completion: self.signal.clone(),
            settings: self
                .settings
                .get(&descriptor.interface)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        };

        debug!("Initializing module {}", module_id);
        AssertUnwindSafe(module.init(init))
            .catch_unwind()
            .await
            .map_err(|panic| anyhow::anyhow!("panicked: {}", panic_message(panic.as_ref())))
            .and_then(|initialized| initialized)
            .map_err(|source| RuntimeError::InitializationFailure {
                module: module_id.clone(),
                source,
            })?;

        self.execution.registry.register(
            &descriptor.interface,
            descriptor.version.clone(),
            module.exports(),
        );
        info!("Module {} is initialized", module_id);

        self.execution.modules.push(LoadedModule {
            descriptor,
            context,
            module,
        });
        Ok(())
    }

    /// Bind each requirement to the highest registered version in range.
    fn bind(&self, descriptor: &ModuleDescriptor) -> RuntimeResult<Capabilities> {
        let mut capabilities = Capabilities::new(descriptor.id());

        for requirement in &descriptor.requires {
            let picked = self.execution.registry.resolve(requirement).ok_or_else(|| {
                RuntimeError::MissingBinding {
                    module: descriptor.id(),
                    interface: requirement.interface.clone(),
                    range: requirement.raw.clone(),
                }
            })?;

            debug!(
                "Bound {} to {}@{} for {}",
                requirement, requirement.interface, picked.version, descriptor
            );
            capabilities.bind(requirement.interface.clone(), picked.instance.clone());
        }

        Ok(capabilities)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
