//! Implementations of the `run` and `list` commands.

use disuware_runtime::{ModuleCatalog, ModuleDescriptor, RunConfig, Runtime, RuntimeResult};
use tracing::info;

/// Start every module of a configuration.
///
/// Returns once startup completed, or after an interrupt when the
/// configuration asks to keep running.
pub async fn run(config: RunConfig, catalog: ModuleCatalog) -> anyhow::Result<()> {
    let keep_alive = config.keep_alive;

    let started = Runtime::new(config, catalog).start().await?;
    started.completion.wait().await?;

    info!(
        "Finished executing disuware, {} modules up and running",
        started.execution.modules.len()
    );

    if keep_alive {
        info!("Press Ctrl+C to stop");
        tokio::signal::ctrl_c().await?;
        info!("Shutting down...");
    }

    Ok(())
}

/// Modules of a configuration in discovery order, or in link order with `linked`.
pub async fn list(config: RunConfig, linked: bool) -> RuntimeResult<Vec<ModuleDescriptor>> {
    let runtime = Runtime::new(config, ModuleCatalog::new());

    if linked {
        Ok(runtime.link().await?.into_modules())
    } else {
        runtime.discover().await
    }
}
