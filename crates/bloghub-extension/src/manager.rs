//! Extension manager: owns the hook registry and runs the boot sequence.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use bloghub_core::config::ExtensionsConfig;
use bloghub_core::error::AppResult;
use bloghub_core::types::ModuleDescriptor;

use crate::hooks::names;
use crate::hooks::{Hook, HookDispatcher, HookRegistry};
use crate::module::context::HostConfig;
use crate::module::loader::{LoadOptions, LoadReport, ModuleLoader};
use crate::module::routes::{Route, RouteTable};
use crate::module::source::BundleSource;
use crate::module::styles::StyleRegistry;

/// Wires the hook registry, route table, style registry, and module loader
/// of one running application.
#[derive(Debug)]
pub struct ExtensionManager {
    /// Hook dispatcher over the process-wide registry.
    hooks: HookDispatcher,
    /// Routes contributed by modules.
    routes: Arc<RouteTable>,
    /// Stylesheets declared by modules.
    styles: Arc<StyleRegistry>,
    /// Module loader.
    loader: ModuleLoader,
}

impl ExtensionManager {
    /// Creates a manager with a fresh hook registry.
    pub fn new(source: Arc<dyn BundleSource>, host: HostConfig) -> Self {
        let hooks = HookDispatcher::new(Arc::new(HookRegistry::new()));
        let routes = Arc::new(RouteTable::new());
        let styles = Arc::new(StyleRegistry::new());
        let loader = ModuleLoader::new(
            source,
            hooks.clone(),
            routes.clone(),
            styles.clone(),
            Arc::new(host),
        );

        Self {
            hooks,
            routes,
            styles,
            loader,
        }
    }

    /// Loads every module, then fires `init`.
    ///
    /// Module failures are isolated and appear in the returned report. A
    /// failing `init` callback is not: its error is returned and the
    /// application should not be considered ready.
    ///
    /// Panics in `init` callbacks are not caught. Only module factories run
    /// under panic isolation.
    pub async fn boot(
        &self,
        descriptors: &[ModuleDescriptor],
        options: &LoadOptions,
    ) -> AppResult<LoadReport> {
        let report = self.loader.load(descriptors, options).await;

        self.hooks.exec(names::INIT, &[]).await.inspect_err(|e| {
            error!(error = %e, "Init hook failed");
        })?;

        info!(
            modules = report.succeeded().len(),
            failed = report.failures().len(),
            hooks = self.hooks.registry().hook_names().len(),
            routes = self.routes.len(),
            "Extensions ready"
        );

        Ok(report)
    }

    /// Returns the hook dispatcher.
    pub fn hooks(&self) -> &HookDispatcher {
        &self.hooks
    }

    /// Returns the handle for hook `name`.
    pub fn hook(&self, name: impl Into<String>) -> Hook {
        self.hooks.hook(name)
    }

    /// Returns the route table.
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Returns the route table after passing it through the `routes` filter.
    pub async fn resolved_routes(&self) -> AppResult<Vec<Route>> {
        let table = serde_json::to_value(self.routes.routes())?;
        let filtered = self.hooks.filter(names::ROUTES, table, &[]).await?;
        Ok(serde_json::from_value(filtered)?)
    }

    /// Returns the style registry.
    pub fn styles(&self) -> &Arc<StyleRegistry> {
        &self.styles
    }

    /// Returns the module loader.
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }
}

impl From<&ExtensionsConfig> for LoadOptions {
    fn from(config: &ExtensionsConfig) -> Self {
        Self {
            mode: config.mode,
            on_error: None,
            timeout: config.module_timeout_seconds.map(Duration::from_secs),
        }
    }
}
