//! Module context: the capabilities handed to a module factory.

use std::sync::Arc;

use serde_json::{Map, Value};

use bloghub_core::config::SiteConfig;

use crate::hooks::{Hook, HookDispatcher};

use super::routes::{MergeStrategy, Route, RouteSink};

/// Read-only host configuration visible to modules.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    site: SiteConfig,
}

impl HostConfig {
    /// Wraps the site configuration.
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }

    /// Returns the active locale.
    pub fn locale(&self) -> &str {
        &self.site.locale
    }

    /// Returns all site settings.
    pub fn settings(&self) -> &Map<String, Value> {
        &self.site.settings
    }

    /// Returns one site setting.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.site.settings.get(key)
    }

    /// Returns all theme variables.
    pub fn theme(&self) -> &Map<String, Value> {
        &self.site.theme
    }

    /// Returns one theme variable.
    pub fn theme_var(&self, key: &str) -> Option<&Value> {
        self.site.theme.get(key)
    }
}

impl From<SiteConfig> for HostConfig {
    fn from(site: SiteConfig) -> Self {
        Self::new(site)
    }
}

/// Context passed to a module factory.
///
/// A context is built for one module and moved into its factory. Modules
/// never receive references to each other; everything they share goes
/// through [`ModuleContext::hook`].
#[derive(Clone)]
pub struct ModuleContext {
    module_name: String,
    args: Value,
    hooks: HookDispatcher,
    routes: Arc<dyn RouteSink>,
    host: Arc<HostConfig>,
}

impl std::fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module_name", &self.module_name)
            .field("args", &self.args)
            .finish()
    }
}

impl ModuleContext {
    /// Creates a context for `module_name`.
    pub fn new(
        module_name: impl Into<String>,
        args: Value,
        hooks: HookDispatcher,
        routes: Arc<dyn RouteSink>,
        host: Arc<HostConfig>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            args,
            hooks,
            routes,
            host,
        }
    }

    /// Returns the name of the module this context belongs to.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Returns the factory arguments from the module descriptor.
    pub fn args(&self) -> &Value {
        &self.args
    }

    /// Returns the handle for hook `name`.
    pub fn hook(&self, name: impl Into<String>) -> Hook {
        self.hooks.hook(name)
    }

    /// Returns the shared dispatcher, for callbacks that outlive the factory.
    pub fn hooks(&self) -> &HookDispatcher {
        &self.hooks
    }

    /// Adds routes owned by this module. `None` uses [`MergeStrategy::Merge`].
    pub fn add_routes(&self, routes: Vec<Route>, strategy: Option<MergeStrategy>) {
        self.routes
            .add_routes(&self.module_name, routes, strategy.unwrap_or_default());
    }

    /// Returns the read-only host configuration.
    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    /// Returns the active locale.
    pub fn locale(&self) -> &str {
        self.host.locale()
    }

    /// Returns all site settings.
    pub fn settings(&self) -> &Map<String, Value> {
        self.host.settings()
    }

    /// Returns all theme variables.
    pub fn theme(&self) -> &Map<String, Value> {
        self.host.theme()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::hooks::HookRegistry;
    use crate::module::routes::RouteTable;

    #[test]
    fn test_add_routes_is_scoped_to_module() {
        let table = Arc::new(RouteTable::new());
        let ctx = ModuleContext::new(
            "theme-default",
            json!({"layout": "wide"}),
            HookDispatcher::new(Arc::new(HookRegistry::new())),
            table.clone(),
            Arc::new(HostConfig::default()),
        );

        ctx.add_routes(vec![Route::new("/", "Home")], None);

        let entries = table.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].module, "theme-default");
        assert_eq!(ctx.args()["layout"], "wide");
        assert_eq!(ctx.locale(), "en-US");
    }

    #[test]
    fn test_host_accessors() {
        let mut site = SiteConfig::default();
        site.settings.insert("title".into(), json!("Carnets"));
        site.theme.insert("primary".into(), json!("#336699"));
        let host = HostConfig::from(site);

        assert_eq!(host.setting("title"), Some(&json!("Carnets")));
        assert_eq!(host.theme_var("primary"), Some(&json!("#336699")));
        assert_eq!(host.setting("missing"), None);
    }
}
