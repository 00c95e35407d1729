//! Shared test helpers for integration tests.

use std::sync::Arc;

use serde_json::Value;

use bloghub_core::config::AppConfig;
use bloghub_extension::module::{HostConfig, LoadOptions, LoadReport, StaticBundleSource};
use bloghub_extension::ExtensionManager;
use bloghub_plugin_seo::SeoPlugin;
use bloghub_theme_default::DefaultTheme;

/// Test application context
pub struct TestApp {
    /// Booted extension layer
    pub manager: ExtensionManager,
    /// Outcome of the boot
    pub report: LoadReport,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Boot the built-in modules declared in `toml`
    pub async fn boot(toml: &str) -> Self {
        let config = AppConfig::from_toml(toml).expect("Failed to parse test config");

        let source = StaticBundleSource::new()
            .with(bloghub_theme_default::MODULE_NAME, DefaultTheme::shared())
            .with(bloghub_plugin_seo::MODULE_NAME, SeoPlugin::shared());
        let manager =
            ExtensionManager::new(Arc::new(source), HostConfig::from(config.site.clone()));

        let report = manager
            .boot(
                &config.extensions.descriptors(),
                &LoadOptions::from(&config.extensions),
            )
            .await
            .expect("Boot failed");

        Self {
            manager,
            report,
            config,
        }
    }

    /// Run the `filter` chain of `hook`
    pub async fn filter(&self, hook: &str, value: Value, extra: &[Value]) -> Value {
        self.manager
            .hook(hook)
            .filter(value, extra)
            .await
            .expect("Filter failed")
    }
}
