//! Extension loading configuration.

use serde::{Deserialize, Serialize};

use crate::types::ModuleDescriptor;

/// How the module loader schedules descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// One module at a time; each factory completes before the next starts.
    #[default]
    Sequential,
    /// All modules start at once with no ordering between them.
    Concurrent,
}

/// Theme and plugin modules loaded at boot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Loader scheduling mode.
    #[serde(default)]
    pub mode: LoadMode,
    /// Per-module time budget. `None` waits indefinitely.
    #[serde(default)]
    pub module_timeout_seconds: Option<u64>,
    /// The active theme, loaded before any plugin.
    #[serde(default)]
    pub theme: Option<ModuleDescriptor>,
    /// Plugins in load order.
    #[serde(default)]
    pub plugins: Vec<ModuleDescriptor>,
}

impl ExtensionsConfig {
    /// Returns the descriptors in load order: theme first, then plugins.
    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.theme
            .iter()
            .chain(self.plugins.iter())
            .cloned()
            .collect()
    }
}
