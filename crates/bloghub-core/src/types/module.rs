//! Descriptor of an independently built theme or plugin bundle.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes one loadable module.
///
/// Descriptors are read from static configuration before loading begins and
/// are never mutated afterwards, so every field is private behind a
/// read-only accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Unique module name.
    module_name: String,
    /// Location of the module bundle (`builtin://`, `file://`, or a path).
    entry: String,
    /// Stylesheet URLs, injected in order before the factory runs.
    #[serde(default)]
    styles: Vec<String>,
    /// Opaque data handed to the module factory.
    #[serde(default)]
    args: Value,
}

impl ModuleDescriptor {
    /// Creates a descriptor with no styles and no factory arguments.
    pub fn new(module_name: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            entry: entry.into(),
            styles: Vec::new(),
            args: Value::Null,
        }
    }

    /// Sets the ordered stylesheet list.
    pub fn with_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.styles = styles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the factory arguments.
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    /// Returns the unique module name.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Returns the bundle location.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Returns the stylesheet URLs in injection order.
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    /// Returns the factory arguments (`Null` when none were configured).
    pub fn args(&self) -> &Value {
        &self.args
    }
}
