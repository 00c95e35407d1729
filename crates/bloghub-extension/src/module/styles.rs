//! Stylesheet injection for modules that declare styles.

use std::fmt::Debug;

use parking_lot::RwLock;
use tracing::debug;

/// Stylesheet injection capability supplied by the host.
///
/// The loader calls [`StyleSink::inject`] once per module, with the
/// descriptor's styles in declaration order, before the module factory runs.
pub trait StyleSink: Send + Sync + Debug {
    /// Schedules `urls` for injection on behalf of `module`.
    fn inject(&self, module: &str, urls: &[String]);
}

/// A stylesheet scheduled for injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedStyle {
    /// Module that declared the stylesheet.
    pub module: String,
    /// Stylesheet URL.
    pub url: String,
}

/// Ordered record of injected stylesheets. A URL is injected at most once.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: RwLock<Vec<InjectedStyle>>,
}

impl StyleRegistry {
    /// Creates an empty style registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every injected stylesheet in injection order.
    pub fn styles(&self) -> Vec<InjectedStyle> {
        self.styles.read().clone()
    }

    /// Returns the stylesheet URLs in injection order.
    pub fn urls(&self) -> Vec<String> {
        self.styles.read().iter().map(|s| s.url.clone()).collect()
    }
}

impl StyleSink for StyleRegistry {
    fn inject(&self, module: &str, urls: &[String]) {
        let mut styles = self.styles.write();
        for url in urls {
            if styles.iter().any(|s| &s.url == url) {
                debug!(module = %module, url = %url, "Stylesheet already injected");
                continue;
            }
            styles.push(InjectedStyle {
                module: module.to_string(),
                url: url.clone(),
            });
        }
    }
}
