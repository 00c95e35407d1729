//! Theme options, read from the module descriptor's `args`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bloghub_core::error::AppResult;

/// Site title used when neither the theme args nor the site settings set one.
pub const DEFAULT_SITE_TITLE: &str = "BlogHub";

/// One navigation menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Display label or translation key.
    pub label: String,
    /// Target route path.
    pub path: String,
}

impl MenuItem {
    /// Creates a menu entry.
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Options accepted by the default theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOptions {
    /// Overrides the `title` site setting.
    pub site_title: Option<String>,
    /// Placed between the page title and the site title.
    pub title_separator: String,
    /// Whether to expose the `/archive` page and its menu entry.
    pub archive: bool,
    /// Extra menu entries appended after the built-in ones.
    pub menu: Vec<MenuItem>,
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            site_title: None,
            title_separator: " - ".to_string(),
            archive: true,
            menu: Vec::new(),
        }
    }
}

impl ThemeOptions {
    /// Parses options from descriptor args. `null` yields the defaults.
    pub fn from_args(args: &Value) -> AppResult<Self> {
        if args.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(args.clone())?)
    }

    /// Menu entries the theme contributes, built-ins first.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items = vec![MenuItem::new("theme.home", "/")];
        if self.archive {
            items.push(MenuItem::new("theme.archive", "/archive"));
        }
        items.extend(self.menu.iter().cloned());
        items
    }
}
