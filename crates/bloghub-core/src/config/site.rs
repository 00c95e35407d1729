//! Site settings handed read-only to theme and plugin modules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Host configuration visible to modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Active locale tag.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Free-form site settings (title, description, posts per page, ...).
    #[serde(default)]
    pub settings: Map<String, Value>,
    /// Theme variables (colors, fonts, ...).
    #[serde(default)]
    pub theme: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            settings: Map::new(),
            theme: Map::new(),
        }
    }
}

fn default_locale() -> String {
    "en-US".to_string()
}
