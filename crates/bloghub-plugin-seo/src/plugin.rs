//! SEO plugin implementation: registers with the BlogHub extension layer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use bloghub_core::error::{AppError, AppResult};
use bloghub_extension::hooks::{HookOptions, names};
use bloghub_extension::module::{MergeStrategy, ModuleContext, ModuleFactory, Route};

use crate::hooks::{self, HeadEntries, SEO_PRIORITY};

/// Name under which the plugin is registered in the static bundle source.
pub const MODULE_NAME: &str = "seo";

/// Options accepted by the SEO plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoOptions {
    /// Overrides the `description` site setting.
    pub description: Option<String>,
    /// Overrides the `base_url` site setting for canonical links.
    pub canonical_base: Option<String>,
    /// Titles longer than this are shortened.
    pub max_title_length: usize,
    /// Whether to contribute the `/sitemap.xml` route.
    pub sitemap: bool,
    /// Route paths excluded from indexing.
    pub noindex: Vec<String>,
}

impl Default for SeoOptions {
    fn default() -> Self {
        Self {
            description: None,
            canonical_base: None,
            max_title_length: 60,
            sitemap: true,
            noindex: Vec::new(),
        }
    }
}

/// SEO plugin for BlogHub
#[derive(Debug, Default)]
pub struct SeoPlugin;

impl SeoPlugin {
    /// Create the plugin.
    pub fn new() -> Self {
        Self
    }

    /// Wraps the plugin into an `Arc<dyn ModuleFactory>`.
    pub fn shared() -> Arc<dyn ModuleFactory> {
        Arc::new(Self)
    }
}

#[async_trait]
impl ModuleFactory for SeoPlugin {
    async fn init(&self, ctx: ModuleContext) -> AppResult<()> {
        for required in [names::TITLE, names::HEAD] {
            if !ctx.hook(required).has() {
                return Err(AppError::validation(format!(
                    "SEO plugin needs a theme that declares the '{required}' hook"
                )));
            }
        }

        let options: SeoOptions = if ctx.args().is_null() {
            SeoOptions::default()
        } else {
            serde_json::from_value(ctx.args().clone())?
        };

        let after_theme = HookOptions::priority(SEO_PRIORITY);
        ctx.hook(names::TITLE).register_with(
            hooks::shorten_title(options.max_title_length),
            after_theme,
        );
        ctx.hook(names::HEAD).register_with(
            hooks::head(HeadEntries {
                description: options
                    .description
                    .clone()
                    .or_else(|| setting_str(&ctx, "description")),
                canonical_base: options
                    .canonical_base
                    .clone()
                    .or_else(|| setting_str(&ctx, "base_url"))
                    .map(|base| base.trim_end_matches('/').to_string()),
                noindex: options.noindex.clone(),
            }),
            after_theme,
        );
        if !options.noindex.is_empty() {
            ctx.hook(names::ROUTES)
                .register_with(hooks::mark_noindex(options.noindex.clone()), after_theme);
        }

        if options.sitemap {
            ctx.add_routes(
                vec![
                    Route::new("/sitemap.xml", "SeoSitemap")
                        .with_name("sitemap")
                        .with_meta(serde_json::json!({ "layout": false })),
                ],
                Some(MergeStrategy::Prepend),
            );
        }

        info!(
            module = %ctx.module_name(),
            sitemap = options.sitemap,
            noindex = options.noindex.len(),
            "SEO plugin registered"
        );
        Ok(())
    }
}

fn setting_str(ctx: &ModuleContext, key: &str) -> Option<String> {
    ctx.settings()
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}
