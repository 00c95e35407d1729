//! Default theme module factory.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use bloghub_core::error::AppResult;
use bloghub_extension::hooks::names;
use bloghub_extension::module::{ModuleContext, ModuleFactory, Route};

use crate::hooks;
use crate::options::{DEFAULT_SITE_TITLE, ThemeOptions};

/// Name under which the theme is registered in the static bundle source.
pub const MODULE_NAME: &str = "theme-default";

/// The built-in default theme.
#[derive(Debug, Default)]
pub struct DefaultTheme;

impl DefaultTheme {
    /// Create the theme.
    pub fn new() -> Self {
        Self
    }

    /// Wraps the theme into an `Arc<dyn ModuleFactory>`.
    pub fn shared() -> Arc<dyn ModuleFactory> {
        Arc::new(Self)
    }
}

#[async_trait]
impl ModuleFactory for DefaultTheme {
    async fn init(&self, ctx: ModuleContext) -> AppResult<()> {
        let options = ThemeOptions::from_args(ctx.args())?;

        let site_title = options
            .site_title
            .clone()
            .or_else(|| setting_str(&ctx, "title"))
            .unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());
        let primary_color = ctx
            .theme()
            .get("primary")
            .and_then(Value::as_str)
            .map(str::to_string);

        ctx.hook(names::LAYOUTS).register(hooks::layouts());
        ctx.hook(names::MENU)
            .register(hooks::menu(options.menu_items()));
        ctx.hook(names::TITLE).register(hooks::title(
            site_title.clone(),
            options.title_separator.clone(),
        ));
        ctx.hook(names::HEAD).register(hooks::head(primary_color));
        ctx.hook(names::TRANSLATIONS)
            .register(hooks::translations());
        ctx.hook(names::INIT).register(hooks::ready(
            ctx.module_name().to_string(),
            ctx.locale().to_string(),
        ));

        ctx.add_routes(routes(&options), None);

        info!(
            module = %ctx.module_name(),
            site_title = %site_title,
            archive = options.archive,
            "Default theme registered"
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

fn routes(options: &ThemeOptions) -> Vec<Route> {
    let mut routes = vec![
        Route::new("/", "ThemeHome").with_name("home"),
        Route::new("/posts/:slug", "ThemePost").with_name("post"),
        Route::new("/tags/:tag", "ThemeTag").with_name("tag"),
        Route::new("/categories/:category", "ThemeCategory").with_name("category"),
    ];
    if options.archive {
        routes.push(Route::new("/archive", "ThemeArchive").with_name("archive"));
    }
    routes
}
