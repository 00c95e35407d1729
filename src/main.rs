//! BlogHub: themeable blog front-end host
//!
//! Main entry point that loads configuration, boots the extension layer, and
//! reports which theme and plugin modules came up.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use bloghub_core::config::{AppConfig, LoadMode};
use bloghub_extension::ExtensionManager;
use bloghub_extension::module::{
    BundleSource, HostConfig, LoadOptions, LoadReport, StaticBundleSource,
};
use bloghub_plugin_seo::SeoPlugin;
use bloghub_theme_default::DefaultTheme;

/// BlogHub extension host
#[derive(Parser)]
#[command(name = "bloghub", version, about = "BlogHub extension host")]
struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Environment overlay to apply on top of the defaults
    #[arg(long, default_value = "development")]
    env: String,

    /// Load modules concurrently instead of in declaration order
    #[arg(long)]
    concurrent: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Boot the configured modules and print the load report
    Boot,
    /// Boot, then list registered hooks and their callback counts
    Hooks,
    /// Boot, then list the resolved front-end routes
    Routes,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "BlogHub failed to start");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Sources for every module the host can load.
///
/// Built-in modules are always available under `builtin://`. With the
/// `dynamic` feature, shared libraries are loaded from `file://` entries.
fn bundle_source() -> Arc<dyn BundleSource> {
    let builtin = StaticBundleSource::new()
        .with(bloghub_theme_default::MODULE_NAME, DefaultTheme::shared())
        .with(bloghub_plugin_seo::MODULE_NAME, SeoPlugin::shared());

    #[cfg(feature = "dynamic")]
    {
        use bloghub_extension::module::{BUILTIN_SCHEME, CompositeBundleSource, DynamicBundleSource};

        Arc::new(
            CompositeBundleSource::new()
                .with(BUILTIN_SCHEME, Arc::new(builtin))
                .with("file", Arc::new(DynamicBundleSource::new())),
        )
    }

    #[cfg(not(feature = "dynamic"))]
    {
        Arc::new(builtin)
    }
}

/// Boots the extension layer and runs the selected command
async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %cli.env,
        "Starting BlogHub"
    );

    let descriptors = config.extensions.descriptors();
    let mut options = LoadOptions::from(&config.extensions).on_error(|module, error| {
        tracing::warn!(module = %module, kind = %error.kind, "Module skipped");
    });
    if cli.concurrent {
        options.mode = LoadMode::Concurrent;
    }

    let manager = ExtensionManager::new(bundle_source(), HostConfig::from(config.site));
    let report = manager.boot(&descriptors, &options).await?;

    match cli.command.unwrap_or(Commands::Boot) {
        Commands::Boot => print_report(&report),
        Commands::Hooks => {
            print_report(&report);
            println!();
            for name in manager.hooks().registry().hook_names() {
                println!("{name:<16} {}", manager.hooks().registry().count(&name));
            }
        }
        Commands::Routes => {
            for route in manager.resolved_routes().await? {
                println!(
                    "{:<28} {:<20} {}",
                    route.path,
                    route.component,
                    route.name.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

fn print_report(report: &LoadReport) {
    for name in report.succeeded() {
        println!("ok      {name}");
    }
    for (name, error) in report.failures() {
        println!("failed  {name}: {error}");
    }
    if report.is_clean() {
        println!("BlogHub ready");
    } else {
        println!(
            "BlogHub ready with {} failed module(s)",
            report.failures().len()
        );
    }
}
