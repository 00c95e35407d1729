//! Bundle sources: the fetch and evaluate capability behind module loading.
//!
//! A source turns a descriptor's `entry` into a [`Bundle`] (fetch) and a
//! bundle into a [`ModuleFactory`] (evaluate). Both stages report failures
//! as errors so the loader can attribute them to the right stage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tracing::info;

use bloghub_core::error::{AppError, AppResult, ErrorKind};

use super::factory::ModuleFactory;

/// URL scheme of statically linked modules.
pub const BUILTIN_SCHEME: &str = "builtin";

/// A fetched, not yet evaluated, module bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// The descriptor entry this bundle was fetched from.
    pub entry: String,
    /// Source-specific resolved location (registry key, file path, ...).
    pub locator: String,
    /// Raw bundle contents, empty for sources that do not read bytes.
    pub bytes: Bytes,
}

/// Fetch and evaluate capability supplied by the host.
#[async_trait]
pub trait BundleSource: Send + Sync + std::fmt::Debug {
    /// Fetches the bundle at `entry`.
    async fn fetch(&self, entry: &str) -> AppResult<Bundle>;

    /// Evaluates a fetched bundle into its factory.
    async fn evaluate(&self, bundle: Bundle) -> AppResult<Arc<dyn ModuleFactory>>;
}

/// Splits `scheme://rest` into its parts.
pub fn split_entry(entry: &str) -> (Option<&str>, &str) {
    match entry.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, entry),
    }
}

/// Build-time registry of statically linked modules, addressed as
/// `builtin://<name>`.
#[derive(Debug, Default)]
pub struct StaticBundleSource {
    factories: RwLock<HashMap<String, Arc<dyn ModuleFactory>>>,
}

impl StaticBundleSource {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`, replacing any previous one.
    pub fn register(&self, name: &str, factory: Arc<dyn ModuleFactory>) {
        self.factories.write().insert(name.to_string(), factory);
        info!(module = %name, "Built-in module registered");
    }

    /// Builder-style [`StaticBundleSource::register`].
    pub fn with(self, name: &str, factory: Arc<dyn ModuleFactory>) -> Self {
        self.register(name, factory);
        self
    }

    /// Returns the registered module names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl BundleSource for StaticBundleSource {
    async fn fetch(&self, entry: &str) -> AppResult<Bundle> {
        let name = match split_entry(entry) {
            (Some(BUILTIN_SCHEME), name) => name,
            _ => {
                return Err(AppError::fetch(format!(
                    "'{entry}' is not a {BUILTIN_SCHEME}:// entry"
                )));
            }
        };

        if !self.factories.read().contains_key(name) {
            return Err(AppError::with_source(
                ErrorKind::Fetch,
                format!("Cannot fetch '{entry}'"),
                missing(name),
            ));
        }

        Ok(Bundle {
            entry: entry.to_string(),
            locator: name.to_string(),
            bytes: Bytes::new(),
        })
    }

    async fn evaluate(&self, bundle: Bundle) -> AppResult<Arc<dyn ModuleFactory>> {
        self.factories
            .read()
            .get(&bundle.locator)
            .cloned()
            .ok_or_else(|| {
                AppError::with_source(
                    ErrorKind::Evaluation,
                    format!("Cannot evaluate '{}'", bundle.entry),
                    missing(&bundle.locator),
                )
            })
    }
}

fn missing(name: &str) -> AppError {
    AppError::not_found(format!("No built-in module named '{name}'"))
}

/// Routes entries to the source registered for their URL scheme.
///
/// Entries without a scheme use the source registered for `file`.
#[derive(Debug, Default)]
pub struct CompositeBundleSource {
    sources: HashMap<String, Arc<dyn BundleSource>>,
}

impl CompositeBundleSource {
    /// Creates a composite with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `scheme://` entries to `source`.
    pub fn with(mut self, scheme: &str, source: Arc<dyn BundleSource>) -> Self {
        self.sources.insert(scheme.to_string(), source);
        self
    }

    fn route(&self, entry: &str) -> AppResult<&Arc<dyn BundleSource>> {
        let scheme = split_entry(entry).0.unwrap_or("file");
        self.sources
            .get(scheme)
            .ok_or_else(|| AppError::fetch(format!("No bundle source for scheme '{scheme}'")))
    }
}

#[async_trait]
impl BundleSource for CompositeBundleSource {
    async fn fetch(&self, entry: &str) -> AppResult<Bundle> {
        self.route(entry)?.fetch(entry).await
    }

    async fn evaluate(&self, bundle: Bundle) -> AppResult<Arc<dyn ModuleFactory>> {
        let source = self
            .route(&bundle.entry)
            .map_err(|e| AppError::evaluation(e.message))?
            .clone();
        source.evaluate(bundle).await
    }
}
