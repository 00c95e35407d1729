//! Module loader: fetches, evaluates, and instantiates theme/plugin modules.
//!
//! Every module runs through `Pending → Fetching → Evaluating →
//! Instantiating → {Succeeded | Failed}`. A failure at any stage, including
//! a panic or an exceeded time budget, is confined to that module: it is
//! logged, passed to the `on_error` callback, and recorded in the report,
//! and loading continues with the next module. `load` itself never fails.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use bloghub_core::config::LoadMode;
use bloghub_core::error::{AppError, AppResult, ErrorKind};
use bloghub_core::types::ModuleDescriptor;

use crate::hooks::HookDispatcher;

use super::context::{HostConfig, ModuleContext};
use super::routes::RouteSink;
use super::source::BundleSource;
use super::styles::StyleSink;

/// Lifecycle state of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Accepted for loading, not started.
    Pending,
    /// Fetching the bundle.
    Fetching,
    /// Evaluating the bundle into a factory.
    Evaluating,
    /// Running the factory.
    Instantiating,
    /// The factory completed.
    Succeeded,
    /// A stage failed.
    Failed,
}

impl ModuleState {
    /// Returns `true` for `Succeeded` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Error kind attributed to a failure observed in this state.
    fn failure_kind(self) -> ErrorKind {
        match self {
            Self::Fetching => ErrorKind::Fetch,
            Self::Evaluating => ErrorKind::Evaluation,
            _ => ErrorKind::Factory,
        }
    }
}

/// Final result of loading one module.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// The module's factory completed.
    Succeeded {
        /// Module name.
        module_name: String,
    },
    /// The module failed; it contributes nothing further.
    Failed {
        /// Module name.
        module_name: String,
        /// What went wrong.
        error: AppError,
    },
}

impl LoadOutcome {
    /// Returns the module name.
    pub fn module_name(&self) -> &str {
        match self {
            Self::Succeeded { module_name } | Self::Failed { module_name, .. } => module_name,
        }
    }

    /// Returns `true` if the module loaded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Outcomes of one `load` call, in descriptor order.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// One outcome per descriptor.
    pub outcomes: Vec<LoadOutcome>,
}

impl LoadReport {
    /// Names of the modules that loaded.
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.module_name())
            .collect()
    }

    /// Failed modules and their errors.
    pub fn failures(&self) -> Vec<(&str, &AppError)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                LoadOutcome::Failed { module_name, error } => Some((module_name.as_str(), error)),
                LoadOutcome::Succeeded { .. } => None,
            })
            .collect()
    }

    /// Returns `true` if every module loaded.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(LoadOutcome::is_success)
    }
}

/// Callback receiving `(module_name, error)` for each failed module.
pub type ErrorCallback = Arc<dyn Fn(&str, &AppError) + Send + Sync>;

/// Options for one `load` call.
#[derive(Clone, Default)]
pub struct LoadOptions {
    /// Scheduling mode.
    pub mode: LoadMode,
    /// Failure callback.
    pub on_error: Option<ErrorCallback>,
    /// Budget for one module's fetch, evaluation, and factory together.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOptions")
            .field("mode", &self.mode)
            .field("on_error", &self.on_error.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LoadOptions {
    /// Sequential loading without a failure callback.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Concurrent loading without a failure callback.
    pub fn concurrent() -> Self {
        Self {
            mode: LoadMode::Concurrent,
            ..Self::default()
        }
    }

    /// Sets the failure callback.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &AppError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Sets the per-module time budget.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Loads modules against the shared hook dispatcher and route table.
pub struct ModuleLoader {
    source: Arc<dyn BundleSource>,
    hooks: HookDispatcher,
    routes: Arc<dyn RouteSink>,
    styles: Arc<dyn StyleSink>,
    host: Arc<HostConfig>,
    /// Module name → current state. Names stay reserved once seen.
    states: DashMap<String, ModuleState>,
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("source", &self.source)
            .field("modules", &self.states.len())
            .finish()
    }
}

impl ModuleLoader {
    /// Creates a loader.
    pub fn new(
        source: Arc<dyn BundleSource>,
        hooks: HookDispatcher,
        routes: Arc<dyn RouteSink>,
        styles: Arc<dyn StyleSink>,
        host: Arc<HostConfig>,
    ) -> Self {
        Self {
            source,
            hooks,
            routes,
            styles,
            host,
            states: DashMap::new(),
        }
    }

    /// Loads `descriptors` and reports one outcome per descriptor.
    ///
    /// A descriptor whose name this loader has already seen fails with a
    /// validation error and leaves the earlier module untouched.
    pub async fn load(&self, descriptors: &[ModuleDescriptor], options: &LoadOptions) -> LoadReport {
        let started = Instant::now();
        let mut seen = HashSet::new();
        let accepted: Vec<bool> = descriptors
            .iter()
            .map(|d| {
                let name = d.module_name();
                let fresh = seen.insert(name) && !self.states.contains_key(name);
                if fresh {
                    self.states.insert(name.to_string(), ModuleState::Pending);
                }
                fresh
            })
            .collect();

        info!(
            modules = descriptors.len(),
            mode = ?options.mode,
            "Loading modules"
        );

        let outcomes = match options.mode {
            LoadMode::Sequential => {
                let mut outcomes = Vec::with_capacity(descriptors.len());
                for (descriptor, fresh) in descriptors.iter().zip(&accepted) {
                    outcomes.push(self.load_one(descriptor, *fresh, options).await);
                }
                outcomes
            }
            LoadMode::Concurrent => {
                join_all(
                    descriptors
                        .iter()
                        .zip(&accepted)
                        .map(|(descriptor, fresh)| self.load_one(descriptor, *fresh, options)),
                )
                .await
            }
        };

        let report = LoadReport { outcomes };
        info!(
            succeeded = report.succeeded().len(),
            failed = report.failures().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Module loading finished"
        );
        report
    }

    /// Returns the current state of `module_name`.
    pub fn state(&self, module_name: &str) -> Option<ModuleState> {
        self.states.get(module_name).map(|s| *s)
    }

    /// Returns every known module and its state, sorted by name.
    pub fn states(&self) -> Vec<(String, ModuleState)> {
        let mut states: Vec<_> = self
            .states
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }

    async fn load_one(
        &self,
        descriptor: &ModuleDescriptor,
        fresh: bool,
        options: &LoadOptions,
    ) -> LoadOutcome {
        let name = descriptor.module_name();
        let started = Instant::now();

        let result = if fresh {
            self.run_guarded(descriptor, options.timeout).await
        } else {
            Err(AppError::validation(format!(
                "Module '{name}' is already loaded or declared twice"
            )))
        };

        match result {
            Ok(()) => {
                self.transition(name, ModuleState::Succeeded);
                info!(
                    module = %name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Module loaded"
                );
                LoadOutcome::Succeeded {
                    module_name: name.to_string(),
                }
            }
            Err(error) => {
                if fresh {
                    self.transition(name, ModuleState::Failed);
                }
                error!(module = %name, error = %error, "Module failed to load");
                if let Some(callback) = &options.on_error {
                    callback(name, &error);
                }
                LoadOutcome::Failed {
                    module_name: name.to_string(),
                    error,
                }
            }
        }
    }

    /// Runs all stages, converting panics and timeouts into errors.
    async fn run_guarded(
        &self,
        descriptor: &ModuleDescriptor,
        timeout: Option<Duration>,
    ) -> AppResult<()> {
        let name = descriptor.module_name();
        let attempt = AssertUnwindSafe(self.run_stages(descriptor)).catch_unwind();

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => {
                    let stage = self.state(name).unwrap_or(ModuleState::Pending);
                    return Err(AppError::timeout(format!(
                        "Module '{name}' exceeded {}ms while {stage:?}",
                        limit.as_millis()
                    )));
                }
            },
            None => attempt.await,
        };

        result.unwrap_or_else(|panic| {
            let stage = self.state(name).unwrap_or(ModuleState::Pending);
            Err(AppError::new(
                stage.failure_kind(),
                format!(
                    "Module '{name}' panicked while {stage:?}: {}",
                    panic_message(panic.as_ref())
                ),
            ))
        })
    }

    async fn run_stages(&self, descriptor: &ModuleDescriptor) -> AppResult<()> {
        let name = descriptor.module_name();

        self.transition(name, ModuleState::Fetching);
        let bundle = self
            .source
            .fetch(descriptor.entry())
            .await
            .map_err(|e| stage_error(ErrorKind::Fetch, name, e))?;

        self.transition(name, ModuleState::Evaluating);
        let factory = self
            .source
            .evaluate(bundle)
            .await
            .map_err(|e| stage_error(ErrorKind::Evaluation, name, e))?;

        // Only modules that evaluated contribute styles.
        if !descriptor.styles().is_empty() {
            self.styles.inject(name, descriptor.styles());
        }

        self.transition(name, ModuleState::Instantiating);
        let ctx = ModuleContext::new(
            name,
            descriptor.args().clone(),
            self.hooks.clone(),
            self.routes.clone(),
            self.host.clone(),
        );
        factory
            .init(ctx)
            .await
            .map_err(|e| stage_error(ErrorKind::Factory, name, e))
    }

    fn transition(&self, name: &str, state: ModuleState) {
        self.states.insert(name.to_string(), state);
        debug!(module = %name, state = ?state, "Module state changed");
    }
}

/// Attributes `err` to a stage, keeping the original as the source.
fn stage_error(kind: ErrorKind, module: &str, err: AppError) -> AppError {
    if err.kind == kind {
        return err;
    }
    AppError::with_source(kind, format!("Module '{module}': {}", err.message), err)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
