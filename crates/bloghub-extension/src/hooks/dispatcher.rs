//! Hook dispatcher: runs a chain under `filter` or `exec` semantics.
//!
//! Both modes:
//! - take one snapshot of the chain when the call starts, so callbacks
//!   registered while it runs are only seen by later dispatches;
//! - await callbacks one at a time in chain order;
//! - stop at the first error and return it to the caller unchanged.
//!
//! `filter` threads a value through the chain. `exec` passes the same
//! arguments to every callback and discards return values.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use bloghub_core::error::AppResult;

use super::callback::{CallbackId, HookFn, HookOptions};
use super::registry::{HookRegistry, RemoveScope};

/// Dispatches hooks to their registered callbacks.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Passes `value` through every callback on `name`.
    ///
    /// Each callback is offered `(current, extra...)` and its result becomes
    /// the next `current`. An empty chain returns `value` unchanged.
    pub async fn filter(&self, name: &str, value: Value, extra: &[Value]) -> AppResult<Value> {
        let callbacks = self.registry.snapshot(name);
        if callbacks.is_empty() {
            return Ok(value);
        }

        debug!(
            hook = %name,
            callback_count = callbacks.len(),
            "Applying filter"
        );

        let mut current = value;
        for callback in &callbacks {
            let mut offered = Vec::with_capacity(1 + extra.len());
            offered.push(current);
            offered.extend_from_slice(extra);

            current = callback.call(offered).await.inspect_err(|e| {
                warn!(
                    hook = %name,
                    callback_id = %callback.id(),
                    priority = callback.priority(),
                    error = %e,
                    "Filter callback failed"
                );
            })?;
        }

        Ok(current)
    }

    /// Invokes every callback on `name` with `args`, in order.
    pub async fn exec(&self, name: &str, args: &[Value]) -> AppResult<()> {
        let callbacks = self.registry.snapshot(name);
        if callbacks.is_empty() {
            return Ok(());
        }

        debug!(
            hook = %name,
            callback_count = callbacks.len(),
            "Executing action"
        );

        for callback in &callbacks {
            callback.call(args.to_vec()).await.inspect_err(|e| {
                warn!(
                    hook = %name,
                    callback_id = %callback.id(),
                    priority = callback.priority(),
                    error = %e,
                    "Action callback failed"
                );
            })?;
        }

        Ok(())
    }

    /// Returns a handle bound to one hook name.
    pub fn hook(&self, name: impl Into<String>) -> Hook {
        Hook {
            name: name.into(),
            dispatcher: self.clone(),
        }
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

/// A named extension point: registration and dispatch for one hook.
#[derive(Debug, Clone)]
pub struct Hook {
    name: String,
    dispatcher: HookDispatcher,
}

impl Hook {
    /// Returns the hook name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// See [`HookRegistry::register`].
    pub fn register(&self, func: HookFn) -> CallbackId {
        self.dispatcher.registry.register(&self.name, func)
    }

    /// See [`HookRegistry::register_with`].
    pub fn register_with(&self, func: HookFn, options: HookOptions) -> CallbackId {
        self.dispatcher
            .registry
            .register_with(&self.name, func, options)
    }

    /// See [`HookRegistry::remove`].
    pub fn remove(&self, func: &HookFn, priority: Option<i32>) -> bool {
        self.dispatcher.registry.remove(&self.name, func, priority)
    }

    /// See [`HookRegistry::remove_all`].
    pub fn remove_all(&self, scope: RemoveScope) -> usize {
        self.dispatcher.registry.remove_all(&self.name, scope)
    }

    /// See [`HookRegistry::has`].
    pub fn has(&self) -> bool {
        self.dispatcher.registry.has(&self.name)
    }

    /// See [`HookRegistry::has_callback`].
    pub fn has_callback(&self, func: &HookFn) -> Option<i32> {
        self.dispatcher.registry.has_callback(&self.name, func)
    }

    /// See [`HookDispatcher::filter`].
    pub async fn filter(&self, value: Value, extra: &[Value]) -> AppResult<Value> {
        self.dispatcher.filter(&self.name, value, extra).await
    }

    /// See [`HookDispatcher::exec`].
    pub async fn exec(&self, args: &[Value]) -> AppResult<()> {
        self.dispatcher.exec(&self.name, args).await
    }
}
