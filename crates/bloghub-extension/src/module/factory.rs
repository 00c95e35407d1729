//! Module factories: the entry point every theme and plugin exports.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

use bloghub_core::error::AppResult;

use super::context::ModuleContext;

/// Entry point of a module, invoked once with its context.
///
/// The factory registers hook callbacks and routes through `ctx`. Returning
/// an error (or panicking) marks the module as failed without affecting
/// other modules.
#[async_trait]
pub trait ModuleFactory: Send + Sync + std::fmt::Debug {
    /// Initializes the module.
    async fn init(&self, ctx: ModuleContext) -> AppResult<()>;
}

type FactoryFn = dyn Fn(ModuleContext) -> BoxFuture<'static, AppResult<()>> + Send + Sync;

/// A closure-based module factory.
pub struct FnFactory {
    /// Label used in debug output.
    label: String,
    /// Factory function.
    func: Arc<FactoryFn>,
}

impl std::fmt::Debug for FnFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFactory")
            .field("label", &self.label)
            .field("func", &"<closure>")
            .finish()
    }
}

impl FnFactory {
    /// Creates a factory from an async closure.
    pub fn new<F, Fut>(label: &str, func: F) -> Self
    where
        F: Fn(ModuleContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        Self {
            label: label.to_string(),
            func: Arc::new(move |ctx| func(ctx).boxed()),
        }
    }

    /// Creates a factory from a synchronous closure.
    pub fn from_sync<F>(label: &str, func: F) -> Self
    where
        F: Fn(ModuleContext) -> AppResult<()> + Send + Sync + 'static,
    {
        Self::new(label, move |ctx| futures::future::ready(func(ctx)))
    }

    /// Wraps the factory into an `Arc<dyn ModuleFactory>`.
    pub fn shared(self) -> Arc<dyn ModuleFactory> {
        Arc::new(self)
    }
}

#[async_trait]
impl ModuleFactory for FnFactory {
    async fn init(&self, ctx: ModuleContext) -> AppResult<()> {
        (self.func)(ctx).await
    }
}
