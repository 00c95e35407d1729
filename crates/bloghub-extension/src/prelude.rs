//! Prelude for module authors.

pub use async_trait::async_trait;
pub use serde_json::{Value, json};

pub use bloghub_core::error::{AppError, AppResult};

pub use crate::hooks::names;
pub use crate::hooks::{Hook, HookArgs, HookFn, HookOptions, RemoveScope};
pub use crate::module::{
    FnFactory, HostConfig, MergeStrategy, ModuleContext, ModuleFactory, Route,
};

pub use crate::export_module;
