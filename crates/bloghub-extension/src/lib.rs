//! # bloghub-extension
//!
//! Extension layer for BlogHub. Provides:
//!
//! - Hook registry with priority-ordered, arity-aware callbacks
//! - Hook dispatcher with `filter` (value threading) and `exec` (actions),
//!   both fail-fast
//! - Module loader that fetches, evaluates, and instantiates theme/plugin
//!   bundles with per-module failure isolation
//! - Static (built-in) and, with the `dynamic` feature, shared-library
//!   bundle sources
//! - [`ExtensionManager`], which wires the above together and runs the boot
//!   sequence

pub mod hooks;
pub mod macros;
pub mod manager;
pub mod module;
pub mod prelude;

pub use hooks::{Hook, HookDispatcher, HookFn, HookOptions, HookRegistry, RemoveScope};
pub use manager::ExtensionManager;
pub use module::{
    LoadOptions, LoadOutcome, LoadReport, ModuleContext, ModuleDescriptor, ModuleFactory,
    ModuleLoader, ModuleState,
};
