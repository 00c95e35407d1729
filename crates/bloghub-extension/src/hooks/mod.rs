//! Hook system: callbacks, registry, and dispatcher.

pub mod callback;
pub mod dispatcher;
pub mod names;
pub mod registry;

pub use callback::{Arity, Callback, CallbackId, DEFAULT_PRIORITY, HookArgs, HookFn, HookOptions};
pub use dispatcher::{Hook, HookDispatcher};
pub use registry::{HookRegistry, RemoveScope};
