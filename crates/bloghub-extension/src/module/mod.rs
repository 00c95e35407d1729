//! Module system: descriptors, contexts, factories, bundle sources, and
//! the loader that ties them together.

pub mod context;
pub mod dynamic;
pub mod factory;
pub mod loader;
pub mod routes;
pub mod source;
pub mod styles;

pub use bloghub_core::types::ModuleDescriptor;
pub use context::{HostConfig, ModuleContext};
#[cfg(feature = "dynamic")]
pub use dynamic::DynamicBundleSource;
pub use dynamic::{CreateFactoryFn, FACTORY_SYMBOL};
pub use factory::{FnFactory, ModuleFactory};
pub use loader::{ErrorCallback, LoadOptions, LoadOutcome, LoadReport, ModuleLoader, ModuleState};
pub use routes::{MergeStrategy, Route, RouteEntry, RouteSink, RouteTable};
pub use source::{BUILTIN_SCHEME, Bundle, BundleSource, CompositeBundleSource, StaticBundleSource};
pub use styles::{InjectedStyle, StyleRegistry, StyleSink};
