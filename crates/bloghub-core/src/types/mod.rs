//! Core type definitions shared across the BlogHub workspace.

pub mod module;

pub use module::ModuleDescriptor;
