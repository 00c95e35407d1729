//! # bloghub-core
//!
//! Core crate for BlogHub. Contains the configuration schemas, the module
//! descriptor type shared by the extension layer and its configuration,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other BlogHub crates.

pub mod config;
pub mod error;
pub mod types;

pub use error::{AppError, AppResult, ErrorKind};
