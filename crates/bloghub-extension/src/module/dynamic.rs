//! Dynamic module source using `libloading` (feature-gated).
//!
//! A dynamic module is a shared library (.so / .dll / .dylib) that exports
//! the [`FACTORY_SYMBOL`] entry point, usually generated with
//! [`export_module!`](crate::export_module). Entries are `file://` URLs or
//! plain paths.

use std::sync::Arc;

use super::factory::ModuleFactory;

/// Name of the entry point every dynamic module exports.
pub const FACTORY_SYMBOL: &str = "bloghub_module_factory";

/// Signature of the exported entry point.
///
/// The returned pointer owns a boxed `Arc<dyn ModuleFactory>` and is
/// reclaimed by the host with `Box::from_raw`. Host and module must be built
/// with the same compiler and the same `bloghub-extension` version.
pub type CreateFactoryFn = unsafe extern "C" fn() -> *mut Arc<dyn ModuleFactory>;

#[cfg(feature = "dynamic")]
mod imp {
    use std::path::PathBuf;
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use tracing::info;

    use bloghub_core::error::{AppError, AppResult};

    use super::{CreateFactoryFn, FACTORY_SYMBOL};
    use crate::module::factory::ModuleFactory;
    use crate::module::source::{Bundle, BundleSource, split_entry};

    /// Loads module factories from shared libraries.
    ///
    /// Loaded libraries stay mapped for the lifetime of the source, since
    /// callbacks registered by their factories point into library code.
    #[derive(Default)]
    pub struct DynamicBundleSource {
        libraries: Mutex<Vec<libloading::Library>>,
    }

    impl DynamicBundleSource {
        /// Creates a new dynamic source.
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns the number of libraries loaded so far.
        pub fn loaded_count(&self) -> usize {
            self.libraries.lock().len()
        }

        fn resolve(entry: &str) -> AppResult<PathBuf> {
            match split_entry(entry) {
                (Some("file"), path) | (None, path) => Ok(PathBuf::from(path)),
                (Some(scheme), _) => Err(AppError::fetch(format!(
                    "Dynamic modules cannot be fetched over '{scheme}'"
                ))),
            }
        }
    }

    impl std::fmt::Debug for DynamicBundleSource {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicBundleSource")
                .field("loaded_count", &self.loaded_count())
                .finish()
        }
    }

    #[async_trait]
    impl BundleSource for DynamicBundleSource {
        async fn fetch(&self, entry: &str) -> AppResult<Bundle> {
            let path = Self::resolve(entry)?;
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                AppError::with_source(
                    bloghub_core::ErrorKind::Fetch,
                    format!("Failed to read module library '{}': {e}", path.display()),
                    e,
                )
            })?;

            Ok(Bundle {
                entry: entry.to_string(),
                locator: path.display().to_string(),
                bytes: Bytes::from(bytes),
            })
        }

        async fn evaluate(&self, bundle: Bundle) -> AppResult<Arc<dyn ModuleFactory>> {
            // SAFETY: loading a library runs its initializers; only trusted
            // module paths from the host configuration reach this point.
            let library = unsafe { libloading::Library::new(&bundle.locator) }.map_err(|e| {
                AppError::evaluation(format!(
                    "Failed to load module library '{}': {e}",
                    bundle.locator
                ))
            })?;

            // SAFETY: the symbol type is fixed by `CreateFactoryFn`; modules
            // export it through `export_module!`.
            let factory = unsafe {
                let create: libloading::Symbol<CreateFactoryFn> =
                    library.get(FACTORY_SYMBOL.as_bytes()).map_err(|e| {
                        AppError::evaluation(format!(
                            "Module '{}' missing '{FACTORY_SYMBOL}' symbol: {e}",
                            bundle.locator
                        ))
                    })?;
                let raw = create();
                if raw.is_null() {
                    return Err(AppError::evaluation(format!(
                        "Module '{}' returned a null factory",
                        bundle.locator
                    )));
                }
                *Box::from_raw(raw)
            };

            info!(
                path = %bundle.locator,
                size = bundle.bytes.len(),
                "Dynamic module library loaded"
            );

            self.libraries.lock().push(library);
            Ok(factory)
        }
    }

}

#[cfg(feature = "dynamic")]
pub use imp::DynamicBundleSource;
