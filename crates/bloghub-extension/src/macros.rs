//! Convenience macros for module development.

/// Exports a module factory from a shared library built as a `cdylib`.
///
/// Generates the `bloghub_module_factory` entry point that the dynamic
/// bundle source looks up.
///
/// # Example
/// ```rust,ignore
/// use bloghub_extension::prelude::*;
///
/// export_module!(FnFactory::from_sync("reading-time", |ctx| {
///     ctx.hook(names::INIT).register(HookFn::nullary_sync(|| Ok(Value::Null)));
///     Ok(())
/// }));
/// ```
#[macro_export]
macro_rules! export_module {
    ($factory:expr) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn bloghub_module_factory()
        -> *mut ::std::sync::Arc<dyn $crate::module::ModuleFactory> {
            let factory: ::std::sync::Arc<dyn $crate::module::ModuleFactory> =
                ::std::sync::Arc::new($factory);
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(factory))
        }
    };
}
