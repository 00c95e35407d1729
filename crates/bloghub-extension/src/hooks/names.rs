//! Well-known extension points fired by the host.
//!
//! The namespace is flat: any string is a valid hook name, and modules are
//! free to declare their own. These are the ones the host itself fires.

/// Fired once through `exec` after every module has been loaded.
pub const INIT: &str = "init";

/// Filter over the layout slot map (`{ slot: [component, ...] }`).
pub const LAYOUTS: &str = "layouts";

/// Filter over the navigation menu entries (`[{ label, path }, ...]`).
pub const MENU: &str = "menu";

/// Filter over a page title. Extra argument: the route path.
pub const TITLE: &str = "title";

/// Filter over document head entries (`[{ tag, attrs }, ...]`). Extra
/// argument: the route path.
pub const HEAD: &str = "head";

/// Filter over the route list before it is handed to the router. See
/// [`ExtensionManager::resolved_routes`](crate::ExtensionManager::resolved_routes).
pub const ROUTES: &str = "routes";

/// Filter over the translation table. Extra argument: the locale.
pub const TRANSLATIONS: &str = "translations";
