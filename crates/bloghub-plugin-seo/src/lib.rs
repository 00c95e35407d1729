//! SEO plugin for BlogHub.
//!
//! Builds on the extension points the active theme declares: it shortens
//! document titles, appends description, canonical, and robots entries to the
//! document head, and contributes a `/sitemap.xml` route ahead of the theme's
//! routes.

pub mod hooks;
pub mod plugin;

pub use plugin::{MODULE_NAME, SeoOptions, SeoPlugin};
