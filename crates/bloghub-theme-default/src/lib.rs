//! Default theme for BlogHub.
//!
//! The theme is statically linked into the host and addressed as
//! `builtin://theme-default`. It declares the layout, menu, title, head, and
//! translation extension points that plugins build on, and contributes the
//! base front-end routes.

pub mod hooks;
pub mod options;
pub mod theme;

pub use options::{MenuItem, ThemeOptions};
pub use theme::{DefaultTheme, MODULE_NAME};
