//! Hook callbacks registered by the default theme.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::info;

use bloghub_extension::prelude::*;

use crate::options::MenuItem;

/// Layout slots the theme fills, with the component it places in each.
const LAYOUT_SLOTS: &[(&str, &str)] = &[
    ("header", "ThemeHeader"),
    ("sidebar", "ThemeSidebar"),
    ("footer", "ThemeFooter"),
];

/// `layouts` filter: adds the theme's component to each slot it owns.
pub fn layouts() -> HookFn {
    HookFn::unary_sync(|layouts| {
        let mut slots = match layouts {
            Value::Object(slots) => slots,
            Value::Null => Map::new(),
            other => {
                return Err(AppError::validation(format!(
                    "layouts must be an object, got {other}"
                )));
            }
        };

        for (slot, component) in LAYOUT_SLOTS {
            let entry = slots
                .entry(*slot)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(components) = entry {
                if !components.iter().any(|c| c == component) {
                    components.push(json!(component));
                }
            }
        }

        Ok(Value::Object(slots))
    })
}

/// `menu` filter: puts the theme's entries in front of the incoming ones,
/// skipping paths that are already present.
pub fn menu(items: Vec<MenuItem>) -> HookFn {
    let items = Arc::new(items);
    HookFn::unary_sync(move |menu| {
        let existing = into_array(menu, names::MENU)?;

        let mut merged = Vec::with_capacity(items.len() + existing.len());
        for item in items.iter() {
            if !existing.iter().any(|e| e["path"] == item.path) {
                merged.push(serde_json::to_value(item)?);
            }
        }
        merged.extend(existing);

        Ok(Value::Array(merged))
    })
}

/// `title` filter: `(title, path)` to the document title.
///
/// The home page and untitled pages get the bare site title.
pub fn title(site_title: String, separator: String) -> HookFn {
    HookFn::binary_sync(move |title, path| {
        let page = title.as_str().map(str::trim).unwrap_or_default();
        if page.is_empty() || path == "/" {
            return Ok(json!(site_title));
        }
        Ok(json!(format!("{page}{separator}{site_title}")))
    })
}

/// `head` filter: appends the `theme-color` meta entry when the site theme
/// defines a primary color.
pub fn head(primary_color: Option<String>) -> HookFn {
    HookFn::unary_sync(move |entries| {
        let mut entries = into_array(entries, names::HEAD)?;
        if let Some(color) = &primary_color {
            entries.push(json!({
                "tag": "meta",
                "attrs": { "name": "theme-color", "content": color }
            }));
        }
        Ok(Value::Array(entries))
    })
}

/// `translations` filter: `(table, locale)`, filling in the theme's strings
/// without overriding keys another module already set.
pub fn translations() -> HookFn {
    HookFn::binary_sync(|table, locale| {
        let mut table = match table {
            Value::Object(table) => table,
            _ => Map::new(),
        };
        for (key, text) in strings(locale.as_str().unwrap_or_default()) {
            table
                .entry(*key)
                .or_insert_with(|| Value::String((*text).to_string()));
        }
        Ok(Value::Object(table))
    })
}

/// `init` action: logs that the theme is live.
pub fn ready(module_name: String, locale: String) -> HookFn {
    HookFn::nullary_sync(move || {
        info!(module = %module_name, locale = %locale, "Theme ready");
        Ok(Value::Null)
    })
}

fn strings(locale: &str) -> &'static [(&'static str, &'static str)] {
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    match language {
        "fr" => &[
            ("theme.home", "Accueil"),
            ("theme.archive", "Archives"),
            ("theme.read_more", "Lire la suite"),
        ],
        "de" => &[
            ("theme.home", "Startseite"),
            ("theme.archive", "Archiv"),
            ("theme.read_more", "Weiterlesen"),
        ],
        _ => &[
            ("theme.home", "Home"),
            ("theme.archive", "Archive"),
            ("theme.read_more", "Read more"),
        ],
    }
}

fn into_array(value: Value, hook: &str) -> AppResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(AppError::validation(format!(
            "{hook} must be an array, got {other}"
        ))),
    }
}
