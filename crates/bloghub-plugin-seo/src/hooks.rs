//! Hook callbacks registered by the SEO plugin.

use std::sync::Arc;

use serde_json::{Value, json};

use bloghub_extension::prelude::*;

/// Priority of the plugin's filters; after the theme's default of 10.
pub const SEO_PRIORITY: i32 = 20;

/// `title` filter: shortens titles longer than `max_chars`, ending them with
/// an ellipsis.
pub fn shorten_title(max_chars: usize) -> HookFn {
    HookFn::unary_sync(move |title| {
        let Some(text) = title.as_str() else {
            return Ok(title);
        };
        if text.chars().count() <= max_chars {
            return Ok(title);
        }
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        Ok(json!(format!("{}…", kept.trim_end())))
    })
}

/// Head entries computed once from the plugin options.
#[derive(Debug, Clone, Default)]
pub struct HeadEntries {
    /// `<meta name="description">` content.
    pub description: Option<String>,
    /// Base URL for `<link rel="canonical">`, without trailing slash.
    pub canonical_base: Option<String>,
    /// Route paths that must not be indexed.
    pub noindex: Vec<String>,
}

/// `head` filter: `(entries, path)` with the plugin's entries appended.
pub fn head(entries: HeadEntries) -> HookFn {
    let entries = Arc::new(entries);
    HookFn::binary_sync(move |head, path| {
        let mut head = match head {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        let path = path.as_str().unwrap_or("/");

        if let Some(description) = &entries.description {
            head.push(json!({
                "tag": "meta",
                "attrs": { "name": "description", "content": description }
            }));
        }
        if let Some(base) = &entries.canonical_base {
            head.push(json!({
                "tag": "link",
                "attrs": { "rel": "canonical", "href": format!("{base}{path}") }
            }));
        }
        if entries.noindex.iter().any(|p| p == path) {
            head.push(json!({
                "tag": "meta",
                "attrs": { "name": "robots", "content": "noindex" }
            }));
        }

        Ok(Value::Array(head))
    })
}

/// `routes` filter: tags excluded routes with `meta.robots = "noindex"`.
pub fn mark_noindex(noindex: Vec<String>) -> HookFn {
    let noindex = Arc::new(noindex);
    HookFn::unary_sync(move |routes| {
        let Value::Array(mut routes) = routes else {
            return Err(AppError::validation("routes must be an array"));
        };
        for route in &mut routes {
            let excluded = route["path"]
                .as_str()
                .is_some_and(|p| noindex.iter().any(|n| n == p));
            if !excluded {
                continue;
            }
            if !route["meta"].is_object() {
                route["meta"] = json!({});
            }
            route["meta"]["robots"] = json!("noindex");
        }
        Ok(Value::Array(routes))
    })
}
