//! Route contributions from modules.

use std::fmt::Debug;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A front-end route contributed by a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// URL pattern, e.g. `/posts/:slug`.
    pub path: String,
    /// Optional route name.
    #[serde(default)]
    pub name: Option<String>,
    /// Component identifier resolved by the renderer.
    pub component: String,
    /// Free-form route metadata.
    #[serde(default)]
    pub meta: Value,
    /// Nested routes.
    #[serde(default)]
    pub children: Vec<Route>,
}

impl Route {
    /// Creates a route with no name, metadata, or children.
    pub fn new(path: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            component: component.into(),
            meta: Value::Null,
            children: Vec::new(),
        }
    }

    /// Sets the route name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the route metadata.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    /// Sets the nested routes.
    pub fn with_children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }
}

/// How new routes combine with routes already in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// A route whose path already exists replaces it in place; others are appended.
    #[default]
    Merge,
    /// New routes move to the front, ahead of every existing route, and
    /// existing routes with the same path are dropped.
    Prepend,
    /// The module's previously added routes are dropped first, then the new
    /// routes are merged.
    Replace,
}

/// Route registration capability handed to modules.
///
/// Implementations must tolerate the same route set being added twice
/// without producing duplicate matches.
pub trait RouteSink: Send + Sync + Debug {
    /// Adds `routes` on behalf of `module`.
    fn add_routes(&self, module: &str, routes: Vec<Route>, strategy: MergeStrategy);
}

/// One route and the module that contributed it.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    /// Contributing module.
    pub module: String,
    /// The route.
    pub route: Route,
}

/// In-memory route table keyed by path.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: RwLock<Vec<RouteEntry>>,
}

impl RouteTable {
    /// Creates an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every route in match order.
    pub fn routes(&self) -> Vec<Route> {
        self.entries.read().iter().map(|e| e.route.clone()).collect()
    }

    /// Returns every route together with its contributing module.
    pub fn entries(&self) -> Vec<RouteEntry> {
        self.entries.read().clone()
    }

    /// Returns the route registered for `path`.
    pub fn find(&self, path: &str) -> Option<Route> {
        self.entries
            .read()
            .iter()
            .find(|e| e.route.path == path)
            .map(|e| e.route.clone())
    }

    /// Returns the number of top-level routes.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no routes have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl RouteSink for RouteTable {
    fn add_routes(&self, module: &str, routes: Vec<Route>, strategy: MergeStrategy) {
        let mut entries = self.entries.write();
        let added = routes.len();

        match strategy {
            MergeStrategy::Merge | MergeStrategy::Replace => {
                if strategy == MergeStrategy::Replace {
                    entries.retain(|e| e.module != module);
                }
                for route in routes {
                    let entry = RouteEntry {
                        module: module.to_string(),
                        route,
                    };
                    match entries.iter().position(|e| e.route.path == entry.route.path) {
                        Some(i) => entries[i] = entry,
                        None => entries.push(entry),
                    }
                }
            }
            MergeStrategy::Prepend => {
                let mut fresh: Vec<RouteEntry> = Vec::with_capacity(routes.len());
                for route in routes {
                    fresh.retain(|e| e.route.path != route.path);
                    fresh.push(RouteEntry {
                        module: module.to_string(),
                        route,
                    });
                }
                entries.retain(|e| fresh.iter().all(|f| f.route.path != e.route.path));
                fresh.append(&mut entries);
                *entries = fresh;
            }
        }

        debug!(
            module = %module,
            added,
            strategy = ?strategy,
            total = entries.len(),
            "Routes added"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(table: &RouteTable) -> Vec<String> {
        table.routes().into_iter().map(|r| r.path).collect()
    }

    #[test]
    fn test_merge_is_idempotent() {
        let table = RouteTable::new();
        let routes = vec![Route::new("/", "Home"), Route::new("/posts/:slug", "Post")];

        table.add_routes("theme", routes.clone(), MergeStrategy::Merge);
        table.add_routes("theme", routes, MergeStrategy::Merge);

        assert_eq!(paths(&table), ["/", "/posts/:slug"]);
    }

    #[test]
    fn test_merge_replaces_in_place() {
        let table = RouteTable::new();
        table.add_routes(
            "theme",
            vec![Route::new("/", "Home"), Route::new("/about", "About")],
            MergeStrategy::Merge,
        );
        table.add_routes("seo", vec![Route::new("/", "SeoHome")], MergeStrategy::Merge);

        assert_eq!(paths(&table), ["/", "/about"]);
        assert_eq!(table.find("/").map(|r| r.component), Some("SeoHome".to_string()));
        assert_eq!(table.entries()[0].module, "seo");
    }

    #[test]
    fn test_prepend_takes_precedence() {
        let table = RouteTable::new();
        table.add_routes(
            "theme",
            vec![Route::new("/", "Home"), Route::new("/:page", "Page")],
            MergeStrategy::Merge,
        );
        table.add_routes(
            "sitemap",
            vec![Route::new("/sitemap.xml", "Sitemap"), Route::new("/", "Landing")],
            MergeStrategy::Prepend,
        );

        assert_eq!(paths(&table), ["/sitemap.xml", "/", "/:page"]);
        assert_eq!(table.find("/").map(|r| r.component), Some("Landing".to_string()));
    }

    #[test]
    fn test_replace_drops_previous_module_routes() {
        let table = RouteTable::new();
        table.add_routes("theme", vec![Route::new("/old", "Old")], MergeStrategy::Merge);
        table.add_routes("other", vec![Route::new("/keep", "Keep")], MergeStrategy::Merge);
        table.add_routes("theme", vec![Route::new("/new", "New")], MergeStrategy::Replace);

        assert_eq!(paths(&table), ["/keep", "/new"]);
    }
}
