//! Hook registry: named chains of callbacks kept in priority order.
//!
//! Each chain is sorted by priority ascending and, within a priority, by
//! registration order. Insertion places a new callback after every existing
//! callback of equal or lower priority; removal only ever deletes entries, so
//! the relative order of the survivors never changes.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, info};

use super::callback::{Arity, Callback, CallbackId, HookFn, HookOptions};

/// Which callbacks `remove_all` clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveScope {
    /// Only callbacks registered at this priority.
    Priority(i32),
    /// The whole chain.
    All,
}

/// Registry of hook callbacks organized by hook name.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Hook name → ordered callback chain.
    chains: DashMap<String, Vec<Callback>>,
    /// Source of registration identifiers.
    next_id: AtomicU64,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `func` on `name` with the default priority and its declared arity.
    pub fn register(&self, name: &str, func: HookFn) -> CallbackId {
        self.register_with(name, func, HookOptions::default())
    }

    /// Registers `func` on `name` with explicit options.
    pub fn register_with(&self, name: &str, func: HookFn, options: HookOptions) -> CallbackId {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let accepted_args = options
            .accepted_args
            .map(Arity::Fixed)
            .unwrap_or_else(|| func.declared_arity());

        let mut chain = self.chains.entry(name.to_string()).or_default();
        let position = chain.partition_point(|c| c.priority <= options.priority);
        chain.insert(
            position,
            Callback {
                id,
                func,
                priority: options.priority,
                accepted_args,
            },
        );

        debug!(
            hook = %name,
            callback_id = %id,
            priority = options.priority,
            chain_len = chain.len(),
            "Hook callback registered"
        );

        id
    }

    /// Removes one registration of `func` from `name`.
    ///
    /// With `priority`, only a registration at that priority matches.
    /// Without, the earliest registration in chain order is removed.
    /// Returns `false` when nothing matched.
    pub fn remove(&self, name: &str, func: &HookFn, priority: Option<i32>) -> bool {
        let removed = {
            let Some(mut chain) = self.chains.get_mut(name) else {
                return false;
            };
            let position = chain
                .iter()
                .position(|c| c.func.ptr_eq(func) && priority.is_none_or(|p| c.priority == p));
            position.map(|i| chain.remove(i))
        };
        self.prune(name);

        match removed {
            Some(callback) => {
                debug!(
                    hook = %name,
                    callback_id = %callback.id,
                    priority = callback.priority,
                    "Hook callback removed"
                );
                true
            }
            None => false,
        }
    }

    /// Removes the registration with the given identifier, wherever it is.
    pub fn remove_by_id(&self, id: CallbackId) -> bool {
        let mut owner = None;
        for mut entry in self.chains.iter_mut() {
            if let Some(i) = entry.iter().position(|c| c.id == id) {
                entry.remove(i);
                owner = Some(entry.key().clone());
                break;
            }
        }

        match owner {
            Some(name) => {
                self.prune(&name);
                debug!(hook = %name, callback_id = %id, "Hook callback removed");
                true
            }
            None => false,
        }
    }

    /// Clears one priority tier or the whole chain. Returns how many
    /// callbacks were removed.
    pub fn remove_all(&self, name: &str, scope: RemoveScope) -> usize {
        let removed = match scope {
            RemoveScope::All => self
                .chains
                .remove(name)
                .map(|(_, chain)| chain.len())
                .unwrap_or(0),
            RemoveScope::Priority(priority) => {
                let removed = match self.chains.get_mut(name) {
                    Some(mut chain) => {
                        let before = chain.len();
                        chain.retain(|c| c.priority != priority);
                        before - chain.len()
                    }
                    None => 0,
                };
                self.prune(name);
                removed
            }
        };

        if removed > 0 {
            info!(hook = %name, scope = ?scope, removed, "Hook callbacks cleared");
        }

        removed
    }

    /// Returns whether `name` has at least one callback.
    pub fn has(&self, name: &str) -> bool {
        self.chains
            .get(name)
            .map(|chain| !chain.is_empty())
            .unwrap_or(false)
    }

    /// Returns the priority of the first registration of `func` on `name`.
    pub fn has_callback(&self, name: &str, func: &HookFn) -> Option<i32> {
        self.chains
            .get(name)
            .and_then(|chain| chain.iter().find(|c| c.func.ptr_eq(func)).map(|c| c.priority))
    }

    /// Returns a copy of the chain for `name` in invocation order.
    pub fn snapshot(&self, name: &str) -> Vec<Callback> {
        self.chains
            .get(name)
            .map(|chain| chain.value().clone())
            .unwrap_or_default()
    }

    /// Returns the number of callbacks registered on `name`.
    pub fn count(&self, name: &str) -> usize {
        self.chains.get(name).map(|chain| chain.len()).unwrap_or(0)
    }

    /// Returns every hook name with at least one callback, sorted.
    pub fn hook_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .chains
            .iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    fn prune(&self, name: &str) {
        self.chains.remove_if(name, |_, chain| chain.is_empty());
    }
}
