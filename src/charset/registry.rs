//! Bounded LRU cache of resolved charset names.
//!
//! Keyed by the raw requested name, so aliases and garbage are cached as
//! they were asked for. Failed lookups are cached too (negative entries),
//! which keeps repeated bogus `Content-Type` charsets cheap. The capacity
//! bound keeps attacker-chosen names from growing the map without limit.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::CharsetHandle;
use crate::core::Error;

/// Maximum number of cached names.
pub const REGISTRY_CAPACITY: usize = 64;

/// Thread-safe charset name cache.
pub struct CharsetRegistry {
    /// Cached entries: name -> handle (None = unsupported)
    entries: RwLock<HashMap<Box<str>, Option<CharsetHandle>>>,
    /// LRU order: most recently used at back
    order: RwLock<Vec<Box<str>>>,
    /// Default returned by [`resolve`](Self::resolve)
    default: CharsetHandle,
    capacity: usize,
}

impl CharsetRegistry {
    /// Create a registry with UTF-8 as default and the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(REGISTRY_CAPACITY)
    }

    /// Create a registry holding at most `capacity` names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
            order: RwLock::new(Vec::with_capacity(capacity)),
            default: CharsetHandle::UTF_8,
            capacity: capacity.max(1),
        }
    }

    /// Replace the handle returned for unresolvable names.
    pub fn with_default(mut self, default: CharsetHandle) -> Self {
        self.default = default;
        self
    }

    /// The handle [`resolve`](Self::resolve) falls back to.
    #[inline]
    pub fn default_charset(&self) -> CharsetHandle {
        self.default
    }

    /// Resolve `name`, returning `None` for missing, empty or unsupported names.
    pub fn lookup(&self, name: Option<&str>) -> Option<CharsetHandle> {
        let name = name.filter(|n| !n.trim().is_empty())?;

        if let Some(cached) = self.cached(name) {
            self.touch(name);
            return cached;
        }

        let resolved = CharsetHandle::for_label(name);
        if resolved.is_none() {
            debug!(error = %Error::UnsupportedEncoding(name.to_string()), "charset lookup failed");
        }
        self.insert(name, resolved);
        resolved
    }

    /// Resolve `name`, falling back to the registry default.
    #[inline]
    pub fn resolve(&self, name: Option<&str>) -> CharsetHandle {
        self.resolve_or(name, self.default)
    }

    /// Resolve `name`, falling back to `fallback`.
    #[inline]
    pub fn resolve_or(&self, name: Option<&str>, fallback: CharsetHandle) -> CharsetHandle {
        self.lookup(name).unwrap_or(fallback)
    }

    /// Cached result for `name` without touching LRU order.
    /// Outer `None` means the name was never looked up (or was evicted).
    #[inline]
    pub fn cached(&self, name: &str) -> Option<Option<CharsetHandle>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).copied()
    }

    /// Number of cached names.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, name: &str, handle: Option<CharsetHandle>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut order = self.order.write().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have resolved the same name meanwhile
        if entries.contains_key(name) {
            return;
        }

        if order.len() >= self.capacity && !order.is_empty() {
            let oldest = order.remove(0);
            entries.remove(&oldest);
        }

        let key: Box<str> = name.into();
        entries.insert(key.clone(), handle);
        order.push(key);
    }

    /// Move `name` to the back of the LRU order.
    fn touch(&self, name: &str) {
        // Hot names are usually already most recent; skip the write lock.
        {
            let order = self.order.read().unwrap_or_else(PoisonError::into_inner);
            if order.last().is_some_and(|n| n.as_ref() == name) {
                return;
            }
        }
        let mut order = self.order.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = order.iter().position(|n| n.as_ref() == name) {
            let key = order.remove(pos);
            order.push(key);
        }
    }
}

impl Default for CharsetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
