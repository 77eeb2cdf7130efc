//! Cross-target public closure cache
//!
//! Optional shared state between concurrent target resolutions. Keys are
//! `(module name, build context)`; a per-key cell guarantees at most one
//! computation per key, with other threads blocking on the winner rather
//! than duplicating work. Entries commit atomically: a reader either sees
//! a fully computed closure or computes it, never a partial write.

use crate::visibility::PublicSurface;
use anvil_decl::BuildContext;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    module: String,
    context: BuildContext,
}

/// Compute-once-per-key cache of public closures
#[derive(Debug, Default)]
pub struct ClosureCache {
    cells: Mutex<HashMap<CacheKey, Arc<OnceLock<Arc<PublicSurface>>>>>,
}

impl ClosureCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the closure for a key, computing it if absent
    ///
    /// The map lock is held only to fetch the per-key cell; the (possibly
    /// expensive) computation runs outside it, serialized per key by the
    /// cell itself.
    pub fn get_or_compute<F>(
        &self,
        module: &str,
        context: &BuildContext,
        compute: F,
    ) -> Arc<PublicSurface>
    where
        F: FnOnce() -> Arc<PublicSurface>,
    {
        let cell = {
            let mut cells = self.cells.lock().expect("closure cache poisoned");
            cells
                .entry(CacheKey {
                    module: module.to_string(),
                    context: *context,
                })
                .or_default()
                .clone()
        };
        cell.get_or_init(compute).clone()
    }

    /// Number of cached keys (computed or in flight)
    pub fn len(&self) -> usize {
        self.cells.lock().expect("closure cache poisoned").len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
