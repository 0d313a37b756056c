//! # Global Symbol Cache
//!
//! Process-wide lookup from deduplicated name to the equivalent symbols.
//!
//! The cache is populated exactly once per run, after deduplication and
//! before any user type is constructed, and is then queried by the factory
//! while linking field and base-class types. `update` swaps the whole map
//! atomically; readers clone an `Arc` and never block each other.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::symbol::SymbolRef;

/// Deduplicated name → equivalent symbols, representative first.
#[derive(Default)]
pub struct GlobalCache
{
    map: RwLock<Arc<HashMap<String, Vec<SymbolRef>>>>,
}

impl GlobalCache
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Replace the cache contents atomically.
    pub fn update(&self, map: HashMap<String, Vec<SymbolRef>>)
    {
        let mut guard = self.map.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(map);
    }

    /// The representative symbol for a name (first entry), if any.
    pub fn get_symbol(&self, name: &str) -> Option<SymbolRef>
    {
        self.snapshot().get(name).and_then(|symbols| symbols.first().cloned())
    }

    /// Every equivalent symbol recorded for a name.
    pub fn get_symbols(&self, name: &str) -> Option<Vec<SymbolRef>>
    {
        self.snapshot().get(name).cloned()
    }

    fn snapshot(&self) -> Arc<HashMap<String, Vec<SymbolRef>>>
    {
        self.map.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}
