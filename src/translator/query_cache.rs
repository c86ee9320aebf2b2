use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use once_cell::sync::OnceCell;

use crate::{compile_error::CompileError, translator::CompiledQuery};

pub type Generator<'a> = dyn FnMut() -> Result<CompiledQuery, CompileError> + 'a;

/// Memoization of compiled queries.
///
/// `get` returns the artifact stored under the query text `key`, or runs
/// `generator` to produce it. At most one generator runs per key at a time;
/// a failed generation is returned to the caller and nothing is stored.
pub trait QueryCache: Send + Sync {
    fn get(&self, key: &str, generator: &mut Generator<'_>) -> Result<Arc<CompiledQuery>, CompileError>;
}

type Entry = Arc<OnceCell<Arc<CompiledQuery>>>;

/// Process-local [`QueryCache`]. Readers of populated keys only take the
/// shared lock; the exclusive lock is held just long enough to create an
/// empty cell.
#[derive(Debug, Default)]
pub struct MemoryQueryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Entry {
        let existing = self.entries.read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned();

        match existing {
            Some(entry) => entry,
            None => {
                let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(entries.entry(key.to_string()).or_default())
            },
        }
    }

    /// Drop the cell of a failed generation unless another caller filled it
    /// in the meantime.
    fn evict_empty(&self, key: &str, cell: &Entry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|stored| Arc::ptr_eq(stored, cell) && stored.get().is_none()) {
            entries.remove(key);
        }
    }

    /// Number of keys with a cell, filled or still being generated.
    pub fn slots(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.entries.read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl QueryCache for MemoryQueryCache {
    fn get(&self, key: &str, generator: &mut Generator<'_>) -> Result<Arc<CompiledQuery>, CompileError> {
        let cell = self.entry(key);
        match cell.get_or_try_init(|| generator().map(Arc::new)) {
            Ok(compiled) => Ok(Arc::clone(compiled)),
            Err(err) => {
                self.evict_empty(key, &cell);
                Err(err)
            },
        }
    }
}
