//! In-process collection store.
//!
//! Documents are kept as serialized JSON so reads go through the same decode
//! and validation path as the persistent stores.

use super::{ensure_domain, CollectionStore, Document, Domain, StoreResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<Domain, String>,
    writes: HashMap<Domain, usize>,
}

/// Volatile collection store for tests and offline sessions.
#[derive(Debug, Default)]
pub struct MemoryCollectionStore {
    state: Mutex<MemoryState>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `documents`; seeding does not count as a write.
    pub fn seeded(documents: impl IntoIterator<Item = Document>) -> StoreResult<Self> {
        let store = Self::new();
        {
            let mut state = store.lock();
            for document in documents {
                let body = document.to_json_string()?;
                state.documents.insert(document.domain(), body);
            }
        }
        Ok(store)
    }

    /// Number of `write` calls accepted for `domain`.
    pub fn write_count(&self, domain: Domain) -> usize {
        self.lock().writes.get(&domain).copied().unwrap_or(0)
    }

    /// Raw JSON text currently held for `domain`.
    pub fn raw(&self, domain: Domain) -> Option<String> {
        self.lock().documents.get(&domain).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CollectionStore for MemoryCollectionStore {
    fn read(&self, domain: Domain) -> StoreResult<Document> {
        let body = self.lock().documents.get(&domain).cloned();
        match body {
            Some(body) => Document::from_json_str(domain, &body),
            None => Ok(Document::empty(domain)),
        }
    }

    fn write(&self, domain: Domain, document: &Document) -> StoreResult<()> {
        ensure_domain(domain, document)?;
        let body = document.to_json_string()?;
        let mut state = self.lock();
        state.documents.insert(domain, body);
        *state.writes.entry(domain).or_insert(0) += 1;
        Ok(())
    }
}
