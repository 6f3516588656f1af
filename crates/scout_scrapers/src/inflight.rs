use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scout_core::{Error, Result};

/// Queries currently being scraped, keyed by trimmed lowercase text
#[derive(Debug, Clone, Default)]
pub struct InFlightSearches {
    active: Arc<Mutex<HashSet<String>>>,
}

fn search_key(query: &str) -> String {
    query.trim().to_lowercase()
}

impl InFlightSearches {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `query`; fails with [`Error::SearchInProgress`] if it is already claimed.
    /// The claim is released when the guard drops.
    pub fn begin(&self, query: &str) -> Result<InFlightGuard> {
        let key = search_key(query);
        if !self.lock().insert(key.clone()) {
            return Err(Error::SearchInProgress(query.trim().to_string()));
        }
        Ok(InFlightGuard {
            key,
            active: self.active.clone(),
        })
    }

    pub fn is_active(&self, query: &str) -> bool {
        self.lock().contains(&search_key(query))
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    key: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
