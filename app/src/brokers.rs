use std::sync::Arc;

use log::{debug, info};

use crate::error::Result;
use crate::store::{CollectionStore, CollectionStoreExt, SAVED_BROKERS};

const DEFAULT_BROKERS: [&str; 4] = [
    "ABC Logistics",
    "Express Freight",
    "Nationwide Transport",
    "Quick Haul Inc",
];

/// Broker names remembered from earlier invoices, used for autocomplete.
pub struct BrokerDirectory {
    store: Arc<dyn CollectionStore>,
}

impl BrokerDirectory {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<String>> {
        self.store.load_all(SAVED_BROKERS)
    }

    /// Exact-match dedup; returns whether the name was new.
    pub fn add_if_new(&self, broker: &str) -> Result<bool> {
        if broker.is_empty() {
            return Ok(false);
        }
        let mut brokers = self.list()?;
        if brokers.iter().any(|b| b == broker) {
            return Ok(false);
        }
        brokers.push(broker.to_string());
        self.store.save_all(SAVED_BROKERS, &brokers)?;
        debug!("broker directory grew to {} names", brokers.len());
        Ok(true)
    }

    /// Starts an untouched directory with a few common brokers. An existing
    /// list, even an empty one, is left alone.
    pub fn seed_defaults_if_missing(&self) -> Result<bool> {
        if self.store.contains(SAVED_BROKERS)? {
            return Ok(false);
        }
        self.store.save_all(SAVED_BROKERS, &DEFAULT_BROKERS[..])?;
        info!("seeded {} default brokers", DEFAULT_BROKERS.len());
        Ok(true)
    }

    /// Case-insensitive substring match, in insertion order. An empty query
    /// suggests nothing.
    pub fn suggest(&self, query: &str) -> Result<Vec<String>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        Ok(self
            .list()?
            .into_iter()
            .filter(|b| b.to_lowercase().contains(&needle))
            .collect())
    }
}
