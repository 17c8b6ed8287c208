use crate::market_data::types::MarketSnapshot;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the current market snapshot — cheap to clone (just an Arc bump).
///
/// The snapshot is only ever swapped whole: readers get an `Arc` to either the
/// previous or the next map, never a partially updated one.
#[derive(Clone, Debug, Default)]
pub struct MarketCache {
    current: Arc<RwLock<Arc<MarketSnapshot>>>,
}

impl MarketCache {
    pub fn new(initial: MarketSnapshot) -> Self {
        MarketCache {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    pub async fn snapshot(&self) -> Arc<MarketSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Replaces the whole snapshot; returns the number of symbols now held.
    pub async fn replace(&self, next: MarketSnapshot) -> usize {
        let len = next.len();
        let next = Arc::new(next);
        *self.current.write().await = next;
        len
    }
}
