use quick_cache::sync::Cache;
use quick_cache::Weighter;
use std::sync::Arc;

pub type FridgeCache = Arc<Cache<CacheQuery, CacheValue, ValueWeighter>>;

/// An in-memory cache holding up to `capacity_bytes` of payload.
pub fn new_cache(capacity_bytes: u64) -> FridgeCache {
    Arc::new(Cache::with_weighter(1000, capacity_bytes, ValueWeighter))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheQuery {
    Scan { hash: String },
    Image { image_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Scan { payload: String },
    Image { url: String },
}

#[derive(Clone)]
pub struct ValueWeighter;

impl Weighter<CacheQuery, CacheValue> for ValueWeighter {
    fn weight(&self, _key: &CacheQuery, val: &CacheValue) -> u64 {
        let len = match val {
            CacheValue::Scan { payload } => payload.len(),
            CacheValue::Image { url } => url.len(),
        };
        // Zero-weight entries would never be evicted.
        (len as u64).max(1)
    }
}
