use std::{collections::HashMap, time::Duration};

use reqwest::Method;
use serde_json::Value as JsonValue;

use crate::{time::Stamp, ApiRequest, Fingerprint};

#[derive(Clone, Debug)]
struct CachedResponse {
    body: JsonValue,
    stored_at: Stamp,
}

/// Short-lived response cache for an allowlist of GET endpoints.
#[derive(Debug)]
pub(crate) struct ResponseCache {
    entries: HashMap<Fingerprint, CachedResponse>,
    ttl: Duration,
    endpoints: Vec<String>,
}

impl ResponseCache {
    pub(crate) fn new(ttl: Duration, endpoints: Vec<String>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            endpoints,
        }
    }

    /// Only GETs whose path ends with an allowlisted suffix are cached.
    pub(crate) fn is_eligible(&self, request: &ApiRequest) -> bool {
        if request.method != Method::GET {
            return false;
        }
        let path = request
            .path
            .split_once('?')
            .map_or(request.path.as_str(), |(path, _)| path);
        self.endpoints
            .iter()
            .any(|endpoint| path.ends_with(endpoint.as_str()))
    }

    /// Returns a fresh payload; an expired entry is dropped and reported absent.
    pub(crate) fn get(&mut self, key: &Fingerprint) -> Option<JsonValue> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.body.clone());
        }
        self.entries.remove(key);
        None
    }

    pub(crate) fn insert(&mut self, key: Fingerprint, body: JsonValue) {
        self.entries.insert(
            key,
            CachedResponse {
                body,
                stored_at: Stamp::now(),
            },
        );
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::ResponseCache;
    use crate::{ApiRequest, ClientOptions, Fingerprint};

    fn cache(ttl_ms: u64) -> ResponseCache {
        ResponseCache::new(
            Duration::from_millis(ttl_ms),
            ClientOptions::default().cacheable_endpoints,
        )
    }

    #[test]
    fn allowlist_matches_get_suffixes_only() {
        let cache = cache(5_000);
        assert!(cache.is_eligible(&ApiRequest::get("/auth/me")));
        assert!(cache.is_eligible(&ApiRequest::get("/api/v1/admin/dashboard")));
        assert!(cache.is_eligible(&ApiRequest::get("/admin/promotions?page=2")));
        assert!(!cache.is_eligible(&ApiRequest::post("/auth/me")));
        assert!(!cache.is_eligible(&ApiRequest::get("/admin/promotion/3")));
        assert!(!cache.is_eligible(&ApiRequest::get("/menu/items")));
    }

    #[test]
    fn fresh_entry_is_returned() {
        let mut cache = cache(5_000);
        let key = Fingerprint::of(&ApiRequest::get("/auth/me"));
        cache.insert(key.clone(), json!({"user": {"id": 1}}));
        assert_eq!(cache.get(&key), Some(json!({"user": {"id": 1}})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entry_is_absent_and_evicted() {
        let mut cache = cache(10);
        let key = Fingerprint::of(&ApiRequest::get("/admin/dashboard"));
        cache.insert(key.clone(), json!({"orders": 4}));
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.len(), 0);
    }
}
