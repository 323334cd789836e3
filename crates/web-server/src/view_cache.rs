use events::{ViewEvent, ViewEvents};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Rendered responses for a view path, keyed by query string.
///
/// Entries for a path are dropped when a `ViewEvent::Revalidate` for that path
/// arrives. Pending events are drained before every lookup, so a read that
/// follows a completed write never sees the pre-write result.
///
/// Each path holds at most `capacity` entries; past that the oldest insert goes.
pub struct ViewCache {
    views: Mutex<HashMap<String, CachedView>>,
    events: Mutex<broadcast::Receiver<ViewEvent>>,
    capacity: usize,
}

#[derive(Default)]
struct CachedView {
    generation: u64,
    entries: HashMap<String, Value>,
    // Keys in insertion order, oldest first.
    order: VecDeque<String>,
}

impl CachedView {
    fn clear(&mut self) {
        self.generation += 1;
        self.entries.clear();
        self.order.clear();
    }

    fn store(&mut self, key: &str, value: Value, capacity: usize) {
        if self.entries.insert(key.to_string(), value).is_some() {
            return;
        }
        self.order.push_back(key.to_string());
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

/// Result of a lookup. A miss carries the generation to hand back to `insert`.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit(Value),
    Miss(u64),
}

impl ViewCache {
    pub fn new(events: &ViewEvents, capacity: usize) -> Self {
        Self {
            views: Mutex::new(HashMap::new()),
            events: Mutex::new(events.subscribe()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, path: &str, key: &str) -> Lookup {
        self.drain();
        let views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        match views.get(path) {
            Some(view) => match view.entries.get(key) {
                Some(value) => Lookup::Hit(value.clone()),
                None => Lookup::Miss(view.generation),
            },
            None => Lookup::Miss(0),
        }
    }

    /// Stores a computed response, unless the path was invalidated after the
    /// lookup that produced `generation`.
    pub fn insert(&self, path: &str, key: &str, value: Value, generation: u64) {
        self.drain();
        let mut views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        let view = views.entry(path.to_string()).or_default();
        if view.generation == generation {
            view.store(key, value, self.capacity);
        } else {
            tracing::debug!(path, "Discarded a response computed before revalidation.");
        }
    }

    pub fn invalidate(&self, path: &str) {
        let mut views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        views.entry(path.to_string()).or_default().clear();
    }

    /// Number of cached responses for `path`.
    pub fn len(&self, path: &str) -> usize {
        let views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        views.get(path).map_or(0, |view| view.entries.len())
    }

    fn invalidate_all(&self) {
        let mut views = self.views.lock().unwrap_or_else(|e| e.into_inner());
        for view in views.values_mut() {
            view.clear();
        }
    }

    fn drain(&self) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            match events.try_recv() {
                Ok(event) => self.invalidate(event.path()),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "View cache lagged; dropping every cached view.");
                    self.invalidate_all();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VIEW: &str = "/dashboard/invoices";

    #[test]
    fn serves_what_was_inserted() {
        let events = ViewEvents::default();
        let cache = ViewCache::new(&events, 16);

        let Lookup::Miss(generation) = cache.get(VIEW, "page=1") else {
            panic!("empty cache hit");
        };
        cache.insert(VIEW, "page=1", json!({"rows": 1}), generation);

        assert_eq!(cache.get(VIEW, "page=1"), Lookup::Hit(json!({"rows": 1})));
        assert!(matches!(cache.get(VIEW, "page=2"), Lookup::Miss(_)));
    }

    #[test]
    fn revalidation_events_clear_the_path() {
        let events = ViewEvents::default();
        let cache = ViewCache::new(&events, 16);
        cache.insert(VIEW, "page=1", json!(1), 0);
        cache.insert("/dashboard/customers", "all", json!(2), 0);

        events.revalidate_path(VIEW);

        assert!(matches!(cache.get(VIEW, "page=1"), Lookup::Miss(1)));
        assert_eq!(cache.get("/dashboard/customers", "all"), Lookup::Hit(json!(2)));
    }

    #[test]
    fn stale_responses_are_not_stored() {
        let events = ViewEvents::default();
        let cache = ViewCache::new(&events, 16);

        let Lookup::Miss(generation) = cache.get(VIEW, "page=1") else {
            panic!("empty cache hit");
        };
        events.revalidate_path(VIEW);
        cache.insert(VIEW, "page=1", json!("stale"), generation);

        assert!(matches!(cache.get(VIEW, "page=1"), Lookup::Miss(_)));
    }

    #[test]
    fn each_view_keeps_at_most_capacity_entries() {
        let events = ViewEvents::default();
        let cache = ViewCache::new(&events, 3);

        for i in 0..1000 {
            let key = format!("query=junk{i}&page=1");
            let Lookup::Miss(generation) = cache.get(VIEW, &key) else {
                panic!("fresh key hit");
            };
            cache.insert(VIEW, &key, json!(i), generation);
        }

        assert_eq!(cache.len(VIEW), 3);
        assert!(matches!(cache.get(VIEW, "query=junk996&page=1"), Lookup::Miss(_)));
        assert_eq!(cache.get(VIEW, "query=junk999&page=1"), Lookup::Hit(json!(999)));
        assert_eq!(cache.get(VIEW, "query=junk997&page=1"), Lookup::Hit(json!(997)));
    }

    #[test]
    fn replacing_a_key_does_not_evict() {
        let events = ViewEvents::default();
        let cache = ViewCache::new(&events, 2);
        cache.insert(VIEW, "a", json!(1), 0);
        cache.insert(VIEW, "b", json!(2), 0);
        cache.insert(VIEW, "a", json!(3), 0);

        assert_eq!(cache.len(VIEW), 2);
        assert_eq!(cache.get(VIEW, "a"), Lookup::Hit(json!(3)));
        assert_eq!(cache.get(VIEW, "b"), Lookup::Hit(json!(2)));
    }

    #[test]
    fn lagging_drops_everything() {
        let events = ViewEvents::new(1);
        let cache = ViewCache::new(&events, 16);
        cache.insert("/a", "k", json!(1), 0);

        events.revalidate_path("/b");
        events.revalidate_path("/c");

        assert!(matches!(cache.get("/a", "k"), Lookup::Miss(_)));
    }
}
