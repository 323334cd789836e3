use crate::error::EventsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// The view path that lists invoices. Every invoice mutation invalidates it.
pub const INVOICES_VIEW: &str = "/dashboard/invoices";

/// The top-level view event enum.
///
/// Serialized with `#[serde(tag = "type", content = "payload")]`, so a revalidation
/// looks like `{"type": "Revalidate", "payload": {"path": "...", "timestamp": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ViewEvent {
    /// Everything previously computed for `path` is stale.
    Revalidate {
        path: String,
        timestamp: DateTime<Utc>,
    },
}

impl ViewEvent {
    pub fn path(&self) -> &str {
        match self {
            ViewEvent::Revalidate { path, .. } => path,
        }
    }
}

/// Publishing half of the invalidation signal. Cheap to clone; every clone feeds
/// the same channel.
#[derive(Debug, Clone)]
pub struct ViewEvents {
    tx: broadcast::Sender<ViewEvent>,
}

impl ViewEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.tx.subscribe()
    }

    /// Sends an event, returning how many subscribers will see it.
    pub fn publish(&self, event: ViewEvent) -> Result<usize, EventsError> {
        self.tx.send(event).map_err(|_| EventsError::Closed)
    }

    /// Marks `path` as stale for every subscribed cache.
    ///
    /// Having no subscribers is not an error: nothing was cached.
    pub fn revalidate_path(&self, path: &str) {
        let event = ViewEvent::Revalidate {
            path: path.to_string(),
            timestamp: Utc::now(),
        };
        match self.publish(event) {
            Ok(receivers) => tracing::debug!(path, receivers, "Revalidated view."),
            Err(_) => tracing::debug!(path, "No view caches subscribed; nothing to revalidate."),
        }
    }
}

impl Default for ViewEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
