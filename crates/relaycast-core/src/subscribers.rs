use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::UserId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscriber {
    pub id: UserId,
    pub display_name: String,
    pub username: Option<String>,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscribeOutcome {
    /// First time this id subscribed (the admin gets notified once).
    pub is_new: bool,
}

/// Users opted in to broadcasts.
///
/// The lock covers only the map operation; callers iterate over `snapshot()`.
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: Mutex<HashMap<UserId, Subscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a subscriber. Re-subscribing keeps the original timestamp.
    pub async fn subscribe(
        &self,
        id: UserId,
        display_name: &str,
        username: Option<&str>,
    ) -> SubscribeOutcome {
        let mut map = self.inner.lock().await;
        let subscribed_at = map
            .get(&id)
            .map(|s| s.subscribed_at)
            .unwrap_or_else(Utc::now);
        let previous = map.insert(
            id,
            Subscriber {
                id,
                display_name: display_name.to_string(),
                username: username.map(str::to_string),
                subscribed_at,
            },
        );
        SubscribeOutcome {
            is_new: previous.is_none(),
        }
    }

    /// Idempotent; returns whether an entry was removed.
    pub async fn unsubscribe(&self, id: UserId) -> bool {
        self.inner.lock().await.remove(&id).is_some()
    }

    pub async fn is_subscribed(&self, id: UserId) -> bool {
        self.inner.lock().await.contains_key(&id)
    }

    /// Point-in-time copy ordered by id.
    pub async fn snapshot(&self) -> Vec<Subscriber> {
        let mut out: Vec<Subscriber> = self.inner.lock().await.values().cloned().collect();
        out.sort_by_key(|s| s.id);
        out
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }
}
