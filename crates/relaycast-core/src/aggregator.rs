//! Album aggregation for admin uploads.
//!
//! Telegram delivers an album as separate messages sharing a `media_group_id`. Items
//! are buffered per group; each arrival cancels the group's debounce timer and arms a
//! new one. When a timer fires after a quiet period the group is settled: two or more
//! items become an album, a lone item goes out as a single medium. A periodic sweep
//! drops groups that never settled.

use std::{
    collections::{hash_map::Entry, HashMap},
    future::Future,
    pin::Pin,
    sync::Arc,
    time::Duration,
};

use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{sleep, Instant},
};
use tokio_util::sync::CancellationToken;

use crate::{broadcast::BroadcastContent, messaging::types::MediaItem};

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
pub type SettleFn = Arc<dyn Fn(BroadcastContent) -> BoxFuture + Send + Sync>;

#[derive(Clone, Copy, Debug)]
pub struct AggregatorConfig {
    /// Debounce delay armed after every item.
    pub debounce: Duration,
    /// Groups older than this are discarded by the sweep.
    pub stale_after: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            stale_after: Duration::from_secs(60 * 60),
        }
    }
}

struct PendingAlbum {
    items: Vec<MediaItem>,
    first_seen_at: Instant,
    last_seen_at: Instant,
    cancel: CancellationToken,
}

pub struct MediaAggregator {
    cfg: AggregatorConfig,
    settle: SettleFn,
    pending: Mutex<HashMap<String, PendingAlbum>>,
}

impl MediaAggregator {
    pub fn new(cfg: AggregatorConfig, settle: SettleFn) -> Arc<Self> {
        Arc::new(Self {
            cfg,
            settle,
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Buffer `item` under `media_group_id` and (re)arm the group's debounce timer.
    pub async fn add_item(self: &Arc<Self>, media_group_id: String, item: MediaItem) {
        let now = Instant::now();
        let cancel = CancellationToken::new();

        let mut map = self.pending.lock().await;
        match map.entry(media_group_id.clone()) {
            Entry::Occupied(mut e) => {
                let group = e.get_mut();
                group.items.push(item);
                group.last_seen_at = now;
                group.cancel.cancel();
                group.cancel = cancel.clone();
            }
            Entry::Vacant(e) => {
                tracing::debug!(group = %media_group_id, "collecting new media group");
                e.insert(PendingAlbum {
                    items: vec![item],
                    first_seen_at: now,
                    last_seen_at: now,
                    cancel: cancel.clone(),
                });
            }
        }
        drop(map);

        self.spawn_timer(media_group_id, cancel);
    }

    fn spawn_timer(self: &Arc<Self>, media_group_id: String, cancel: CancellationToken) {
        let aggregator = Arc::clone(self);
        let delay = self.cfg.debounce;
        tokio::spawn(async move {
            tokio::select! {
              _ = cancel.cancelled() => {}
              _ = sleep(delay) => {
                aggregator.settle_group(&media_group_id).await;
              }
            }
        });
    }

    async fn settle_group(&self, media_group_id: &str) {
        let content = {
            let mut map = self.pending.lock().await;
            let Some(group) = map.get(media_group_id) else {
                // Settled or swept concurrently.
                return;
            };
            if Instant::now().saturating_duration_since(group.last_seen_at) < self.cfg.debounce / 2
            {
                return;
            }
            let Some(group) = map.remove(media_group_id) else {
                return;
            };
            settled_content(group.items)
        };

        let Some(content) = content else {
            return;
        };
        tracing::debug!(group = %media_group_id, album = matches!(content, BroadcastContent::Album(_)), "media group settled");
        (self.settle)(content).await;
    }

    /// Discard groups first seen more than `stale_after` ago. Returns how many were
    /// dropped.
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Instant::now()).await
    }

    pub async fn sweep_at(&self, now: Instant) -> usize {
        let stale_after = self.cfg.stale_after;
        let mut map = self.pending.lock().await;
        let before = map.len();
        map.retain(|_, group| {
            let keep = now.saturating_duration_since(group.first_seen_at) <= stale_after;
            if !keep {
                group.cancel.cancel();
            }
            keep
        });
        let dropped = before - map.len();
        if dropped > 0 {
            tracing::info!(dropped, "discarded stale media groups");
        }
        dropped
    }

    /// Run `sweep` every `interval` until `shutdown` is cancelled.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let aggregator = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                  _ = shutdown.cancelled() => break,
                  _ = tick.tick() => {
                    aggregator.sweep().await;
                  }
                }
            }
        })
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Two or more items make an album; a single item is a standalone medium.
fn settled_content(items: Vec<MediaItem>) -> Option<BroadcastContent> {
    if items.len() > 1 {
        return Some(BroadcastContent::Album(items));
    }
    items.into_iter().next().map(BroadcastContent::Single)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn aggregator(
        debounce: Duration,
    ) -> (Arc<MediaAggregator>, mpsc::UnboundedReceiver<BroadcastContent>) {
        aggregator_with(debounce, Duration::from_secs(3600))
    }

    fn aggregator_with(
        debounce: Duration,
        stale_after: Duration,
    ) -> (Arc<MediaAggregator>, mpsc::UnboundedReceiver<BroadcastContent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settle: SettleFn = Arc::new(move |content: BroadcastContent| {
            let tx = tx.clone();
            let fut: BoxFuture = Box::pin(async move {
                let _ = tx.send(content);
            });
            fut
        });
        let cfg = AggregatorConfig {
            debounce,
            stale_after,
        };
        (MediaAggregator::new(cfg, settle), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn items_close_together_settle_as_one_album_in_order() {
        let (agg, mut rx) = aggregator(Duration::from_secs(1));
        let a = MediaItem::photo("a", Some("hello"));
        let b = MediaItem::photo("b", None);

        agg.add_item("g1".to_string(), a.clone()).await;
        sleep(Duration::from_millis(200)).await;
        agg.add_item("g1".to_string(), b.clone()).await;
        sleep(Duration::from_secs(3)).await;

        assert_eq!(rx.try_recv().unwrap(), BroadcastContent::Album(vec![a, b]));
        assert!(rx.try_recv().is_err());
        assert_eq!(agg.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn lone_item_settles_as_single() {
        let (agg, mut rx) = aggregator(Duration::from_secs(1));
        let a = MediaItem::document("doc", None);

        agg.add_item("g1".to_string(), a.clone()).await;
        sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
        sleep(Duration::from_secs(2)).await;

        assert_eq!(rx.try_recv().unwrap(), BroadcastContent::Single(a));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn groups_are_independent() {
        let (agg, mut rx) = aggregator(Duration::from_secs(1));
        agg.add_item("g1".to_string(), MediaItem::photo("a1", None)).await;
        agg.add_item("g2".to_string(), MediaItem::photo("b1", None)).await;
        agg.add_item("g1".to_string(), MediaItem::photo("a2", None)).await;
        assert_eq!(agg.pending_count().await, 2);
        sleep(Duration::from_secs(3)).await;

        let mut got = vec![rx.try_recv().unwrap(), rx.try_recv().unwrap()];
        got.sort_by_key(|c| matches!(c, BroadcastContent::Single(_)));
        assert_eq!(
            got,
            vec![
                BroadcastContent::Album(vec![
                    MediaItem::photo("a1", None),
                    MediaItem::photo("a2", None)
                ]),
                BroadcastContent::Single(MediaItem::photo("b1", None)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_drops_stale_groups_and_silences_their_timers() {
        let (agg, mut rx) = aggregator(Duration::from_secs(1));
        agg.add_item("old".to_string(), MediaItem::photo("a", None)).await;
        agg.add_item("old".to_string(), MediaItem::photo("b", None)).await;

        assert_eq!(agg.sweep_at(Instant::now() + Duration::from_secs(1800)).await, 0);
        assert_eq!(agg.pending_count().await, 1);

        assert_eq!(agg.sweep_at(Instant::now() + Duration::from_secs(3601)).await, 1);
        assert_eq!(agg.pending_count().await, 0);

        sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn settling_a_missing_group_emits_nothing() {
        let (agg, mut rx) = aggregator(Duration::from_secs(1));
        agg.settle_group("missing").await;

        assert!(rx.try_recv().is_err());
        assert_eq!(agg.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn settle_waits_for_half_the_debounce_of_quiet() {
        let (agg, mut rx) = aggregator(Duration::from_secs(1));
        let a = MediaItem::photo("a", None);

        agg.add_item("g".to_string(), a.clone()).await;
        agg.settle_group("g").await;
        assert!(rx.try_recv().is_err());
        assert_eq!(agg.pending_count().await, 1);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.try_recv().unwrap(), BroadcastContent::Single(a));
        assert_eq!(agg.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task_discards_stale_groups_until_shutdown() {
        // Debounce longer than staleness so only the sweeper can clear the group.
        let (agg, mut rx) = aggregator_with(Duration::from_secs(10_000), Duration::from_secs(60));
        let shutdown = CancellationToken::new();
        let handle = agg.spawn_sweeper(Duration::from_secs(30), shutdown.clone());

        agg.add_item("g".to_string(), MediaItem::photo("a", None)).await;
        sleep(Duration::from_secs(45)).await;
        assert_eq!(agg.pending_count().await, 1);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(agg.pending_count().await, 0);

        shutdown.cancel();
        handle.await.unwrap();

        sleep(Duration::from_secs(20_000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn settle_policy_requires_two_items_for_an_album() {
        assert_eq!(settled_content(vec![]), None);
        assert_eq!(
            settled_content(vec![MediaItem::photo("a", None)]),
            Some(BroadcastContent::Single(MediaItem::photo("a", None)))
        );
        assert!(matches!(
            settled_content(vec![MediaItem::photo("a", None), MediaItem::photo("b", None)]),
            Some(BroadcastContent::Album(items)) if items.len() == 2
        ));
    }
}
