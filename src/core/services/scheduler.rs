//! Session-scoped refresh task with explicit start/stop lifecycle.
//!
//! Refreshes run on a fixed interval and on demand via [`trigger`]. Triggers
//! arriving while a refresh is in flight coalesce into exactly one follow-up
//! run: `Notify` holds a single stored permit, so overlapping timer ticks,
//! push events, and post-advance triggers never queue up. A refresh in
//! flight is never hard-cancelled.
//!
//! [`trigger`]: RefreshScheduler::trigger

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use super::aggregator::NotificationAggregator;
use crate::domain::NotificationFeed;

pub struct RefreshScheduler {
    aggregator: Arc<NotificationAggregator>,
    owner_id: Uuid,
    refresh_interval: Duration,
    refresh_trigger: Arc<Notify>,
    shutdown: Arc<Notify>,
    feed_tx: watch::Sender<Option<NotificationFeed>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(
        aggregator: Arc<NotificationAggregator>,
        owner_id: Uuid,
        refresh_interval: Duration,
    ) -> Self {
        let (feed_tx, _) = watch::channel(None);
        Self {
            aggregator,
            owner_id,
            refresh_interval,
            refresh_trigger: Arc::new(Notify::new()),
            shutdown: Arc::new(Notify::new()),
            feed_tx,
            handle: Mutex::new(None),
        }
    }

    /// Receiver for feeds published by the refresh loop.
    pub fn subscribe(&self) -> watch::Receiver<Option<NotificationFeed>> {
        self.feed_tx.subscribe()
    }

    /// Requests a refresh: push events and successful advancements call this.
    pub fn trigger(&self) {
        self.refresh_trigger.notify_one();
    }

    /// Spawns the refresh loop. Idempotent while already running.
    pub fn start(&self) {
        let mut handle = self.handle.lock().unwrap();
        if handle.is_some() {
            return;
        }
        let aggregator = Arc::clone(&self.aggregator);
        let owner_id = self.owner_id;
        let interval = self.refresh_interval;
        let trigger = Arc::clone(&self.refresh_trigger);
        let shutdown = Arc::clone(&self.shutdown);
        let feed_tx = self.feed_tx.clone();
        *handle = Some(tokio::spawn(async move {
            run_loop(aggregator, owner_id, interval, trigger, shutdown, feed_tx).await;
        }));
    }

    /// Stops the refresh loop and waits for it to finish.
    pub async fn stop(&self) {
        let handle = self.handle.lock().unwrap().take();
        if let Some(handle) = handle {
            self.shutdown.notify_one();
            let _ = handle.await;
        }
    }
}

async fn run_loop(
    aggregator: Arc<NotificationAggregator>,
    owner_id: Uuid,
    interval: Duration,
    trigger: Arc<Notify>,
    shutdown: Arc<Notify>,
    feed_tx: watch::Sender<Option<NotificationFeed>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = trigger.notified() => {}
            _ = shutdown.notified() => break,
        }
        let now = Utc::now().naive_utc();
        match aggregator.build_feed(owner_id, now).await {
            Ok(feed) => {
                let _ = feed_tx.send(Some(feed));
            }
            Err(err) => {
                tracing::warn!(owner = %owner_id, error = %err, "scheduled refresh failed");
            }
        }
    }
    tracing::debug!(owner = %owner_id, "refresh loop stopped");
}
