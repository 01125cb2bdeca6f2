//! Per-owner/session wiring of the notification engine.
//!
//! One engine instance serves one owner; there is no shared mutable state
//! across owners. The presentation layer talks to this facade only.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use super::advancement::AdvancementCoordinator;
use super::aggregator::NotificationAggregator;
use super::scheduler::RefreshScheduler;
use crate::config::EngineConfig;
use crate::domain::{CompletionOverrides, NotificationFeed, RealizedTransaction};
use crate::errors::EngineResult;
use crate::store::{ObligationStore, PendingRequestSource};

pub struct NotificationEngine {
    owner_id: Uuid,
    coordinator: AdvancementCoordinator,
    aggregator: Arc<NotificationAggregator>,
    scheduler: RefreshScheduler,
}

impl NotificationEngine {
    pub fn new(
        obligations: Arc<dyn ObligationStore>,
        requests: Arc<dyn PendingRequestSource>,
        config: EngineConfig,
        owner_id: Uuid,
    ) -> Self {
        let aggregator = Arc::new(NotificationAggregator::new(
            Arc::clone(&obligations),
            requests,
            config.clone(),
        ));
        let scheduler = RefreshScheduler::new(
            Arc::clone(&aggregator),
            owner_id,
            config.refresh_interval(),
        );
        Self {
            owner_id,
            coordinator: AdvancementCoordinator::new(obligations, config),
            aggregator,
            scheduler,
        }
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Starts the background refresh loop for this session.
    pub fn start(&self) {
        self.scheduler.start();
    }

    /// Stops the background refresh loop.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
    }

    /// Feeds published by the background loop.
    pub fn subscribe(&self) -> watch::Receiver<Option<NotificationFeed>> {
        self.scheduler.subscribe()
    }

    /// Requests a refresh in response to an external push event, such as a
    /// peer request being created or updated.
    pub fn on_push_event(&self) {
        self.scheduler.trigger();
    }

    /// Builds a feed on demand, outside the background cadence.
    pub async fn get_feed(&self) -> EngineResult<NotificationFeed> {
        self.aggregator
            .build_feed(self.owner_id, Utc::now().naive_utc())
            .await
    }

    pub async fn complete(
        &self,
        obligation_id: Uuid,
        overrides: Option<CompletionOverrides>,
    ) -> EngineResult<RealizedTransaction> {
        let record = self.coordinator.complete(obligation_id, overrides).await?;
        self.scheduler.trigger();
        Ok(record)
    }

    pub async fn edit_and_complete(
        &self,
        obligation_id: Uuid,
        overrides: CompletionOverrides,
    ) -> EngineResult<RealizedTransaction> {
        let record = self
            .coordinator
            .edit_and_complete(obligation_id, overrides)
            .await?;
        self.scheduler.trigger();
        Ok(record)
    }

    pub async fn skip(&self, obligation_id: Uuid) -> EngineResult<NaiveDate> {
        let next = self.coordinator.skip(obligation_id).await?;
        self.scheduler.trigger();
        Ok(next)
    }

    pub async fn deactivate(&self, obligation_id: Uuid) -> EngineResult<()> {
        self.coordinator.deactivate(obligation_id).await?;
        self.scheduler.trigger();
        Ok(())
    }
}
