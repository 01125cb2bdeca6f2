//! Builds the merged notification feed for one owner.
//!
//! Each cycle fetches active obligations, catches up stale anchors (persisting
//! the repair through the same CAS discipline as user advancement), filters by
//! the eligibility window, merges read-only pending peer requests, and sorts
//! into a deterministic feed. Collaborator timeouts degrade the feed instead
//! of failing it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::{
    NotificationFeed, NotificationItem, NotificationSource, RecurringObligation,
};
use crate::errors::{EngineError, EngineResult};
use crate::schedule::{catch_up_to_today, eligibility};
use crate::store::{CasOutcome, ObligationStore, PendingRequestSource, StoreError};

pub struct NotificationAggregator {
    obligations: Arc<dyn ObligationStore>,
    requests: Arc<dyn PendingRequestSource>,
    config: EngineConfig,
}

impl NotificationAggregator {
    pub fn new(
        obligations: Arc<dyn ObligationStore>,
        requests: Arc<dyn PendingRequestSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            obligations,
            requests,
            config,
        }
    }

    /// Runs one aggregation cycle at the given instant.
    pub async fn build_feed(
        &self,
        owner_id: Uuid,
        now: NaiveDateTime,
    ) -> EngineResult<NotificationFeed> {
        let today = now.date();
        let mut feed = NotificationFeed::default();
        let mut items = Vec::new();

        // A listing outage degrades to a partial feed: pending requests can
        // still surface even when no obligation is readable.
        let obligations = match self.list_active_with_retry(owner_id).await {
            Ok(obligations) => obligations,
            Err(err) => {
                tracing::warn!(owner = %owner_id, error = %err, "obligation listing unavailable");
                feed.degraded = true;
                Vec::new()
            }
        };

        for obligation in &obligations {
            match self.resolve_due_date(obligation, today).await {
                Ok((due_date, repaired_degraded)) => {
                    feed.degraded |= repaired_degraded;
                    if eligibility::is_eligible(due_date, now, &obligation.frequency, &self.config)
                    {
                        items.push(NotificationItem {
                            source: NotificationSource::Recurring,
                            source_id: obligation.id,
                            due_date,
                            minutes_until_due: eligibility::minutes_until_due(due_date, now),
                            label: eligibility::label(due_date, now, &obligation.frequency),
                            description: obligation.description.clone(),
                            amount: obligation.amount,
                        });
                    }
                }
                Err(EngineError::RunawayRecurrence { .. }) => {
                    tracing::warn!(
                        obligation = %obligation.id,
                        "catch-up exceeded iteration cap, flagging for review"
                    );
                    feed.needs_review.push(obligation.id);
                    feed.degraded = true;
                }
                Err(err) => {
                    tracing::warn!(obligation = %obligation.id, error = %err, "skipping obligation");
                    feed.degraded = true;
                }
            }
        }

        self.merge_pending_requests(owner_id, now, &mut items, &mut feed)
            .await;

        items.sort_by_key(|item| (item.minutes_until_due, item.source.sort_rank(), item.source_id));
        dedupe_by_source(&mut items);

        feed.today_count = items.iter().filter(|item| item.due_date <= today).count();
        feed.upcoming_count = items.len() - feed.today_count;
        feed.items = items;
        Ok(feed)
    }

    /// Catches the anchor up to today and persists the repair when it moved.
    /// A CAS conflict means another trigger repaired it first; the stored
    /// value is re-read and trusted. Returns the due date plus whether the
    /// repair left the feed degraded.
    async fn resolve_due_date(
        &self,
        obligation: &RecurringObligation,
        today: NaiveDate,
    ) -> EngineResult<(NaiveDate, bool)> {
        let anchor = obligation.anchor_due_date;
        let caught_up = catch_up_to_today(
            anchor,
            &obligation.frequency,
            today,
            self.config.max_catch_up_iterations,
        )?;
        if caught_up == anchor {
            return Ok((caught_up, false));
        }

        let repair = timeout(
            self.config.store_timeout(),
            self.obligations.advance_anchor(obligation.id, anchor, caught_up),
        )
        .await;
        match repair {
            Ok(Ok(CasOutcome::Applied)) => Ok((caught_up, false)),
            Ok(Ok(CasOutcome::Conflict)) => {
                let refreshed = timeout(
                    self.config.store_timeout(),
                    self.obligations.get(obligation.id),
                )
                .await;
                match refreshed {
                    Ok(Ok(Some(current))) => {
                        let due = catch_up_to_today(
                            current.anchor_due_date,
                            &current.frequency,
                            today,
                            self.config.max_catch_up_iterations,
                        )?;
                        Ok((due, false))
                    }
                    _ => Ok((caught_up, true)),
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(obligation = %obligation.id, error = %err, "anchor repair failed");
                Ok((caught_up, true))
            }
            Err(_) => {
                tracing::warn!(obligation = %obligation.id, "anchor repair timed out");
                Ok((caught_up, true))
            }
        }
    }

    async fn merge_pending_requests(
        &self,
        owner_id: Uuid,
        now: NaiveDateTime,
        items: &mut Vec<NotificationItem>,
        feed: &mut NotificationFeed,
    ) {
        let pending = timeout(
            self.config.store_timeout(),
            self.requests.list_pending(owner_id),
        )
        .await;
        match pending {
            Ok(Ok(requests)) => {
                for request in requests {
                    items.push(NotificationItem {
                        source: NotificationSource::PendingRequest,
                        source_id: request.id,
                        due_date: request.due_date,
                        minutes_until_due: eligibility::minutes_until_due(request.due_date, now),
                        label: eligibility::day_level_label(request.due_date, now),
                        description: request.description,
                        amount: request.amount,
                    });
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "pending request source failed");
                feed.degraded = true;
            }
            Err(_) => {
                tracing::warn!("pending request source timed out");
                feed.degraded = true;
            }
        }
    }

    async fn list_active_with_retry(
        &self,
        owner_id: Uuid,
    ) -> EngineResult<Vec<RecurringObligation>> {
        let attempts = self.config.read_retry_attempts.max(1);
        let mut last_error = None;
        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.read_retry_backoff()).await;
            }
            let listed = timeout(
                self.config.store_timeout(),
                self.obligations.list_active(owner_id),
            )
            .await;
            match listed {
                Ok(Ok(obligations)) => return Ok(obligations),
                Ok(Err(err)) => {
                    tracing::warn!(attempt, error = %err, "obligation listing failed");
                    last_error = Some(EngineError::from(err));
                }
                Err(_) => {
                    tracing::warn!(attempt, "obligation listing timed out");
                    last_error = Some(EngineError::from(StoreError::Unavailable(
                        "obligation listing timed out".into(),
                    )));
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| EngineError::StoreUnavailable("obligation listing failed".into())))
    }
}

fn dedupe_by_source(items: &mut Vec<NotificationItem>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.source_id));
}
