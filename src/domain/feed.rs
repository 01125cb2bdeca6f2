use chrono::NaiveDate;
use uuid::Uuid;

/// Origin of a feed entry. Pending peer requests sort ahead of recurring
/// items when urgency ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSource {
    PendingRequest,
    Recurring,
}

impl NotificationSource {
    pub(crate) fn sort_rank(self) -> u8 {
        match self {
            NotificationSource::PendingRequest => 0,
            NotificationSource::Recurring => 1,
        }
    }
}

/// Ephemeral feed entry, recomputed on every aggregation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationItem {
    pub source: NotificationSource,
    pub source_id: Uuid,
    pub due_date: NaiveDate,
    pub minutes_until_due: i64,
    pub label: String,
    pub description: String,
    pub amount: f64,
}

/// Result of one aggregation cycle.
///
/// `degraded` marks a partial feed: a collaborator timed out or failed, so
/// the items present are valid but possibly incomplete. `needs_review` lists
/// obligations whose catch-up exceeded the iteration cap and require manual
/// attention.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    pub items: Vec<NotificationItem>,
    pub today_count: usize,
    pub upcoming_count: usize,
    pub degraded: bool,
    pub needs_review: Vec<Uuid>,
}
