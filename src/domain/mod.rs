//! Domain models for recurring obligations and the notification feed.

pub mod feed;
pub mod obligation;

pub use feed::{NotificationFeed, NotificationItem, NotificationSource};
pub use obligation::{
    CompletionOverrides, ObligationKind, PendingRequestItem, RealizedTransaction,
    RecurringObligation,
};
