pub mod advancement;
pub mod aggregator;
pub mod engine;
pub mod scheduler;

pub use advancement::AdvancementCoordinator;
pub use aggregator::NotificationAggregator;
pub use engine::NotificationEngine;
pub use scheduler::RefreshScheduler;
