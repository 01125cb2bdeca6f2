#![doc(test(attr(deny(warnings))))]

//! Obligation Core provides the recurrence scheduling and notification engine
//! behind recurring income and expense tracking: computing next occurrences
//! under calendar clamping, deciding when an obligation should surface as a
//! notification, and advancing schedules exactly once per occurrence even
//! under concurrent triggers.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod schedule;
pub mod store;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Obligation Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
