pub mod services;

pub use services::NotificationEngine;
