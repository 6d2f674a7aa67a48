//! Hotelwatch - hotel availability price monitor
//! Built with Domain-Driven Design principles

pub mod app;
pub mod config;
pub mod report;

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::{Monitor, Scheduler};
pub use config::Config;
pub use domain::price::{PriceEvaluator, PriceHistory};
pub use infrastructure::{AvailabilityClient, NotificationDispatcher, WebhookNotifier};
pub use report::CycleReport;
