//! Domain layer - availability data and price evaluation

pub mod availability;
pub mod price;

pub use availability::{AvailabilityPayload, DayError};
pub use price::{AlertKind, PriceAlert, PriceEvaluator, PriceHistory};
