pub mod availability_client;
pub mod retry;

pub use availability_client::AvailabilityClient;
pub use retry::{fetch_with_retry, RetryPolicy};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::availability::AvailabilityPayload;
use crate::shared::errors::FetchError;

/// Source of hotel availability data
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Fetch prices for `limit` days starting at `start`, in a single request.
    async fn fetch(&self, start: NaiveDate, limit: u32) -> Result<AvailabilityPayload, FetchError>;
}
