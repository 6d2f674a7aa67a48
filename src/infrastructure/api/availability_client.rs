use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::AvailabilitySource;
use crate::config::ApiCfg;
use crate::domain::availability::AvailabilityPayload;
use crate::shared::errors::{AppError, FetchError};

/// HTTP client for the hotel availability endpoint
pub struct AvailabilityClient {
    http_client: Client,
    base_url: String,
}

impl AvailabilityClient {
    pub fn new(cfg: &ApiCfg) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: cfg.base_url.clone(),
        })
    }
}

#[async_trait]
impl AvailabilitySource for AvailabilityClient {
    async fn fetch(&self, start: NaiveDate, limit: u32) -> Result<AvailabilityPayload, FetchError> {
        let start = start.format("%Y-%m-%d").to_string();
        info!(
            "🔍 Fetching availability from {} (start={}, limit={})",
            self.base_url, start, limit
        );

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("start", start), ("limit", limit.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let payload: AvailabilityPayload = response.json().await?;
        debug!("Availability payload holds {} days", payload.day_count());
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(url: String) -> AvailabilityClient {
        AvailabilityClient::new(&ApiCfg {
            base_url: url,
            timeout_secs: 5,
            user_agent: "hotelwatch-test".to_string(),
            ..ApiCfg::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_parameterized_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/availability")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), "2025-06-27".into()),
                Matcher::UrlEncoded("limit".into(), "6".into()),
            ]))
            .match_header("user-agent", "hotelwatch-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"2025-06-30": {"YLXX": {"status": "open", "min": 180, "max": 240}}}"#)
            .create_async()
            .await;

        let client = client_for(format!("{}/availability", server.url()));
        let payload = client
            .fetch(NaiveDate::from_ymd_opt(2025, 6, 27).unwrap(), 6)
            .await
            .unwrap();

        assert_eq!(payload.day_count(), 1);
        let obs = payload
            .observations_for(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
            .unwrap();
        assert_eq!(obs[0].min_price, Some(180.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/availability")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(format!("{}/availability", server.url()));
        let err = client
            .fetch(NaiveDate::from_ymd_opt(2025, 6, 27).unwrap(), 6)
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Status(503));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_object_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/availability")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[1, 2, 3]")
            .create_async()
            .await;

        let client = client_for(format!("{}/availability", server.url()));
        let err = client
            .fetch(NaiveDate::from_ymd_opt(2025, 6, 27).unwrap(), 6)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
