use crate::{config::Config, error::QueryError, model::GroundingSource, service::gemini::GeminiClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod gemini;

/// The raw outcome of one AI call: the unparsed reply text plus the web
/// citations the service grounded it on, deduplicated by uri.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub raw_text: String,
    pub sources: Vec<GroundingSource>,
}

/// Abstraction over the generative reasoning service. One outbound call per
/// invocation; no retry is performed at this layer.
#[async_trait]
pub trait ForecastService: Send + Sync + Debug {
    /// Request a daily weather-comfort prediction for a free-text query.
    async fn daily_prediction(&self, query_text: &str) -> Result<ServiceResponse, QueryError>;

    /// Request a country-level climate overview for one month.
    async fn country_overview(
        &self,
        country: &str,
        month: u32,
        year: i32,
    ) -> Result<ServiceResponse, QueryError>;
}

/// Construct the AI client from config.
pub fn service_from_config(config: &Config) -> anyhow::Result<GeminiClient> {
    GeminiClient::new(config)
}
