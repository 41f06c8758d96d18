use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::QueryError,
    model::{GroundingSource, dedup_by_uri},
    service::{ForecastService, ServiceResponse},
};

/// Client for the Google Generative Language API with the web-search tool
/// enabled on every request.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.resolved_api_key()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, prompt: String) -> Result<ServiceResponse, QueryError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
            tools: vec![RequestTool { google_search: GoogleSearch {} }],
        };

        debug!(model = %self.model, "Sending generateContent request");

        let res = self
            .http
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(status = %status, "AI service request failed");
            return Err(QueryError::Service(format!(
                "AI service request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| QueryError::Service(format!("unexpected AI service response: {e}")))?;

        let candidate = parsed.candidates.into_iter().next().ok_or_else(|| {
            QueryError::Service("AI service response contained no candidates".to_string())
        })?;

        let raw_text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let sources = candidate
            .grounding_metadata
            .map(collect_sources)
            .unwrap_or_default();

        debug!(sources = sources.len(), chars = raw_text.len(), "Received AI reply");

        Ok(ServiceResponse { raw_text, sources })
    }
}

#[async_trait]
impl ForecastService for GeminiClient {
    async fn daily_prediction(&self, query_text: &str) -> Result<ServiceResponse, QueryError> {
        self.generate(daily_prompt(query_text)).await
    }

    async fn country_overview(
        &self,
        country: &str,
        month: u32,
        year: i32,
    ) -> Result<ServiceResponse, QueryError> {
        self.generate(country_prompt(country, month, year)).await
    }
}

fn daily_prompt(query_text: &str) -> String {
    format!(
        r#"Based on the user's query: "{query_text}", first identify the location and the target date.

Crucially, if the location parsed from the query does not correspond to a real, known geographical location (city, country, etc.), you MUST return a single JSON object with a single key: {{"isValidLocation": false}}. Do not attempt to provide a forecast for nonsensical or fictional locations.

If the location is valid, analyze real-time forecasts, satellite data, and historical climate information for that location and date using web search to get the most up-to-date information.
Provide a "Weather Comfort Prediction".

Your final output for a valid location MUST be a single JSON object that conforms to the following structure. Do NOT wrap it in markdown backticks or any other text.
The 'location' and 'date' fields in the JSON MUST reflect the values you parsed from the user's query. The date should be in 'YYYY-MM-DD' format.

{{
  "location": "Paris, France",
  "date": "2024-10-27",
  "comfortScore": 10,
  "conditions": [
    {{
      "name": "Very Hot",
      "likelihood": 85,
      "description": "Temperatures are expected to be significantly above the seasonal average.",
      "value": 35,
      "unit": "°C"
    }}
  ],
  "summary": "Expect a very hot and uncomfortable day, with temperatures feeling even warmer due to high humidity.",
  "recommendations": [
    "Stay hydrated and seek air-conditioned spaces during peak hours.",
    "Consider swimming or other water-based activities to cool down."
  ]
}}

- The "conditions" array must include all five categories: 'Very Hot', 'Very Cold', 'Very Windy', 'Very Wet', 'Very Uncomfortable'.
- For 'Very Windy', 'Very Hot', or 'Very Cold', provide the predicted numerical 'value' and 'unit'. Otherwise, set value and unit to null.
- Recommendations must be nuanced and actionable based on the specific conditions.
"#
    )
}

fn country_prompt(country: &str, month: u32, year: i32) -> String {
    let month_name = month_name(month);
    format!(
        r#"Analyze the typical weather comfort and climate for the entire country of "{country}" for the month of {month_name}, {year}.
Use web search to find historical climate data, long-range forecasts, and regional weather patterns.

If the provided country name does not correspond to a real, known country, you MUST return a single JSON object with a single key: {{"isValidCountry": false}}.

If the country is valid, provide a comprehensive overview. Your final output must be a single JSON object conforming to the following structure. Do NOT wrap it in markdown backticks.

{{
  "country": "{country}",
  "month": {month},
  "year": {year},
  "overallSummary": "A high-level summary of the expected weather comfort across the country for the specified month and year.",
  "regionalBreakdowns": [
    {{
      "region": "Northern Region",
      "summary": "Detailed summary for the northern part of the country, highlighting temperature ranges, precipitation, and unique conditions."
    }},
    {{
      "region": "Coastal Areas",
      "summary": "Summary for coastal areas, focusing on humidity, wind, and sea conditions."
    }}
  ],
  "travelAdvice": [
    "Pack layered clothing for variable temperatures.",
    "Be prepared for potential afternoon showers in the south.",
    "Book accommodations with air conditioning in tropical zones."
  ]
}}

- Provide at least 2-3 regional breakdowns for different parts of the country.
- Travel advice should be practical and based on the climate analysis.
"#
    )
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "an unknown month",
    }
}

fn collect_sources(metadata: GroundingMetadata) -> Vec<GroundingSource> {
    let sources = metadata
        .grounding_chunks
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| match (web.uri, web.title) {
            (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                Some(GroundingSource { uri, title })
            }
            _ => None,
        })
        .collect();

    dedup_by_uri(sources)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    tools: Vec<RequestTool>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct RequestTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}
