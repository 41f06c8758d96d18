//! Extraction and validation of the loosely-typed AI reply.
//!
//! The service is not contractually guaranteed to emit pure JSON: replies may
//! wrap the object in prose or markdown fences. Extraction takes the first
//! `{` through the last `}` and parses that span, then a sentinel field is
//! checked before the payload is normalized into the strict domain types.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::QueryError;
use crate::model::{
    Condition, ConditionKind, CountryOverviewData, PredictionData, RegionalBreakdown,
};

/// Shown when the AI flags the queried location as unknown.
pub const INVALID_LOCATION_MESSAGE: &str =
    "Unable to find data for the specified location. Please check the name and try again.";

/// Shown when the AI flags the queried country as unknown.
pub const INVALID_COUNTRY_MESSAGE: &str =
    "Unable to find data for the specified country. Please check the name and try again.";

/// Locate and parse the single JSON object embedded in a reply.
pub fn extract_json(raw: &str) -> Result<Value, QueryError> {
    let start = raw
        .find('{')
        .ok_or_else(|| QueryError::Parse("no JSON object found in the AI response".to_string()))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| QueryError::Parse("no JSON object found in the AI response".to_string()))?;

    serde_json::from_str(&raw[start..=end])
        .map_err(|e| QueryError::Parse(format!("malformed JSON in the AI response: {e}")))
}

fn check_sentinel(value: &Value, field: &str, message: &str) -> Result<(), QueryError> {
    if value.get(field).and_then(Value::as_bool) == Some(false) {
        return Err(QueryError::InvalidSubject(message.to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    name: Option<String>,
    likelihood: Option<f64>,
    description: Option<String>,
    value: Option<f64>,
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrediction {
    location: Option<String>,
    date: Option<String>,
    comfort_score: Option<f64>,
    conditions: Option<Vec<RawCondition>>,
    summary: Option<String>,
    recommendations: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawRegion {
    region: Option<String>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverview {
    country: Option<String>,
    month: Option<u32>,
    year: Option<i32>,
    overall_summary: Option<String>,
    regional_breakdowns: Option<Vec<RawRegion>>,
    travel_advice: Option<Vec<String>>,
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, QueryError> {
    field.ok_or_else(|| QueryError::Schema(format!("missing required field '{name}'")))
}

fn required_text(field: Option<String>, name: &str) -> Result<String, QueryError> {
    let text = required(field, name)?;
    if text.trim().is_empty() {
        return Err(QueryError::Schema(format!("required field '{name}' is empty")));
    }
    Ok(text)
}

/// Validate and normalize a daily-prediction reply.
pub fn daily_prediction(raw_text: &str) -> Result<PredictionData, QueryError> {
    let value = extract_json(raw_text)?;
    check_sentinel(&value, "isValidLocation", INVALID_LOCATION_MESSAGE)?;

    let raw: RawPrediction = serde_json::from_value(value)
        .map_err(|e| QueryError::Schema(format!("prediction payload is mistyped: {e}")))?;

    let location = required_text(raw.location, "location")?;
    let date_text = required_text(raw.date, "date")?;
    let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d")
        .map_err(|e| QueryError::Schema(format!("date '{date_text}' is not YYYY-MM-DD: {e}")))?;
    let comfort_score = required(raw.comfort_score, "comfortScore")?;

    let raw_conditions = raw.conditions.unwrap_or_default();
    if raw_conditions.is_empty() {
        return Err(QueryError::Schema("conditions array is missing or empty".to_string()));
    }

    let mut conditions: Vec<Condition> = Vec::with_capacity(raw_conditions.len());
    for rc in raw_conditions {
        let name = required_text(rc.name, "conditions[].name")?;
        let kind = ConditionKind::try_from(name.as_str())
            .map_err(|e| QueryError::Schema(e.to_string()))?;
        if conditions.iter().any(|c| c.name == kind) {
            return Err(QueryError::Schema(format!("duplicate condition category '{kind}'")));
        }
        let likelihood = required(rc.likelihood, "conditions[].likelihood")?;
        conditions.push(Condition {
            name: kind,
            likelihood: clamp_likelihood(likelihood),
            description: rc.description.unwrap_or_default(),
            value: rc.value,
            unit: rc.unit,
        });
    }

    for kind in ConditionKind::all() {
        if !conditions.iter().any(|c| c.name == *kind) {
            return Err(QueryError::Schema(format!("missing condition category '{kind}'")));
        }
    }

    Ok(PredictionData {
        location,
        date,
        comfort_score,
        conditions,
        summary: raw.summary.unwrap_or_default(),
        recommendations: raw.recommendations.unwrap_or_default(),
    })
}

/// Validate and normalize a country-overview reply.
pub fn country_overview(raw_text: &str) -> Result<CountryOverviewData, QueryError> {
    let value = extract_json(raw_text)?;
    check_sentinel(&value, "isValidCountry", INVALID_COUNTRY_MESSAGE)?;

    let raw: RawOverview = serde_json::from_value(value)
        .map_err(|e| QueryError::Schema(format!("overview payload is mistyped: {e}")))?;

    let country = required_text(raw.country, "country")?;
    let month = required(raw.month, "month")?;
    if !(1..=12).contains(&month) {
        return Err(QueryError::Schema(format!("month {month} is out of range 1-12")));
    }
    let year = required(raw.year, "year")?;
    let overall_summary = required_text(raw.overall_summary, "overallSummary")?;

    let raw_regions = raw.regional_breakdowns.unwrap_or_default();
    if raw_regions.is_empty() {
        return Err(QueryError::Schema(
            "regionalBreakdowns array is missing or empty".to_string(),
        ));
    }

    let mut regional_breakdowns = Vec::with_capacity(raw_regions.len());
    for rr in raw_regions {
        regional_breakdowns.push(RegionalBreakdown {
            region: required_text(rr.region, "regionalBreakdowns[].region")?,
            summary: rr.summary.unwrap_or_default(),
        });
    }

    Ok(CountryOverviewData {
        country,
        month,
        year,
        overall_summary,
        regional_breakdowns,
        travel_advice: raw.travel_advice.unwrap_or_default(),
    })
}

fn clamp_likelihood(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}
