use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The five fixed discomfort dimensions every daily prediction reports on.
///
/// Conditions are matched by this enum rather than by raw name strings, so a
/// misspelled category in a payload is a validation error instead of a
/// silently missing metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    #[serde(rename = "Very Hot")]
    VeryHot,
    #[serde(rename = "Very Cold")]
    VeryCold,
    #[serde(rename = "Very Windy")]
    VeryWindy,
    #[serde(rename = "Very Wet")]
    VeryWet,
    #[serde(rename = "Very Uncomfortable")]
    VeryUncomfortable,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::VeryHot => "Very Hot",
            ConditionKind::VeryCold => "Very Cold",
            ConditionKind::VeryWindy => "Very Windy",
            ConditionKind::VeryWet => "Very Wet",
            ConditionKind::VeryUncomfortable => "Very Uncomfortable",
        }
    }

    pub const fn all() -> &'static [ConditionKind] {
        &[
            ConditionKind::VeryHot,
            ConditionKind::VeryCold,
            ConditionKind::VeryWindy,
            ConditionKind::VeryWet,
            ConditionKind::VeryUncomfortable,
        ]
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ConditionKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Very Hot" => Ok(ConditionKind::VeryHot),
            "Very Cold" => Ok(ConditionKind::VeryCold),
            "Very Windy" => Ok(ConditionKind::VeryWindy),
            "Very Wet" => Ok(ConditionKind::VeryWet),
            "Very Uncomfortable" => Ok(ConditionKind::VeryUncomfortable),
            _ => Err(anyhow::anyhow!(
                "Unknown condition category '{value}'. Expected one of: \
                 Very Hot, Very Cold, Very Windy, Very Wet, Very Uncomfortable."
            )),
        }
    }
}

/// One discomfort dimension of a daily prediction.
///
/// `value`/`unit` carry the predicted magnitude for the heat, cold, and wind
/// categories and are absent for the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: ConditionKind,
    pub likelihood: u8,
    pub description: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A validated daily weather-comfort prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionData {
    pub location: String,
    pub date: NaiveDate,
    pub comfort_score: f64,
    pub conditions: Vec<Condition>,
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl PredictionData {
    /// Comfort score clamped into the renderable 0–10 band. Upstream values
    /// outside that range are display artifacts, not data to preserve.
    pub fn clamped_score(&self) -> f64 {
        self.comfort_score.clamp(0.0, 10.0)
    }

    pub fn condition(&self, kind: ConditionKind) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.name == kind)
    }
}

/// A web citation the AI grounded its answer on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

/// Drop repeated citations, keeping the first occurrence per uri in order.
pub fn dedup_by_uri(sources: Vec<GroundingSource>) -> Vec<GroundingSource> {
    let mut seen = std::collections::HashSet::new();
    sources
        .into_iter()
        .filter(|s| seen.insert(s.uri.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalBreakdown {
    pub region: String,
    pub summary: String,
}

/// A validated country-level monthly climate overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryOverviewData {
    pub country: String,
    pub month: u32,
    pub year: i32,
    pub overall_summary: String,
    pub regional_breakdowns: Vec<RegionalBreakdown>,
    pub travel_advice: Vec<String>,
}

/// Daily prediction together with the citations that grounded it.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub prediction: PredictionData,
    pub sources: Vec<GroundingSource>,
}

/// Country overview together with the citations that grounded it.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryOverview {
    pub overview: CountryOverviewData,
    pub sources: Vec<GroundingSource>,
}

/// The result of one completed query, whichever mode produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Daily(DailyForecast),
    Country(CountryOverview),
}

/// Display theme, persisted across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Restore from a stored value; anything but `"dark"` means light.
    pub fn from_stored(stored: Option<&str>) -> Self {
        match stored {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// Test fixture shared across module tests: a valid prediction covering all
/// five categories.
#[cfg(test)]
pub(crate) fn sample_prediction() -> PredictionData {
    let conditions = ConditionKind::all()
        .iter()
        .map(|kind| Condition {
            name: *kind,
            likelihood: 20,
            description: format!("{kind} is unlikely."),
            value: None,
            unit: None,
        })
        .collect();

    PredictionData {
        location: "Paris, France".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 10, 27).unwrap(),
        comfort_score: 7.5,
        conditions,
        summary: "Mild autumn day.".to_string(),
        recommendations: vec!["Bring a light jacket.".to_string()],
    }
}
