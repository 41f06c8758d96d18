//! Application state controller.
//!
//! Owns the current query state, the history list, and the theme; the
//! key-value store is seeded from at startup and written on transitions,
//! never read back as truth. Each submission carries a request token, and a
//! completion whose token has been superseded is discarded, so the
//! last-submitted query is authoritative even when replies arrive out of
//! order.

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::{
    error::QueryError,
    extract,
    history::{HistoryItem, HistoryLog},
    model::{CountryOverview, DailyForecast, QueryOutcome, Theme},
    service::ForecastService,
    store::{KvStore, keys},
};

/// Parameters of one user submission.
#[derive(Debug, Clone)]
pub enum QueryParams {
    Daily { location: String, date: NaiveDate },
    Country { country: String, month: u32, year: i32 },
}

impl QueryParams {
    fn validate(&self) -> Result<(), QueryError> {
        match self {
            QueryParams::Daily { location, .. } => {
                if location.trim().is_empty() {
                    return Err(QueryError::InvalidInput(
                        "Please provide a location and a date.".to_string(),
                    ));
                }
            }
            QueryParams::Country { country, month, .. } => {
                if country.trim().is_empty() {
                    return Err(QueryError::InvalidInput(
                        "Please provide a country, month, and year.".to_string(),
                    ));
                }
                if !(1..=12).contains(month) {
                    return Err(QueryError::InvalidInput(
                        "Month must be between 1 and 12.".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Where the controller currently stands.
#[derive(Debug)]
pub enum QueryState {
    Idle,
    Loading,
    Success(QueryOutcome),
    Failed(String),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

/// Identifies one submission; completions carrying a superseded token are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

pub struct AppController<S> {
    service: S,
    store: KvStore,
    state: QueryState,
    history: HistoryLog,
    theme: Theme,
    last_location: Option<String>,
    seq: u64,
}

impl<S: ForecastService> AppController<S> {
    /// Build a controller seeded from the store. Corrupt or missing entries
    /// fall back to defaults.
    pub fn new(service: S, store: KvStore) -> Self {
        let theme = Theme::from_stored(store.get(keys::THEME).as_deref());
        let history = HistoryLog::load(&store);
        let last_location = store.get(keys::LAST_LOCATION).filter(|l| !l.trim().is_empty());

        Self {
            service,
            store,
            state: QueryState::Idle,
            history,
            theme,
            last_location,
            seq: 0,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn last_location(&self) -> Option<&str> {
        self.last_location.as_deref()
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggle())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Theme {
        self.theme = theme;
        self.store.set(keys::THEME, theme.as_str());
        theme
    }

    pub fn clear_history(&mut self) {
        self.history.clear(&self.store);
    }

    /// Validate and run one submission to completion.
    pub async fn submit(&mut self, params: QueryParams) -> &QueryState {
        let Some(token) = self.begin_query(&params) else {
            return &self.state;
        };
        let result = self.run_query(&params).await;
        self.complete_query(token, result);
        &self.state
    }

    /// Clear any previous result and enter `Loading`, or fail inline when a
    /// required input is missing. No network call happens here.
    pub fn begin_query(&mut self, params: &QueryParams) -> Option<RequestToken> {
        if let Err(e) = params.validate() {
            self.state = QueryState::Failed(e.display_message());
            return None;
        }

        self.seq += 1;
        self.state = QueryState::Loading;
        debug!(seq = self.seq, "Query started");
        Some(RequestToken(self.seq))
    }

    /// Apply a completion. A stale token means a newer submission has taken
    /// over; its completion is dropped without touching state.
    pub fn complete_query(
        &mut self,
        token: RequestToken,
        result: Result<QueryOutcome, QueryError>,
    ) {
        if token.0 != self.seq {
            debug!(stale = token.0, current = self.seq, "Discarding stale query completion");
            return;
        }

        match result {
            Ok(outcome) => {
                if let QueryOutcome::Daily(forecast) = &outcome {
                    let item = HistoryItem::new(
                        forecast.prediction.clone(),
                        Utc::now().timestamp_millis(),
                    );
                    self.history.record(item, &self.store);
                    self.store.set(keys::LAST_LOCATION, &forecast.prediction.location);
                    self.last_location = Some(forecast.prediction.location.clone());
                }
                self.state = QueryState::Success(outcome);
            }
            Err(err) => {
                warn!(error = %err, "Query failed");
                self.state = QueryState::Failed(err.display_message());
            }
        }
    }

    async fn run_query(&self, params: &QueryParams) -> Result<QueryOutcome, QueryError> {
        match params {
            QueryParams::Daily { location, date } => {
                let query = format!("Weather in {location} on {}", date.format("%Y-%m-%d"));
                let reply = self.service.daily_prediction(&query).await?;
                let prediction = extract::daily_prediction(&reply.raw_text)?;
                Ok(QueryOutcome::Daily(DailyForecast { prediction, sources: reply.sources }))
            }
            QueryParams::Country { country, month, year } => {
                let reply = self.service.country_overview(country, *month, *year).await?;
                let overview = extract::country_overview(&reply.raw_text)?;
                Ok(QueryOutcome::Country(CountryOverview { overview, sources: reply.sources }))
            }
        }
    }
}
