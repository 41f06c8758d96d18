//! Core library for the `comfort` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The AI query client and its service abstraction
//! - Extraction and validation of the AI's loosely-typed replies
//! - Shared domain models (predictions, overviews, history, theme)
//! - The application state controller and chart derivation
//!
//! It is used by `comfort-cli`, but can also be reused by other binaries or
//! services.

pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod extract;
pub mod history;
pub mod model;
pub mod service;
pub mod store;

pub use app::{AppController, QueryParams, QueryState, RequestToken};
pub use chart::{ChartModel, Metric};
pub use config::Config;
pub use error::QueryError;
pub use history::{HistoryItem, HistoryLog, MAX_HISTORY_ITEMS};
pub use model::{
    Condition, ConditionKind, CountryOverview, CountryOverviewData, DailyForecast,
    GroundingSource, PredictionData, QueryOutcome, RegionalBreakdown, Theme,
};
pub use service::{ForecastService, ServiceResponse, gemini::GeminiClient, service_from_config};
pub use store::KvStore;
