//! End-to-end controller scenarios against a canned in-process service.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use comfort_core::{
    AppController, Condition, ConditionKind, DailyForecast, ForecastService, KvStore,
    PredictionData, QueryError, QueryOutcome, QueryParams, QueryState, ServiceResponse, Theme,
    error::GENERIC_FAILURE_MESSAGE,
    extract::INVALID_COUNTRY_MESSAGE,
    store::keys,
};

/// The daily-prediction example payload, wrapped in prose the way the live
/// service tends to reply.
const PARIS_REPLY: &str = r#"Here is the prediction you asked for:
{
    "location": "Paris, France",
    "date": "2024-10-27",
    "comfortScore": 10,
    "conditions": [
        {"name": "Very Hot", "likelihood": 85, "description": "Temperatures are expected to be significantly above the seasonal average.", "value": 35, "unit": "°C"},
        {"name": "Very Cold", "likelihood": 2, "description": "No cold snap expected.", "value": 5, "unit": "°C"},
        {"name": "Very Windy", "likelihood": 10, "description": "Light breeze at most.", "value": 12, "unit": "km/h"},
        {"name": "Very Wet", "likelihood": 5, "description": "Dry throughout.", "value": null, "unit": null},
        {"name": "Very Uncomfortable", "likelihood": 40, "description": "Humidity may build up.", "value": null, "unit": null}
    ],
    "summary": "Expect a very hot and uncomfortable day, with temperatures feeling even warmer due to high humidity.",
    "recommendations": ["Stay hydrated and seek air-conditioned spaces during peak hours."]
}
Let me know if you need anything else."#;

#[derive(Debug)]
enum Canned {
    Reply(&'static str),
    Fail(&'static str),
    Unexpected,
}

impl Canned {
    fn to_response(&self) -> Result<ServiceResponse, QueryError> {
        match self {
            Canned::Reply(text) => {
                Ok(ServiceResponse { raw_text: (*text).to_string(), sources: Vec::new() })
            }
            Canned::Fail(msg) => Err(QueryError::Service((*msg).to_string())),
            Canned::Unexpected => panic!("service called when no call was expected"),
        }
    }
}

#[derive(Debug)]
struct CannedService {
    daily: Canned,
    country: Canned,
    calls: Arc<AtomicUsize>,
}

impl CannedService {
    fn daily(reply: Canned) -> Self {
        Self { daily: reply, country: Canned::Unexpected, calls: Arc::default() }
    }

    fn country(reply: Canned) -> Self {
        Self { daily: Canned::Unexpected, country: reply, calls: Arc::default() }
    }

    /// Handle for asserting call counts after the service moves into the
    /// controller.
    fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ForecastService for CannedService {
    async fn daily_prediction(&self, _query_text: &str) -> Result<ServiceResponse, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.daily.to_response()
    }

    async fn country_overview(
        &self,
        _country: &str,
        _month: u32,
        _year: i32,
    ) -> Result<ServiceResponse, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.country.to_response()
    }
}

fn paris_params() -> QueryParams {
    QueryParams::Daily {
        location: "Paris, France".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 10, 27).unwrap(),
    }
}

fn sample_prediction(location: &str) -> PredictionData {
    let conditions = ConditionKind::all()
        .iter()
        .map(|kind| Condition {
            name: *kind,
            likelihood: 20,
            description: String::new(),
            value: None,
            unit: None,
        })
        .collect();

    PredictionData {
        location: location.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 10, 27).unwrap(),
        comfort_score: 5.0,
        conditions,
        summary: String::new(),
        recommendations: Vec::new(),
    }
}

#[tokio::test]
async fn daily_success_records_history_and_last_location() {
    let dir = tempfile::tempdir().unwrap();
    let store = KvStore::at(dir.path());
    let mut controller =
        AppController::new(CannedService::daily(Canned::Reply(PARIS_REPLY)), store.clone());

    let state = controller.submit(paris_params()).await;

    match state {
        QueryState::Success(QueryOutcome::Daily(forecast)) => {
            assert_eq!(forecast.prediction.location, "Paris, France");
            assert_eq!(forecast.prediction.conditions.len(), 5);
        }
        other => panic!("expected daily success, got {other:?}"),
    }

    assert_eq!(controller.history().len(), 1);
    assert!(
        controller.history().items()[0].id.starts_with("Paris, France-2024-10-27-"),
        "unexpected id: {}",
        controller.history().items()[0].id
    );
    assert_eq!(store.get(keys::LAST_LOCATION).as_deref(), Some("Paris, France"));
    assert!(store.get(keys::HISTORY).is_some());
    assert_eq!(controller.last_location(), Some("Paris, France"));
}

#[tokio::test]
async fn invalid_country_sentinel_fails_with_the_exact_message() {
    let dir = tempfile::tempdir().unwrap();
    let service = CannedService::country(Canned::Reply(r#"{"isValidCountry": false}"#));
    let mut controller = AppController::new(service, KvStore::at(dir.path()));

    let state = controller
        .submit(QueryParams::Country { country: "Atlantis".to_string(), month: 6, year: 2025 })
        .await;

    match state {
        QueryState::Failed(msg) => assert_eq!(msg, INVALID_COUNTRY_MESSAGE),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_location_fails_inline_without_a_service_call() {
    let dir = tempfile::tempdir().unwrap();
    let service = CannedService::daily(Canned::Unexpected);
    let calls = service.call_counter();
    let mut controller = AppController::new(service, KvStore::at(dir.path()));

    let params = QueryParams::Daily {
        location: String::new(),
        date: NaiveDate::from_ymd_opt(2024, 10, 27).unwrap(),
    };
    let state = controller.submit(params).await;

    match state {
        QueryState::Failed(msg) => assert_eq!(msg, "Please provide a location and a date."),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(controller.history().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_reply_shows_the_generic_message() {
    let dir = tempfile::tempdir().unwrap();
    let service = CannedService::daily(Canned::Reply("I could not produce a forecast today."));
    let mut controller = AppController::new(service, KvStore::at(dir.path()));

    let state = controller.submit(paris_params()).await;

    match state {
        QueryState::Failed(msg) => assert_eq!(msg, GENERIC_FAILURE_MESSAGE),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(controller.history().is_empty());
}

#[tokio::test]
async fn service_failure_surfaces_its_message() {
    let dir = tempfile::tempdir().unwrap();
    let service = CannedService::daily(Canned::Fail("quota exhausted"));
    let calls = service.call_counter();
    let mut controller = AppController::new(service, KvStore::at(dir.path()));

    let state = controller.submit(paris_params()).await;

    match state {
        QueryState::Failed(msg) => assert_eq!(msg, "quota exhausted"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stale_completion_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let service = CannedService::daily(Canned::Unexpected);
    let mut controller = AppController::new(service, KvStore::at(dir.path()));

    let first = controller.begin_query(&paris_params()).unwrap();
    let second = controller
        .begin_query(&QueryParams::Daily {
            location: "Lyon, France".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 10, 28).unwrap(),
        })
        .unwrap();

    // The slow first request resolves after the second one superseded it.
    let stale_outcome = QueryOutcome::Daily(DailyForecast {
        prediction: sample_prediction("Paris, France"),
        sources: Vec::new(),
    });
    controller.complete_query(first, Ok(stale_outcome));

    assert!(controller.state().is_loading(), "stale completion must not change state");
    assert!(controller.history().is_empty(), "stale completion must not touch history");

    let fresh_outcome = QueryOutcome::Daily(DailyForecast {
        prediction: sample_prediction("Lyon, France"),
        sources: Vec::new(),
    });
    controller.complete_query(second, Ok(fresh_outcome));

    match controller.state() {
        QueryState::Success(QueryOutcome::Daily(forecast)) => {
            assert_eq!(forecast.prediction.location, "Lyon, France");
        }
        other => panic!("expected success for the newer query, got {other:?}"),
    }
    assert_eq!(controller.history().len(), 1);
    assert_eq!(controller.last_location(), Some("Lyon, France"));
}

#[tokio::test]
async fn clearing_history_removes_the_storage_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = KvStore::at(dir.path());
    let mut controller =
        AppController::new(CannedService::daily(Canned::Reply(PARIS_REPLY)), store.clone());

    controller.submit(paris_params()).await;
    assert!(store.get(keys::HISTORY).is_some());

    controller.clear_history();
    assert!(controller.history().is_empty());
    assert_eq!(store.get(keys::HISTORY), None);
}

#[tokio::test]
async fn theme_toggle_persists_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let store = KvStore::at(dir.path());

    let mut controller =
        AppController::new(CannedService::daily(Canned::Unexpected), store.clone());
    assert_eq!(controller.theme(), Theme::Light);

    assert_eq!(controller.toggle_theme(), Theme::Dark);
    assert_eq!(store.get(keys::THEME).as_deref(), Some("dark"));

    let reopened = AppController::new(CannedService::daily(Canned::Unexpected), store);
    assert_eq!(reopened.theme(), Theme::Dark);
}
