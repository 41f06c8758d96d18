use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    model::PredictionData,
    store::{KvStore, keys},
};

/// Most-recent entries kept; older ones are dropped on insert.
pub const MAX_HISTORY_ITEMS: usize = 50;

/// A completed daily prediction as remembered in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    #[serde(flatten)]
    pub prediction: PredictionData,
}

impl HistoryItem {
    pub fn new(prediction: PredictionData, captured_millis: i64) -> Self {
        let id = format!("{}-{}-{}", prediction.location, prediction.date, captured_millis);
        Self { id, prediction }
    }
}

/// The bounded, persisted list of past daily predictions, newest first.
///
/// The in-memory list is the source of truth; the store is written on every
/// mutation and its entry is removed outright when the list becomes empty.
#[derive(Debug, Default)]
pub struct HistoryLog {
    items: Vec<HistoryItem>,
}

impl HistoryLog {
    /// Load from the store. A corrupt entry seeds an empty log.
    pub fn load(store: &KvStore) -> Self {
        let Some(raw) = store.get(keys::HISTORY) else {
            return Self::default();
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Self { items },
            Err(e) => {
                warn!(error = %e, "Discarding unreadable prediction history");
                Self::default()
            }
        }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Prepend a completed prediction, dropping the oldest beyond the cap.
    pub fn record(&mut self, item: HistoryItem, store: &KvStore) {
        self.items.insert(0, item);
        self.items.truncate(MAX_HISTORY_ITEMS);
        self.persist(store);
    }

    /// Forget everything and delete the storage entry.
    pub fn clear(&mut self, store: &KvStore) {
        self.items.clear();
        store.remove(keys::HISTORY);
    }

    /// Distinct locations in first-occurrence (newest-first) order.
    pub fn locations(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.items
            .iter()
            .map(|item| item.prediction.location.as_str())
            .filter(|location| seen.insert(*location))
            .collect()
    }

    /// The entries for one location, sorted ascending by forecast date.
    /// This is the chart input.
    pub fn for_location(&self, location: &str) -> Vec<HistoryItem> {
        let mut slice: Vec<HistoryItem> = self
            .items
            .iter()
            .filter(|item| item.prediction.location == location)
            .cloned()
            .collect();
        slice.sort_by_key(|item| item.prediction.date);
        slice
    }

    fn persist(&self, store: &KvStore) {
        if self.items.is_empty() {
            store.remove(keys::HISTORY);
            return;
        }

        match serde_json::to_string(&self.items) {
            Ok(json) => store.set(keys::HISTORY, &json),
            Err(e) => warn!(error = %e, "Failed to serialize prediction history"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_prediction;
    use chrono::NaiveDate;

    fn store() -> (tempfile::TempDir, KvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = KvStore::at(dir.path());
        (dir, store)
    }

    fn item_for(location: &str, date: NaiveDate, captured_millis: i64) -> HistoryItem {
        let mut prediction = sample_prediction();
        prediction.location = location.to_string();
        prediction.date = date;
        HistoryItem::new(prediction, captured_millis)
    }

    #[test]
    fn id_combines_location_date_and_capture_time() {
        let item = HistoryItem::new(sample_prediction(), 1730000000000);
        assert_eq!(item.id, "Paris, France-2024-10-27-1730000000000");
    }

    #[test]
    fn newest_entry_is_first() {
        let (_dir, store) = store();
        let mut log = HistoryLog::default();

        let d = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();
        log.record(item_for("Paris, France", d, 1), &store);
        log.record(item_for("Lyon, France", d, 2), &store);

        assert_eq!(log.items()[0].prediction.location, "Lyon, France");
        assert_eq!(log.items()[1].prediction.location, "Paris, France");
    }

    #[test]
    fn cap_drops_the_oldest() {
        let (_dir, store) = store();
        let mut log = HistoryLog::default();
        let d = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();

        for i in 0..(MAX_HISTORY_ITEMS as i64 + 1) {
            log.record(item_for("Paris, France", d, i), &store);
        }

        assert_eq!(log.len(), MAX_HISTORY_ITEMS);
        // The first-inserted item (captured_millis 0) is gone.
        assert!(log.items().iter().all(|item| !item.id.ends_with("-0")));
        // The newest survives at the front.
        assert!(log.items()[0].id.ends_with(&format!("-{}", MAX_HISTORY_ITEMS)));
    }

    #[test]
    fn persistence_roundtrips_in_order() {
        let (_dir, store) = store();
        let mut log = HistoryLog::default();
        let d = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();

        for i in 0..3 {
            log.record(item_for("Paris, France", d, i), &store);
        }

        let reloaded = HistoryLog::load(&store);
        assert_eq!(reloaded.items(), log.items());
    }

    #[test]
    fn clear_removes_the_storage_entry() {
        let (_dir, store) = store();
        let mut log = HistoryLog::default();
        let d = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();

        log.record(item_for("Paris, France", d, 1), &store);
        assert!(store.get(keys::HISTORY).is_some());

        log.clear(&store);
        assert!(log.is_empty());
        assert_eq!(store.get(keys::HISTORY), None);
    }

    #[test]
    fn corrupt_history_loads_as_empty() {
        let (_dir, store) = store();
        store.set(keys::HISTORY, "{not json");

        let log = HistoryLog::load(&store);
        assert!(log.is_empty());
    }

    #[test]
    fn for_location_filters_and_sorts_by_date() {
        let (_dir, store) = store();
        let mut log = HistoryLog::default();

        let later = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();
        log.record(item_for("Paris, France", later, 1), &store);
        log.record(item_for("Lyon, France", earlier, 2), &store);
        log.record(item_for("Paris, France", earlier, 3), &store);

        let slice = log.for_location("Paris, France");
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].prediction.date, earlier);
        assert_eq!(slice[1].prediction.date, later);

        assert_eq!(log.locations(), vec!["Paris, France", "Lyon, France"]);
    }
}
