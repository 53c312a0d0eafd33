// Position store: the latest valid report per station
//
// Owned by the maintenance task only; the GPS task never sees it, so there is
// no lock here. Anything else that needs the store must go through its owner.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Latest valid position report of one station.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionEntry {
    /// Station identifier (callsign), the store key
    pub source: String,
    /// Report time, normalized to UTC
    pub timestamp: DateTime<Utc>,
    /// Report time exactly as logged; informational, echoed into the POI file
    pub isotime: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Trimmed free text, possibly empty
    pub comment: String,
}

/// Map from station identifier to its most recently ingested entry.
#[derive(Debug, Default)]
pub struct PositionStore {
    entries: HashMap<String, PositionEntry>,
}

impl PositionStore {
    pub fn new() -> Self {
        PositionStore { entries: HashMap::new() }
    }

    /// Insert or replace the entry for `entry.source`.
    ///
    /// Last write wins: an older report still replaces a newer one. Returns the
    /// replaced entry, if any.
    pub fn upsert(&mut self, entry: PositionEntry) -> Option<PositionEntry> {
        self.entries.insert(entry.source.clone(), entry)
    }

    pub fn get(&self, source: &str) -> Option<&PositionEntry> {
        self.entries.get(source)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &PositionEntry> {
        self.entries.values()
    }

    /// Entries ordered most recent first; equal timestamps ordered by source.
    pub fn by_recency(&self) -> Vec<&PositionEntry> {
        let mut sorted: Vec<&PositionEntry> = self.entries.values().collect();
        sorted.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.source.cmp(&b.source))
        });
        sorted
    }

    /// Keep only entries for which `keep` returns true. Returns how many were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&PositionEntry) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|_, entry| keep(entry));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(source: &str, minutes: i64, lat: f64) -> PositionEntry {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        PositionEntry {
            source: source.to_string(),
            timestamp,
            isotime: timestamp.to_rfc3339(),
            latitude: lat,
            longitude: -112.0,
            comment: String::new(),
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = PositionStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_upsert_replaces() {
        let mut store = PositionStore::new();
        assert!(store.upsert(entry("N0CALL", 0, 33.0)).is_none());
        let old = store.upsert(entry("N0CALL", 1, 34.0)).unwrap();
        assert_eq!(old.latitude, 33.0);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("N0CALL").unwrap().latitude, 34.0);
    }

    #[test]
    fn test_upsert_last_write_wins_even_if_older() {
        let mut store = PositionStore::new();
        store.upsert(entry("N0CALL", 10, 33.0));
        store.upsert(entry("N0CALL", -10, 34.0));
        let kept = store.get("N0CALL").unwrap();
        assert_eq!(kept.latitude, 34.0);
        assert_eq!(kept.timestamp, entry("N0CALL", -10, 0.0).timestamp);
    }

    #[test]
    fn test_by_recency_order() {
        let mut store = PositionStore::new();
        store.upsert(entry("OLD", -30, 33.0));
        store.upsert(entry("NEW", 0, 33.0));
        store.upsert(entry("B-TIE", -10, 33.0));
        store.upsert(entry("A-TIE", -10, 33.0));

        let order: Vec<&str> = store.by_recency().iter().map(|e| e.source.as_str()).collect();
        assert_eq!(order, vec!["NEW", "A-TIE", "B-TIE", "OLD"]);
    }

    #[test]
    fn test_retain_counts_removed() {
        let mut store = PositionStore::new();
        store.upsert(entry("A", 0, 33.0));
        store.upsert(entry("B", 0, 35.0));
        store.upsert(entry("C", 0, 36.0));
        let removed = store.retain(|e| e.latitude < 34.0);
        assert_eq!(removed, 2);
        assert!(store.contains("A"));
        assert!(!store.contains("B"));
    }
}
