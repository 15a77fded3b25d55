//! In-memory record store.
//!
//! The store is an owned object, built in `main` and handed to handlers by
//! `Arc` — there is no global state, so tests never reset anything. A
//! read/write lock lets concurrent reads proceed while writers get exclusive
//! access. Every operation that checks and then mutates does both under one
//! held write lock, so a racing update or delete can never interleave with
//! the existence check.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::model::{ReportFields, WeatherReport};

/// The keyed collection of weather reports.
///
/// Invariant: every stored record's `id` equals its map key. [`insert`] and
/// [`replace`] are the only writers of record values and both maintain it.
///
/// [`insert`]: ReportStore::insert
/// [`replace`]: ReportStore::replace
pub struct ReportStore {
    reports: RwLock<HashMap<String, WeatherReport>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self { reports: RwLock::new(HashMap::new()) }
    }

    /// Unconditional upsert under the record's own id. Never fails.
    pub fn insert(&self, report: WeatherReport) {
        self.reports.write().insert(report.id.clone(), report);
    }

    /// Clone-out lookup.
    pub fn get(&self, id: &str) -> Option<WeatherReport> {
        self.reports.read().get(id).cloned()
    }

    /// Replaces the record stored under `id` wholesale, forcing the stored
    /// id to `id`. Returns the new record, or `None` when `id` is unknown —
    /// replace never creates. Existence check and overwrite happen under one
    /// write lock.
    pub fn replace(&self, id: &str, fields: ReportFields) -> Option<WeatherReport> {
        let mut reports = self.reports.write();
        if !reports.contains_key(id) {
            return None;
        }
        let report = fields.into_report(id.to_owned());
        reports.insert(id.to_owned(), report.clone());
        Some(report)
    }

    /// Removes the record if present. Idempotent: a second call on the same
    /// id reports `false` rather than failing.
    pub fn remove(&self, id: &str) -> bool {
        self.reports.write().remove(id).is_some()
    }

    /// Whichever record map iteration yields first — no defined order.
    /// Feeds the push stream; `None` when the store is empty.
    pub fn any(&self) -> Option<WeatherReport> {
        self.reports.read().values().next().cloned()
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReportDraft;

    fn report(id: &str, city: &str) -> WeatherReport {
        WeatherReport {
            id: id.to_owned(),
            city: city.to_owned(),
            temperature: 20.5,
            conditions: "Cloudy".to_owned(),
        }
    }

    fn fields(city: &str, temperature: f64, conditions: &str) -> ReportFields {
        ReportDraft {
            city: Some(city.to_owned()),
            temperature: Some(temperature),
            conditions: Some(conditions.to_owned()),
        }
        .validate()
        .expect("fixture draft is valid")
    }

    #[test]
    fn insert_then_get_round_trips() {
        let store = ReportStore::new();
        store.insert(report("a", "Austin"));
        assert_eq!(store.get("a").expect("present").city, "Austin");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn insert_is_an_upsert() {
        let store = ReportStore::new();
        store.insert(report("a", "Austin"));
        store.insert(report("a", "Boston"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").expect("present").city, "Boston");
    }

    #[test]
    fn replace_overwrites_and_forces_the_id() {
        let store = ReportStore::new();
        store.insert(report("a", "Austin"));
        let updated = store
            .replace("a", fields("Austin", 33.0, "Hot"))
            .expect("id exists");
        assert_eq!(updated.id, "a");
        assert_eq!(updated.temperature, 33.0);
        assert_eq!(store.get("a").expect("present"), updated);
    }

    #[test]
    fn replace_never_creates() {
        let store = ReportStore::new();
        assert!(store.replace("ghost", fields("Lima", 18.0, "Rain")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let store = ReportStore::new();
        store.insert(report("a", "Austin"));
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.get("a").is_none());
    }

    #[test]
    fn any_yields_some_record_or_none() {
        let store = ReportStore::new();
        assert!(store.any().is_none());
        store.insert(report("a", "Austin"));
        assert_eq!(store.any().expect("non-empty").id, "a");
    }
}
