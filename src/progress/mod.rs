//! Completion tracking
//!
//! The [`CompletionSet`] holds the ids of topics marked done. It is read once
//! through a [`ProgressBackend`] and written back wholesale after every
//! toggle; there is no delta format and no merging, the last write wins.

mod backend;

pub use backend::{JsonFileBackend, MemoryBackend, ProgressBackend, PROGRESS_FILE};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::registry::{Day, Registry};

/// Browser storage key used by the static site
pub const STORAGE_KEY: &str = "study-tracker-progress";

/// Progress persistence errors
#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid progress data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Set of completed topic ids
///
/// Serialized as a JSON array of strings. Ordering is sorted, so the stored
/// value does not depend on the order topics were toggled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSet(BTreeSet<String>);

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`, returning `true` when it is now complete
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of this day's topics that are complete
    pub fn completed_in(&self, day: &Day) -> usize {
        day.topics.iter().filter(|t| self.contains(t.id)).count()
    }

    /// Stored ids the registry no longer knows about
    pub fn stale_ids(&self, registry: &Registry) -> Vec<&str> {
        self.iter().filter(|id| !registry.contains(id)).collect()
    }

    pub fn to_json(&self) -> Result<String, ProgressError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProgressError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<S: Into<String>> FromIterator<S> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Completed / total counts for a day or the whole plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayProgress {
    pub completed: usize,
    pub total: usize,
}

impl DayProgress {
    /// Completed fraction in `0.0..=1.0`; an empty group counts as zero
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Rounded percentage for progress bars
    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Owns the completion set and keeps the backend in sync with it
pub struct ProgressStore<B: ProgressBackend> {
    backend: B,
    completed: CompletionSet,
}

impl<B: ProgressBackend> ProgressStore<B> {
    /// Restore saved progress
    ///
    /// Missing or unreadable data starts from an empty set.
    pub fn open(backend: B) -> Self {
        let completed = match backend.load() {
            Ok(Some(set)) => set,
            Ok(None) => CompletionSet::new(),
            Err(e) => {
                tracing::warn!("Discarding saved progress: {}", e);
                CompletionSet::new()
            }
        };
        tracing::debug!("Loaded {} completed topics", completed.len());

        Self { backend, completed }
    }

    pub fn completed(&self) -> &CompletionSet {
        &self.completed
    }

    pub fn is_complete(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Flip a topic and persist the whole set
    pub fn toggle(&mut self, id: &str) -> Result<bool, ProgressError> {
        let now_complete = self.completed.toggle(id);
        self.backend.save(&self.completed)?;
        tracing::debug!("Topic {} complete={}", id, now_complete);
        Ok(now_complete)
    }

    /// Clear all progress and persist the empty set
    pub fn reset(&mut self) -> Result<(), ProgressError> {
        self.completed.clear();
        self.backend.save(&self.completed)
    }

    pub fn day_progress(&self, day: &Day) -> DayProgress {
        DayProgress {
            completed: self.completed.completed_in(day),
            total: day.topics.len(),
        }
    }

    /// Progress across every day of the registry
    pub fn overall(&self, registry: &Registry) -> DayProgress {
        registry
            .days()
            .iter()
            .map(|day| self.day_progress(day))
            .fold(
                DayProgress {
                    completed: 0,
                    total: 0,
                },
                |acc, p| DayProgress {
                    completed: acc.completed + p.completed,
                    total: acc.total + p.total,
                },
            )
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Topic;

    static DAY_ONE: &[Day] = &[Day {
        id: 1,
        title: "Day 1",
        subtitle: "",
        total_time: "2h",
        color: "blue",
        icon: "1",
        topics: &[
            Topic {
                id: "1-1",
                title: "One",
                file: "day1/one.md",
                duration: "1h",
                description: "",
                tags: &[],
            },
            Topic {
                id: "1-2",
                title: "Two",
                file: "day1/two.md",
                duration: "1h",
                description: "",
                tags: &[],
            },
        ],
    }];

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut set: CompletionSet = ["1-2"].into_iter().collect();
        for id in ["1-1", "1-2"] {
            let before = set.contains(id);
            set.toggle(id);
            set.toggle(id);
            assert_eq!(set.contains(id), before);
        }
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serialization_is_order_independent() {
        let a: CompletionSet = ["3-1", "1-1", "2-2"].into_iter().collect();
        let b: CompletionSet = ["2-2", "3-1", "1-1"].into_iter().collect();

        let json = a.to_json().unwrap();
        assert_eq!(json, b.to_json().unwrap());
        assert_eq!(json, r#"["1-1","2-2","3-1"]"#);

        let restored = CompletionSet::from_json(&json).unwrap();
        assert_eq!(restored, a);
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(CompletionSet::from_json("{not json").is_err());
        assert!(CompletionSet::from_json(r#"{"1-1":true}"#).is_err());
    }

    #[test]
    fn test_mark_complete_then_reload() {
        let registry = Registry::new(DAY_ONE);
        let mut store = ProgressStore::open(MemoryBackend::new());
        assert!(store.toggle("1-1").unwrap());

        // A fresh store over the same storage sees the saved set
        let store = ProgressStore::open(store.into_backend());
        let expected: CompletionSet = ["1-1"].into_iter().collect();
        assert_eq!(store.completed(), &expected);

        let day = registry.day(1).unwrap();
        let progress = store.day_progress(day);
        assert_eq!(progress, DayProgress { completed: 1, total: 2 });
        assert_eq!(progress.ratio(), 0.5);
        assert_eq!(progress.percent(), 50);
    }

    #[test]
    fn test_corrupt_storage_falls_back_to_empty() {
        let backend = MemoryBackend::with_raw("[1, 2, oops");
        let store = ProgressStore::open(backend);
        assert!(store.completed().is_empty());
    }

    #[test]
    fn test_toggle_overwrites_stored_value() {
        let mut store = ProgressStore::open(MemoryBackend::new());
        store.toggle("1-2").unwrap();
        store.toggle("1-1").unwrap();
        assert_eq!(store.backend().raw(), Some(r#"["1-1","1-2"]"#));

        store.toggle("1-2").unwrap();
        assert_eq!(store.backend().raw(), Some(r#"["1-1"]"#));
    }

    #[test]
    fn test_reset_and_overall() {
        let registry = Registry::new(DAY_ONE);
        let mut store = ProgressStore::open(MemoryBackend::new());
        store.toggle("1-1").unwrap();
        store.toggle("1-2").unwrap();
        assert!(store.overall(&registry).is_complete());

        store.reset().unwrap();
        assert_eq!(store.overall(&registry).completed, 0);
        assert_eq!(store.backend().raw(), Some("[]"));
    }

    #[test]
    fn test_stale_ids() {
        let registry = Registry::new(DAY_ONE);
        let set: CompletionSet = ["1-1", "7-7"].into_iter().collect();
        assert_eq!(set.stale_ids(&registry), vec!["7-7"]);
    }

    #[test]
    fn test_empty_day_ratio() {
        let p = DayProgress {
            completed: 0,
            total: 0,
        };
        assert_eq!(p.ratio(), 0.0);
        assert!(!p.is_complete());
    }
}
