//! Study plan registry - the compile-time list of days and topics
//!
//! Every navigable topic is declared here together with the markdown file
//! it is backed by. Display order is declaration order, and the global
//! "flattened" order (day by day, topic by topic) drives prev/next links.

mod plan;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path};
use thiserror::Error;

lazy_static! {
    static ref TOPIC_ID: Regex = Regex::new(r"^[0-9]+-[0-9]+$").unwrap();
}

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),

    #[error("Duplicate topic id: {0}")]
    DuplicateTopic(String),

    #[error("Invalid topic id: {0} (expected <day>-<n>)")]
    InvalidId(String),

    #[error("Topic {id} has an invalid file path: {path}")]
    InvalidPath { id: String, path: String },

    #[error("Day {0} has no topics")]
    EmptyDay(u32),
}

/// One study unit, backed by one markdown file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    /// Unique identifier, e.g. `1-2`
    pub id: &'static str,
    pub title: &'static str,
    /// Markdown file, relative to the content root
    pub file: &'static str,
    /// Free-text time estimate such as `1-2h`
    pub duration: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
}

/// An ordered group of topics covering one study session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Day {
    pub id: u32,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub total_time: &'static str,
    /// Theme token used by the stylesheet (`blue`, `green`, ...)
    pub color: &'static str,
    pub icon: &'static str,
    pub topics: &'static [Topic],
}

/// A topic resolved together with its parent day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicRef {
    pub day: &'static Day,
    pub topic: &'static Topic,
    /// Position in the flattened order
    pub index: usize,
}

/// Previous and next topics around a given one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub prev: Option<TopicRef>,
    pub next: Option<TopicRef>,
}

/// Read-only handle over a static list of days
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    days: &'static [Day],
}

impl Registry {
    /// Wrap an arbitrary static list of days
    pub const fn new(days: &'static [Day]) -> Self {
        Self { days }
    }

    /// The study plan shipped with the binary
    pub fn builtin() -> Self {
        Self::new(plan::DAYS)
    }

    /// All days in display order
    pub fn days(&self) -> &'static [Day] {
        self.days
    }

    /// Look up a day by its ordinal id
    pub fn day(&self, id: u32) -> Option<&'static Day> {
        self.days.iter().find(|d| d.id == id)
    }

    /// Iterate over every topic in flattened order
    pub fn topics(&self) -> impl Iterator<Item = TopicRef> {
        let days: &'static [Day] = self.days;
        days.iter()
            .flat_map(|day| day.topics.iter().map(move |topic| (day, topic)))
            .enumerate()
            .map(|(index, (day, topic))| TopicRef { day, topic, index })
    }

    /// Every topic identifier in flattened order
    pub fn topic_ids(&self) -> Vec<&'static str> {
        self.topics().map(|t| t.topic.id).collect()
    }

    /// Total number of topics
    pub fn len(&self) -> usize {
        self.days.iter().map(|d| d.topics.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a topic and its parent day
    pub fn find(&self, id: &str) -> Option<TopicRef> {
        self.topics().find(|t| t.topic.id == id)
    }

    /// Like [`Registry::find`], but unknown ids become an error
    pub fn resolve(&self, id: &str) -> Result<TopicRef, RegistryError> {
        self.find(id)
            .ok_or_else(|| RegistryError::UnknownTopic(id.to_string()))
    }

    /// Membership test used for every "is this a valid id" check
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Previous and next topic in flattened order
    ///
    /// Both sides are `None` for an unknown id.
    pub fn neighbors(&self, id: &str) -> Neighbors {
        let Some(current) = self.find(id) else {
            return Neighbors::default();
        };

        let mut neighbors = Neighbors::default();
        for t in self.topics() {
            if t.index + 1 == current.index {
                neighbors.prev = Some(t);
            } else if t.index == current.index + 1 {
                neighbors.next = Some(t);
                break;
            }
        }
        neighbors
    }

    /// Check structural rules the rest of the crate relies on
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();

        for day in self.days {
            if day.topics.is_empty() {
                return Err(RegistryError::EmptyDay(day.id));
            }

            for topic in day.topics {
                if !TOPIC_ID.is_match(topic.id) {
                    return Err(RegistryError::InvalidId(topic.id.to_string()));
                }
                if !seen.insert(topic.id) {
                    return Err(RegistryError::DuplicateTopic(topic.id.to_string()));
                }
                if !is_relative_content_path(topic.file) {
                    return Err(RegistryError::InvalidPath {
                        id: topic.id.to_string(),
                        path: topic.file.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A path that stays inside the content root once joined onto it
pub fn is_relative_content_path(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    static TWO_DAYS: &[Day] = &[
        Day {
            id: 1,
            title: "Backend",
            subtitle: "APIs",
            total_time: "3h",
            color: "blue",
            icon: "B",
            topics: &[
                Topic {
                    id: "1-1",
                    title: "First",
                    file: "day1/first.md",
                    duration: "1h",
                    description: "",
                    tags: &["api"],
                },
                Topic {
                    id: "1-2",
                    title: "Second",
                    file: "day1/second.md",
                    duration: "2h",
                    description: "",
                    tags: &[],
                },
            ],
        },
        Day {
            id: 2,
            title: "Frontend",
            subtitle: "UI",
            total_time: "1h",
            color: "green",
            icon: "F",
            topics: &[Topic {
                id: "2-1",
                title: "Third",
                file: "day2/third.md",
                duration: "1h",
                description: "",
                tags: &[],
            }],
        },
    ];

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = Registry::builtin();
        assert!(!registry.is_empty());
        registry.validate().unwrap();
    }

    #[test]
    fn test_find_returns_parent_day_from_registry() {
        for registry in [Registry::builtin(), Registry::new(TWO_DAYS)] {
            for id in registry.topic_ids() {
                let found = registry.find(id).unwrap();
                assert_eq!(found.topic.id, id);
                assert!(registry.days().iter().any(|d| d == found.day));
                assert!(found.day.topics.iter().any(|t| t.id == id));
            }
        }
    }

    #[test]
    fn test_topic_ids_flattened_order() {
        let registry = Registry::new(TWO_DAYS);
        assert_eq!(registry.topic_ids(), vec!["1-1", "1-2", "2-1"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_unknown_id() {
        let registry = Registry::new(TWO_DAYS);
        assert!(registry.find("9-9").is_none());
        assert!(!registry.contains("9-9"));
        assert_eq!(
            registry.resolve("9-9"),
            Err(RegistryError::UnknownTopic("9-9".to_string()))
        );
        assert_eq!(registry.neighbors("9-9"), Neighbors::default());
    }

    #[test]
    fn test_neighbors_cross_day_boundary() {
        let registry = Registry::new(TWO_DAYS);
        let n = registry.neighbors("1-2");
        assert_eq!(n.prev.unwrap().topic.id, "1-1");
        assert_eq!(n.next.unwrap().topic.id, "2-1");
        assert_eq!(n.next.unwrap().day.id, 2);
    }

    #[test]
    fn test_neighbors_boundaries_and_inverse() {
        let registry = Registry::builtin();
        let ids = registry.topic_ids();

        assert!(registry.neighbors(ids[0]).prev.is_none());
        assert!(registry.neighbors(ids[ids.len() - 1]).next.is_none());

        for id in &ids[1..ids.len() - 1] {
            let prev = registry.neighbors(id).prev.unwrap();
            let back = registry.neighbors(prev.topic.id).next.unwrap();
            assert_eq!(back.topic.id, *id);
        }
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        static DUP: &[Day] = &[Day {
            id: 1,
            title: "",
            subtitle: "",
            total_time: "",
            color: "",
            icon: "",
            topics: &[
                Topic {
                    id: "1-1",
                    title: "a",
                    file: "a.md",
                    duration: "",
                    description: "",
                    tags: &[],
                },
                Topic {
                    id: "1-1",
                    title: "b",
                    file: "b.md",
                    duration: "",
                    description: "",
                    tags: &[],
                },
            ],
        }];
        assert_eq!(
            Registry::new(DUP).validate(),
            Err(RegistryError::DuplicateTopic("1-1".to_string()))
        );
    }

    #[test]
    fn test_content_path_rules() {
        assert!(is_relative_content_path("day1/a.md"));
        assert!(is_relative_content_path("./a.md"));
        assert!(!is_relative_content_path("../secret.md"));
        assert!(!is_relative_content_path("/etc/passwd"));
        assert!(!is_relative_content_path(""));
    }
}
