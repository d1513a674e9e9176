//! List the study plan

use anyhow::Result;
use indexmap::IndexMap;
use std::fmt::Write;

use crate::progress::CompletionSet;
use crate::registry::Registry;
use crate::StudyTracker;

/// List the plan by type
pub fn run(tracker: &StudyTracker, list_type: &str) -> Result<()> {
    let store = tracker.progress_store();
    let output = render(&tracker.registry, store.completed(), list_type)?;
    print!("{}", output);
    Ok(())
}

/// Build the listing text
pub fn render(registry: &Registry, completed: &CompletionSet, list_type: &str) -> Result<String> {
    let mut out = String::new();

    match list_type {
        "day" | "days" => {
            writeln!(out, "Days ({}):", registry.days().len())?;
            for day in registry.days() {
                writeln!(
                    out,
                    "  Day {} {} - {} [{}/{}] ({})",
                    day.id,
                    day.icon,
                    day.title,
                    completed.completed_in(day),
                    day.topics.len(),
                    day.total_time
                )?;
                for topic in day.topics {
                    writeln!(
                        out,
                        "    [{}] {} {} ({})",
                        if completed.contains(topic.id) { "x" } else { " " },
                        topic.id,
                        topic.title,
                        topic.duration
                    )?;
                }
            }
        }
        "topic" | "topics" => {
            writeln!(out, "Topics ({}):", registry.len())?;
            for t in registry.topics() {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    t.topic.id, t.topic.title, t.topic.file
                )?;
            }
        }
        "tag" | "tags" => {
            let mut tags: IndexMap<&str, usize> = IndexMap::new();
            for t in registry.topics() {
                for tag in t.topic.tags {
                    *tags.entry(*tag).or_insert(0) += 1;
                }
            }
            // Stable sort keeps first-seen order among equal counts
            tags.sort_by(|_, a, _, b| b.cmp(a));

            writeln!(out, "Tags ({}):", tags.len())?;
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: days, topics, tags",
                list_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_days_marks_completed() {
        let registry = Registry::builtin();
        let completed: CompletionSet = ["1-2"].into_iter().collect();
        let out = render(&registry, &completed, "days").unwrap();

        assert!(out.starts_with("Days (5):"));
        assert!(out.contains("[1/3]"));
        assert!(out.contains("[x] 1-2"));
        assert!(out.contains("[ ] 1-1"));
    }

    #[test]
    fn test_list_topics() {
        let registry = Registry::builtin();
        let out = render(&registry, &CompletionSet::new(), "topics").unwrap();
        assert_eq!(out.lines().count(), registry.len() + 1);
        assert!(out.contains("day1/fastapi-service-design.md"));
    }

    #[test]
    fn test_list_tags_by_count() {
        let registry = Registry::builtin();
        let out = render(&registry, &CompletionSet::new(), "tags").unwrap();
        let first = out.lines().nth(1).unwrap();
        assert_eq!(first.trim(), "api (2)");
    }

    #[test]
    fn test_unknown_type() {
        let err = render(&Registry::builtin(), &CompletionSet::new(), "posts").unwrap_err();
        assert!(err.to_string().contains("Unknown type: posts"));
    }
}
