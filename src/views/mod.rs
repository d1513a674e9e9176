//! Page view models
//!
//! Pure functions from registry + completion state to serializable page
//! data. The dev server and the static generator both feed these into the
//! same templates; neither view keeps state of its own.

mod templates;

pub use templates::{PageRenderer, SiteMeta, PROGRESS_JS, STYLE_CSS};

use serde::Serialize;
use std::collections::BTreeSet;

use crate::content::{ContentLoader, HeadingEntry, MarkdownRenderer};
use crate::progress::{CompletionSet, DayProgress};
use crate::registry::{Day, Registry, RegistryError, Topic, TopicRef};

/// URL builder for a site mounted under `root`
#[derive(Debug, Clone, Serialize)]
pub struct Links {
    root: String,
}

impl Links {
    /// `root` must start and end with `/`
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn topic(&self, id: &str) -> String {
        format!("{}topics/{}/", self.root, id)
    }

    pub fn toggle(&self, id: &str) -> String {
        format!("{}topics/{}/toggle", self.root, id)
    }

    pub fn asset(&self, name: &str) -> String {
        format!("{}assets/{}", self.root, name)
    }

    /// Overview URL with exactly the given days expanded
    ///
    /// The bare root means "everything open", so an empty set still
    /// carries an empty `open` parameter.
    pub fn overview(&self, expanded: &ExpandedDays) -> String {
        format!("{}?open={}", self.root, expanded.to_query())
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Day ids whose topic lists are shown on the overview
///
/// Owned by whoever renders the overview (the request, in the server) and
/// passed in; toggling produces a new value rather than mutating the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedDays(BTreeSet<u32>);

impl ExpandedDays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every day expanded
    pub fn all(registry: &Registry) -> Self {
        Self(registry.days().iter().map(|d| d.id).collect())
    }

    /// Parse the `open` query value (`1,3`); unparsable parts are ignored
    pub fn from_query(value: &str) -> Self {
        Self(
            value
                .split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect(),
        )
    }

    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn contains(&self, day: u32) -> bool {
        self.0.contains(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The set with `day` flipped
    pub fn toggled(&self, day: u32) -> Self {
        let mut next = self.0.clone();
        if !next.remove(&day) {
            next.insert(day);
        }
        Self(next)
    }
}

/// One topic row
#[derive(Debug, Clone, Serialize)]
pub struct TopicView {
    pub id: &'static str,
    pub title: &'static str,
    pub duration: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub completed: bool,
    pub href: String,
    pub toggle_action: String,
}

impl TopicView {
    fn new(topic: &'static Topic, completed: bool, links: &Links) -> Self {
        Self {
            id: topic.id,
            title: topic.title,
            duration: topic.duration,
            description: topic.description,
            tags: topic.tags,
            completed,
            href: links.topic(topic.id),
            toggle_action: links.toggle(topic.id),
        }
    }
}

/// One collapsible day section
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub id: u32,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub total_time: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    pub expanded: bool,
    /// Overview URL with this day's expanded state flipped
    pub toggle_href: String,
    pub topics: Vec<TopicView>,
}

/// Data for the overview page
#[derive(Debug, Clone, Serialize)]
pub struct OverviewPage {
    /// `false` when completion state is only known to the browser
    pub hydrated: bool,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    /// Where toggle forms return to
    pub return_to: String,
    pub days: Vec<DayView>,
}

/// Build the overview from the registry and caller-owned state
pub fn build_overview(
    registry: &Registry,
    completion: &CompletionSet,
    expanded: &ExpandedDays,
    hydrated: bool,
    links: &Links,
) -> OverviewPage {
    let days: Vec<DayView> = registry
        .days()
        .iter()
        .map(|day| day_view(day, completion, expanded, links))
        .collect();

    let overall = DayProgress {
        completed: days.iter().map(|d| d.completed).sum(),
        total: days.iter().map(|d| d.total).sum(),
    };

    OverviewPage {
        hydrated,
        completed: overall.completed,
        total: overall.total,
        percent: overall.percent(),
        return_to: links.overview(expanded),
        days,
    }
}

fn day_view(
    day: &'static Day,
    completion: &CompletionSet,
    expanded: &ExpandedDays,
    links: &Links,
) -> DayView {
    let progress = DayProgress {
        completed: completion.completed_in(day),
        total: day.topics.len(),
    };

    DayView {
        id: day.id,
        title: day.title,
        subtitle: day.subtitle,
        total_time: day.total_time,
        color: day.color,
        icon: day.icon,
        completed: progress.completed,
        total: progress.total,
        percent: progress.percent(),
        expanded: expanded.contains(day.id),
        toggle_href: links.overview(&expanded.toggled(day.id)),
        topics: day
            .topics
            .iter()
            .map(|t| TopicView::new(t, completion.contains(t.id), links))
            .collect(),
    }
}

/// Prev/next link on a topic page
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub id: &'static str,
    pub title: &'static str,
    pub href: String,
}

impl NavLink {
    fn new(t: TopicRef, links: &Links) -> Self {
        Self {
            id: t.topic.id,
            title: t.topic.title,
            href: links.topic(t.topic.id),
        }
    }
}

/// Parent day summary shown above a topic
#[derive(Debug, Clone, Serialize)]
pub struct DayBadge {
    pub id: u32,
    pub title: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
}

/// Data for a topic detail page
#[derive(Debug, Clone, Serialize)]
pub struct TopicPage {
    pub topic: TopicView,
    pub day: DayBadge,
    /// Position in the flattened order, 1-based
    pub position: usize,
    pub count: usize,
    pub html: String,
    pub toc: Vec<HeadingEntry>,
    pub prev: Option<NavLink>,
    pub next: Option<NavLink>,
    /// `false` in the static build, where only the browser knows
    pub hydrated: bool,
}

/// Build a topic page for an already-resolved topic
pub fn build_topic_page(
    registry: &Registry,
    found: TopicRef,
    markdown: &str,
    renderer: &MarkdownRenderer,
    completed: Option<bool>,
    links: &Links,
) -> TopicPage {
    let rendered = renderer.render(markdown);
    let neighbors = registry.neighbors(found.topic.id);

    TopicPage {
        topic: TopicView::new(found.topic, completed.unwrap_or(false), links),
        day: DayBadge {
            id: found.day.id,
            title: found.day.title,
            color: found.day.color,
            icon: found.day.icon,
        },
        position: found.index + 1,
        count: registry.len(),
        html: rendered.html,
        toc: rendered.headings,
        prev: neighbors.prev.map(|t| NavLink::new(t, links)),
        next: neighbors.next.map(|t| NavLink::new(t, links)),
        hydrated: completed.is_some(),
    }
}

/// Resolve, load and render a topic page
///
/// Unknown ids are the only failure; unreadable files render the
/// loader's placeholder.
pub fn load_topic_page(
    registry: &Registry,
    loader: &ContentLoader,
    renderer: &MarkdownRenderer,
    id: &str,
    completed: Option<bool>,
    links: &Links,
) -> Result<TopicPage, RegistryError> {
    let found = registry.resolve(id)?;
    let markdown = loader.load_topic(found.topic);
    Ok(build_topic_page(
        registry, found, &markdown, renderer, completed, links,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    static PLAN: &[Day] = &[
        Day {
            id: 1,
            title: "Day 1",
            subtitle: "Backend",
            total_time: "2h",
            color: "blue",
            icon: "1",
            topics: &[
                Topic {
                    id: "1-1",
                    title: "One",
                    file: "day1/one.md",
                    duration: "1h",
                    description: "first",
                    tags: &["api"],
                },
                Topic {
                    id: "1-2",
                    title: "Two",
                    file: "missing/file.md",
                    duration: "1h",
                    description: "second",
                    tags: &[],
                },
            ],
        },
        Day {
            id: 2,
            title: "Day 2",
            subtitle: "Frontend",
            total_time: "1h",
            color: "green",
            icon: "2",
            topics: &[Topic {
                id: "2-1",
                title: "Three",
                file: "day2/three.md",
                duration: "1h",
                description: "",
                tags: &[],
            }],
        },
    ];

    fn renderer() -> MarkdownRenderer {
        MarkdownRenderer::with_options("base16-ocean.dark", false)
    }

    #[test]
    fn test_expanded_days_query() {
        let expanded = ExpandedDays::from_query("3, 1,x,,1");
        assert_eq!(expanded.to_query(), "1,3");
        assert!(expanded.contains(3));
        assert_eq!(expanded.toggled(3).to_query(), "1");
        assert_eq!(expanded.toggled(2).to_query(), "1,2,3");
        assert!(ExpandedDays::from_query("").is_empty());
    }

    #[test]
    fn test_overview_counts_and_links() {
        let registry = Registry::new(PLAN);
        let completion: CompletionSet = ["1-1"].into_iter().collect();
        let expanded = ExpandedDays::from_query("1");
        let links = Links::default();

        let page = build_overview(&registry, &completion, &expanded, true, &links);
        assert_eq!((page.completed, page.total, page.percent), (1, 3, 33));
        assert_eq!(page.return_to, "/?open=1");

        let day1 = &page.days[0];
        assert_eq!((day1.completed, day1.total, day1.percent), (1, 2, 50));
        assert!(day1.expanded);
        assert_eq!(day1.toggle_href, "/?open=");
        assert!(day1.topics[0].completed);
        assert!(!day1.topics[1].completed);
        assert_eq!(day1.topics[0].href, "/topics/1-1/");
        assert_eq!(day1.topics[0].toggle_action, "/topics/1-1/toggle");

        let day2 = &page.days[1];
        assert!(!day2.expanded);
        assert_eq!(day2.toggle_href, "/?open=1,2");
    }

    #[test]
    fn test_links_under_prefix() {
        let links = Links::new("/prep/");
        assert_eq!(links.topic("2-1"), "/prep/topics/2-1/");
        assert_eq!(links.asset("style.css"), "/prep/assets/style.css");
        assert_eq!(
            links.overview(&ExpandedDays::from_query("2")),
            "/prep/?open=2"
        );
    }

    #[test]
    fn test_topic_page_navigation() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("day1")).unwrap();
        fs::write(dir.path().join("day1/one.md"), "# One\n\n## Details\n").unwrap();

        let registry = Registry::new(PLAN);
        let loader = ContentLoader::new(dir.path());
        let links = Links::default();

        let page =
            load_topic_page(&registry, &loader, &renderer(), "1-1", Some(true), &links).unwrap();
        assert!(page.prev.is_none());
        assert_eq!(page.next.as_ref().unwrap().id, "1-2");
        assert_eq!(page.position, 1);
        assert_eq!(page.count, 3);
        assert_eq!(page.toc.len(), 2);
        assert!(page.topic.completed);
        assert!(page.hydrated);

        let last = load_topic_page(&registry, &loader, &renderer(), "2-1", None, &links).unwrap();
        assert!(last.next.is_none());
        assert_eq!(last.prev.as_ref().unwrap().href, "/topics/1-2/");
        assert!(!last.hydrated);
    }

    #[test]
    fn test_topic_page_missing_file_renders_placeholder() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new(PLAN);
        let loader = ContentLoader::new(dir.path());

        let page = load_topic_page(
            &registry,
            &loader,
            &renderer(),
            "1-2",
            None,
            &Links::default(),
        )
        .unwrap();
        assert!(page.html.contains("Content Not Found"));
        assert!(page.html.contains("missing/file.md"));
    }

    #[test]
    fn test_unknown_topic_is_not_found() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::new(PLAN);
        let loader = ContentLoader::new(dir.path());

        let result = load_topic_page(
            &registry,
            &loader,
            &renderer(),
            "9-9",
            None,
            &Links::default(),
        );
        assert!(matches!(result, Err(RegistryError::UnknownTopic(id)) if id == "9-9"));
    }
}
