//! Content loader - reads topic markdown from the content root
//!
//! Reads never fail from the caller's point of view: a file that cannot be
//! read degrades to a placeholder document naming the requested path, and
//! the underlying error goes to the log.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::registry::{is_relative_content_path, Registry, Topic};

/// Markdown shown in place of a file that could not be read
pub fn not_found_placeholder(path: &str) -> String {
    format!(
        "# Content Not Found\n\nThe file `{}` could not be found.\n",
        path
    )
}

/// Loads topic markdown from a content root
#[derive(Debug, Clone)]
pub struct ContentLoader {
    root: PathBuf,
}

impl ContentLoader {
    /// Create a loader for the given content root
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The content root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a markdown file relative to the content root
    pub fn load(&self, rel_path: &str) -> String {
        match self.checked_path(rel_path) {
            Ok(path) => match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => self.fallback(rel_path, &e),
            },
            Err(e) => self.fallback(rel_path, &e),
        }
    }

    /// Async variant of [`ContentLoader::load`] for request handlers
    pub async fn load_async(&self, rel_path: &str) -> String {
        match self.checked_path(rel_path) {
            Ok(path) => match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => self.fallback(rel_path, &e),
            },
            Err(e) => self.fallback(rel_path, &e),
        }
    }

    /// Read the markdown backing a topic
    pub fn load_topic(&self, topic: &Topic) -> String {
        self.load(topic.file)
    }

    /// Topics whose file does not exist under the content root
    pub fn missing_files(&self, registry: &Registry) -> Vec<&'static Topic> {
        registry
            .topics()
            .map(|t| t.topic)
            .filter(|topic| !self.root.join(topic.file).is_file())
            .collect()
    }

    /// Markdown files under the content root that no topic points at
    pub fn unregistered_files(&self, registry: &Registry) -> Vec<PathBuf> {
        if !self.root.exists() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && is_markdown_file(e.path()))
            .filter_map(|e| {
                let relative = e.path().strip_prefix(&self.root).ok()?.to_path_buf();
                let registered = registry
                    .topics()
                    .any(|t| Path::new(t.topic.file) == relative.as_path());
                (!registered).then_some(relative)
            })
            .collect();

        files.sort();
        files
    }

    fn checked_path(&self, rel_path: &str) -> io::Result<PathBuf> {
        if is_relative_content_path(rel_path) {
            Ok(self.root.join(rel_path))
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path escapes the content root",
            ))
        }
    }

    fn fallback(&self, rel_path: &str, err: &io::Error) -> String {
        tracing::warn!(
            "Failed to read content {:?} under {:?}: {}",
            rel_path,
            self.root,
            err
        );
        not_found_placeholder(rel_path)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_load_existing_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "day1/intro.md", "# Intro\n\nHello.");

        let loader = ContentLoader::new(dir.path());
        assert_eq!(loader.load("day1/intro.md"), "# Intro\n\nHello.");
    }

    #[test]
    fn test_missing_file_returns_placeholder() {
        let dir = TempDir::new().unwrap();
        let loader = ContentLoader::new(dir.path());

        let text = loader.load("missing/file.md");
        assert!(text.contains("Content Not Found"));
        assert!(text.contains("missing/file.md"));
    }

    #[test]
    fn test_escaping_path_returns_placeholder() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "inside.md", "secret");
        let loader = ContentLoader::new(dir.path().join("content"));

        let text = loader.load("../inside.md");
        assert!(!text.contains("secret"));
        assert!(text.contains("../inside.md"));
    }

    #[test]
    fn test_every_builtin_topic_loads_text_or_placeholder() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::builtin();
        let first = registry.topics().next().unwrap().topic;
        write(dir.path(), first.file, "# Present");

        let loader = ContentLoader::new(dir.path());
        for t in registry.topics() {
            let text = loader.load_topic(t.topic);
            assert!(!text.is_empty());
            if t.topic.id != first.id {
                assert_eq!(text, not_found_placeholder(t.topic.file));
            }
        }
    }

    #[tokio::test]
    async fn test_load_async_matches_sync() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.md", "alpha");
        let loader = ContentLoader::new(dir.path());

        assert_eq!(loader.load_async("a.md").await, "alpha");
        assert_eq!(
            loader.load_async("nope.md").await,
            not_found_placeholder("nope.md")
        );
    }

    #[test]
    fn test_missing_and_unregistered_files() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::builtin();
        for t in registry.topics() {
            write(dir.path(), t.topic.file, "x");
        }
        let removed = registry.topics().last().unwrap().topic;
        fs::remove_file(dir.path().join(removed.file)).unwrap();
        write(dir.path(), "day3/infrastructure-components-v2.md", "dup");
        write(dir.path(), "notes.txt", "not markdown");

        let loader = ContentLoader::new(dir.path());
        let missing = loader.missing_files(&registry);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, removed.id);

        let extra = loader.unregistered_files(&registry);
        assert_eq!(
            extra,
            vec![PathBuf::from("day3/infrastructure-components-v2.md")]
        );
    }
}
