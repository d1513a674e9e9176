//! Generator module - writes the whole study site as static HTML
//!
//! Every topic id is known from the registry, so each detail page is
//! generated up front. Completion state is not known at build time: the
//! overview is written unhydrated and the bundled script fills it in from
//! browser storage.

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::{ContentLoader, MarkdownRenderer};
use crate::progress::CompletionSet;
use crate::views::{
    build_overview, load_topic_page, ExpandedDays, Links, PageRenderer, SiteMeta, PROGRESS_JS,
    STYLE_CSS,
};
use crate::StudyTracker;

/// What a generation pass produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub pages: usize,
    /// Topics rendered with the not-found placeholder
    pub missing: Vec<&'static str>,
}

/// Static site generator
pub struct Generator {
    tracker: StudyTracker,
    pages: PageRenderer,
    renderer: MarkdownRenderer,
    loader: ContentLoader,
    links: Links,
}

impl Generator {
    /// Create a new generator
    pub fn new(tracker: &StudyTracker) -> Result<Self> {
        Ok(Self {
            tracker: tracker.clone(),
            pages: PageRenderer::new()?,
            renderer: tracker.renderer(),
            loader: tracker.loader(),
            links: Links::new(&tracker.config.url_root()),
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<GenerateStats> {
        let public_dir = &self.tracker.public_dir;
        let registry = &self.tracker.registry;
        fs::create_dir_all(public_dir)?;

        let site = SiteMeta::new(
            &self.tracker.config.title,
            &self.tracker.config.subtitle,
            &self.links,
        );
        let mut stats = GenerateStats::default();

        write_file(&public_dir.join("assets/style.css"), STYLE_CSS)?;
        write_file(&public_dir.join("assets/progress.js"), PROGRESS_JS)?;

        let overview = build_overview(
            registry,
            &CompletionSet::new(),
            &ExpandedDays::all(registry),
            false,
            &self.links,
        );
        write_file(
            &public_dir.join("index.html"),
            &self.pages.overview(&site, &overview)?,
        )?;
        stats.pages += 1;

        stats.missing = self
            .loader
            .missing_files(registry)
            .into_iter()
            .map(|t| t.id)
            .collect();
        for id in &stats.missing {
            tracing::warn!("Topic {} has no content file, rendering placeholder", id);
        }

        for id in registry.topic_ids() {
            let page =
                load_topic_page(registry, &self.loader, &self.renderer, id, None, &self.links)?;
            let html = self.pages.topic(&site, &page)?;
            write_file(
                &public_dir.join("topics").join(id).join("index.html"),
                &html,
            )?;
            stats.pages += 1;
        }

        write_file(
            &public_dir.join("404.html"),
            &self.pages.not_found(&site, "this page")?,
        )?;
        stats.pages += 1;

        Ok(stats)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::debug!("Generated: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudyConfig;
    use tempfile::TempDir;

    #[test]
    fn test_generate_writes_every_topic() {
        let dir = TempDir::new().unwrap();
        let mut config = StudyConfig::default();
        config.root = "prep".to_string();
        let tracker = StudyTracker::with_config(dir.path(), config);

        let first = tracker.registry.topics().next().unwrap().topic;
        let path = tracker.content_root.join(first.file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "# Hello\n").unwrap();

        let stats = Generator::new(&tracker).unwrap().generate().unwrap();
        assert_eq!(stats.pages, tracker.registry.len() + 2);
        assert_eq!(stats.missing.len(), tracker.registry.len() - 1);
        assert!(!stats.missing.contains(&first.id));

        let public = &tracker.public_dir;
        assert!(public.join("assets/style.css").is_file());
        assert!(public.join("404.html").is_file());

        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("skeleton"));
        assert!(index.contains(r#"href="/prep/topics/1-1/""#));

        for id in tracker.registry.topic_ids() {
            let page = public.join("topics").join(id).join("index.html");
            assert!(page.is_file(), "missing page for {}", id);
        }

        let first_page =
            fs::read_to_string(public.join("topics").join(first.id).join("index.html")).unwrap();
        assert!(first_page.contains(r#"<h1 id="hello""#));

        let last_id = *tracker.registry.topic_ids().last().unwrap();
        let last_page =
            fs::read_to_string(public.join("topics").join(last_id).join("index.html")).unwrap();
        assert!(last_page.contains("Content Not Found"));
    }
}
