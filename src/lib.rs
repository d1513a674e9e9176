//! study-tracker: browse a markdown study plan and track completed topics
//!
//! A compile-time registry lists study days and their topics. Each topic is
//! backed by a markdown file under the content root. The crate renders the
//! plan as a checklist (dev server or static site) and keeps the set of
//! completed topics in a small JSON store.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod progress;
pub mod registry;
pub mod server;
pub mod views;

use anyhow::Result;
use std::path::Path;

use content::{ContentLoader, MarkdownRenderer};
use progress::{JsonFileBackend, ProgressStore};
use registry::Registry;

/// The main application
#[derive(Clone)]
pub struct StudyTracker {
    /// Configuration
    pub config: config::StudyConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory topic paths are relative to
    pub content_root: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
    /// Completion store file
    pub progress_path: std::path::PathBuf,
    /// Study plan
    pub registry: Registry,
}

impl StudyTracker {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(config::CONFIG_FILE);

        let config = if config_path.exists() {
            config::StudyConfig::load(&config_path)?
        } else {
            config::StudyConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance from an already-loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::StudyConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_root = config.content_root(&base_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let progress_path = base_dir.join(&config.progress_file);

        tracing::debug!("Content root: {:?}", content_root);

        Self {
            config,
            base_dir,
            content_root,
            public_dir,
            progress_path,
            registry: Registry::builtin(),
        }
    }

    /// Swap the study plan
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Loader rooted at the configured content root
    pub fn loader(&self) -> ContentLoader {
        ContentLoader::new(&self.content_root)
    }

    /// Markdown renderer using the configured highlight settings
    pub fn renderer(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        )
    }

    /// Open the file-backed completion store
    pub fn progress_store(&self) -> ProgressStore<JsonFileBackend> {
        ProgressStore::open(JsonFileBackend::new(&self.progress_path))
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
