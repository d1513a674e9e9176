//! Study site configuration (study.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name, looked up in the base directory
pub const CONFIG_FILE: &str = "study.yml";

/// Deployment mode, which decides where content is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    // Site
    pub title: String,
    pub subtitle: String,

    // Content
    pub mode: Mode,
    /// Content root in development, relative to the base directory
    pub content_dir: String,
    /// Content root in production, absolute
    pub packaged_content_dir: String,

    // Output
    pub public_dir: String,
    /// URL prefix of the generated site
    pub root: String,

    // Progress
    pub progress_file: String,

    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            title: "Interview Prep".to_string(),
            subtitle: "Study plan and checklist".to_string(),

            mode: Mode::Development,
            content_dir: "content".to_string(),
            packaged_content_dir: "/app/content".to_string(),

            public_dir: "public".to_string(),
            root: "/".to_string(),

            progress_file: crate::progress::PROGRESS_FILE.to_string(),

            highlight: HighlightConfig::default(),
        }
    }
}

impl StudyConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: StudyConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize for `init`
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Resolve the content root for the configured mode
    pub fn content_root(&self, base_dir: &Path) -> PathBuf {
        match self.mode {
            Mode::Development => base_dir.join(&self.content_dir),
            Mode::Production => PathBuf::from(&self.packaged_content_dir),
        }
    }

    /// URL prefix with exactly one leading and one trailing slash
    pub fn url_root(&self) -> String {
        let trimmed = self.root.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}
