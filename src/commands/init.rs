//! Initialize a study directory

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::{StudyConfig, CONFIG_FILE};
use crate::registry::{Registry, Topic};

/// What `init` created
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitReport {
    pub wrote_config: bool,
    pub created: Vec<&'static str>,
}

/// Write a default config and a stub file for every topic that lacks one
///
/// Existing files are never overwritten.
pub fn init_dir(target_dir: &Path, registry: &Registry) -> Result<InitReport> {
    fs::create_dir_all(target_dir)?;
    let mut report = InitReport::default();

    let config_path = target_dir.join(CONFIG_FILE);
    let config = if config_path.exists() {
        StudyConfig::load(&config_path)?
    } else {
        let config = StudyConfig::default();
        let header = "# Study tracker configuration\n# mode: development reads content_dir, production reads packaged_content_dir\n\n";
        fs::write(&config_path, format!("{}{}", header, config.to_yaml()?))?;
        report.wrote_config = true;
        config
    };

    let content_root = config.content_root(target_dir);
    for t in registry.topics() {
        let path = content_root.join(t.topic.file);
        if path.exists() {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, stub(t.topic))?;
        tracing::debug!("Created {:?}", path);
        report.created.push(t.topic.id);
    }

    Ok(report)
}

/// Starter markdown for a topic
fn stub(topic: &Topic) -> String {
    let tags = topic
        .tags
        .iter()
        .map(|t| format!("`{}`", t))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "# {}\n\n> {}\n\nEstimated time: {}  \nTags: {}\n\n## Key points\n\n- [ ] \n\n## Talking points\n\n",
        topic.title, topic.description, topic.duration, tags
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_config_and_stubs() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::builtin();

        let report = init_dir(dir.path(), &registry).unwrap();
        assert!(report.wrote_config);
        assert_eq!(report.created.len(), registry.len());
        assert!(dir.path().join("study.yml").is_file());

        let first = registry.topics().next().unwrap().topic;
        let text = fs::read_to_string(dir.path().join("content").join(first.file)).unwrap();
        assert!(text.starts_with(&format!("# {}", first.title)));
    }

    #[test]
    fn test_init_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        let registry = Registry::builtin();
        let first = registry.topics().next().unwrap().topic;
        let path = dir.path().join("content").join(first.file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "my notes").unwrap();

        init_dir(dir.path(), &registry).unwrap();
        let again = init_dir(dir.path(), &registry).unwrap();

        assert!(!again.wrote_config);
        assert!(again.created.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "my notes");
    }
}
