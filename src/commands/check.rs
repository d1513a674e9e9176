//! Check the registry against the content directory

use anyhow::Result;
use std::path::PathBuf;

use crate::content::ContentLoader;
use crate::registry::{Registry, RegistryError};
use crate::StudyTracker;

/// Problems found by `check`
#[derive(Debug, Default)]
pub struct CheckReport {
    pub registry_error: Option<RegistryError>,
    /// `(id, file)` for topics whose file is missing
    pub missing: Vec<(&'static str, &'static str)>,
    /// Markdown files no topic points at
    pub unregistered: Vec<PathBuf>,
}

impl CheckReport {
    /// Missing files and registry errors fail the check; extra files only warn
    pub fn is_ok(&self) -> bool {
        self.registry_error.is_none() && self.missing.is_empty()
    }
}

/// Inspect the registry and content root
pub fn inspect(registry: &Registry, loader: &ContentLoader) -> CheckReport {
    CheckReport {
        registry_error: registry.validate().err(),
        missing: loader
            .missing_files(registry)
            .into_iter()
            .map(|t| (t.id, t.file))
            .collect(),
        unregistered: loader.unregistered_files(registry),
    }
}

/// Run the check and print a report
pub fn run(tracker: &StudyTracker) -> Result<()> {
    let report = inspect(&tracker.registry, &tracker.loader());

    println!("Content root: {}", tracker.content_root.display());
    if let Some(e) = &report.registry_error {
        println!("Registry error: {}", e);
    }
    for (id, file) in &report.missing {
        println!("  missing      {} {}", id, file);
    }
    for path in &report.unregistered {
        println!("  unregistered {}", path.display());
    }

    if report.is_ok() {
        println!(
            "OK: {} topics, {} unregistered file(s)",
            tracker.registry.len(),
            report.unregistered.len()
        );
        Ok(())
    } else {
        anyhow::bail!(
            "check failed: {} missing file(s){}",
            report.missing.len(),
            if report.registry_error.is_some() {
                ", invalid registry"
            } else {
                ""
            }
        )
    }
}
