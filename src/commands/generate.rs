//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::Generator;
use crate::StudyTracker;

/// Generate the static site
pub fn run(tracker: &StudyTracker) -> Result<()> {
    let start = std::time::Instant::now();

    let stats = Generator::new(tracker)?.generate()?;

    if !stats.missing.is_empty() {
        tracing::warn!(
            "{} topic(s) have no content file: {}",
            stats.missing.len(),
            stats.missing.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages in {:.2}s",
        stats.pages,
        duration.as_secs_f64()
    );

    Ok(())
}

/// Watch the content root and regenerate on change
pub fn watch(tracker: &StudyTracker) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&tracker.content_root, RecursiveMode::Recursive)?;

    tracing::info!("Watching {:?}. Press Ctrl+C to stop.", tracker.content_root);

    loop {
        match rx.recv() {
            Ok(Ok(_events)) => {
                tracing::info!("Content changed, regenerating...");
                if let Err(e) = run(tracker) {
                    tracing::error!("Generation failed: {}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(_) => break,
        }
    }

    Ok(())
}
