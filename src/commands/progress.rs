//! Progress commands: toggle, show, reset

use anyhow::Result;
use std::fmt::Write;

use crate::progress::{ProgressBackend, ProgressStore};
use crate::registry::Registry;
use crate::StudyTracker;

/// Toggle a topic in the saved progress; returns the new state
pub fn toggle(tracker: &StudyTracker, id: &str) -> Result<bool> {
    toggle_in(&tracker.registry, &mut tracker.progress_store(), id)
}

/// Toggle against any backend, rejecting ids the registry does not know
pub fn toggle_in<B: ProgressBackend>(
    registry: &Registry,
    store: &mut ProgressStore<B>,
    id: &str,
) -> Result<bool> {
    let found = registry.resolve(id)?;
    let complete = store.toggle(found.topic.id)?;
    tracing::info!(
        "{} {} marked {}",
        found.topic.id,
        found.topic.title,
        if complete { "complete" } else { "incomplete" }
    );
    Ok(complete)
}

/// Print per-day and overall progress
pub fn show(tracker: &StudyTracker) -> Result<()> {
    let store = tracker.progress_store();
    print!("{}", summary(&tracker.registry, &store)?);
    Ok(())
}

/// Clear all saved progress
pub fn reset(tracker: &StudyTracker) -> Result<()> {
    let mut store = tracker.progress_store();
    let cleared = store.completed().len();
    store.reset()?;
    tracing::info!("Cleared {} completed topic(s)", cleared);
    Ok(())
}

/// Progress report text
pub fn summary<B: ProgressBackend>(registry: &Registry, store: &ProgressStore<B>) -> Result<String> {
    let mut out = String::new();

    for day in registry.days() {
        let progress = store.day_progress(day);
        writeln!(
            out,
            "Day {} {:<20} {:>2}/{:<2} {:>3}% {}",
            day.id,
            day.title,
            progress.completed,
            progress.total,
            progress.percent(),
            bar(progress.ratio(), 20)
        )?;
    }

    let overall = store.overall(registry);
    writeln!(
        out,
        "Overall {:>24}/{:<2} {:>3}%",
        overall.completed,
        overall.total,
        overall.percent()
    )?;

    let stale = store.completed().stale_ids(registry);
    if !stale.is_empty() {
        writeln!(out, "Unknown ids in saved progress: {}", stale.join(", "))?;
    }

    Ok(out)
}

/// Text progress bar
fn bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
