//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::StudyTracker;

/// Remove the generated site
///
/// Saved progress lives outside the public directory and is kept.
pub fn run(tracker: &StudyTracker) -> Result<()> {
    if tracker.public_dir.exists() {
        fs::remove_dir_all(&tracker.public_dir)?;
        tracing::info!("Deleted: {:?}", tracker.public_dir);
    }

    Ok(())
}
