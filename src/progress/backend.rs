//! Persistence backends for the completion set

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{CompletionSet, ProgressError};

/// Default progress file name, relative to the base directory
pub const PROGRESS_FILE: &str = ".study-progress.json";

/// Where a [`CompletionSet`] is kept between runs
pub trait ProgressBackend {
    /// Read the saved set; `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<CompletionSet>, ProgressError>;

    /// Replace the saved set
    fn save(&mut self, set: &CompletionSet) -> Result<(), ProgressError>;
}

/// Keeps the serialized set in memory, the way browser storage holds a string
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    raw: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary stored string, valid or not
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Some(raw.to_string()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl ProgressBackend for MemoryBackend {
    fn load(&self) -> Result<Option<CompletionSet>, ProgressError> {
        self.raw
            .as_deref()
            .map(CompletionSet::from_json)
            .transpose()
    }

    fn save(&mut self, set: &CompletionSet) -> Result<(), ProgressError> {
        self.raw = Some(set.to_json()?);
        Ok(())
    }
}

/// JSON array of ids in a single file
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<CompletionSet>, ProgressError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(CompletionSet::from_json(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, set: &CompletionSet) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write next to the target and rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, set.to_json()?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
