//! Snapshot persistence for monitoring state.
//!
//! One flat JSON file holds the whole state: a schema tag, a write
//! timestamp and one entry per URL. Loading is infallible: a missing,
//! unreadable, corrupt or schema-mismatched file yields fresh state.
//! Saving replaces the file atomically via a temp file in the same
//! directory. Concurrent runs against the same file are the caller's
//! responsibility (cron / CI schedulers provide the mutual exclusion).

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::models::{Snapshot, UrlEntry};

/// Handle on the snapshot file, bound to the schema version the
/// running configuration expects.
pub struct StateStore {
    path: PathBuf,
    schema_version: String,
}

impl StateStore {
    pub fn new(path: PathBuf, schema_version: String) -> Self {
        Self {
            path,
            schema_version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot if a usable one exists.
    ///
    /// Returns `None` when the file is absent, unreadable, malformed
    /// or carries a different schema tag. None of these are errors:
    /// the monitor starts over from empty state.
    pub fn read(&self) -> Option<Snapshot> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No previous snapshot");
                return None;
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read snapshot; starting fresh"
                );
                return None;
            }
        };

        let snapshot: Snapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Snapshot is not valid JSON; starting fresh"
                );
                return None;
            }
        };

        if snapshot.schema != self.schema_version {
            warn!(
                found = %snapshot.schema,
                expected = %self.schema_version,
                "State schema mismatch; ignoring old state"
            );
            return None;
        }

        Some(snapshot)
    }

    /// Load the per-URL entries, falling back to an empty map when no
    /// usable snapshot exists.
    pub fn load(&self) -> BTreeMap<String, UrlEntry> {
        self.read().map(|snapshot| snapshot.urls).unwrap_or_default()
    }

    /// Write the complete snapshot, replacing any previous one.
    ///
    /// The write goes to a temp file in the destination directory and
    /// is renamed over the target, so an interrupted run leaves either
    /// the old snapshot or the new one, never a truncated file.
    pub fn save(&self, urls: &BTreeMap<String, UrlEntry>, saved_at: i64) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;

        let snapshot = Snapshot::new(self.schema_version.clone(), saved_at, urls.clone());
        let json = serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?;

        let mut staging =
            NamedTempFile::new_in(&parent).context("Failed to create snapshot temp file")?;
        staging
            .write_all(json.as_bytes())
            .context("Failed to write snapshot")?;
        staging
            .as_file()
            .sync_all()
            .context("Failed to sync snapshot to disk")?;

        let staging_path = staging.into_temp_path();
        fs::rename(&*staging_path, &self.path)
            .with_context(|| format!("Failed to replace snapshot: {}", self.path.display()))?;

        Ok(())
    }
}
