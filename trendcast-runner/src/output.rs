//! Current-output replacement.
//!
//! A run leaves exactly one current chart in the output directory. In
//! date-stamped mode every earlier `<stem>_<YYYY-MM-DD>.<ext>` file is removed
//! before the new one is written. Deletion is best-effort: a file that cannot
//! be removed is logged and reported, and the run carries on. Files that do
//! not match the exact pattern are never touched.

use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Date format used in stamped file names.
pub const STAMP_FORMAT: &str = "%Y-%m-%d";

/// A stale output file that could not be removed. Never fatal.
#[derive(Debug, Error)]
#[error("failed to delete stale output {}: {source}", path.display())]
pub struct FileDeletionError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl Serialize for FileDeletionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileDeletionError", 3)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("kind", &format!("{:?}", self.source.kind()))?;
        state.serialize_field("error", &self.source.to_string())?;
        state.end()
    }
}

/// Naming scheme for the current output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub stem: String,
    pub extension: String,
    /// `Some(date)` for `<stem>_<date>.<ext>`, `None` for a static `<stem>.<ext>`.
    pub stamp: Option<NaiveDate>,
}

impl OutputTarget {
    pub fn stamped(dir: impl Into<PathBuf>, stem: &str, extension: &str, date: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.to_string(),
            extension: extension.to_string(),
            stamp: Some(date),
        }
    }

    pub fn fixed(dir: impl Into<PathBuf>, stem: &str, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.to_string(),
            extension: extension.to_string(),
            stamp: None,
        }
    }

    pub fn file_name(&self) -> String {
        match self.stamp {
            Some(date) => format!(
                "{}_{}.{}",
                self.stem,
                date.format(STAMP_FORMAT),
                self.extension
            ),
            None => format!("{}.{}", self.stem, self.extension),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }

    /// Whether `name` is a stamped output of this stem and extension.
    pub fn matches_stamped(&self, name: &str) -> bool {
        let Some(rest) = name
            .strip_prefix(self.stem.as_str())
            .and_then(|r| r.strip_prefix('_'))
        else {
            return false;
        };
        let Some(stamp) = rest
            .strip_suffix(self.extension.as_str())
            .and_then(|r| r.strip_suffix('.'))
        else {
            return false;
        };
        stamp.len() == 10 && NaiveDate::parse_from_str(stamp, STAMP_FORMAT).is_ok()
    }
}

/// What the replacement did.
#[derive(Debug, Default, Serialize)]
pub struct OutputReport {
    pub written: PathBuf,
    pub deleted: Vec<PathBuf>,
    /// Stale files that could not be removed.
    pub failed_deletions: Vec<FileDeletionError>,
}

/// Remove stale stamped outputs, then write the new file via `write`.
///
/// `write` receives the final path. Errors from scanning the directory or
/// from `write` are fatal; individual deletions are not.
pub fn replace_current_output<E, F>(target: &OutputTarget, write: F) -> Result<OutputReport, E>
where
    E: From<io::Error>,
    F: FnOnce(&Path) -> Result<(), E>,
{
    replace_current_output_with(target, remove_stale, write)
}

fn replace_current_output_with<E, R, F>(
    target: &OutputTarget,
    mut remove: R,
    write: F,
) -> Result<OutputReport, E>
where
    E: From<io::Error>,
    R: FnMut(&Path) -> Result<(), FileDeletionError>,
    F: FnOnce(&Path) -> Result<(), E>,
{
    std::fs::create_dir_all(&target.dir)?;

    let mut report = OutputReport::default();
    if target.stamp.is_some() {
        for stale in stale_outputs(target)? {
            match remove(&stale) {
                Ok(()) => {
                    tracing::info!(path = %stale.display(), "removed previous output");
                    report.deleted.push(stale);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "continuing with stale output in place");
                    report.failed_deletions.push(err);
                }
            }
        }
    }

    let path = target.path();
    write(&path)?;
    tracing::info!(path = %path.display(), "wrote output");
    report.written = path;
    Ok(report)
}

/// Stamped files of this target in its directory, sorted by name.
pub fn stale_outputs(target: &OutputTarget) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(&target.dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if target.matches_stamped(&name.to_string_lossy()) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

fn remove_stale(path: &Path) -> Result<(), FileDeletionError> {
    std::fs::remove_file(path).map_err(|source| FileDeletionError {
        path: path.to_path_buf(),
        source,
    })
}
