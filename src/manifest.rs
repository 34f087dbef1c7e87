//! Extraction manifest
//!
//! The full run's output record: summary counts per finish category plus
//! the ordered list of reconciled entries. Written once at the end of a
//! run as a whole-file overwrite; the write goes through a temporary
//! file in the same directory and a rename, so a reader never observes a
//! half-written manifest.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codes::Finish;
use crate::reconcile::ReconciledEntry;
use crate::{ExtractionError, Result};

/// Summary counts per finish category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishCounts {
    pub glossy: usize,
    pub sanded: usize,
    pub matte: usize,
    pub special: usize,
}

impl FinishCounts {
    /// Tally the paired entries of a run
    pub fn tally(entries: &[ReconciledEntry]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.finish {
                Some(Finish::Glossy) => counts.glossy += 1,
                Some(Finish::Sanded) => counts.sanded += 1,
                Some(Finish::Matte) => counts.matte += 1,
                Some(Finish::Special) => counts.special += 1,
                None => {}
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.glossy + self.sanded + self.matte + self.special
    }
}

/// Grid metadata recorded for fixed-grid runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridInfo {
    pub cols: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

/// The whole run's output: counts plus ordered reconciled entries.
///
/// Never updated in place; a re-run overwrites the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionManifest {
    /// Label of the source document
    pub source: String,
    /// Total swatch assets written by the run
    pub total_colors: usize,
    /// Paired-entry counts per finish
    pub counts: FinishCounts,
    /// Grid shape and cell size, for fixed-grid runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridInfo>,
    /// Ordered reconciled entries
    pub entries: Vec<ReconciledEntry>,
}

impl ExtractionManifest {
    /// Start an empty manifest for a source document
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            total_colors: 0,
            counts: FinishCounts::default(),
            grid: None,
            entries: Vec::new(),
        }
    }

    /// Append a page's entries and refresh the summary counts
    pub fn extend(&mut self, entries: Vec<ReconciledEntry>) {
        self.entries.extend(entries);
        self.total_colors = self.entries.len();
        self.counts = FinishCounts::tally(&self.entries);
    }

    /// Write the manifest atomically: serialize to a temporary file in
    /// the destination directory, then rename over the target.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ExtractionError::config("manifest serialization failed", e))?;
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = parent.join(".manifest.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load a previously written manifest
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ExtractionError::config(format!("invalid manifest {}", path.display()), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(ordinal: usize, finish: Option<Finish>) -> ReconciledEntry {
        ReconciledEntry {
            ordinal,
            code: finish.map(|_| format!("{:04}", 1000 + ordinal)),
            finish,
            name: None,
            old_path: PathBuf::from(format!("color_{ordinal:03}.png")),
            new_path: finish.map(|f| PathBuf::from(format!("{}-{}.png", 1000 + ordinal, f))),
        }
    }

    #[test]
    fn test_counts_tally() {
        let entries = vec![
            entry(1, Some(Finish::Glossy)),
            entry(2, Some(Finish::Glossy)),
            entry(3, Some(Finish::Sanded)),
            entry(4, None),
        ];
        let counts = FinishCounts::tally(&entries);
        assert_eq!(counts.glossy, 2);
        assert_eq!(counts.sanded, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let mut manifest = ExtractionManifest::new("test chart");
        manifest.extend(vec![entry(1, Some(Finish::Matte))]);
        manifest.write(&path).unwrap();

        let loaded = ExtractionManifest::load(&path).unwrap();
        assert_eq!(loaded.source, "test chart");
        assert_eq!(loaded.total_colors, 1);
        assert_eq!(loaded.counts.matte, 1);
        assert!(!dir.path().join(".manifest.tmp").exists());
    }

    #[test]
    fn test_rerun_overwrites_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let mut first = ExtractionManifest::new("chart");
        first.extend(vec![entry(1, Some(Finish::Glossy)), entry(2, Some(Finish::Glossy))]);
        first.write(&path).unwrap();

        let second = ExtractionManifest::new("chart");
        second.write(&path).unwrap();

        let loaded = ExtractionManifest::load(&path).unwrap();
        assert_eq!(loaded.total_colors, 0);
        assert!(loaded.entries.is_empty());
    }
}
