//! Swatch/code reconciliation
//!
//! Pairs an ordered sequence of extracted swatch assets with an ordered
//! sequence of color codes, index for index. This is position-based
//! matching, not content-based: the Nth swatch in reading order gets the
//! Nth code in extraction order, so both sequences must carry the same
//! stable total order before pairing.
//!
//! Reconciliation is two-phase: [`Reconciler::plan`] produces a pending
//! change set without touching the filesystem, and [`Reconciler::apply`]
//! commits it. Declining to apply leaves the extracted assets on disk
//! under their pre-reconciliation names for manual review.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codes::{ColorCode, Finish};
use crate::ExtractionError;

/// The final join of one swatch asset to one color code (or to none,
/// when counts mismatch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledEntry {
    /// 1-based position in the swatch sequence
    pub ordinal: usize,
    /// Paired numeric code, absent for unmatched swatches
    pub code: Option<String>,
    /// Paired finish variant
    pub finish: Option<Finish>,
    /// Paired color name, for named non-coded swatches
    pub name: Option<String>,
    /// Asset path before reconciliation (`<category>_<ordinal>.png`)
    pub old_path: PathBuf,
    /// Asset path after reconciliation (`<code>-<finish>.png`), absent
    /// for unmatched swatches
    pub new_path: Option<PathBuf>,
}

/// Pending change set produced by planning, committed by applying.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenamePlan {
    /// All swatches in order; unmatched ones carry no code or new path
    pub entries: Vec<ReconciledEntry>,
    /// Codes left over when the code sequence is longer than the swatch
    /// sequence, or whose rename target collides with an earlier code's;
    /// reported, never guessed at
    pub unmatched_codes: Vec<ColorCode>,
}

impl RenamePlan {
    /// Entries that will actually be renamed
    pub fn paired(&self) -> impl Iterator<Item = &ReconciledEntry> {
        self.entries.iter().filter(|e| e.new_path.is_some())
    }

    /// Number of swatches with no paired code
    pub fn unmatched_swatches(&self) -> usize {
        self.entries.iter().filter(|e| e.new_path.is_none()).count()
    }
}

/// Outcome of applying a plan; failed items are named, never silently
/// dropped.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Successfully renamed assets
    pub renamed: usize,
    /// `FileNotFound` for each source missing at its expected pre-rename
    /// location (e.g. a prior run already renamed it)
    pub missing: Vec<ExtractionError>,
    /// Renames that failed for other filesystem reasons
    pub failed: Vec<PathBuf>,
}

/// Position-based reconciler for one page or section.
pub struct Reconciler;

impl Reconciler {
    /// Pair swatch asset paths with codes index for index.
    ///
    /// Only the overlapping prefix is paired; excess swatches become
    /// unmatched entries and excess codes are reported separately. Pure:
    /// no filesystem access happens here.
    pub fn plan(swatch_paths: &[PathBuf], codes: &[ColorCode]) -> RenamePlan {
        let mut entries = Vec::with_capacity(swatch_paths.len());
        let mut unmatched_codes = Vec::new();
        let mut targets = HashSet::new();
        for (idx, old_path) in swatch_paths.iter().enumerate() {
            let entry = match codes.get(idx) {
                Some(code) => {
                    let file_name = format!("{}.png", code.asset_stem());
                    let new_path = match old_path.parent() {
                        Some(parent) => parent.join(&file_name),
                        None => PathBuf::from(&file_name),
                    };
                    // two codes can share a stem (same code and finish,
                    // one carrying a name); renaming both would overwrite
                    if !targets.insert(new_path.clone()) {
                        warn!(
                            path = %new_path.display(),
                            code = ?code,
                            "rename target collision, code left unmatched"
                        );
                        unmatched_codes.push(code.clone());
                        Self::unpaired(idx, old_path)
                    } else {
                        ReconciledEntry {
                            ordinal: idx + 1,
                            code: code.code.clone(),
                            finish: Some(code.finish),
                            name: code.name.clone(),
                            old_path: old_path.clone(),
                            new_path: Some(new_path),
                        }
                    }
                }
                None => Self::unpaired(idx, old_path),
            };
            entries.push(entry);
        }

        unmatched_codes.extend_from_slice(codes.get(swatch_paths.len()..).unwrap_or(&[]));
        RenamePlan {
            entries,
            unmatched_codes,
        }
    }

    fn unpaired(idx: usize, old_path: &Path) -> ReconciledEntry {
        ReconciledEntry {
            ordinal: idx + 1,
            code: None,
            finish: None,
            name: None,
            old_path: old_path.to_path_buf(),
            new_path: None,
        }
    }

    /// Commit a plan by renaming assets on disk.
    ///
    /// Per-item failures are logged with the offending path and the run
    /// continues. A source missing at its pre-rename location is
    /// reported as not found; re-applying an already-applied plan
    /// renames nothing and reports every source as missing.
    pub fn apply(plan: &RenamePlan) -> ApplyReport {
        let mut report = ApplyReport::default();
        for entry in &plan.entries {
            let Some(new_path) = &entry.new_path else {
                continue;
            };
            if !entry.old_path.exists() {
                warn!(path = %entry.old_path.display(), "rename source not found");
                report.missing.push(ExtractionError::FileNotFound {
                    path: entry.old_path.clone(),
                });
                continue;
            }
            match std::fs::rename(&entry.old_path, new_path) {
                Ok(()) => report.renamed += 1,
                Err(e) => {
                    warn!(
                        from = %entry.old_path.display(),
                        to = %new_path.display(),
                        error = %e,
                        "rename failed"
                    );
                    report.failed.push(entry.old_path.clone());
                }
            }
        }
        report
    }
}
