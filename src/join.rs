//! Folds the string table into assembly metadata.

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::constants::progress::JOIN_PROGRESS_INTERVAL;
use crate::metadata::AssemblyTable;
use crate::pipeline::progress_due;
use crate::table::StringTable;
use crate::types::{AssemblyId, FileId};

/// Cut the assembly key out of a file id.
///
/// Returns the `segment`-th piece of `file_id` split on `separator`, or `None`
/// when there are not enough pieces.
pub fn assembly_key(file_id: &str, separator: char, segment: usize) -> Option<&str> {
    file_id.split(separator).nth(segment)
}

/// Per-entry problem that skipped a string table entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinIssue {
    /// The derived key has no metadata record.
    MissingJoinKey {
        /// String table entry that was skipped.
        file_id: FileId,
        /// Key derived from `file_id`.
        assembly_key: AssemblyId,
    },
    /// The file id has too few separator segments to derive a key.
    UnderivableKey {
        /// String table entry that was skipped.
        file_id: FileId,
    },
}

impl JoinIssue {
    /// File id of the skipped entry.
    pub fn file_id(&self) -> &str {
        match self {
            JoinIssue::MissingJoinKey { file_id, .. } | JoinIssue::UnderivableKey { file_id } => {
                file_id
            }
        }
    }
}

/// Result of folding one string table entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Names assigned to a record whose list was empty.
    Assigned {
        /// Record the names went to.
        assembly_key: AssemblyId,
        /// Names copied.
        names: usize,
    },
    /// Names appended to a record that already had some.
    Extended {
        /// Record the names went to.
        assembly_key: AssemblyId,
        /// Names copied.
        names: usize,
    },
    /// Entry skipped.
    Skipped(JoinIssue),
}

/// Summary of a join pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinReport {
    /// Entries whose names landed in a record.
    pub merged_entries: usize,
    /// Names copied into records.
    pub merged_names: usize,
    /// Skipped entries, in string table order.
    pub issues: Vec<JoinIssue>,
}

impl JoinReport {
    /// True if every entry found its assembly.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Joins string table entries into an [`AssemblyTable`].
#[derive(Clone, Debug)]
pub struct MetadataJoiner {
    separator: char,
    segment: usize,
}

impl Default for MetadataJoiner {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl MetadataJoiner {
    /// Create a joiner using the configured key derivation.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            separator: config.assembly_separator,
            segment: config.assembly_segment,
        }
    }

    /// Fold a single entry into `assemblies`.
    ///
    /// An empty part-name list takes `names` as-is; a non-empty one is extended.
    /// Names are concatenated, never deduplicated across files.
    pub fn join_entry(
        &self,
        assemblies: &mut AssemblyTable,
        file_id: &str,
        names: &[String],
    ) -> JoinOutcome {
        let Some(key) = assembly_key(file_id, self.separator, self.segment) else {
            return JoinOutcome::Skipped(JoinIssue::UnderivableKey {
                file_id: file_id.to_string(),
            });
        };
        let Some(record) = assemblies.get_mut(key) else {
            return JoinOutcome::Skipped(JoinIssue::MissingJoinKey {
                file_id: file_id.to_string(),
                assembly_key: key.to_string(),
            });
        };
        if record.part_names.is_empty() {
            record.part_names = names.to_vec();
            JoinOutcome::Assigned {
                assembly_key: key.to_string(),
                names: names.len(),
            }
        } else {
            record.part_names.extend_from_slice(names);
            JoinOutcome::Extended {
                assembly_key: key.to_string(),
                names: names.len(),
            }
        }
    }

    /// Fold every entry of `strings` into `assemblies`, collecting skipped entries.
    pub fn join(&self, assemblies: &mut AssemblyTable, strings: &StringTable) -> JoinReport {
        let mut report = JoinReport::default();
        for (idx, (file_id, names)) in strings.iter().enumerate() {
            if progress_due(idx as u64, JOIN_PROGRESS_INTERVAL) {
                debug!(entries = idx, total = strings.len(), "processing keys");
            }
            match self.join_entry(assemblies, file_id, names) {
                JoinOutcome::Assigned { names, .. } | JoinOutcome::Extended { names, .. } => {
                    report.merged_entries += 1;
                    report.merged_names += names;
                }
                JoinOutcome::Skipped(issue) => {
                    warn!(file_id = %file_id, issue = ?issue, "string table entry has no assembly");
                    report.issues.push(issue);
                }
            }
        }
        info!(
            merged_entries = report.merged_entries,
            merged_names = report.merged_names,
            skipped_entries = report.issues.len(),
            "assembly join finished"
        );
        report
    }
}
