//! Assembly metadata table loaded from CSV and the records the join mutates.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::constants::assembly::{COLUMN_ASSEMBLY_ID, DROPPED_COLUMNS};
use crate::errors::PipelineError;
use crate::types::{AssemblyId, CellValue, ColumnName, NameString};

/// One assembly row with its accumulated part names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRecord {
    /// Primary key.
    pub assembly_id: AssemblyId,
    /// Descriptive cells aligned with [`AssemblyTable::columns`]; `None` for empty cells.
    pub fields: Vec<Option<CellValue>>,
    /// Names folded in by the join, in contribution order.
    pub part_names: Vec<NameString>,
}

/// Metadata rows deduplicated and indexed by `assembly_id`.
#[derive(Clone, Debug, Default)]
pub struct AssemblyTable {
    columns: Vec<ColumnName>,
    records: IndexMap<AssemblyId, AssemblyRecord>,
    duplicate_rows: usize,
}

impl AssemblyTable {
    /// Create an empty table with the given descriptive columns.
    pub fn with_columns(columns: Vec<ColumnName>) -> Self {
        Self {
            columns,
            records: IndexMap::new(),
            duplicate_rows: 0,
        }
    }

    /// Load metadata CSV from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Load metadata CSV with a header row.
    ///
    /// `assembly_id`, `file_number`, and `part_num` must be present. The two
    /// per-file columns are dropped; every other column is kept verbatim. Rows
    /// repeating an `assembly_id` are discarded, keeping the first.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let id_idx = column_index(&headers, COLUMN_ASSEMBLY_ID)?;
        for dropped in DROPPED_COLUMNS {
            column_index(&headers, dropped)?;
        }
        let kept: Vec<(usize, ColumnName)> = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| *idx != id_idx && !DROPPED_COLUMNS.contains(name))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let mut table = Self::with_columns(kept.iter().map(|(_, name)| name.clone()).collect());
        for row in csv_reader.records() {
            let row = row?;
            let assembly_id = row.get(id_idx).unwrap_or_default().to_string();
            let fields = kept
                .iter()
                .map(|(idx, _)| {
                    row.get(*idx)
                        .filter(|cell| !cell.is_empty())
                        .map(str::to_string)
                })
                .collect();
            table.insert(AssemblyRecord {
                assembly_id,
                fields,
                part_names: Vec::new(),
            });
        }
        debug!(
            assemblies = table.len(),
            duplicate_rows = table.duplicate_rows,
            columns = table.columns.len(),
            "assembly metadata loaded"
        );
        Ok(table)
    }

    /// Insert a record unless its id is already present. Returns whether it was inserted.
    pub fn insert(&mut self, record: AssemblyRecord) -> bool {
        if self.records.contains_key(&record.assembly_id) {
            self.duplicate_rows += 1;
            return false;
        }
        self.records.insert(record.assembly_id.clone(), record);
        true
    }

    /// Descriptive column names, excluding `assembly_id` and dropped columns.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Look up a record.
    pub fn get(&self, assembly_id: &str) -> Option<&AssemblyRecord> {
        self.records.get(assembly_id)
    }

    /// Look up a record for mutation.
    pub fn get_mut(&mut self, assembly_id: &str) -> Option<&mut AssemblyRecord> {
        self.records.get_mut(assembly_id)
    }

    /// Records in first-seen order.
    pub fn records(&self) -> impl Iterator<Item = &AssemblyRecord> {
        self.records.values()
    }

    /// Number of unique assemblies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no assemblies were loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows discarded because their `assembly_id` was already seen.
    pub fn duplicate_rows(&self) -> usize {
        self.duplicate_rows
    }

    /// Replace every empty part-name list with [`PartNames::Missing`].
    pub fn finalize(self) -> FinalizedAssemblies {
        let records = self
            .records
            .into_values()
            .map(|record| FinalizedAssembly {
                assembly_id: record.assembly_id,
                fields: record.fields,
                part_names: PartNames::from(record.part_names),
            })
            .collect();
        FinalizedAssemblies {
            columns: self.columns,
            records,
        }
    }
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, PipelineError> {
    headers
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: column.to_string(),
        })
}

/// Part names of a finalized record; never an ambiguous empty list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartNames {
    /// At least one name was joined in.
    Names(Vec<NameString>),
    /// No string table entry contributed to this assembly.
    Missing,
}

impl From<Vec<NameString>> for PartNames {
    fn from(names: Vec<NameString>) -> Self {
        if names.is_empty() {
            PartNames::Missing
        } else {
            PartNames::Names(names)
        }
    }
}

impl PartNames {
    /// Names, or `None` when missing.
    pub fn as_slice(&self) -> Option<&[NameString]> {
        match self {
            PartNames::Names(names) => Some(names),
            PartNames::Missing => None,
        }
    }

    /// True for the missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, PartNames::Missing)
    }
}

/// A record after the join, ready for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedAssembly {
    /// Metadata primary key.
    pub assembly_id: AssemblyId,
    /// Descriptive cells, aligned with `FinalizedAssemblies::columns`.
    pub fields: Vec<Option<CellValue>>,
    /// Joined names, or `Missing` when nothing matched.
    pub part_names: PartNames,
}

/// Immutable export view of the joined assembly table.
#[derive(Clone, Debug, Default)]
pub struct FinalizedAssemblies {
    /// Descriptive column names aligned with each record's `fields`.
    pub columns: Vec<ColumnName>,
    /// Records in metadata order.
    pub records: Vec<FinalizedAssembly>,
}

impl FinalizedAssemblies {
    /// Number of records with at least one part name.
    pub fn with_names(&self) -> usize {
        self.records
            .iter()
            .filter(|record| !record.part_names.is_missing())
            .count()
    }
}
