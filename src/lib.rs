#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner shared by the binary.
pub mod apps;
/// Solid-body line detection.
pub mod classifier;
/// Extraction and join configuration.
pub mod config;
/// Centralized constants grouped by concern.
pub mod constants;
/// JSON, CSV, and Parquet writers.
pub mod export;
/// Quoted string extraction and file id derivation.
pub mod extract;
/// Stoplist heuristic over tokenized strings.
pub mod filter;
/// Assembly join.
pub mod join;
/// Assembly metadata table.
pub mod metadata;
/// End-to-end runs.
pub mod pipeline;
/// Per-file string table aggregation.
pub mod table;
/// Treebank-style word tokenizer.
pub mod tokenize;
/// Input transports (filesystem line corpus).
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use classifier::LineClassifier;
pub use config::{PipelineConfig, PipelinePaths};
pub use errors::PipelineError;
pub use extract::{extract_strings, file_id, quoted_strings};
pub use filter::{Stoplist, TokenFilter, Verdict};
pub use join::{JoinIssue, JoinOutcome, JoinReport, MetadataJoiner, assembly_key};
pub use metadata::{
    AssemblyRecord, AssemblyTable, FinalizedAssemblies, FinalizedAssembly, PartNames,
};
pub use pipeline::{PipelineReport, RunMode};
pub use table::{
    BuildStats, LineIssue, LineOutcome, StringTable, StringTableBuild, StringTableBuilder,
    build_string_table,
};
pub use tokenize::word_tokens;
pub use transport::LineStream;
pub use types::{AssemblyId, CellValue, ColumnName, FileId, NameString, Token};
