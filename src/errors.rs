use std::io;

use thiserror::Error;

use crate::types::ColumnName;

/// Error type for fatal configuration, IO, and persistence failures.
///
/// Per-line and per-entry problems are not errors; see
/// [`LineIssue`](crate::table::LineIssue) and [`JoinIssue`](crate::join::JoinIssue).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// String table JSON could not be encoded or decoded.
    #[error("string table json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Metadata CSV could not be read or the dataset CSV written.
    #[error("metadata csv error: {0}")]
    Csv(#[from] csv::Error),
    /// Parquet encoding failed.
    #[error("parquet export failed: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    /// A required metadata column is absent from the header.
    #[error("metadata is missing required column '{column}'")]
    MissingColumn {
        /// Name of the absent column.
        column: ColumnName,
    },
    /// The pipeline configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
}
