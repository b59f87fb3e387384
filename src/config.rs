use std::path::{Path, PathBuf};

use crate::constants::assembly::{KEY_SEGMENT, KEY_SEPARATOR};
use crate::constants::filter::MAX_SHORT_TOKENS;
use crate::constants::lines::{FILE_ID_DELIMITER, SOLID_BODY_MARKER};
use crate::constants::paths::{
    DEFAULT_LINES_PATH, DEFAULT_METADATA_PATH, DEFAULT_OUTPUT_STEM, DEFAULT_STRING_TABLE_PATH,
};
use crate::errors::PipelineError;
use crate::filter::Stoplist;

/// Top-level extraction and join configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Entity marker identifying solid-body record lines.
    pub solid_marker: String,
    /// Delimiter ending the file prefix of each record line.
    pub file_delimiter: String,
    /// Low-information terms used by the token filter.
    pub stoplist: Stoplist,
    /// Distinct token count at or below which a stoplist hit drops a string.
    pub max_short_tokens: usize,
    /// Separator used to split file ids into assembly key segments.
    pub assembly_separator: char,
    /// Zero-based segment index holding the assembly key.
    pub assembly_segment: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            solid_marker: SOLID_BODY_MARKER.to_string(),
            file_delimiter: FILE_ID_DELIMITER.to_string(),
            stoplist: Stoplist::default(),
            max_short_tokens: MAX_SHORT_TOKENS,
            assembly_separator: KEY_SEPARATOR,
            assembly_segment: KEY_SEGMENT,
        }
    }
}

impl PipelineConfig {
    /// Override the solid-body marker.
    pub fn with_solid_marker(mut self, marker: impl Into<String>) -> Self {
        self.solid_marker = marker.into();
        self
    }

    /// Override the file id delimiter.
    pub fn with_file_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.file_delimiter = delimiter.into();
        self
    }

    /// Replace the stoplist.
    pub fn with_stoplist(mut self, stoplist: Stoplist) -> Self {
        self.stoplist = stoplist;
        self
    }

    /// Override the short-string token threshold.
    pub fn with_max_short_tokens(mut self, max_short_tokens: usize) -> Self {
        self.max_short_tokens = max_short_tokens;
        self
    }

    /// Override how assembly keys are cut from file ids.
    pub fn with_assembly_key(mut self, separator: char, segment: usize) -> Self {
        self.assembly_separator = separator;
        self.assembly_segment = segment;
        self
    }

    /// Reject configurations that would silently match every or no line.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.solid_marker.is_empty() {
            return Err(PipelineError::Configuration(
                "solid-body marker must not be empty".to_string(),
            ));
        }
        if self.file_delimiter.is_empty() {
            return Err(PipelineError::Configuration(
                "file id delimiter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input and output locations for a dataset run.
#[derive(Clone, Debug)]
pub struct PipelinePaths {
    /// Line corpus file, or a directory of `.txt` line shards.
    pub lines: PathBuf,
    /// String table JSON (written after extraction, read in join-only runs).
    pub string_table: PathBuf,
    /// Assembly metadata CSV.
    pub metadata: PathBuf,
    /// Output stem; `.csv` and `.parquet` are appended.
    pub output_stem: PathBuf,
}

impl Default for PipelinePaths {
    fn default() -> Self {
        Self {
            lines: PathBuf::from(DEFAULT_LINES_PATH),
            string_table: PathBuf::from(DEFAULT_STRING_TABLE_PATH),
            metadata: PathBuf::from(DEFAULT_METADATA_PATH),
            output_stem: PathBuf::from(DEFAULT_OUTPUT_STEM),
        }
    }
}

impl PipelinePaths {
    /// Resolve every default filename inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let defaults = Self::default();
        Self {
            lines: dir.join(defaults.lines),
            string_table: dir.join(defaults.string_table),
            metadata: dir.join(defaults.metadata),
            output_stem: dir.join(defaults.output_stem),
        }
    }

    /// Path of the CSV assembly table.
    pub fn csv_output(&self) -> PathBuf {
        with_suffix(&self.output_stem, "csv")
    }

    /// Path of the Parquet assembly snapshot.
    pub fn parquet_output(&self) -> PathBuf {
        with_suffix(&self.output_stem, "parquet")
    }
}

// Appends rather than replaces so stems like `data.v2` survive.
fn with_suffix(stem: &Path, extension: &str) -> PathBuf {
    let mut raw = stem.as_os_str().to_owned();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}
