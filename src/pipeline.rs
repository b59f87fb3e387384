//! End-to-end extraction and join runs over the configured files.

use std::path::Path;

use tracing::{debug, info};

use crate::config::{PipelineConfig, PipelinePaths};
use crate::constants::progress::LINE_PROGRESS_INTERVAL;
use crate::errors::PipelineError;
use crate::export::{
    read_string_table_json, write_assemblies_csv, write_assemblies_parquet,
    write_string_table_json,
};
use crate::join::{JoinReport, MetadataJoiner};
use crate::metadata::{AssemblyTable, FinalizedAssemblies};
use crate::table::{BuildStats, LineIssue, StringTable, StringTableBuild, StringTableBuilder};
use crate::transport::LineStream;

/// Which stages a run executes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Scan the line corpus, write the string table, then join.
    #[default]
    Full,
    /// Reuse an existing string table JSON and only join.
    JoinOnly,
}

/// Summary returned after a run.
#[derive(Clone, Debug, Default)]
pub struct PipelineReport {
    /// Extraction counters; `None` for join-only runs.
    pub build: Option<BuildStats>,
    /// Lines skipped during extraction.
    pub line_issues: Vec<LineIssue>,
    /// Files in the string table that was joined.
    pub string_table_files: usize,
    /// Join counters and skipped entries.
    pub join: JoinReport,
    /// Unique assemblies exported.
    pub assemblies: usize,
    /// Exported assemblies with at least one part name.
    pub assemblies_with_names: usize,
}

/// Stream the line corpus at `lines` into a string table.
pub fn extract_string_table(
    lines: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<StringTableBuild, PipelineError> {
    config.validate()?;
    let mut builder = StringTableBuilder::new(config);
    LineStream::new(lines.as_ref()).for_each_line(|line| {
        builder.push_line(line);
        let stats = builder.stats();
        if progress_due(stats.lines_seen, LINE_PROGRESS_INTERVAL) {
            debug!(
                lines_seen = stats.lines_seen,
                solid_body_lines = stats.solid_body_lines,
                "processing lines"
            );
        }
    })?;
    let build = builder.finish();
    info!(
        files = build.table.len(),
        strings = build.table.string_count(),
        lines_seen = build.stats.lines_seen,
        solid_body_lines = build.stats.solid_body_lines,
        malformed_lines = build.stats.malformed_lines,
        "string table built"
    );
    Ok(build)
}

/// True every `interval` items; `0` disables progress events.
pub(crate) fn progress_due(count: u64, interval: u64) -> bool {
    interval > 0 && count > 0 && count % interval == 0
}

/// Load metadata from `metadata`, fold `strings` into it, and finalize.
pub fn join_assemblies(
    metadata: impl AsRef<Path>,
    strings: &StringTable,
    config: &PipelineConfig,
) -> Result<(FinalizedAssemblies, JoinReport), PipelineError> {
    let mut assemblies = AssemblyTable::from_path(metadata)?;
    let report = MetadataJoiner::from_config(config).join(&mut assemblies, strings);
    let finalized = assemblies.finalize();
    info!(
        assemblies = finalized.records.len(),
        with_names = finalized.with_names(),
        missing = finalized.records.len() - finalized.with_names(),
        "assembly table finalized"
    );
    Ok((finalized, report))
}

/// Run the configured stages and write every output artifact.
pub fn run(
    paths: &PipelinePaths,
    config: &PipelineConfig,
    mode: RunMode,
) -> Result<PipelineReport, PipelineError> {
    let mut report = PipelineReport::default();

    let strings = match mode {
        RunMode::Full => {
            let build = extract_string_table(&paths.lines, config)?;
            write_string_table_json(&build.table, &paths.string_table)?;
            report.build = Some(build.stats);
            report.line_issues = build.issues;
            build.table
        }
        RunMode::JoinOnly => read_string_table_json(&paths.string_table)?,
    };
    report.string_table_files = strings.len();

    let (assemblies, join) = join_assemblies(&paths.metadata, &strings, config)?;
    write_assemblies_csv(&assemblies, paths.csv_output())?;
    write_assemblies_parquet(&assemblies, paths.parquet_output())?;

    report.join = join;
    report.assemblies = assemblies.records.len();
    report.assemblies_with_names = assemblies.with_names();
    Ok(report)
}
