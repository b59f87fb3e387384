use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::{PipelineConfig, PipelinePaths};
use crate::constants::paths::{
    DEFAULT_LINES_PATH, DEFAULT_METADATA_PATH, DEFAULT_OUTPUT_STEM, DEFAULT_STRING_TABLE_PATH,
};
use crate::filter::Stoplist;
use crate::join::JoinIssue;
use crate::pipeline::{PipelineReport, RunMode, run};
use crate::table::LineIssue;

#[derive(Debug, Parser)]
#[command(
    name = "build_name_dataset",
    disable_help_subcommand = true,
    about = "Build a part-name dataset from STEP record lines",
    long_about = "Extract quoted names from solid-body STEP record lines, drop low-information strings, write the per-file string table, and join it into assembly metadata (CSV and Parquet).",
    after_help = "Set RUST_LOG=stepnames=debug for per-stage diagnostics."
)]
struct BuildNameDatasetCli {
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_LINES_PATH,
        help = "Line corpus file, or a directory of .txt line shards"
    )]
    lines: PathBuf,
    #[arg(
        long = "string-table",
        value_name = "PATH",
        default_value = DEFAULT_STRING_TABLE_PATH,
        help = "String table JSON to write (or read with --join-only)"
    )]
    string_table: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_METADATA_PATH,
        help = "Assembly metadata CSV"
    )]
    metadata: PathBuf,
    #[arg(
        long = "output-stem",
        value_name = "STEM",
        default_value = DEFAULT_OUTPUT_STEM,
        help = "Output stem; .csv and .parquet are appended"
    )]
    output_stem: PathBuf,
    #[arg(
        long = "join-only",
        help = "Skip extraction and join an existing string table"
    )]
    join_only: bool,
    #[arg(long, value_name = "ENTITY", help = "Override the solid-body marker")]
    marker: Option<String>,
    #[arg(
        long,
        value_name = "TEXT",
        help = "Override the delimiter ending each line's file prefix"
    )]
    delimiter: Option<String>,
    #[arg(
        long = "stopword",
        value_name = "WORD",
        help = "Replace the default stoplist, repeat as needed"
    )]
    stopwords: Vec<String>,
}

impl BuildNameDatasetCli {
    fn paths(&self) -> PipelinePaths {
        PipelinePaths {
            lines: self.lines.clone(),
            string_table: self.string_table.clone(),
            metadata: self.metadata.clone(),
            output_stem: self.output_stem.clone(),
        }
    }

    fn config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(marker) = &self.marker {
            config = config.with_solid_marker(marker.clone());
        }
        if let Some(delimiter) = &self.delimiter {
            config = config.with_file_delimiter(delimiter.clone());
        }
        if !self.stopwords.is_empty() {
            config = config.with_stoplist(Stoplist::new(&self.stopwords));
        }
        config
    }

    fn mode(&self) -> RunMode {
        if self.join_only {
            RunMode::JoinOnly
        } else {
            RunMode::Full
        }
    }
}

/// Parse `args_iter` (without the program name), run the pipeline, and print a summary.
pub fn run_build_name_dataset<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<BuildNameDatasetCli, _>(
        std::iter::once("build_name_dataset".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let paths = cli.paths();
    let report = run(&paths, &cli.config(), cli.mode())?;
    print_report(&paths, &report);
    Ok(())
}

fn print_report(paths: &PipelinePaths, report: &PipelineReport) {
    if let Some(stats) = &report.build {
        println!(
            "Scanned {} lines ({} solid-body, {} with names) into {} files -> {}",
            stats.lines_seen,
            stats.solid_body_lines,
            stats.lines_with_names,
            report.string_table_files,
            paths.string_table.display()
        );
    } else {
        println!(
            "Loaded {} files from {}",
            report.string_table_files,
            paths.string_table.display()
        );
    }
    for issue in &report.line_issues {
        match issue {
            LineIssue::MalformedLine {
                line_number,
                excerpt,
            } => eprintln!("line {line_number}: no file id delimiter: {excerpt}"),
        }
    }

    println!(
        "Joined {} entries ({} names); {} of {} assemblies have part names",
        report.join.merged_entries,
        report.join.merged_names,
        report.assemblies_with_names,
        report.assemblies
    );
    for issue in &report.join.issues {
        match issue {
            JoinIssue::MissingJoinKey {
                file_id,
                assembly_key,
            } => eprintln!("no assembly '{assembly_key}' for {file_id}"),
            JoinIssue::UnderivableKey { file_id } => {
                eprintln!("cannot derive assembly key from {file_id}")
            }
        }
    }
    println!(
        "Wrote {} and {}",
        paths.csv_output().display(),
        paths.parquet_output().display()
    );
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> BuildNameDatasetCli {
        parse_cli::<BuildNameDatasetCli, _>(
            std::iter::once("build_name_dataset").chain(args.iter().copied()),
        )
        .unwrap()
        .unwrap()
    }

    #[test]
    fn defaults_use_fixed_filenames() {
        let cli = parse(&[]);
        let paths = cli.paths();
        assert_eq!(paths.lines, PathBuf::from("all_name_lines.txt"));
        assert_eq!(paths.string_table, PathBuf::from("abc_text_data.json"));
        assert_eq!(paths.metadata, PathBuf::from("meta.csv"));
        assert_eq!(paths.csv_output(), PathBuf::from("data.csv"));
        assert_eq!(cli.mode(), RunMode::Full);
    }

    #[test]
    fn overrides_flow_into_config() {
        let cli = parse(&[
            "--join-only",
            "--marker",
            "BREP_WITH_VOIDS",
            "--stopword",
            "Gear",
            "--stopword",
            "shaft",
        ]);
        let config = cli.config();
        assert_eq!(cli.mode(), RunMode::JoinOnly);
        assert_eq!(config.solid_marker, "BREP_WITH_VOIDS");
        assert_eq!(config.file_delimiter, ".step:");
        assert_eq!(config.stoplist, Stoplist::new(["gear", "shaft"]));
    }

    #[test]
    fn help_returns_none() {
        let parsed = parse_cli::<BuildNameDatasetCli, _>(["build_name_dataset", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let parsed = parse_cli::<BuildNameDatasetCli, _>(["build_name_dataset", "--bogus"]);
        assert!(parsed.is_err());
    }
}
