//! Streaming aggregation of useful strings per source file.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::LineClassifier;
use crate::config::PipelineConfig;
use crate::constants::lines::EXCERPT_CHARS;
use crate::extract::{file_id, quoted_strings};
use crate::filter::TokenFilter;
use crate::types::{FileId, NameString};

/// Finalized mapping from file id to its unique useful strings.
///
/// Keys and values keep first-seen order from the aggregation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StringTable {
    entries: IndexMap<FileId, Vec<NameString>>,
}

impl StringTable {
    /// Build a table from already-finalized entries.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (FileId, Vec<NameString>)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Strings recorded for `file_id`.
    pub fn get(&self, file_id: &str) -> Option<&[NameString]> {
        self.entries.get(file_id).map(Vec::as_slice)
    }

    /// Iterate `(file_id, strings)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&FileId, &Vec<NameString>)> {
        self.entries.iter()
    }

    /// File ids in table order.
    pub fn file_ids(&self) -> impl Iterator<Item = &FileId> {
        self.entries.keys()
    }

    /// Number of file ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no file contributed a useful string.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of strings across all files.
    pub fn string_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Per-line problem that skipped the line without aborting the build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineIssue {
    /// A solid-body line with useful strings but no file id delimiter.
    MalformedLine {
        /// 1-based position of the line in the stream.
        line_number: u64,
        /// Leading characters of the offending line.
        excerpt: String,
    },
}

/// What happened to a single pushed line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line is not a solid-body record.
    NotSolidBody,
    /// Solid-body line whose strings were all filtered out (or absent).
    NoUsefulStrings,
    /// Useful strings merged into `file_id`; `added` counts strings new to that file.
    Merged {
        /// File the strings were merged into.
        file_id: FileId,
        /// Strings new to that file.
        added: usize,
    },
    /// Useful strings found but no file id could be derived.
    Malformed,
}

/// Counters collected while building a table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Lines pushed into the builder.
    pub lines_seen: u64,
    /// Lines accepted by the classifier.
    pub solid_body_lines: u64,
    /// Lines that contributed at least one useful string.
    pub lines_with_names: u64,
    /// Lines skipped for lacking a file id.
    pub malformed_lines: u64,
}

/// Result of a completed build.
#[derive(Clone, Debug)]
pub struct StringTableBuild {
    /// The finalized table.
    pub table: StringTable,
    /// Counters for the pass.
    pub stats: BuildStats,
    /// Skipped lines, in stream order.
    pub issues: Vec<LineIssue>,
}

/// Single-pass builder; holds only the accumulated table between lines.
pub struct StringTableBuilder {
    classifier: LineClassifier,
    filter: TokenFilter,
    delimiter: String,
    entries: IndexMap<FileId, IndexSet<NameString>>,
    stats: BuildStats,
    issues: Vec<LineIssue>,
}

impl StringTableBuilder {
    /// Create a builder from pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            classifier: LineClassifier::new(config.solid_marker.clone()),
            filter: TokenFilter::new(config.stoplist.clone(), config.max_short_tokens),
            delimiter: config.file_delimiter.clone(),
            entries: IndexMap::new(),
            stats: BuildStats::default(),
            issues: Vec::new(),
        }
    }

    /// Classify, extract, filter, and merge one raw line.
    pub fn push_line(&mut self, line: &str) -> LineOutcome {
        self.stats.lines_seen += 1;
        if !self.classifier.is_solid_body(line) {
            return LineOutcome::NotSolidBody;
        }
        self.stats.solid_body_lines += 1;

        let useful = self.filter.useful_strings(quoted_strings(line));
        if useful.is_empty() {
            return LineOutcome::NoUsefulStrings;
        }

        let Some(id) = file_id(line, &self.delimiter) else {
            self.stats.malformed_lines += 1;
            let excerpt: String = line.chars().take(EXCERPT_CHARS).collect();
            warn!(
                line_number = self.stats.lines_seen,
                excerpt = %excerpt,
                "skipping solid-body line without file id delimiter"
            );
            self.issues.push(LineIssue::MalformedLine {
                line_number: self.stats.lines_seen,
                excerpt,
            });
            return LineOutcome::Malformed;
        };

        self.stats.lines_with_names += 1;
        let names = self.entries.entry(id.to_string()).or_default();
        let before = names.len();
        names.extend(useful);
        LineOutcome::Merged {
            file_id: id.to_string(),
            added: names.len() - before,
        }
    }

    /// Push every line of `lines` in order.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.push_line(line.as_ref());
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Freeze every per-file set into an ordered list.
    pub fn finish(self) -> StringTableBuild {
        debug!(
            files = self.entries.len(),
            lines_seen = self.stats.lines_seen,
            solid_body_lines = self.stats.solid_body_lines,
            malformed_lines = self.stats.malformed_lines,
            "string table finalized"
        );
        let table = StringTable::from_entries(
            self.entries
                .into_iter()
                .map(|(id, names)| (id, names.into_iter().collect())),
        );
        StringTableBuild {
            table,
            stats: self.stats,
            issues: self.issues,
        }
    }
}

/// Build a table from an in-memory sequence of lines.
pub fn build_string_table<I, S>(lines: I, config: &PipelineConfig) -> StringTableBuild
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = StringTableBuilder::new(config);
    builder.extend(lines);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET_LINE: &str =
        "/x/y/widget.step: #10=MANIFOLD_SOLID_BREP('Main Body',#11); 'Custom_Bracket_7'";

    #[test]
    fn end_to_end_line_keeps_informative_name_only() {
        let build = build_string_table([WIDGET_LINE], &PipelineConfig::default());
        assert_eq!(build.table.len(), 1);
        assert_eq!(
            build.table.get("/x/y/widget"),
            Some(&["Custom_Bracket_7".to_string()][..])
        );
        assert_eq!(build.stats.lines_with_names, 1);
        assert!(build.issues.is_empty());
    }

    #[test]
    fn non_solid_lines_are_ignored() {
        let mut builder = StringTableBuilder::new(&PipelineConfig::default());
        let outcome = builder.push_line("/x/a.step: #1=PRODUCT('Gear','Gear','',(#2));");
        assert_eq!(outcome, LineOutcome::NotSolidBody);
        let build = builder.finish();
        assert!(build.table.is_empty());
        assert_eq!(build.stats.lines_seen, 1);
        assert_eq!(build.stats.solid_body_lines, 0);
    }

    #[test]
    fn lettered_part_name_survives_into_table() {
        let build = build_string_table(
            ["/x/y/w.step: #1=MANIFOLD_SOLID_BREP('Part A.',#2);"],
            &PipelineConfig::default(),
        );
        assert_eq!(build.table.get("/x/y/w"), Some(&["Part A.".to_string()][..]));
    }

    #[test]
    fn lines_with_only_stoplist_names_add_no_entry() {
        let mut builder = StringTableBuilder::new(&PipelineConfig::default());
        let outcome = builder.push_line("/x/a.step: #1=MANIFOLD_SOLID_BREP('Body',#2);");
        assert_eq!(outcome, LineOutcome::NoUsefulStrings);
        assert!(builder.finish().table.is_empty());
    }

    #[test]
    fn repeated_line_is_idempotent() {
        let mut builder = StringTableBuilder::new(&PipelineConfig::default());
        let first = builder.push_line(WIDGET_LINE);
        let second = builder.push_line(WIDGET_LINE);
        assert_eq!(
            first,
            LineOutcome::Merged {
                file_id: "/x/y/widget".to_string(),
                added: 1
            }
        );
        assert_eq!(
            second,
            LineOutcome::Merged {
                file_id: "/x/y/widget".to_string(),
                added: 0
            }
        );
        let build = builder.finish();
        assert_eq!(build.table.string_count(), 1);
    }

    #[test]
    fn sets_union_across_lines_in_first_seen_order() {
        let lines = [
            "/x/a.step: #1=MANIFOLD_SOLID_BREP('Lid',#2);",
            "/x/b.step: #1=MANIFOLD_SOLID_BREP('Gear',#2);",
            "/x/a.step: #3=MANIFOLD_SOLID_BREP('Hinge',#4); 'Lid'",
        ];
        let build = build_string_table(lines, &PipelineConfig::default());
        let ids: Vec<&FileId> = build.table.file_ids().collect();
        assert_eq!(ids, vec!["/x/a", "/x/b"]);
        assert_eq!(
            build.table.get("/x/a"),
            Some(&["Lid".to_string(), "Hinge".to_string()][..])
        );
    }

    #[test]
    fn malformed_line_is_skipped_with_issue() {
        let lines = [
            "/x/a.stp: #1=MANIFOLD_SOLID_BREP('Lid',#2);",
            "/x/b.step: #1=MANIFOLD_SOLID_BREP('Gear',#2);",
        ];
        let build = build_string_table(lines, &PipelineConfig::default());
        assert_eq!(build.table.len(), 1);
        assert_eq!(build.stats.malformed_lines, 1);
        assert!(matches!(
            &build.issues[..],
            [LineIssue::MalformedLine { line_number: 1, excerpt }] if excerpt.starts_with("/x/a.stp")
        ));
    }

    #[test]
    fn empty_names_pass_through() {
        let build = build_string_table(
            ["/x/a.step: #1=MANIFOLD_SOLID_BREP('',#2);"],
            &PipelineConfig::default(),
        );
        assert_eq!(build.table.get("/x/a"), Some(&[String::new()][..]));
    }

    #[test]
    fn serializes_as_plain_object_in_insertion_order() {
        let table = StringTable::from_entries([
            ("z".to_string(), vec!["Zahnrad".to_string()]),
            ("a".to_string(), vec!["Écrou".to_string()]),
        ]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"z":["Zahnrad"],"a":["Écrou"]}"#);
        let back: StringTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
