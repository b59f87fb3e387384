/// Constants used to recognize and slice STEP record lines.
pub mod lines {
    /// Entity name marking a line that describes a manifold solid body.
    pub const SOLID_BODY_MARKER: &str = "MANIFOLD_SOLID_BREP";
    /// Separator between the source file prefix and the record text (for example `/a/b/00000001_x.step: #12=...`).
    pub const FILE_ID_DELIMITER: &str = ".step:";
    /// Quote character delimiting embedded STEP string literals.
    pub const QUOTE: char = '\'';
    /// Max characters of a line copied into a diagnostic excerpt.
    pub const EXCERPT_CHARS: usize = 80;
}

/// Constants used by the token filter heuristic.
pub mod filter {
    /// Generic CAD vocabulary that carries no naming information on its own.
    pub const DEFAULT_STOPLIST: &[&str] = &[
        "part", "body", "desc", "top", "base", "bottom", "left", "right", "front", "back",
        "curve", "surface", "surf",
    ];
    /// Strings with more distinct tokens than this are kept even when they hit the stoplist.
    pub const MAX_SHORT_TOKENS: usize = 2;
}

/// Constants used by the metadata table and the assembly join.
pub mod assembly {
    /// Separator splitting a file identifier into key segments (for example `00000001_1ffb81a7_step_000`).
    pub const KEY_SEPARATOR: char = '_';
    /// Zero-based segment of the file identifier holding the assembly id.
    pub const KEY_SEGMENT: usize = 1;
    /// Metadata primary key column.
    pub const COLUMN_ASSEMBLY_ID: &str = "assembly_id";
    /// Per-file column dropped before the join.
    pub const COLUMN_FILE_NUMBER: &str = "file_number";
    /// Per-part column dropped before the join.
    pub const COLUMN_PART_NUM: &str = "part_num";
    /// Output column holding joined part names.
    pub const COLUMN_PART_NAMES: &str = "part_names";
    /// Columns removed from the metadata before records are built.
    pub const DROPPED_COLUMNS: [&str; 2] = [COLUMN_FILE_NUMBER, COLUMN_PART_NUM];
}

/// Intervals for periodic `debug!` progress events.
pub mod progress {
    /// Corpus lines between extraction progress events.
    pub const LINE_PROGRESS_INTERVAL: u64 = 100_000;
    /// String table entries between join progress events.
    pub const JOIN_PROGRESS_INTERVAL: u64 = 10_000;
}

/// Default file locations used by the dataset runner.
pub mod paths {
    /// Line corpus produced by grepping STEP files for named entities.
    pub const DEFAULT_LINES_PATH: &str = "all_name_lines.txt";
    /// JSON string table written after extraction.
    pub const DEFAULT_STRING_TABLE_PATH: &str = "abc_text_data.json";
    /// Assembly metadata CSV.
    pub const DEFAULT_METADATA_PATH: &str = "meta.csv";
    /// File stem for the joined assembly table (`.csv` and `.parquet` are appended).
    pub const DEFAULT_OUTPUT_STEM: &str = "data";
    /// Extension of line shards picked up when the corpus path is a directory.
    pub const LINE_SHARD_EXTENSION: &str = "txt";
}

/// Constants used by the exporters.
pub mod export {
    /// Indent unit for the pretty-printed string table.
    pub const JSON_INDENT: &[u8] = b"    ";
    /// Parquet schema root name.
    pub const PARQUET_SCHEMA_NAME: &str = "assemblies";
    /// Repeated group name inside the `part_names` LIST column.
    pub const PARQUET_LIST_GROUP: &str = "list";
    /// Leaf name inside the `part_names` LIST column.
    pub const PARQUET_LIST_ELEMENT: &str = "element";
}
