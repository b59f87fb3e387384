//! Quoted string extraction and file id derivation for record lines.

use crate::constants::lines::QUOTE;

/// Return every substring enclosed in a pair of single quotes, left to right.
///
/// Pairs are matched shortest-first, so `'a' 'b'` yields `a` and `b` rather than
/// `a' 'b`. Content may contain line breaks. A trailing quote without a partner
/// yields nothing. STEP's doubled-quote escape (`'it''s'`) therefore comes out
/// as two strings, `it` and `s`.
pub fn quoted_strings(line: &str) -> Vec<&str> {
    let segments: Vec<&str> = line.split(QUOTE).collect();
    // Odd segments sit between an opening and a closing quote, unless they run to the end.
    segments
        .iter()
        .enumerate()
        .filter(|(idx, _)| idx % 2 == 1 && idx + 1 < segments.len())
        .map(|(_, segment)| *segment)
        .collect()
}

/// Owned variant of [`quoted_strings`].
pub fn extract_strings(line: &str) -> Vec<String> {
    quoted_strings(line).into_iter().map(str::to_string).collect()
}

/// Prefix of `line` before the first `delimiter`, or `None` when it is absent.
pub fn file_id<'a>(line: &'a str, delimiter: &str) -> Option<&'a str> {
    line.split_once(delimiter).map(|(prefix, _)| prefix)
}
