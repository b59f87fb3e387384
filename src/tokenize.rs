//! Treebank-style word tokenizer used to score name strings.
//!
//! Whitespace separates chunks and punctuation is peeled off each chunk the way
//! Penn Treebank tokenizers do it. Word-internal `_`, `-`, `.` and `/` never split,
//! so identifiers such as `Custom_Bracket_7` or `M8x1.25` stay whole.

use crate::types::Token;

/// Characters always emitted as their own token.
const SPLIT_ALWAYS: &[char] = &[
    ';', '@', '#', '$', '%', '&', '?', '!', '(', ')', '[', ']', '{', '}', '<', '>',
];
/// Characters that may close a sentence after its final period.
const CLOSERS: &[&str] = &[")", "]", "}", ">", "''"];
/// Clitics split from the end of their host word.
const CLITICS: &[&str] = &["n't", "'ll", "'re", "'ve", "'s", "'m", "'d"];
/// Fused words and the index where they split (`cannot` -> `can` + `not`).
const FUSED: &[(&str, usize)] = &[
    ("cannot", 3),
    ("d'ye", 1),
    ("gimme", 3),
    ("gonna", 3),
    ("gotta", 3),
    ("lemme", 3),
    ("more'n", 4),
    ("wanna", 3),
];

/// Split `text` into word tokens, preserving the original casing.
pub fn word_tokens(text: &str) -> Vec<Token> {
    let chunks: Vec<&str> = text.split_whitespace().collect();
    let mut tokens = Vec::new();
    for (idx, chunk) in chunks.iter().enumerate() {
        let ends_sentence = chunks
            .get(idx + 1)
            .is_none_or(|next| next.chars().next().is_some_and(char::is_uppercase));
        let start = tokens.len();
        push_chunk_tokens(chunk, &mut tokens);
        if ends_sentence {
            split_final_period(&mut tokens, start);
        }
    }
    tokens
}

/// Lower-cased, distinct tokens of `text` in first-seen order.
pub fn distinct_lowercase_tokens(text: &str) -> indexmap::IndexSet<Token> {
    word_tokens(text)
        .into_iter()
        .map(|token| token.to_lowercase())
        .collect()
}

fn push_chunk_tokens(chunk: &str, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = chunk.chars().collect();
    let mut word = String::new();
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        let next = chars.get(idx + 1).copied();

        if ch == '"' {
            flush_word(&mut word, tokens);
            let opening = idx == 0 || matches!(chars[idx - 1], '(' | '[' | '{' | '<');
            tokens.push(if opening { "``" } else { "''" }.to_string());
        } else if SPLIT_ALWAYS.contains(&ch) {
            flush_word(&mut word, tokens);
            tokens.push(ch.to_string());
        } else if (ch == ',' || ch == ':') && !next.is_some_and(|c| c.is_ascii_digit()) {
            flush_word(&mut word, tokens);
            tokens.push(ch.to_string());
        } else if ch == '.' && chars[idx..].starts_with(&['.', '.', '.']) {
            flush_word(&mut word, tokens);
            tokens.push("...".to_string());
            idx += 3;
            continue;
        } else if ch == '-' && next == Some('-') {
            flush_word(&mut word, tokens);
            tokens.push("--".to_string());
            idx += 2;
            continue;
        } else {
            word.push(ch);
        }
        idx += 1;
    }
    flush_word(&mut word, tokens);
}

fn flush_word(word: &mut String, tokens: &mut Vec<Token>) {
    if word.is_empty() {
        return;
    }
    let taken = std::mem::take(word);
    let lower = taken.to_lowercase();

    if let Some((_, at)) = FUSED.iter().find(|(fused, _)| *fused == lower) {
        let (head, tail) = split_at_char(&taken, *at);
        tokens.push(head);
        tokens.push(tail);
        return;
    }

    for clitic in CLITICS {
        if lower.len() > clitic.len() && lower.ends_with(clitic) {
            let at = taken.chars().count() - clitic.chars().count();
            let (head, tail) = split_at_char(&taken, at);
            tokens.push(head);
            tokens.push(tail);
            return;
        }
    }

    // Quoted STEP strings never contain `'`, so the apostrophe rules above and
    // below only apply when `word_tokens` is called on free text.
    // Possessive plural: `dogs'` -> `dogs` + `'`.
    if taken.len() > 1 && taken.ends_with('\'') && !taken.ends_with("''") {
        let at = taken.chars().count() - 1;
        let (head, tail) = split_at_char(&taken, at);
        tokens.push(head);
        tokens.push(tail);
        return;
    }

    tokens.push(taken);
}

/// Split a sentence-final period off the last word of the chunk starting at `start`.
fn split_final_period(tokens: &mut Vec<Token>, start: usize) {
    let mut pos = tokens.len();
    while pos > start && CLOSERS.contains(&tokens[pos - 1].as_str()) {
        pos -= 1;
    }
    if pos == start {
        return;
    }
    let word = &tokens[pos - 1];
    if word.len() < 2 || !word.ends_with('.') || word.ends_with("..") {
        return;
    }
    let stem = word[..word.len() - 1].to_string();
    tokens[pos - 1] = stem;
    tokens.insert(pos, ".".to_string());
}

fn split_at_char(text: &str, at: usize) -> (String, String) {
    let byte = text
        .char_indices()
        .nth(at)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    (text[..byte].to_string(), text[byte..].to_string())
}
