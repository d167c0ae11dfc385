//! `do ... end` block accounting
//!
//! Manifests nest `group`, `platforms`, `if` and other blocks that all
//! close with the same `end` keyword. Matching a block to its `end` is a
//! plain depth counter over these per-line deltas.

use std::sync::LazyLock;

use regex::Regex;

use super::args::strip_comment;

static DO_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdo\s*(?:\|[^|]*\|)?\s*$").expect("valid regex"));

static KEYWORD_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:if|unless|while|until|case|begin|def|class|module|for)\b").expect("valid regex")
});

static TRAILING_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s;)])end\s*$").expect("valid regex"));

/// Whether the code of a line opens a block closed by `end`.
pub fn opens_block(code: &str) -> bool {
    let code = code.trim();
    !code.is_empty() && (DO_OPENER.is_match(code) || KEYWORD_OPENER.is_match(code))
}

/// Whether the code of a line starts with the `end` keyword.
pub fn starts_with_end(code: &str) -> bool {
    let code = code.trim_start();
    match code.strip_prefix("end") {
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    }
}

/// Net change in block depth caused by a line.
///
/// Trailing comments are ignored. One-line blocks (`def x; end`) net to
/// zero.
pub fn block_delta(line: &str) -> i32 {
    let code = strip_comment(line).trim();
    if code.is_empty() {
        return 0;
    }

    if starts_with_end(code) {
        return -1;
    }

    if opens_block(code) {
        if TRAILING_END.is_match(code) {
            0
        } else {
            1
        }
    } else {
        0
    }
}

/// Find the line closing the block opened on `start`.
///
/// Returns `None` when the block is never closed.
pub fn matching_end<'a, I>(lines: I, start: usize) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut depth = 1i32;
    for (idx, line) in lines.into_iter().enumerate().skip(start + 1) {
        depth += block_delta(line);
        if depth <= 0 {
            return Some(idx);
        }
    }
    None
}
