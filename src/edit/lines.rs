//! Line buffer that preserves every line terminator
//!
//! Lines keep their own `\n` / `\r\n` (or nothing, for a final line without
//! one), so lines that are not replaced come back out byte for byte.

use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct LineBuffer<'a> {
    lines: Vec<Cow<'a, str>>,
    newline: &'static str,
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

impl<'a> LineBuffer<'a> {
    pub fn new(text: &'a str) -> Self {
        let lines: Vec<Cow<'a, str>> = text.split_inclusive('\n').map(Cow::Borrowed).collect();
        let newline = match lines.first().map(|l| split_terminator(l).1) {
            Some("\r\n") => "\r\n",
            _ => "\n",
        };
        Self { lines, newline }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line content without its terminator.
    pub fn content(&self, idx: usize) -> &str {
        split_terminator(&self.lines[idx]).0
    }

    pub fn is_blank(&self, idx: usize) -> bool {
        self.content(idx).trim().is_empty()
    }

    /// Index of the first line of the trailing run of blank lines, or
    /// `len()` when the last line is not blank.
    pub fn trailing_blank_start(&self) -> usize {
        let mut idx = self.lines.len();
        while idx > 0 && self.is_blank(idx - 1) {
            idx -= 1;
        }
        idx
    }

    /// Replace the content of a line, keeping its terminator.
    pub fn replace(&mut self, idx: usize, content: &str) {
        let ending = split_terminator(&self.lines[idx]).1;
        let replaced = format!("{content}{ending}");
        self.lines[idx] = Cow::Owned(replaced);
    }

    /// Insert lines before `idx` (`idx == len()` appends).
    ///
    /// When appending after a final line that has no terminator, that line
    /// gets one and the last inserted line is left without, so the file
    /// keeps ending the way it did.
    pub fn insert(&mut self, idx: usize, contents: &[String]) {
        if contents.is_empty() {
            return;
        }

        let unterminated_tail = idx == self.lines.len()
            && self
                .lines
                .last()
                .is_some_and(|l| split_terminator(l).1.is_empty());

        if unterminated_tail && let Some(last) = self.lines.last_mut() {
            last.to_mut().push_str(self.newline);
        }

        let count = contents.len();
        let tail = self.lines.split_off(idx);
        for (i, content) in contents.iter().enumerate() {
            let line = if unterminated_tail && i + 1 == count {
                content.clone()
            } else {
                format!("{content}{}", self.newline)
            };
            self.lines.push(Cow::Owned(line));
        }
        self.lines.extend(tail);
    }

    pub fn into_string(self) -> String {
        self.lines.concat()
    }
}
