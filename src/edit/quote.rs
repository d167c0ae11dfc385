//! Quote style resolution for rewritten and inserted declarations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::file_types::ManifestKind;
use crate::parsers::statement::DeclarationStatement;

/// Which quote character to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(QuoteStyle::Single),
            '"' => Some(QuoteStyle::Double),
            _ => None,
        }
    }

    /// Wrap `s` in quotes, escaping backslashes and the quote character.
    pub fn wrap(self, s: &str) -> String {
        let q = self.as_char();
        let mut out = String::with_capacity(s.len() + 2);
        out.push(q);
        for c in s.chars() {
            if c == q || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(q);
        out
    }

    /// Detect the style used by an existing declaration line.
    ///
    /// Looks at the character right after the declaration keyword; any
    /// line that is not a declaration yields `None`.
    pub fn detect(line: &str) -> Option<Self> {
        DeclarationStatement::parse(line, ManifestKind::Gemfile)
            .or_else(|| DeclarationStatement::parse(line, ManifestKind::Gemspec))
            .and_then(|stmt| Self::from_char(stmt.quote))
    }

    /// Explicit override, then the style of `existing_line`, then `default`.
    pub fn resolve(explicit: Option<Self>, existing_line: Option<&str>, default: Self) -> Self {
        explicit
            .or_else(|| existing_line.and_then(Self::detect))
            .unwrap_or(default)
    }
}

impl fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteStyle::Single => f.write_str("single"),
            QuoteStyle::Double => f.write_str("double"),
        }
    }
}

impl FromStr for QuoteStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" | "'" => Ok(QuoteStyle::Single),
            "double" | "\"" => Ok(QuoteStyle::Double),
            other => Err(format!("unknown quote style `{other}` (expected single or double)")),
        }
    }
}
