//! Splitting a dependency declaration line into its parts
//!
//! ```text
//! "  gem 'rails', '~> 7.0', require: false # web"
//!  ^^ ^^^^ ^^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//!  |  |    |     rest
//!  |  |    name (quoted)
//!  |  keyword
//!  indent
//! ```
//!
//! Rewriting a declaration only ever replaces the start of `rest`, so
//! everything after the version constraints is carried over verbatim.

use std::sync::LazyLock;

use regex::Regex;

use super::args::{Quoted, quoted_at};
use crate::file_types::ManifestKind;

static GEM_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(gem\b\s*(\()?\s*)").expect("valid regex"));

static SPEC_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\s*)(([A-Za-z_]\w*)\.add_(runtime_|development_)?dependency\b\s*(\()?\s*)",
    )
    .expect("valid regex")
});

/// A dependency declaration split into its textual parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationStatement<'a> {
    /// Leading whitespace
    pub indent: &'a str,
    /// Keyword clause up to the opening quote (`gem `, `spec.add_dependency(`)
    pub keyword: &'a str,
    /// Receiver of a gemspec statement (`spec` in `spec.add_dependency`)
    pub receiver: Option<&'a str>,
    /// Quote character around the name
    pub quote: char,
    /// Gem name without quotes
    pub name: &'a str,
    /// Everything after the closing quote of the name
    pub rest: &'a str,
    /// The argument list is wrapped in parentheses
    pub parenthesized: bool,
    /// `add_development_dependency`
    pub development: bool,
}

impl<'a> DeclarationStatement<'a> {
    /// Parse a line as a declaration of the given manifest kind.
    pub fn parse(line: &'a str, kind: ManifestKind) -> Option<Self> {
        match kind {
            ManifestKind::Gemfile => Self::parse_gem(line),
            ManifestKind::Gemspec => Self::parse_spec(line),
        }
    }

    fn parse_gem(line: &'a str) -> Option<Self> {
        let caps = GEM_KEYWORD.captures(line)?;
        let indent = caps.get(1)?.as_str();
        let keyword = caps.get(2)?;
        let parenthesized = caps.get(3).is_some();
        Self::finish(line, indent, keyword.as_str(), None, parenthesized, false)
    }

    fn parse_spec(line: &'a str) -> Option<Self> {
        let caps = SPEC_KEYWORD.captures(line)?;
        let indent = caps.get(1)?.as_str();
        let keyword = caps.get(2)?;
        let receiver = caps.get(3).map(|m| m.as_str());
        let development = caps
            .get(4)
            .is_some_and(|m| m.as_str() == "development_");
        let parenthesized = caps.get(5).is_some();
        Self::finish(
            line,
            indent,
            keyword.as_str(),
            receiver,
            parenthesized,
            development,
        )
    }

    fn finish(
        line: &'a str,
        indent: &'a str,
        keyword: &'a str,
        receiver: Option<&'a str>,
        parenthesized: bool,
        development: bool,
    ) -> Option<Self> {
        let name_start = indent.len() + keyword.len();
        let Quoted { value, quote, end } = quoted_at(line, name_start)?;
        if value.is_empty() || value.contains("#{") {
            return None;
        }

        Some(Self {
            indent,
            keyword,
            receiver,
            quote,
            name: value,
            rest: &line[end..],
            parenthesized,
            development,
        })
    }

    /// The line up to and including the quoted name.
    pub fn head(&self) -> String {
        format!("{}{}{q}{}{q}", self.indent, self.keyword, self.name, q = self.quote)
    }

    /// Argument text after the name, without closing parenthesis or comment.
    pub fn arguments(&self) -> &'a str {
        let rest = super::args::strip_comment(self.rest);
        let rest = if self.parenthesized {
            match super::args::closing_paren(rest) {
                Some(idx) => &rest[..idx],
                None => rest,
            }
        } else {
            rest
        };
        rest.trim_start().strip_prefix(',').unwrap_or(rest)
    }
}
