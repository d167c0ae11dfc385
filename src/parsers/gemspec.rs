//! Parser for `*.gemspec` files
//!
//! Gemspecs have no nesting that matters for dependencies: each line is
//! tested on its own for a dependency statement or a
//! `required_ruby_version` assignment.

use std::sync::LazyLock;

use regex::Regex;

use super::args::{quoted_at, strip_comment};
use super::statement::DeclarationStatement;
use super::{
    DEVELOPMENT_GROUP, GemDeclaration, ManifestDocument, Parser, join_versions, leading_versions,
};
use crate::file_types::ManifestKind;

static RUBY_VERSION_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[A-Za-z_]\w*\.required_ruby_version\s*=\s*(.+)$").expect("valid regex")
});

/// Parser for gemspec dependency files
#[derive(Debug, Default)]
pub struct GemspecParser;

impl GemspecParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for GemspecParser {
    fn parse(&self, content: &str) -> ManifestDocument {
        let mut doc = ManifestDocument::new(ManifestKind::Gemspec);

        for (line_idx, line) in content.lines().enumerate() {
            let code = strip_comment(line);
            if code.trim().is_empty() {
                continue;
            }

            if let Some(stmt) = DeclarationStatement::parse(line, ManifestKind::Gemspec) {
                let mut decl = GemDeclaration::new(stmt.name, line_idx as u32);
                let args = super::args::split_args(stmt.arguments());
                let (versions, _) = leading_versions(&args);
                decl.version_requirement = join_versions(versions);
                if stmt.development {
                    decl.groups.push(DEVELOPMENT_GROUP.to_string());
                }
                doc.declarations.push(decl);
                continue;
            }

            if let Some(caps) = RUBY_VERSION_ASSIGN.captures(code)
                && let Some(value) = caps.get(1)
            {
                doc.language_version = join_versions(quoted_strings(value.as_str()));
            }
        }

        doc
    }
}

/// Every quoted string in `s`, in order.
///
/// Covers `'>= 3.0'`, `['>= 3.0', '< 4']` and
/// `Gem::Requirement.new('>= 3.0')` alike.
fn quoted_strings(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < s.len() {
        let Some(offset) = s[idx..].find(['\'', '"']) else {
            break;
        };
        let start = idx + offset;
        match quoted_at(s, start) {
            Some(q) => {
                out.push(q.value.to_string());
                idx = q.end;
            }
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEMSPEC: &str = r#"# frozen_string_literal: true

require_relative "lib/my_gem/version"

Gem::Specification.new do |spec|
  spec.name = "my_gem"
  spec.version = MyGem::VERSION
  spec.required_ruby_version = ">= 3.0.0"

  spec.add_dependency "activesupport", ">= 6.1", "< 8"
  spec.add_runtime_dependency "zeitwerk", "~> 2.6"
  spec.add_dependency "rack"

  spec.add_development_dependency "rspec", "~> 3.12"
  # spec.add_dependency "commented_out"
end
"#;

    #[test]
    fn test_parse_gemspec() {
        let doc = GemspecParser::new().parse(GEMSPEC);

        assert_eq!(doc.kind, ManifestKind::Gemspec);
        assert_eq!(doc.language_version.as_deref(), Some(">= 3.0.0"));
        assert!(doc.default_source.is_none());
        assert_eq!(doc.declarations.len(), 4);

        let active = doc.find("activesupport").unwrap();
        assert_eq!(active.version_requirement.as_deref(), Some(">= 6.1, < 8"));
        assert!(!active.is_development());
        assert_eq!(active.line, 9);

        let zeitwerk = doc.find("zeitwerk").unwrap();
        assert_eq!(zeitwerk.version_requirement.as_deref(), Some("~> 2.6"));

        assert!(doc.find("rack").unwrap().version_requirement.is_none());

        let rspec = doc.find("rspec").unwrap();
        assert!(rspec.is_development());
        assert_eq!(rspec.groups, vec![DEVELOPMENT_GROUP.to_string()]);

        assert!(doc.find("commented_out").is_none());
    }

    #[test]
    fn test_array_and_parenthesized_forms() {
        let content = "s.add_dependency('nokogiri', ['>= 1.13', '< 2'])\n";
        let doc = GemspecParser::new().parse(content);

        assert_eq!(
            doc.declarations[0].version_requirement.as_deref(),
            Some(">= 1.13, < 2")
        );
    }

    #[test]
    fn test_requirement_object() {
        let content = "s.required_ruby_version = Gem::Requirement.new('>= 2.7', '< 4')\n";
        let doc = GemspecParser::new().parse(content);
        assert_eq!(doc.language_version.as_deref(), Some(">= 2.7, < 4"));
    }

    #[test]
    fn test_empty_gemspec() {
        let doc = GemspecParser::new().parse("");
        assert!(doc.declarations.is_empty());
        assert!(doc.language_version.is_none());
    }
}
