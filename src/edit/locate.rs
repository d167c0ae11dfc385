//! Finding declarations and block boundaries in manifest text

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::file_types::ManifestKind;
use crate::parsers::args::strip_comment;
use crate::parsers::blocks::matching_end;
use crate::parsers::gemfile::group_opening;
use crate::parsers::statement::DeclarationStatement;

static SPEC_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*).*\bGem::Specification\.new\b.*\bdo\s*(?:\|\s*([A-Za-z_]\w*)\s*\|)?\s*$")
        .expect("valid regex")
});

/// A `group ... do ... end` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBlockSpan {
    pub group_names: Vec<String>,
    /// Line of the `group` statement
    pub start_line: usize,
    /// Line of the matching `end`
    pub end_line: usize,
    /// Leading whitespace of the `group` line
    pub indentation: String,
}

/// Insertion anchors of a gemspec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecBoundary {
    pub last_dependency_line: Option<usize>,
    pub block_start_line: Option<usize>,
    pub block_end_line: Option<usize>,
    /// Leading whitespace of the `Gem::Specification.new` line
    pub block_indentation: String,
    /// Block parameter (`spec` in `do |spec|`)
    pub receiver: Option<String>,
}

/// First line declaring `name`. Comment and blank lines never match.
pub fn find_declaration_line(text: &str, kind: ManifestKind, name: &str) -> Option<usize> {
    text.lines().position(|line| {
        DeclarationStatement::parse(line, kind).is_some_and(|stmt| stmt.name == name)
    })
}

/// Last line holding any declaration.
pub fn last_declaration_line(text: &str, kind: ManifestKind) -> Option<usize> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| DeclarationStatement::parse(line, kind).is_some())
        .map(|(idx, _)| idx)
        .last()
}

/// Locate the `group` block for exactly `groups` (order-insensitive).
pub fn find_group_block(text: &str, groups: &[String]) -> Option<GroupBlockSpan> {
    let wanted: BTreeSet<&str> = groups.iter().map(String::as_str).collect();
    let lines: Vec<&str> = text.lines().collect();

    for (start, line) in lines.iter().enumerate() {
        let Some(names) = group_opening(line) else {
            continue;
        };
        let found: BTreeSet<&str> = names.iter().map(String::as_str).collect();
        if found != wanted {
            continue;
        }

        let Some(end) = matching_end(lines.iter().copied(), start) else {
            tracing::debug!("group block at line {start} is never closed");
            continue;
        };

        let indentation = &line[..line.len() - line.trim_start().len()];
        return Some(GroupBlockSpan {
            group_names: names,
            start_line: start,
            end_line: end,
            indentation: indentation.to_string(),
        });
    }

    None
}

/// Scan a gemspec for the last dependency line and the end of the
/// `Gem::Specification.new` block.
pub fn find_spec_boundary(text: &str) -> SpecBoundary {
    let lines: Vec<&str> = text.lines().collect();
    let mut boundary = SpecBoundary::default();

    for (idx, line) in lines.iter().enumerate() {
        if DeclarationStatement::parse(line, ManifestKind::Gemspec).is_some() {
            boundary.last_dependency_line = Some(idx);
        }

        if boundary.block_start_line.is_none()
            && let Some(caps) = SPEC_OPENER.captures(strip_comment(line))
        {
            boundary.block_start_line = Some(idx);
            boundary.block_indentation = caps
                .get(1)
                .map_or_else(String::new, |m| m.as_str().to_string());
            boundary.receiver = caps.get(2).map(|m| m.as_str().to_string());
            boundary.block_end_line = matching_end(lines.iter().copied(), idx);
        }
    }

    boundary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_declaration_line() {
        let text = "source 'https://rubygems.org'\n# gem 'rails'\n\ngem 'rails-html'\ngem \"rails\"\ngem 'rails', '7'\n";
        assert_eq!(find_declaration_line(text, ManifestKind::Gemfile, "rails"), Some(4));
        assert_eq!(find_declaration_line(text, ManifestKind::Gemfile, "pg"), None);
    }

    #[test]
    fn test_find_group_block() {
        let text = "gem 'rails'\n\ngroup :development, :test do\n  gem 'rspec'\nend\n";
        let groups = vec!["test".to_string(), "development".to_string()];
        let span = find_group_block(text, &groups).unwrap();
        assert_eq!(span.start_line, 2);
        assert_eq!(span.end_line, 4);
        assert_eq!(span.indentation, "");

        assert!(find_group_block(text, &["test".to_string()]).is_none());
    }

    #[test]
    fn test_find_group_block_nested() {
        let text = r#"group :test do
  gem 'rspec'
  platforms :jruby do
    gem 'jdbc'
  end
  if ENV['CI']
    gem 'ci_reporter'
  end
end
"#;
        let span = find_group_block(text, &["test".to_string()]).unwrap();
        assert_eq!(span.end_line, 8);
    }

    #[test]
    fn test_indented_group_block() {
        let text = "platforms :mri do\n  group :test do\n    gem 'x'\n  end\nend\n";
        let span = find_group_block(text, &["test".to_string()]).unwrap();
        assert_eq!(span.start_line, 1);
        assert_eq!(span.end_line, 3);
        assert_eq!(span.indentation, "  ");
    }

    #[test]
    fn test_find_spec_boundary() {
        let text = r#"Gem::Specification.new do |spec|
  spec.name = "x"
  spec.files = Dir.chdir(__dir__) do
    `git ls-files -z`.split("\x0")
  end
  spec.add_dependency "rack"
end
"#;
        let boundary = find_spec_boundary(text);
        assert_eq!(boundary.block_start_line, Some(0));
        assert_eq!(boundary.last_dependency_line, Some(5));
        assert_eq!(boundary.block_end_line, Some(6));
        assert_eq!(boundary.receiver.as_deref(), Some("spec"));
    }

    #[test]
    fn test_spec_boundary_without_block() {
        let boundary = find_spec_boundary("# nothing here\n");
        assert_eq!(boundary, SpecBoundary::default());
    }
}
