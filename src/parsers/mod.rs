//! Readers for Ruby dependency manifests (Gemfile, gemspec)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::file_types::ManifestKind;

pub mod args;
pub mod blocks;
pub mod gemfile;
pub mod gemspec;
pub mod statement;

/// Group that gemspec development dependencies are reported under
pub const DEVELOPMENT_GROUP: &str = "development";

/// The `require:` option of a gem declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequire", into = "RawRequire")]
pub enum RequireOption {
    /// `require: false`
    Disabled,
    /// `require: 'custom/path'`
    Path(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawRequire {
    Flag(bool),
    Path(String),
}

impl TryFrom<RawRequire> for RequireOption {
    type Error = String;

    fn try_from(raw: RawRequire) -> Result<Self, Self::Error> {
        match raw {
            RawRequire::Flag(false) => Ok(RequireOption::Disabled),
            RawRequire::Flag(true) => {
                Err("`true` is the default; omit requireOption instead".to_string())
            }
            RawRequire::Path(path) => Ok(RequireOption::Path(path)),
        }
    }
}

impl From<RequireOption> for RawRequire {
    fn from(option: RequireOption) -> Self {
        match option {
            RequireOption::Disabled => RawRequire::Flag(false),
            RequireOption::Path(path) => RawRequire::Path(path),
        }
    }
}

/// One dependency declaration extracted from a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GemDeclaration {
    /// Gem name
    pub name: String,
    /// Version constraint(s), e.g. "~> 7.0" or ">= 1.2, < 2"
    pub version_requirement: Option<String>,
    /// Git URL, filesystem path or gem server, when not the default source
    pub source: Option<String>,
    /// Bundler groups, empty when ungrouped
    pub groups: Vec<String>,
    /// Platforms the gem is restricted to
    pub platforms: Vec<String>,
    /// `require:` option
    pub require_option: Option<RequireOption>,
    /// Line number in the file (0-indexed)
    pub line: u32,
}

impl GemDeclaration {
    pub fn new(name: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            version_requirement: None,
            source: None,
            groups: Vec::new(),
            platforms: Vec::new(),
            require_option: None,
            line,
        }
    }

    pub fn is_development(&self) -> bool {
        self.groups.iter().any(|g| g == DEVELOPMENT_GROUP)
    }
}

/// Structured view of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    pub kind: ManifestKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// `ruby '3.2.2'` or `required_ruby_version = '>= 3.0'`
    pub language_version: Option<String>,
    /// First `source` statement of a Gemfile
    pub default_source: Option<String>,
    /// Declarations in file order
    pub declarations: Vec<GemDeclaration>,
}

impl ManifestDocument {
    pub fn new(kind: ManifestKind) -> Self {
        Self {
            kind,
            path: None,
            language_version: None,
            default_source: None,
            declarations: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// First declaration of `name`.
    pub fn find(&self, name: &str) -> Option<&GemDeclaration> {
        self.declarations.iter().find(|d| d.name == name)
    }
}

/// Trait for parsing manifest files
pub trait Parser: Send + Sync {
    /// Parse the given file content. Never fails; lines that cannot be
    /// understood are skipped.
    fn parse(&self, content: &str) -> ManifestDocument;
}

/// Parse `content` with the parser for `kind`.
pub fn parse_manifest(kind: ManifestKind, content: &str) -> ManifestDocument {
    match kind {
        ManifestKind::Gemfile => gemfile::GemfileParser::new().parse(content),
        ManifestKind::Gemspec => gemspec::GemspecParser::new().parse(content),
    }
}

/// Collect the leading positional version constraints of an argument list.
///
/// Stops at the first argument that is not a quoted string or a list of
/// quoted strings.
fn leading_versions(args: &[&str]) -> (Vec<String>, usize) {
    let mut versions = Vec::new();
    let mut consumed = 0;

    for arg in args {
        match args::parse_value(arg) {
            args::ArgValue::Str(v) => versions.push(v),
            args::ArgValue::List(items)
                if !items.is_empty() && items.iter().all(|i| matches!(i, args::ArgValue::Str(_))) =>
            {
                versions.extend(items.into_iter().filter_map(|i| match i {
                    args::ArgValue::Str(v) => Some(v),
                    _ => None,
                }));
            }
            _ => break,
        }
        consumed += 1;
    }

    (versions, consumed)
}

fn join_versions(versions: Vec<String>) -> Option<String> {
    let versions: Vec<String> = versions
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if versions.is_empty() {
        None
    } else {
        Some(versions.join(", "))
    }
}
