//! Manifest kind detection
//!
//! Bundler projects keep dependencies in two shapes of file: a `Gemfile`
//! (one `gem` statement per dependency, optionally inside `group` blocks)
//! and a `*.gemspec` (a single `Gem::Specification.new` block with
//! `add_dependency` statements). This module decides which one a file is.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SPEC_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*(?:Gem::Specification\.new\b|[A-Za-z_]\w*\.add_(?:runtime_|development_)?dependency\b)",
    )
    .expect("valid regex")
});

/// Supported manifest kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    /// List-style manifest (`Gemfile`, `gems.rb`)
    Gemfile,
    /// Specification-style manifest (`*.gemspec`)
    Gemspec,
}

impl ManifestKind {
    /// Detect the manifest kind from a file name.
    ///
    /// Returns `None` when the name does not identify a kind, in which
    /// case [`ManifestKind::sniff`] decides from the content.
    pub fn detect(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_str()?;
        if filename.ends_with(".gemspec") {
            Some(ManifestKind::Gemspec)
        } else if filename == "Gemfile"
            || filename == "gems.rb"
            || filename.ends_with(".gemfile")
            || (filename.starts_with("Gemfile.") && filename != "Gemfile.lock")
        {
            Some(ManifestKind::Gemfile)
        } else {
            None
        }
    }

    /// Guess the kind from file content. Falls back to `Gemfile`.
    pub fn sniff(content: &str) -> Self {
        if SPEC_MARKER.is_match(content) {
            ManifestKind::Gemspec
        } else {
            ManifestKind::Gemfile
        }
    }

    /// Pick the kind for a file: explicit hint, then file name, then content.
    pub fn resolve(path: &Path, content: &str, hint: Option<Self>) -> Self {
        hint.or_else(|| Self::detect(path))
            .unwrap_or_else(|| Self::sniff(content))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ManifestKind::Gemfile => "Gemfile",
            ManifestKind::Gemspec => "gemspec",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
