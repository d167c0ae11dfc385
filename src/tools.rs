//! File-level operations on manifests
//!
//! [`ManifestTools`] is the entry point for callers: it validates input,
//! reads the manifest, runs a text edit from [`crate::edit`] and writes the
//! result back once. [`ToolRequest`] and [`ToolResponse`] are the JSON
//! shapes used by the `exec` subcommand and by any transport in front of
//! it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::edit::{self, DeclarationOptions, EditStyle, PinOperator, QuoteStyle};
use crate::error::{ErrorCategory, ManifestError};
use crate::file_types::ManifestKind;
use crate::parsers::{DEVELOPMENT_GROUP, ManifestDocument, RequireOption, parse_manifest};
use crate::validation;

/// Result of an edit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Whether the file was rewritten
    pub changed: bool,
    /// Absolute path of the manifest
    pub path: PathBuf,
    /// One-line summary for the caller
    pub message: String,
}

/// Reads and edits manifests on disk.
#[derive(Debug, Clone, Default)]
pub struct ManifestTools {
    config: Config,
    base_dir: Option<PathBuf>,
}

impl ManifestTools {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            base_dir: None,
        }
    }

    /// Resolve relative paths against `dir` instead of the working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute path for a caller-supplied path.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        let joined = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        };
        std::path::absolute(&joined).unwrap_or(joined)
    }

    /// Parse a manifest into its declarations.
    pub fn read(
        &self,
        path: &Path,
        kind: Option<ManifestKind>,
    ) -> Result<ManifestDocument, ManifestError> {
        let (path, content) = self.load(path)?;
        let kind = ManifestKind::resolve(&path, &content, kind);
        let document = parse_manifest(kind, &content).with_path(&path);

        tracing::debug!(
            "Read {} declarations from {}",
            document.declarations.len(),
            path.display()
        );
        Ok(document)
    }

    /// Set the version constraint of `name`.
    pub fn pin(
        &self,
        path: &Path,
        name: &str,
        version: &str,
        operator: Option<PinOperator>,
        quote: Option<QuoteStyle>,
    ) -> Result<EditOutcome, ManifestError> {
        validation::gem_name(name)?;
        validation::version(version, operator)?;

        let (path, content) = self.load(path)?;
        let kind = ManifestKind::resolve(&path, &content, None);
        let constraint = edit::format::version_constraint(version, operator);

        let edit = edit::pin(&content, kind, name, &constraint, self.style(kind, quote))
            .map_err(|e| ManifestError::from_edit(e, &path))?;
        let changed = store(&path, &content, &edit.text)?;

        let message = format!("Pinned {name} to {constraint} in {}", path.display());
        tracing::info!("{message}");
        Ok(EditOutcome {
            changed,
            path,
            message,
        })
    }

    /// Remove the version constraint of `name`.
    pub fn unpin(&self, path: &Path, name: &str) -> Result<EditOutcome, ManifestError> {
        validation::gem_name(name)?;

        let (path, content) = self.load(path)?;
        let kind = ManifestKind::resolve(&path, &content, None);

        let edit = edit::unpin(&content, kind, name)
            .map_err(|e| ManifestError::from_edit(e, &path))?;
        let Some(edit) = edit else {
            let message = format!("{name} has no version constraint in {}", path.display());
            tracing::debug!("{message}");
            return Ok(EditOutcome {
                changed: false,
                path,
                message,
            });
        };

        let changed = store(&path, &content, &edit.text)?;
        let message = format!("Unpinned {name} in {}", path.display());
        tracing::info!("{message}");
        Ok(EditOutcome {
            changed,
            path,
            message,
        })
    }

    /// Add a `gem` statement to a Gemfile.
    pub fn add_declaration(
        &self,
        path: &Path,
        name: &str,
        opts: &DeclarationOptions,
        quote: Option<QuoteStyle>,
    ) -> Result<EditOutcome, ManifestError> {
        validate_options(name, opts)?;

        let (path, content) = self.load(path)?;
        require_kind(&path, &content, ManifestKind::Gemfile)?;

        let style = self.style(ManifestKind::Gemfile, quote);
        let edit = edit::add_declaration(&content, name, opts, style)
            .map_err(|e| ManifestError::from_edit(e, &path))?;
        let changed = store(&path, &content, &edit.text)?;

        let message = if opts.groups.is_empty() {
            format!("Added {name} to {}", path.display())
        } else {
            format!(
                "Added {name} to group {} in {}",
                opts.groups.join(", "),
                path.display()
            )
        };
        tracing::info!("{message}");
        Ok(EditOutcome {
            changed,
            path,
            message,
        })
    }

    /// Add a dependency statement to a gemspec.
    ///
    /// A `development` entry in `opts.groups` writes
    /// `add_development_dependency`; other group, platform, source and
    /// require options have no gemspec spelling and are ignored.
    pub fn add_dependency(
        &self,
        path: &Path,
        name: &str,
        opts: &DeclarationOptions,
        quote: Option<QuoteStyle>,
    ) -> Result<EditOutcome, ManifestError> {
        validate_options(name, opts)?;

        let (path, content) = self.load(path)?;
        require_kind(&path, &content, ManifestKind::Gemspec)?;

        let style = self.style(ManifestKind::Gemspec, quote);
        let edit = edit::add_dependency(&content, name, opts, style)
            .map_err(|e| ManifestError::from_edit(e, &path))?;
        let changed = store(&path, &content, &edit.text)?;

        let kind = if opts.groups.iter().any(|g| g == DEVELOPMENT_GROUP) {
            "development dependency"
        } else {
            "dependency"
        };
        let message = format!("Added {kind} {name} to {}", path.display());
        tracing::info!("{message}");
        Ok(EditOutcome {
            changed,
            path,
            message,
        })
    }

    /// Run one request and fold the result into a response.
    pub fn execute(&self, request: ToolRequest) -> ToolResponse {
        let result = match request {
            ToolRequest::Read { path, kind } => self.read(&path, kind).map(|document| {
                let resolved = document.path.clone().unwrap_or(path);
                let message = format!(
                    "Read {} declarations from {}",
                    document.declarations.len(),
                    resolved.display()
                );
                ToolResponse::success(message, Some(document))
            }),
            ToolRequest::Pin {
                path,
                name,
                version,
                pin_operator,
                quote_style,
            } => self
                .pin(&path, &name, &version, pin_operator, quote_style)
                .map(ToolResponse::from),
            ToolRequest::Unpin { path, name } => self.unpin(&path, &name).map(ToolResponse::from),
            ToolRequest::AddDependency {
                path,
                name,
                version,
                pin_operator,
                development,
                quote_style,
            } => {
                let opts = DeclarationOptions {
                    version,
                    operator: pin_operator,
                    groups: if development {
                        vec![DEVELOPMENT_GROUP.to_string()]
                    } else {
                        Vec::new()
                    },
                    ..Default::default()
                };
                self.add_dependency(&path, &name, &opts, quote_style)
                    .map(ToolResponse::from)
            }
            ToolRequest::AddDeclaration {
                path,
                name,
                version,
                pin_operator,
                groups,
                platforms,
                source,
                require_option,
                quote_style,
            } => {
                let opts = DeclarationOptions {
                    version,
                    operator: pin_operator,
                    groups,
                    platforms,
                    source,
                    require: require_option,
                };
                self.add_declaration(&path, &name, &opts, quote_style)
                    .map(ToolResponse::from)
            }
        };

        result.unwrap_or_else(ToolResponse::from)
    }

    /// Parse a JSON request and run it.
    pub fn execute_json(&self, input: &str) -> ToolResponse {
        match serde_json::from_str::<ToolRequest>(input) {
            Ok(request) => self.execute(request),
            Err(e) => ManifestError::invalid("request", e.to_string()).into(),
        }
    }

    fn style(&self, kind: ManifestKind, quote: Option<QuoteStyle>) -> EditStyle<'_> {
        EditStyle {
            quote,
            default_quote: self.config.default_quote(kind),
            indent: &self.config.formatting.indent,
        }
    }

    fn load(&self, path: &Path) -> Result<(PathBuf, String), ManifestError> {
        let path = self.resolve_path(path);
        let metadata = fs::metadata(&path).map_err(|e| ManifestError::from_io(e, &path))?;
        if !metadata.is_file() {
            return Err(ManifestError::NotAFile { path });
        }
        let content = fs::read_to_string(&path).map_err(|e| ManifestError::from_io(e, &path))?;
        Ok((path, content))
    }
}

fn validate_options(name: &str, opts: &DeclarationOptions) -> Result<(), ManifestError> {
    validation::gem_name(name)?;
    if let Some(version) = opts.version.as_deref() {
        validation::version(version, opts.operator)?;
    } else if opts.operator.is_some() {
        return Err(ManifestError::invalid(
            "pinOperator",
            "an operator needs a version",
        ));
    }
    validation::symbol_names("groups", &opts.groups)?;
    validation::symbol_names("platforms", &opts.platforms)?;
    if let Some(source) = opts.source.as_deref() {
        validation::plain_text("source", source)?;
    }
    if let Some(RequireOption::Path(path)) = &opts.require {
        validation::plain_text("requireOption", path)?;
    }
    Ok(())
}

fn require_kind(path: &Path, content: &str, expected: ManifestKind) -> Result<(), ManifestError> {
    let actual = ManifestKind::resolve(path, content, None);
    if actual == expected {
        Ok(())
    } else {
        Err(ManifestError::WrongKind {
            path: path.to_path_buf(),
            expected,
            actual,
        })
    }
}

/// Write `new` over `old` unless they are equal. Returns whether it wrote.
fn store(path: &Path, old: &str, new: &str) -> Result<bool, ManifestError> {
    if old == new {
        tracing::debug!("{} unchanged, skipping write", path.display());
        return Ok(false);
    }
    fs::write(path, new).map_err(|e| ManifestError::from_io(e, path))?;
    Ok(true)
}

/// A request as received over JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ToolRequest {
    Read {
        path: PathBuf,
        #[serde(default)]
        kind: Option<ManifestKind>,
    },
    Pin {
        path: PathBuf,
        name: String,
        version: String,
        #[serde(default)]
        pin_operator: Option<PinOperator>,
        #[serde(default)]
        quote_style: Option<QuoteStyle>,
    },
    Unpin {
        path: PathBuf,
        name: String,
    },
    AddDependency {
        path: PathBuf,
        name: String,
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        pin_operator: Option<PinOperator>,
        #[serde(default)]
        development: bool,
        #[serde(default)]
        quote_style: Option<QuoteStyle>,
    },
    AddDeclaration {
        path: PathBuf,
        name: String,
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        pin_operator: Option<PinOperator>,
        #[serde(default)]
        groups: Vec<String>,
        #[serde(default)]
        platforms: Vec<String>,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        require_option: Option<RequireOption>,
        #[serde(default)]
        quote_style: Option<QuoteStyle>,
    },
}

/// Response sent back for a [`ToolRequest`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<ManifestDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorCategory>,
    /// Variant name of the error, finer than `error_kind`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl ToolResponse {
    pub fn success(message: String, document: Option<ManifestDocument>) -> Self {
        Self {
            success: true,
            message,
            document,
            error_kind: None,
            error_code: None,
        }
    }
}

impl From<EditOutcome> for ToolResponse {
    fn from(outcome: EditOutcome) -> Self {
        Self::success(outcome.message, None)
    }
}

impl From<ManifestError> for ToolResponse {
    fn from(err: ManifestError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            document: None,
            error_kind: Some(err.category()),
            error_code: Some(err.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_manifest(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_relative_path_uses_base_dir() {
        let tools = ManifestTools::default().with_base_dir("/srv/app");
        assert_eq!(
            tools.resolve_path(Path::new("Gemfile")),
            PathBuf::from("/srv/app/Gemfile")
        );
        assert_eq!(
            tools.resolve_path(Path::new("/other/Gemfile")),
            PathBuf::from("/other/Gemfile")
        );
    }

    #[test]
    fn test_pin_message_names_constraint() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "Gemfile", "gem 'rails'\n");

        let outcome = ManifestTools::default()
            .pin(&path, "rails", "7.1", Some(PinOperator::Pessimistic), None)
            .unwrap();
        assert!(outcome.changed);
        assert!(outcome.message.starts_with("Pinned rails to ~> 7.1 in "));
        assert_eq!(fs::read_to_string(&path).unwrap(), "gem 'rails', '~> 7.1'\n");
    }

    #[test]
    fn test_validation_before_io() {
        let tools = ManifestTools::default();
        let err = tools
            .pin(Path::new("/does/not/exist"), "bad name", "1.0", None, None)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InputValidation);

        let opts = DeclarationOptions {
            operator: Some(PinOperator::AtLeast),
            ..Default::default()
        };
        let err = tools
            .add_declaration(Path::new("/does/not/exist"), "rails", &opts, None)
            .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::InvalidInput {
                field: "pinOperator",
                ..
            }
        ));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ManifestTools::default()
            .read(dir.path(), None)
            .unwrap_err();
        assert!(matches!(err, ManifestError::NotAFile { .. }));
    }

    #[test]
    fn test_wrong_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            "demo.gemspec",
            "Gem::Specification.new do |s|\nend\n",
        );
        let err = ManifestTools::default()
            .add_declaration(&path, "rails", &DeclarationOptions::default(), None)
            .unwrap_err();
        assert!(matches!(err, ManifestError::WrongKind { .. }));
    }

    #[test]
    fn test_request_deserialization() {
        let request: ToolRequest = serde_json::from_value(json!({
            "operation": "addDeclaration",
            "path": "Gemfile",
            "name": "rspec-rails",
            "version": "6.1",
            "pinOperator": "~>",
            "groups": ["development", "test"],
            "requireOption": false,
            "quoteStyle": "double"
        }))
        .unwrap();

        assert_eq!(
            request,
            ToolRequest::AddDeclaration {
                path: PathBuf::from("Gemfile"),
                name: "rspec-rails".to_string(),
                version: Some("6.1".to_string()),
                pin_operator: Some(PinOperator::Pessimistic),
                groups: vec!["development".to_string(), "test".to_string()],
                platforms: Vec::new(),
                source: None,
                require_option: Some(RequireOption::Disabled),
                quote_style: Some(QuoteStyle::Double),
            }
        );
    }

    #[test]
    fn test_require_true_is_rejected() {
        let response = ManifestTools::default().execute_json(
            r#"{"operation":"addDeclaration","path":"Gemfile","name":"x","requireOption":true}"#,
        );
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorCategory::InputValidation));
    }

    #[test]
    fn test_error_response_shape() {
        let response = ToolResponse::from(ManifestError::FileNotFound {
            path: PathBuf::from("/app/Gemfile"),
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "message": "file not found: `/app/Gemfile`",
                "errorKind": "fileAccess",
                "errorCode": "FileNotFound"
            })
        );
    }
}
