//! Error types for manifest reads and edits
//!
//! Every failure is a deterministic function of the input and the file
//! content, so nothing here is retried. Errors fall into three categories:
//!
//! - **Input validation**: malformed names or versions, caught before any I/O
//! - **File access**: missing files, directories, permission problems
//! - **Structural conflicts**: the file content does not allow the edit

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::edit::EditError;
use crate::file_types::ManifestKind;

/// Broad classification of a [`ManifestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    InputValidation,
    FileAccess,
    StructuralConflict,
}

/// Error during a manifest read or edit.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("`{}` is a {actual} manifest, expected a {expected} manifest", path.display())]
    WrongKind {
        path: PathBuf,
        expected: ManifestKind,
        actual: ManifestKind,
    },

    #[error("file not found: `{}`", path.display())]
    FileNotFound { path: PathBuf },

    #[error("not a file: `{}`", path.display())]
    NotAFile { path: PathBuf },

    #[error("permission denied: `{}`", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("gem `{name}` is not declared in `{}`", path.display())]
    DeclarationNotFound { name: String, path: PathBuf },

    #[error("gem `{name}` is already declared in `{}`", path.display())]
    AlreadyExists { name: String, path: PathBuf },

    #[error("no `Gem::Specification.new` block in `{}`", path.display())]
    StructureNotFound { path: PathBuf },

    #[error("gem `{name}` spans several lines in `{}`; edit it by hand", path.display())]
    MultiLineDeclaration { name: String, path: PathBuf },
}

impl ManifestError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Map an I/O failure on `path` to the matching file-access error.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::IsADirectory => Self::NotAFile { path },
            _ => Self::Io { path, source: err },
        }
    }

    /// Attach the manifest path to an error raised by the text mutators.
    pub fn from_edit(err: EditError, path: &Path) -> Self {
        let path = path.to_path_buf();
        match err {
            EditError::DeclarationNotFound { name } => Self::DeclarationNotFound { name, path },
            EditError::AlreadyDeclared { name } => Self::AlreadyExists { name, path },
            EditError::NoSpecificationBlock => Self::StructureNotFound { path },
            EditError::MultiLineDeclaration { name } => Self::MultiLineDeclaration { name, path },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::WrongKind { .. } => ErrorCategory::InputValidation,
            Self::FileNotFound { .. }
            | Self::NotAFile { .. }
            | Self::PermissionDenied { .. }
            | Self::Io { .. } => ErrorCategory::FileAccess,
            Self::DeclarationNotFound { .. }
            | Self::AlreadyExists { .. }
            | Self::StructureNotFound { .. }
            | Self::MultiLineDeclaration { .. } => ErrorCategory::StructuralConflict,
        }
    }

    /// Stable machine-readable name of the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "InvalidInput",
            Self::WrongKind { .. } => "WrongKind",
            Self::FileNotFound { .. } => "FileNotFound",
            Self::NotAFile { .. } => "NotAFile",
            Self::PermissionDenied { .. } => "PermissionDenied",
            Self::Io { .. } => "Io",
            Self::DeclarationNotFound { .. } => "DeclarationNotFound",
            Self::AlreadyExists { .. } => "AlreadyExists",
            Self::StructureNotFound { .. } => "StructureNotFound",
            Self::MultiLineDeclaration { .. } => "MultiLineDeclaration",
        }
    }
}
