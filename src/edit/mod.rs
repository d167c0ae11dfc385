//! Text-level edits to Gemfiles and gemspecs
//!
//! Edits work line by line on the raw text. Lines outside the edited range
//! are carried through byte for byte, including comments, blank lines and
//! line terminators.

pub mod format;
pub mod lines;
pub mod locate;
pub mod mutate;
pub mod quote;

use std::ops::Range;

use thiserror::Error;

pub use format::{DeclarationOptions, PinOperator};
pub use mutate::{EditStyle, add_declaration, add_dependency, pin, unpin};
pub use quote::QuoteStyle;

use lines::LineBuffer;

/// Why an edit could not be applied to the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no declaration of `{name}`")]
    DeclarationNotFound { name: String },

    #[error("`{name}` is already declared")]
    AlreadyDeclared { name: String },

    #[error("no `Gem::Specification.new` block")]
    NoSpecificationBlock,

    /// Arguments continue past the end of the declaration line
    #[error("the declaration of `{name}` spans several lines")]
    MultiLineDeclaration { name: String },
}

/// The full text after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub text: String,
    /// Lines of `text` that were written by the edit (0-based)
    pub lines: Range<usize>,
}

impl Edit {
    fn new(buf: LineBuffer<'_>, lines: Range<usize>) -> Self {
        Self {
            text: buf.into_string(),
            lines,
        }
    }
}
