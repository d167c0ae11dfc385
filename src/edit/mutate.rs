//! Pin, unpin and insert operations on manifest text
//!
//! Each operation takes the whole file text and returns the whole new
//! text. Only the touched lines differ from the input.

use super::format::{
    DeclarationOptions, format_gem_declaration, format_group_opening, format_spec_declaration,
};
use super::lines::LineBuffer;
use super::locate::{
    find_declaration_line, find_group_block, find_spec_boundary, last_declaration_line,
};
use super::quote::QuoteStyle;
use super::{Edit, EditError};
use crate::file_types::ManifestKind;
use crate::parsers::args::{ArgValue, parse_value, quoted_at, strip_comment};
use crate::parsers::statement::DeclarationStatement;

/// Receiver used when a gemspec gives no hint
const DEFAULT_RECEIVER: &str = "spec";

/// Formatting preferences for one edit.
#[derive(Debug, Clone, Copy)]
pub struct EditStyle<'a> {
    /// Caller override
    pub quote: Option<QuoteStyle>,
    /// Used when neither an override nor an existing line decides
    pub default_quote: QuoteStyle,
    /// One level of indentation
    pub indent: &'a str,
}

/// Replace the version constraint of `name` with `constraint`.
pub fn pin(
    text: &str,
    kind: ManifestKind,
    name: &str,
    constraint: &str,
    style: EditStyle<'_>,
) -> Result<Edit, EditError> {
    let idx = find_declaration_line(text, kind, name).ok_or_else(|| not_found(name))?;
    let mut buf = LineBuffer::new(text);
    let line = buf.content(idx);
    let stmt = DeclarationStatement::parse(line, kind).ok_or_else(|| not_found(name))?;
    ensure_single_line(line, name)?;

    let quote = QuoteStyle::resolve(style.quote, Some(line), style.default_quote);
    let (rest, _) = strip_versions(stmt.rest);
    let new_line = format!("{}, {}{rest}", name_clause(&stmt, quote), quote.wrap(constraint));

    tracing::debug!("pinning {} on line {}: {:?}", name, idx, new_line);
    buf.replace(idx, &new_line);
    Ok(Edit::new(buf, idx..idx + 1))
}

/// Drop the version constraint of `name`.
///
/// Returns `Ok(None)` when the declaration carries no constraint.
pub fn unpin(text: &str, kind: ManifestKind, name: &str) -> Result<Option<Edit>, EditError> {
    let idx = find_declaration_line(text, kind, name).ok_or_else(|| not_found(name))?;
    let mut buf = LineBuffer::new(text);
    let line = buf.content(idx);
    let stmt = DeclarationStatement::parse(line, kind).ok_or_else(|| not_found(name))?;
    ensure_single_line(line, name)?;

    let (rest, stripped) = strip_versions(stmt.rest);
    if !stripped {
        return Ok(None);
    }

    let new_line = format!("{}{rest}", stmt.head());
    buf.replace(idx, &new_line);
    Ok(Some(Edit::new(buf, idx..idx + 1)))
}

/// Insert a `gem` statement into a Gemfile.
///
/// With groups, the gem goes last inside the matching `group` block, or
/// into a new block at the end of the file. Without groups it goes at the
/// end of the file, before any trailing blank lines.
pub fn add_declaration(
    text: &str,
    name: &str,
    opts: &DeclarationOptions,
    style: EditStyle<'_>,
) -> Result<Edit, EditError> {
    if find_declaration_line(text, ManifestKind::Gemfile, name).is_some() {
        return Err(EditError::AlreadyDeclared {
            name: name.to_string(),
        });
    }

    let mut buf = LineBuffer::new(text);

    if !opts.groups.is_empty()
        && let Some(span) = find_group_block(text, &opts.groups)
    {
        let existing = (span.start_line + 1..span.end_line)
            .rev()
            .map(|i| buf.content(i))
            .find(|l| DeclarationStatement::parse(l, ManifestKind::Gemfile).is_some())
            .map(str::to_string)
            .or_else(|| last_gem_line(text, &buf));
        let quote = QuoteStyle::resolve(style.quote, existing.as_deref(), style.default_quote);
        let line = format!(
            "{}{}{}",
            span.indentation,
            style.indent,
            format_gem_declaration(name, opts, quote)
        );

        tracing::debug!("inserting {} into group block ending on line {}", name, span.end_line);
        buf.insert(span.end_line, &[line]);
        return Ok(Edit::new(buf, span.end_line..span.end_line + 1));
    }

    let existing = last_gem_line(text, &buf);
    let quote = QuoteStyle::resolve(style.quote, existing.as_deref(), style.default_quote);
    let declaration = format_gem_declaration(name, opts, quote);
    let at = buf.trailing_blank_start();

    let new_lines = if opts.groups.is_empty() {
        vec![declaration]
    } else {
        let mut block = Vec::with_capacity(4);
        if at > 0 {
            block.push(String::new());
        }
        block.push(format_group_opening(&opts.groups, quote));
        block.push(format!("{}{declaration}", style.indent));
        block.push("end".to_string());
        block
    };

    let count = new_lines.len();
    buf.insert(at, &new_lines);
    Ok(Edit::new(buf, at..at + count))
}

/// Insert an `add_dependency` statement into a gemspec.
pub fn add_dependency(
    text: &str,
    name: &str,
    opts: &DeclarationOptions,
    style: EditStyle<'_>,
) -> Result<Edit, EditError> {
    if find_declaration_line(text, ManifestKind::Gemspec, name).is_some() {
        return Err(EditError::AlreadyDeclared {
            name: name.to_string(),
        });
    }

    let boundary = find_spec_boundary(text);
    let mut buf = LineBuffer::new(text);

    if let Some(last) = boundary.last_dependency_line {
        let anchor = buf.content(last);
        let stmt = DeclarationStatement::parse(anchor, ManifestKind::Gemspec);
        let indent = stmt.map_or("", |s| s.indent).to_string();
        let receiver = stmt
            .and_then(|s| s.receiver)
            .unwrap_or(DEFAULT_RECEIVER)
            .to_string();
        let quote = QuoteStyle::resolve(style.quote, Some(anchor), style.default_quote);
        let line = format!(
            "{indent}{}",
            format_spec_declaration(&receiver, name, opts, quote)
        );

        buf.insert(last + 1, &[line]);
        return Ok(Edit::new(buf, last + 1..last + 2));
    }

    let Some(end) = boundary.block_end_line else {
        return Err(EditError::NoSpecificationBlock);
    };

    let receiver = boundary.receiver.as_deref().unwrap_or(DEFAULT_RECEIVER);
    let quote = QuoteStyle::resolve(style.quote, None, style.default_quote);
    let line = format!(
        "{}{}{}",
        boundary.block_indentation,
        style.indent,
        format_spec_declaration(receiver, name, opts, quote)
    );

    let mut new_lines = Vec::with_capacity(2);
    if end > 0 && !buf.is_blank(end - 1) {
        new_lines.push(String::new());
    }
    new_lines.push(line);

    let count = new_lines.len();
    buf.insert(end, &new_lines);
    Ok(Edit::new(buf, end..end + count))
}

fn not_found(name: &str) -> EditError {
    EditError::DeclarationNotFound {
        name: name.to_string(),
    }
}

/// Version arguments on a continuation line are out of reach of a
/// single-line rewrite, so such declarations are refused.
fn ensure_single_line(line: &str, name: &str) -> Result<(), EditError> {
    let code = strip_comment(line).trim_end();
    if code.ends_with(',') || code.ends_with('\\') {
        return Err(EditError::MultiLineDeclaration {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn last_gem_line(text: &str, buf: &LineBuffer<'_>) -> Option<String> {
    last_declaration_line(text, ManifestKind::Gemfile).map(|i| buf.content(i).to_string())
}

/// Indentation, keyword and name, re-quoted if the style changes.
fn name_clause(stmt: &DeclarationStatement<'_>, quote: QuoteStyle) -> String {
    if stmt.quote == quote.as_char() {
        stmt.head()
    } else {
        format!("{}{}{}", stmt.indent, stmt.keyword, quote.wrap(stmt.name))
    }
}

/// Remove the version arguments at the start of `rest`.
///
/// Version arguments are quoted strings (or arrays of them) directly
/// after the name, each preceded by a comma. Returns the remaining text and
/// whether anything was removed.
fn strip_versions(mut rest: &str) -> (&str, bool) {
    let mut stripped = false;

    loop {
        let Some(after_comma) = rest.trim_start().strip_prefix(',') else {
            break;
        };
        let candidate = after_comma.trim_start();

        let token_len = if let Some(q) = quoted_at(candidate, 0) {
            q.end
        } else if candidate.starts_with('[') {
            match list_end(candidate) {
                Some(end) => end,
                None => break,
            }
        } else {
            break;
        };

        let token = &candidate[..token_len];
        let is_version = match parse_value(token) {
            ArgValue::Str(_) => true,
            ArgValue::List(items) => {
                !items.is_empty() && items.iter().all(|i| matches!(i, ArgValue::Str(_)))
            }
            _ => false,
        };

        let next = candidate[token_len..].trim_start();
        let is_hash_key = (next.starts_with(':') && !next.starts_with("::")) || next.starts_with("=>");
        if !is_version || is_hash_key {
            break;
        }

        rest = &candidate[token_len..];
        stripped = true;
    }

    (rest, stripped)
}

/// Byte index just past the `]` closing the list that starts `s`.
fn list_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        if let Some(q) = quote {
            if b == b'\\' {
                idx += 1;
            } else if b == q {
                quote = None;
            }
        } else {
            match b {
                b'\'' | b'"' => quote = Some(b),
                b'[' => depth += 1,
                b']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(idx + 1);
                    }
                }
                _ => {}
            }
        }
        idx += 1;
    }

    None
}
