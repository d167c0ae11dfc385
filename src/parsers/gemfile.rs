//! Parser for Bundler Gemfiles
//!
//! Single forward pass over the lines. Supports:
//! - `gem` declarations with version constraints and options
//! - `group`, `platforms`, `source`, `git` and `path` blocks
//! - `source` and `ruby` statements

use std::sync::LazyLock;

use regex::Regex;

use super::args::{ArgValue, parse_name_list, parse_pair, parse_value, split_args, strip_comment};
use super::blocks::{block_delta, starts_with_end};
use super::statement::DeclarationStatement;
use super::{GemDeclaration, ManifestDocument, Parser, RequireOption, join_versions, leading_versions};
use crate::file_types::ManifestKind;

/// Gem server that legacy `source :rubygems` statements point to
pub const RUBYGEMS_URL: &str = "https://rubygems.org";

static DO_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\bdo\s*(?:\|[^|]*\|)?\s*$").expect("valid regex"));

/// Parser for Gemfile dependency files
#[derive(Debug, Default)]
pub struct GemfileParser;

impl GemfileParser {
    pub fn new() -> Self {
        Self
    }
}

/// A block the scanner is currently inside.
#[derive(Debug, Clone, PartialEq)]
enum Frame {
    Group(Vec<String>),
    Platforms(Vec<String>),
    Source(String),
    /// `if`, `install_if`, `env` and other blocks that do not scope gems
    Other,
}

/// Context threaded through the scan.
#[derive(Debug, Default)]
struct ScanContext {
    frames: Vec<Frame>,
    current_source: Option<String>,
}

impl ScanContext {
    fn groups(&self) -> Vec<String> {
        let mut groups = Vec::new();
        for frame in &self.frames {
            if let Frame::Group(names) = frame {
                extend_unique(&mut groups, names.iter().cloned());
            }
        }
        groups
    }

    fn platforms(&self) -> Vec<String> {
        let mut platforms = Vec::new();
        for frame in &self.frames {
            if let Frame::Platforms(names) = frame {
                extend_unique(&mut platforms, names.iter().cloned());
            }
        }
        platforms
    }

    fn block_source(&self) -> Option<&str> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Source(source) => Some(source.as_str()),
            _ => None,
        })
    }
}

impl Parser for GemfileParser {
    fn parse(&self, content: &str) -> ManifestDocument {
        let mut doc = ManifestDocument::new(ManifestKind::Gemfile);
        doc.declarations.reserve(32);
        let mut ctx = ScanContext::default();

        for (line_idx, line) in content.lines().enumerate() {
            let line_num = line_idx as u32;
            let code = strip_comment(line).trim();

            // Skip comments and empty lines
            if code.is_empty() {
                continue;
            }

            if let Some((args, _)) = block_call(code, &["ruby"]) {
                if let Some(ArgValue::Str(version)) = split_args(args).first().map(|a| parse_value(a)) {
                    doc.language_version = Some(version);
                }
                continue;
            }

            if let Some((args, opens)) = block_call(code, &["source"]) {
                let Some(url) = split_args(args).first().and_then(|a| source_url(a)) else {
                    if opens {
                        ctx.frames.push(Frame::Other);
                    }
                    continue;
                };
                if opens {
                    ctx.frames.push(Frame::Source(url));
                } else {
                    if doc.default_source.is_none() {
                        doc.default_source = Some(url.clone());
                    }
                    ctx.current_source = Some(url);
                }
                continue;
            }

            if let Some((args, true)) = block_call(code, &["group"]) {
                ctx.frames.push(Frame::Group(parse_name_list(args)));
                continue;
            }

            if let Some((args, true)) = block_call(code, &["platforms", "platform"]) {
                ctx.frames.push(Frame::Platforms(parse_name_list(args)));
                continue;
            }

            if let Some((args, true)) = block_call(code, &["git", "path", "github"]) {
                let source = split_args(args)
                    .first()
                    .and_then(|a| parse_value(a).as_text().map(str::to_string))
                    .map(|s| {
                        if code.starts_with("github") {
                            github_url(&s)
                        } else {
                            s
                        }
                    });
                ctx.frames.push(source.map_or(Frame::Other, Frame::Source));
                continue;
            }

            if starts_with_end(code) {
                ctx.frames.pop();
                continue;
            }

            if let Some(stmt) = DeclarationStatement::parse(line, ManifestKind::Gemfile) {
                let decl = parse_gem_declaration(&stmt, line_num, &ctx, doc.default_source.as_deref());
                doc.declarations.push(decl);
                continue;
            }

            if block_delta(code) > 0 {
                ctx.frames.push(Frame::Other);
            }
        }

        doc
    }
}

/// Match `keyword args [do |x|]` or `keyword(args) [do]`.
///
/// Returns the argument text and whether the statement opens a block.
pub(crate) fn block_call<'a>(code: &'a str, keywords: &[&str]) -> Option<(&'a str, bool)> {
    let rest = keywords.iter().find_map(|kw| {
        code.strip_prefix(kw)
            .filter(|rest| rest.is_empty() || rest.starts_with([' ', '\t', '(']))
    })?;

    let (args, opens) = match DO_SUFFIX.find(rest) {
        Some(m) => (&rest[..m.start()], true),
        None => (rest, false),
    };

    let args = args.trim();
    let args = args
        .strip_prefix('(')
        .and_then(|a| a.strip_suffix(')'))
        .unwrap_or(args);
    Some((args, opens))
}

/// Parse the group names of a `group ... do` line.
pub(crate) fn group_opening(line: &str) -> Option<Vec<String>> {
    let code = strip_comment(line).trim();
    match block_call(code, &["group"]) {
        Some((args, true)) => Some(parse_name_list(args)),
        _ => None,
    }
}

fn source_url(arg: &str) -> Option<String> {
    match parse_value(arg) {
        ArgValue::Str(url) => Some(url),
        // `source :rubygems` and friends from Bundler 1.x
        ArgValue::Symbol(_) => Some(RUBYGEMS_URL.to_string()),
        _ => None,
    }
}

fn github_url(repo: &str) -> String {
    if repo.contains('/') {
        format!("https://github.com/{repo}.git")
    } else {
        format!("https://github.com/{repo}/{repo}.git")
    }
}

fn parse_gem_declaration(
    stmt: &DeclarationStatement<'_>,
    line_num: u32,
    ctx: &ScanContext,
    default_source: Option<&str>,
) -> GemDeclaration {
    let mut decl = GemDeclaration::new(stmt.name, line_num);
    let args = split_args(stmt.arguments());
    let (versions, consumed) = leading_versions(&args);
    decl.version_requirement = join_versions(versions);

    let mut groups = ctx.groups();
    let mut platforms = ctx.platforms();
    let mut explicit_source: Option<String> = None;

    for arg in &args[consumed..] {
        let Some((key, value)) = parse_pair(arg) else {
            continue;
        };
        match key.as_str() {
            "platform" | "platforms" => extend_unique(&mut platforms, value.to_names()),
            "group" | "groups" => extend_unique(&mut groups, value.to_names()),
            "source" | "git" | "path" if explicit_source.is_none() => {
                explicit_source = value.as_text().map(str::to_string);
            }
            "github" if explicit_source.is_none() => {
                explicit_source = value.as_text().map(github_url);
            }
            "require" => {
                decl.require_option = match value {
                    ArgValue::Bool(false) | ArgValue::Nil => Some(RequireOption::Disabled),
                    ArgValue::Str(path) => Some(RequireOption::Path(path)),
                    _ => None,
                };
            }
            _ => {}
        }
    }

    decl.source = explicit_source
        .or_else(|| ctx.block_source().map(str::to_string))
        .or_else(|| {
            ctx.current_source
                .as_deref()
                .filter(|current| Some(*current) != default_source)
                .map(str::to_string)
        });
    decl.groups = groups;
    decl.platforms = platforms;
    decl
}

fn extend_unique(target: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}
