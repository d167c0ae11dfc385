//! Scanning helpers for Ruby call arguments
//!
//! Only the literal subset that shows up in manifests is understood:
//! quoted strings, symbols, booleans, `nil`, bracketed lists and hash
//! pairs written as `key: value` or `:key => value`.

/// A quoted string found in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoted<'a> {
    /// Text between the quotes, escapes left as written
    pub value: &'a str,
    /// The quote character used (`'` or `"`)
    pub quote: char,
    /// Byte index just past the closing quote
    pub end: usize,
}

/// A literal argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Symbol(String),
    List(Vec<ArgValue>),
    Bool(bool),
    Nil,
    /// Anything else (method calls, constants, lambdas...)
    Other(String),
}

impl ArgValue {
    /// String or symbol contents.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) | ArgValue::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Flatten a scalar or list into its textual members.
    pub fn to_names(&self) -> Vec<String> {
        match self {
            ArgValue::List(items) => items
                .iter()
                .filter_map(|item| item.as_text().map(str::to_string))
                .collect(),
            other => other.as_text().map(str::to_string).into_iter().collect(),
        }
    }
}

/// Parse a quoted string starting at `start` (leading blanks are skipped).
pub fn quoted_at(s: &str, start: usize) -> Option<Quoted<'_>> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut idx = start;

    while idx < len && (bytes[idx] == b' ' || bytes[idx] == b'\t') {
        idx += 1;
    }
    if idx >= len {
        return None;
    }

    let quote = bytes[idx];
    if quote != b'\'' && quote != b'"' {
        return None;
    }
    idx += 1;

    let string_start = idx;
    while idx < len && bytes[idx] != quote {
        if bytes[idx] == b'\\' {
            idx += 1;
        }
        idx += 1;
    }
    if idx >= len {
        return None;
    }

    Some(Quoted {
        value: &s[string_start..idx],
        quote: quote as char,
        end: idx + 1,
    })
}

/// Return the code part of a line, without a trailing `#` comment.
pub fn strip_comment(line: &str) -> &str {
    match comment_start(line) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Byte index of the `#` starting a trailing comment, if any.
pub fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    idx += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b'#' => return Some(idx),
                _ => {}
            },
        }
        idx += 1;
    }

    None
}

/// Byte index of the first `)` that closes nothing opened inside `s`.
pub fn closing_paren(s: &str) -> Option<usize> {
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
                b'(' | b'[' | b'{' => depth += 1,
                b')' if depth == 0 => return Some(idx),
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b'#' => return None,
                _ => {}
            }
        }
        idx += 1;
    }

    None
}

/// Split an argument list on top-level commas. Pieces are trimmed and
/// empty pieces dropped.
pub fn split_args(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
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
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    push_arg(&mut args, &s[start..idx]);
                    start = idx + 1;
                }
                _ => {}
            }
        }
        idx += 1;
    }
    push_arg(&mut args, &s[start.min(s.len())..]);

    args
}

fn push_arg<'a>(args: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        args.push(piece);
    }
}

/// Parse a single literal value.
pub fn parse_value(s: &str) -> ArgValue {
    let s = s.trim();

    if let Some(q) = quoted_at(s, 0)
        && q.end == s.len()
    {
        return ArgValue::Str(q.value.to_string());
    }

    if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return ArgValue::List(split_args(inner).into_iter().map(parse_value).collect());
    }

    // %w[a b] and %i[a b] word lists
    if let Some(rest) = s.strip_prefix("%w").or_else(|| s.strip_prefix("%i"))
        && let Some(inner) = strip_delimiters(rest)
    {
        let symbols = s.starts_with("%i");
        return ArgValue::List(
            inner
                .split_whitespace()
                .map(|w| {
                    if symbols {
                        ArgValue::Symbol(w.to_string())
                    } else {
                        ArgValue::Str(w.to_string())
                    }
                })
                .collect(),
        );
    }

    if let Some(sym) = s.strip_prefix(':') {
        if let Some(q) = quoted_at(sym, 0)
            && q.end == sym.len()
        {
            return ArgValue::Symbol(q.value.to_string());
        }
        if is_identifier(sym.trim_end_matches(['?', '!'])) {
            return ArgValue::Symbol(sym.to_string());
        }
    }

    match s {
        "true" => ArgValue::Bool(true),
        "false" => ArgValue::Bool(false),
        "nil" => ArgValue::Nil,
        _ => ArgValue::Other(s.to_string()),
    }
}

fn strip_delimiters(s: &str) -> Option<&str> {
    let (open, close) = match s.chars().next()? {
        '[' => ('[', ']'),
        '(' => ('(', ')'),
        '{' => ('{', '}'),
        '<' => ('<', '>'),
        _ => return None,
    };
    s.strip_prefix(open)?.strip_suffix(close)
}

/// Parse a hash pair (`key: value`, `:key => value`, `'key' => value`).
pub fn parse_pair(arg: &str) -> Option<(String, ArgValue)> {
    let arg = arg.trim();

    if let Some(idx) = find_top_level(arg, "=>") {
        let key = parse_value(&arg[..idx]);
        let key = key.as_text()?.to_string();
        return Some((key, parse_value(&arg[idx + 2..])));
    }

    // `key: value`, where the key is a bare identifier or a quoted string
    if let Some(q) = quoted_at(arg, 0)
        && arg[q.end..].starts_with(':')
    {
        return Some((q.value.to_string(), parse_value(&arg[q.end + 1..])));
    }

    let colon = arg.find(':')?;
    let key = &arg[..colon];
    if !is_identifier(key) || arg[colon + 1..].starts_with(':') {
        return None;
    }
    Some((key.to_string(), parse_value(&arg[colon + 1..])))
}

fn find_top_level(s: &str, needle: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let needle = needle.as_bytes();
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
        } else if b == b'\'' || b == b'"' {
            quote = Some(b);
        } else if bytes[idx..].starts_with(needle) {
            return Some(idx);
        }
        idx += 1;
    }

    None
}

/// Collect names from a group or platform argument list, ignoring
/// trailing options such as `optional: true`.
pub fn parse_name_list(s: &str) -> Vec<String> {
    let mut names = Vec::new();
    for arg in split_args(s) {
        if parse_pair(arg).is_some() {
            continue;
        }
        for name in parse_value(arg).to_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_at() {
        let q = quoted_at("  'rails', '7.0'", 0).unwrap();
        assert_eq!(q.value, "rails");
        assert_eq!(q.quote, '\'');
        assert_eq!(q.end, 9);

        let q = quoted_at(r#""a\"b" rest"#, 0).unwrap();
        assert_eq!(q.value, r#"a\"b"#);

        assert!(quoted_at("rails", 0).is_none());
        assert!(quoted_at("'unterminated", 0).is_none());
        assert!(quoted_at("", 0).is_none());
    }

    #[test]
    fn test_strip_comment_respects_quotes() {
        assert_eq!(strip_comment("gem 'rails' # web"), "gem 'rails' ");
        assert_eq!(strip_comment("gem 'c#-bindings'"), "gem 'c#-bindings'");
        assert_eq!(strip_comment(r#"source "https://x#frag""#), r#"source "https://x#frag""#);
        assert_eq!(strip_comment("# whole line"), "");
    }

    #[test]
    fn test_split_args_nested() {
        let args = split_args(" '~> 7.0', platforms: [:mri, :jruby], require: false ");
        assert_eq!(
            args,
            vec!["'~> 7.0'", "platforms: [:mri, :jruby]", "require: false"]
        );

        let args = split_args("'a, b', 'c'");
        assert_eq!(args, vec!["'a, b'", "'c'"]);

        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn test_closing_paren() {
        assert_eq!(closing_paren(", '~> 7.0')"), Some(10));
        assert_eq!(closing_paren(", [1, (2)]) # x"), Some(10));
        assert_eq!(closing_paren(", '(')"), Some(5));
        assert_eq!(closing_paren(", '1.0'"), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("'x'"), ArgValue::Str("x".to_string()));
        assert_eq!(parse_value(":jruby"), ArgValue::Symbol("jruby".to_string()));
        assert_eq!(parse_value(":\"x-y\""), ArgValue::Symbol("x-y".to_string()));
        assert_eq!(parse_value("false"), ArgValue::Bool(false));
        assert_eq!(parse_value("nil"), ArgValue::Nil);
        assert_eq!(
            parse_value("[:mri, 'windows']"),
            ArgValue::List(vec![
                ArgValue::Symbol("mri".to_string()),
                ArgValue::Str("windows".to_string())
            ])
        );
        assert_eq!(
            parse_value("%i[mri jruby]").to_names(),
            vec!["mri".to_string(), "jruby".to_string()]
        );
        assert_eq!(
            parse_value("ENV['X']"),
            ArgValue::Other("ENV['X']".to_string())
        );
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("require: false"),
            Some(("require".to_string(), ArgValue::Bool(false)))
        );
        assert_eq!(
            parse_pair(":git => 'https://x/y.git'"),
            Some((
                "git".to_string(),
                ArgValue::Str("https://x/y.git".to_string())
            ))
        );
        assert_eq!(
            parse_pair("\"path\": '../x'"),
            Some(("path".to_string(), ArgValue::Str("../x".to_string())))
        );
        assert_eq!(parse_pair("'~> 7.0'"), None);
        assert_eq!(parse_pair(":test"), None);
        assert_eq!(parse_pair("Foo::Bar"), None);
    }

    #[test]
    fn test_parse_pair_non_ascii_outside_quotes() {
        assert_eq!(parse_pair(":tést"), None);
        assert_eq!(
            parse_pair("require: ENV['X'] || café"),
            Some((
                "require".to_string(),
                ArgValue::Other("ENV['X'] || café".to_string())
            ))
        );
        assert_eq!(
            parse_pair("'clé' => 'v'"),
            Some(("clé".to_string(), ArgValue::Str("v".to_string())))
        );
    }

    #[test]
    fn test_parse_name_list() {
        assert_eq!(
            parse_name_list(":development, :test"),
            vec!["development".to_string(), "test".to_string()]
        );
        assert_eq!(
            parse_name_list("[:development, 'test']"),
            vec!["development".to_string(), "test".to_string()]
        );
        assert_eq!(
            parse_name_list(":docs, optional: true"),
            vec!["docs".to_string()]
        );
    }
}
