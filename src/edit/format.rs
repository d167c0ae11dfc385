//! Rendering declarations as Gemfile or gemspec text
//!
//! Formatting is pure: it knows nothing about the file a line ends up in,
//! only how one declaration is spelled. Tokens are joined with `", "` in a
//! fixed order (name, version, platforms, source, require) and absent
//! fields contribute nothing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::quote::QuoteStyle;
use crate::parsers::args::is_identifier;
use crate::parsers::{DEVELOPMENT_GROUP, RequireOption};

/// Version comparison operators accepted when pinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinOperator {
    #[serde(rename = "~>")]
    Pessimistic,
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "=")]
    Exact,
}

impl PinOperator {
    pub const ALL: [PinOperator; 6] = [
        PinOperator::Pessimistic,
        PinOperator::AtLeast,
        PinOperator::GreaterThan,
        PinOperator::LessThan,
        PinOperator::AtMost,
        PinOperator::Exact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PinOperator::Pessimistic => "~>",
            PinOperator::AtLeast => ">=",
            PinOperator::GreaterThan => ">",
            PinOperator::LessThan => "<",
            PinOperator::AtMost => "<=",
            PinOperator::Exact => "=",
        }
    }
}

impl fmt::Display for PinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operator `{s}` (expected one of ~>, >=, >, <, <=, =)"))
    }
}

/// Everything about a declaration except its name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationOptions {
    pub version: Option<String>,
    pub operator: Option<PinOperator>,
    pub groups: Vec<String>,
    pub platforms: Vec<String>,
    pub source: Option<String>,
    pub require: Option<RequireOption>,
}

impl DeclarationOptions {
    /// The combined version constraint, if a version is set.
    pub fn constraint(&self) -> Option<String> {
        self.version
            .as_deref()
            .map(|v| version_constraint(v, self.operator))
    }
}

/// How a source string is spelled in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClause {
    Git,
    Path,
    Source,
}

impl SourceClause {
    pub fn classify(source: &str) -> Self {
        if source.starts_with("git@") || source.starts_with("git:") || Url::parse(source).is_ok() {
            SourceClause::Git
        } else if ["/", "./", "../", "~/"].iter().any(|p| source.starts_with(p)) {
            SourceClause::Path
        } else {
            SourceClause::Source
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SourceClause::Git => "git",
            SourceClause::Path => "path",
            SourceClause::Source => "source",
        }
    }
}

/// `"~> 7.0"` from `("7.0", Some(~>))`; the version alone without operator.
pub fn version_constraint(version: &str, operator: Option<PinOperator>) -> String {
    let version = version.trim();
    match operator {
        Some(op) => format!("{op} {version}"),
        None => version.to_string(),
    }
}

/// `:test` for plain identifiers, a quoted string otherwise.
pub fn symbol(name: &str, quote: QuoteStyle) -> String {
    if is_identifier(name) {
        format!(":{name}")
    } else {
        format!(":{}", quote.wrap(name))
    }
}

/// `group :development, :test do`
pub fn format_group_opening(groups: &[String], quote: QuoteStyle) -> String {
    let names: Vec<String> = groups.iter().map(|g| symbol(g, quote)).collect();
    format!("group {} do", names.join(", "))
}

/// Render a Gemfile `gem` statement (without indentation).
pub fn format_gem_declaration(name: &str, opts: &DeclarationOptions, quote: QuoteStyle) -> String {
    let mut tokens = vec![format!("gem {}", quote.wrap(name))];

    if let Some(constraint) = opts.constraint() {
        tokens.push(quote.wrap(&constraint));
    }

    match opts.platforms.as_slice() {
        [] => {}
        [single] => tokens.push(format!("platforms: {}", symbol(single, quote))),
        many => {
            let symbols: Vec<String> = many.iter().map(|p| symbol(p, quote)).collect();
            tokens.push(format!("platforms: [{}]", symbols.join(", ")));
        }
    }

    if let Some(source) = opts.source.as_deref() {
        let clause = SourceClause::classify(source);
        tokens.push(format!("{}: {}", clause.key(), quote.wrap(source)));
    }

    match &opts.require {
        Some(RequireOption::Disabled) => tokens.push("require: false".to_string()),
        Some(RequireOption::Path(path)) => tokens.push(format!("require: {}", quote.wrap(path))),
        None => {}
    }

    tokens.join(", ")
}

/// Render a gemspec dependency statement (without indentation).
///
/// A `development` group selects `add_development_dependency`.
pub fn format_spec_declaration(
    receiver: &str,
    name: &str,
    opts: &DeclarationOptions,
    quote: QuoteStyle,
) -> String {
    let method = if opts.groups.iter().any(|g| g == DEVELOPMENT_GROUP) {
        "add_development_dependency"
    } else {
        "add_dependency"
    };

    let mut tokens = vec![format!("{receiver}.{method} {}", quote.wrap(name))];
    if let Some(constraint) = opts.constraint() {
        tokens.push(quote.wrap(&constraint));
    }
    tokens.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> DeclarationOptions {
        DeclarationOptions::default()
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(
            format_gem_declaration("rails", &opts(), QuoteStyle::Single),
            "gem 'rails'"
        );
        assert_eq!(
            format_gem_declaration("rails", &opts(), QuoteStyle::Double),
            "gem \"rails\""
        );
    }

    #[test]
    fn test_version_with_operator() {
        let o = DeclarationOptions {
            version: Some("7.0.0".to_string()),
            operator: Some(PinOperator::Pessimistic),
            ..opts()
        };
        assert_eq!(
            format_gem_declaration("rails", &o, QuoteStyle::Single),
            "gem 'rails', '~> 7.0.0'"
        );
    }

    #[test]
    fn test_version_without_operator_is_kept_verbatim() {
        let o = DeclarationOptions {
            version: Some(">= 1.2".to_string()),
            ..opts()
        };
        assert_eq!(
            format_gem_declaration("pg", &o, QuoteStyle::Single),
            "gem 'pg', '>= 1.2'"
        );
    }

    #[test]
    fn test_full_token_order() {
        let o = DeclarationOptions {
            version: Some("1.0".to_string()),
            operator: Some(PinOperator::AtLeast),
            groups: vec!["test".to_string()],
            platforms: vec!["mri".to_string(), "jruby".to_string()],
            source: Some("../vendor/foo".to_string()),
            require: Some(RequireOption::Disabled),
        };
        assert_eq!(
            format_gem_declaration("foo", &o, QuoteStyle::Single),
            "gem 'foo', '>= 1.0', platforms: [:mri, :jruby], path: '../vendor/foo', require: false"
        );
    }

    #[test]
    fn test_source_classification() {
        assert_eq!(
            SourceClause::classify("https://github.com/rails/rails.git"),
            SourceClause::Git
        );
        assert_eq!(
            SourceClause::classify("git@github.com:rails/rails.git"),
            SourceClause::Git
        );
        assert_eq!(SourceClause::classify("/opt/gems/foo"), SourceClause::Path);
        assert_eq!(SourceClause::classify("./foo"), SourceClause::Path);
        assert_eq!(SourceClause::classify("../foo"), SourceClause::Path);
        assert_eq!(SourceClause::classify("gemfury"), SourceClause::Source);
    }

    #[test]
    fn test_require_path() {
        let o = DeclarationOptions {
            require: Some(RequireOption::Path("rack/cors".to_string())),
            ..opts()
        };
        assert_eq!(
            format_gem_declaration("rack-cors", &o, QuoteStyle::Double),
            "gem \"rack-cors\", require: \"rack/cors\""
        );
    }

    #[test]
    fn test_spec_declaration() {
        let o = DeclarationOptions {
            version: Some("6.1".to_string()),
            operator: Some(PinOperator::AtLeast),
            ..opts()
        };
        assert_eq!(
            format_spec_declaration("spec", "activesupport", &o, QuoteStyle::Double),
            "spec.add_dependency \"activesupport\", \">= 6.1\""
        );

        let dev = DeclarationOptions {
            groups: vec![DEVELOPMENT_GROUP.to_string()],
            ..opts()
        };
        assert_eq!(
            format_spec_declaration("s", "rake", &dev, QuoteStyle::Single),
            "s.add_development_dependency 'rake'"
        );
    }

    #[test]
    fn test_group_opening() {
        let groups = vec!["development".to_string(), "test".to_string()];
        assert_eq!(
            format_group_opening(&groups, QuoteStyle::Single),
            "group :development, :test do"
        );
        assert_eq!(
            format_group_opening(&["ci-only".to_string()], QuoteStyle::Single),
            "group :'ci-only' do"
        );
    }

    #[test]
    fn test_operator_parsing() {
        for op in PinOperator::ALL {
            assert_eq!(op.as_str().parse::<PinOperator>(), Ok(op));
        }
        assert!("^".parse::<PinOperator>().is_err());
    }
}
