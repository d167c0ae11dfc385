//! Input checks run before any file is touched

use std::sync::LazyLock;

use regex::Regex;

use crate::edit::PinOperator;
use crate::error::ManifestError;

static GEM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid regex"));

/// An optional operator followed by a dotted version (`1.2.3`, `7.0.0.rc1`).
static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(~>|>=|<=|!=|>|<|=)\s*)?(\d+(?:\.[0-9A-Za-z]+)*)$").expect("valid regex")
});

static GROUP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").expect("valid regex"));

pub fn gem_name(name: &str) -> Result<(), ManifestError> {
    if GEM_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ManifestError::invalid(
            "name",
            format!("`{name}` is not a valid gem name"),
        ))
    }
}

/// Validate a version, alone or together with a separate operator.
///
/// A version that already carries its own operator cannot be combined with
/// an explicit one.
pub fn version(version: &str, operator: Option<PinOperator>) -> Result<(), ManifestError> {
    let trimmed = version.trim();
    let Some(caps) = VERSION.captures(trimmed) else {
        return Err(ManifestError::invalid(
            "version",
            format!("`{version}` is not a valid version constraint"),
        ));
    };

    if let (Some(op), Some(own)) = (operator, caps.get(1)) {
        return Err(ManifestError::invalid(
            "pinOperator",
            format!("`{op}` given for `{trimmed}`, which already has `{}`", own.as_str()),
        ));
    }

    Ok(())
}

/// Group and platform names become Ruby symbols.
pub fn symbol_names(field: &'static str, names: &[String]) -> Result<(), ManifestError> {
    for name in names {
        if !GROUP_NAME.is_match(name) {
            return Err(ManifestError::invalid(
                field,
                format!("`{name}` is not a valid name"),
            ));
        }
    }
    Ok(())
}

/// Sources and require paths end up inside a quoted string.
pub fn plain_text(field: &'static str, value: &str) -> Result<(), ManifestError> {
    if value.trim().is_empty() {
        return Err(ManifestError::invalid(field, "must not be empty"));
    }
    if value.contains(['\n', '\r']) {
        return Err(ManifestError::invalid(field, "must be a single line"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gem_names() {
        for name in ["rails", "rack-cors", "net_http", "activerecord-7.0", "3scale"] {
            assert!(gem_name(name).is_ok(), "{name}");
        }
        for name in ["", "-rails", "rails ruby", "rails'", "a/b"] {
            assert!(gem_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn test_versions() {
        assert!(version("7.0.0", None).is_ok());
        assert!(version("7.0.0.rc1", Some(PinOperator::Pessimistic)).is_ok());
        assert!(version("~> 7.0", None).is_ok());
        assert!(version(">=1.2", None).is_ok());
        assert!(version("latest", None).is_err());
        assert!(version("1..2", None).is_err());
        assert!(version("", None).is_err());
    }

    #[test]
    fn test_operator_conflict() {
        let err = version("~> 7.0", Some(PinOperator::AtLeast)).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::InvalidInput {
                field: "pinOperator",
                ..
            }
        ));
    }

    #[test]
    fn test_symbol_names() {
        let ok = vec!["development".to_string(), "ci-only".to_string()];
        assert!(symbol_names("groups", &ok).is_ok());

        let bad = vec!["test".to_string(), "no spaces".to_string()];
        let err = symbol_names("groups", &bad).unwrap_err();
        assert!(err.to_string().starts_with("invalid groups"));
    }

    #[test]
    fn test_plain_text() {
        assert!(plain_text("source", "https://gems.example.com").is_ok());
        assert!(plain_text("source", "  ").is_err());
        assert!(plain_text("require", "a\nb").is_err());
    }
}
