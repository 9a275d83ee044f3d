//! Path validation.
//!
//! # Responsibilities
//! - Reject malformed Route urls before they reach the store
//! - Report which rule failed with a human readable message
//!
//! # Design Decisions
//! - Each rule is an independent pure function; order does not matter
//! - The dot-segment rule is optional and switched per deployment via [`UrlPolicy`]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed path rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("First character must be \"/\".")]
    MissingLeadingSlash,

    #[error("Last character must be \"/\".")]
    MissingTrailingSlash,

    #[error("Consecutive slashes (\"//\") are not allowed.")]
    DoubleSlash,

    #[error("Hash symbol (AKA \"pound\", \"#\") is not allowed.")]
    HashSymbol,

    #[error("Question mark (\"?\") is not allowed.")]
    QuestionMark,

    #[error("Path segments consisting only of \".\" are not allowed.")]
    DotSegment,
}

/// Which optional rules apply in this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlPolicy {
    /// Reject segments such as `.` or `..`.
    pub forbid_dot_segments: bool,
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self {
            forbid_dot_segments: true,
        }
    }
}

impl UrlPolicy {
    /// Only the five structural rules.
    pub const STRUCTURAL: UrlPolicy = UrlPolicy {
        forbid_dot_segments: false,
    };
}

pub fn validate_start_in_slash(path: &str) -> Result<(), ValidationError> {
    if !path.starts_with('/') {
        return Err(ValidationError::MissingLeadingSlash);
    }
    Ok(())
}

pub fn validate_end_in_slash(path: &str) -> Result<(), ValidationError> {
    if !path.ends_with('/') {
        return Err(ValidationError::MissingTrailingSlash);
    }
    Ok(())
}

pub fn validate_no_double_slashes(path: &str) -> Result<(), ValidationError> {
    if path.contains("//") {
        return Err(ValidationError::DoubleSlash);
    }
    Ok(())
}

/// Hash symbols would be read by clients as a fragment marker.
pub fn validate_no_hash_symbol(path: &str) -> Result<(), ValidationError> {
    if path.contains('#') {
        return Err(ValidationError::HashSymbol);
    }
    Ok(())
}

pub fn validate_no_questionmark(path: &str) -> Result<(), ValidationError> {
    if path.contains('?') {
        return Err(ValidationError::QuestionMark);
    }
    Ok(())
}

/// Rejects `.`, `..`, `...` and so on as whole segments. Dots inside a
/// segment (`/v1.2/`) are fine.
pub fn validate_no_dot_segments(path: &str) -> Result<(), ValidationError> {
    let dotted = path
        .split('/')
        .any(|segment| !segment.is_empty() && segment.bytes().all(|b| b == b'.'));
    if dotted {
        return Err(ValidationError::DotSegment);
    }
    Ok(())
}

/// Run every rule enabled by `policy`, returning the first failure.
pub fn validate_url(path: &str, policy: UrlPolicy) -> Result<(), ValidationError> {
    validate_start_in_slash(path)?;
    validate_end_in_slash(path)?;
    validate_no_double_slashes(path)?;
    validate_no_hash_symbol(path)?;
    validate_no_questionmark(path)?;
    if policy.forbid_dot_segments {
        validate_no_dot_segments(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    type Rule = fn(&str) -> Result<(), ValidationError>;

    const RULES: [(&str, Rule); 6] = [
        ("start", validate_start_in_slash),
        ("end", validate_end_in_slash),
        ("double", validate_no_double_slashes),
        ("hash", validate_no_hash_symbol),
        ("question", validate_no_questionmark),
        ("dots", validate_no_dot_segments),
    ];

    fn failing_rules(path: &str) -> Vec<&'static str> {
        RULES
            .iter()
            .filter(|(_, rule)| rule(path).is_err())
            .map(|(name, _)| *name)
            .collect()
    }

    #[test]
    fn test_valid_paths_pass_everything() {
        for path in ["/", "/a/", "/a/b/", "/v1.2/", "/with-dash_and_underscore/"] {
            assert!(failing_rules(path).is_empty(), "{path} should be valid");
            assert_eq!(validate_url(path, UrlPolicy::default()), Ok(()));
        }
    }

    #[test]
    fn test_counter_examples_fail_exactly_one_rule() {
        let cases = [
            ("no/leading/slash/", "start"),
            ("/no/trailing/slash", "end"),
            ("/a//b/", "double"),
            ("/a/#b/", "hash"),
            ("/a/?b/", "question"),
            ("/a/../", "dots"),
        ];
        for (path, rule) in cases {
            assert_eq!(failing_rules(path), vec![rule], "{path}");
        }
    }

    #[test]
    fn test_dot_segments_follow_policy() {
        assert_eq!(
            validate_url("/a/./", UrlPolicy::default()),
            Err(ValidationError::DotSegment)
        );
        assert_eq!(validate_url("/a/./", UrlPolicy::STRUCTURAL), Ok(()));
        assert_eq!(validate_url("/.../", UrlPolicy::STRUCTURAL), Ok(()));
        assert_eq!(validate_url("/.hidden/", UrlPolicy::default()), Ok(()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::MissingTrailingSlash.to_string(),
            "Last character must be \"/\"."
        );
        assert!(ValidationError::DoubleSlash.to_string().contains("//"));
    }
}
