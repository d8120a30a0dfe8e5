//! Version policy: which discovered module versions are eligible for upload.
//!
//! Two optional predicates, a semantic-version range and a regular
//! expression over the raw version string. Both are parsed once when the
//! policy is built so that a bad expression fails before any module is
//! touched.

use regex::Regex;

use crate::error::{RegistryError, Result};

/// A parsed semantic version.
pub type Version = semver::Version;

/// A version requirement (range expression).
pub type VersionReq = semver::VersionReq;

/// Parse a version string like "1.2.3".
pub fn parse_version(s: &str) -> Result<Version> {
    Version::parse(s).map_err(|source| RegistryError::ConstraintParse {
        input: s.to_string(),
        source,
    })
}

/// Parse a version requirement string like ">=1.0.0, <2.0.0".
pub fn parse_requirement(s: &str) -> Result<VersionReq> {
    VersionReq::parse(s).map_err(|source| RegistryError::ConstraintParse {
        input: s.to_string(),
        source,
    })
}

/// Which predicate turned a version away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The version is outside the semantic range.
    Semver,
    /// The version does not match the regex.
    Regex,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Semver => "semver",
            Rejection::Regex => "regex",
        }
    }
}

/// Result of evaluating a policy against one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

/// Operator-supplied version constraints.
///
/// An empty policy accepts every version.
#[derive(Debug, Clone, Default)]
pub struct VersionPolicy {
    semver: Option<VersionReq>,
    regex: Option<Regex>,
}

impl VersionPolicy {
    /// Build a policy, treating `None` and empty strings as "not configured".
    pub fn new(semver: Option<&str>, regex: Option<&str>) -> Result<Self> {
        let semver = semver
            .filter(|s| !s.trim().is_empty())
            .map(parse_requirement)
            .transpose()?;
        let regex = regex
            .filter(|s| !s.is_empty())
            .map(Regex::new)
            .transpose()?;
        Ok(VersionPolicy { semver, regex })
    }

    /// Whether no predicate is configured.
    pub fn is_unconstrained(&self) -> bool {
        self.semver.is_none() && self.regex.is_none()
    }

    /// Evaluate the policy against a raw version string.
    ///
    /// The semantic range is checked first. A version that does not parse as
    /// semver while a range is configured is an error, not a rejection.
    pub fn evaluate(&self, version: &str) -> Result<Verdict> {
        if let Some(req) = &self.semver {
            if !req.matches(&parse_version(version)?) {
                return Ok(Verdict::Rejected(Rejection::Semver));
            }
        }

        if let Some(re) = &self.regex {
            if !re.is_match(version) {
                return Ok(Verdict::Rejected(Rejection::Regex));
            }
        }

        Ok(Verdict::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(semver: &str, regex: &str) -> VersionPolicy {
        VersionPolicy::new(Some(semver), Some(regex)).unwrap()
    }

    #[test]
    fn unconstrained_accepts_anything() {
        let p = VersionPolicy::new(None, Some("")).unwrap();
        assert!(p.is_unconstrained());
        assert_eq!(p.evaluate("not-semver").unwrap(), Verdict::Accepted);
    }

    #[test]
    fn composed_constraints() {
        let p = policy(">=1.0.0", r"^1\.");
        assert_eq!(p.evaluate("1.2.0").unwrap(), Verdict::Accepted);
        assert_eq!(
            p.evaluate("2.0.0").unwrap(),
            Verdict::Rejected(Rejection::Regex)
        );
        assert_eq!(
            p.evaluate("0.9.0").unwrap(),
            Verdict::Rejected(Rejection::Semver)
        );
    }

    #[test]
    fn semver_failure_wins_over_regex() {
        // 2.0.0 fails the range; the regex result is irrelevant.
        let p = policy(">=1.0.0, <2.0.0", ".*");
        assert_eq!(
            p.evaluate("2.0.0").unwrap(),
            Verdict::Rejected(Rejection::Semver)
        );
    }

    #[test]
    fn prerelease_follows_semver_rules() {
        let p = VersionPolicy::new(Some(">=1.0.0"), None).unwrap();
        assert_eq!(
            p.evaluate("1.2.0-beta").unwrap(),
            Verdict::Rejected(Rejection::Semver)
        );

        let p = VersionPolicy::new(Some(">=1.2.0-alpha"), None).unwrap();
        assert_eq!(p.evaluate("1.2.0-beta").unwrap(), Verdict::Accepted);
    }

    #[test]
    fn regex_only() {
        let p = VersionPolicy::new(None, Some(r"^\d+\.\d+\.\d+$")).unwrap();
        assert_eq!(p.evaluate("1.0.0").unwrap(), Verdict::Accepted);
        assert_eq!(
            p.evaluate("1.0.0-rc1").unwrap(),
            Verdict::Rejected(Rejection::Regex)
        );
    }

    #[test]
    fn bad_range_fails_at_construction() {
        let err = VersionPolicy::new(Some(">=>1"), None).unwrap_err();
        assert!(matches!(err, RegistryError::ConstraintParse { .. }));
    }

    #[test]
    fn bad_regex_fails_at_construction() {
        let err = VersionPolicy::new(None, Some("(unclosed")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRegex(_)));
    }

    #[test]
    fn unparsable_module_version_is_an_error() {
        let p = VersionPolicy::new(Some(">=1.0.0"), None).unwrap();
        let err = p.evaluate("latest").unwrap_err();
        assert!(matches!(err, RegistryError::ConstraintParse { .. }));
    }
}
