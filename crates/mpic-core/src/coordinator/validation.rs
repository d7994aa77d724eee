//! Request validation and resolution of orchestration defaults.
//!
//! Every rule is checked and all violations are reported together, before any perspective
//! is called.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{config::OrchestrationConfig, types::MpicRequest};

/// The rule a request violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationIssueKind {
    MissingDomainOrIpTarget,
    InvalidPerspectiveCount,
    InvalidQuorumCount,
    InvalidMaxAttempts,
}

impl ValidationIssueKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingDomainOrIpTarget => "missing-domain-or-ip-target",
            Self::InvalidPerspectiveCount => "invalid-perspective-count",
            Self::InvalidQuorumCount => "invalid-quorum-count",
            Self::InvalidMaxAttempts => "invalid-max-attempts",
        }
    }
}

/// One violated rule, with the offending value in the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub issue_type: ValidationIssueKind,
    pub message: String,
}

impl ValidationIssue {
    fn new(issue_type: ValidationIssueKind, message: impl Into<String>) -> Self {
        Self { issue_type, message: message.into() }
    }
}

/// All rules a request violated. Never empty when returned as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssues {
    pub validation_issues: Vec<ValidationIssue>,
}

impl ValidationIssues {
    #[must_use]
    pub fn contains(&self, kind: ValidationIssueKind) -> bool {
        self.validation_issues.iter().any(|i| i.issue_type == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validation_issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validation_issues.is_empty()
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.validation_issues.iter().map(|i| i.issue_type.as_str()).collect();
        f.write_str(&kinds.join(", "))
    }
}

/// Parameters after defaults and the attempt ceiling were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParameters {
    pub perspective_count: usize,
    pub quorum_count: usize,
    pub max_attempts: u32,
}

/// Smallest quorum accepted for `perspective_count` perspectives.
///
/// Up to five perspectives one may disagree; beyond that two may.
#[must_use]
pub fn required_quorum(perspective_count: usize) -> usize {
    let tolerated = if perspective_count <= 5 { 1 } else { 2 };
    perspective_count.saturating_sub(tolerated).max(1)
}

/// Applies defaults to `request` and checks every orchestration rule.
///
/// `available` is the number of resolvable target perspectives.
pub fn validate_request(
    request: &MpicRequest,
    config: &OrchestrationConfig,
    available: usize,
) -> Result<ResolvedParameters, ValidationIssues> {
    let requested = request.orchestration_parameters.unwrap_or_default();
    let mut issues = Vec::new();

    if request.domain_or_ip_target.trim().is_empty() {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::MissingDomainOrIpTarget,
            "domain_or_ip_target must not be empty",
        ));
    }

    let perspective_count = requested.perspective_count.unwrap_or(config.default_perspective_count);
    let count_valid =
        perspective_count >= config.min_perspective_count && perspective_count <= available;
    if !count_valid {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::InvalidPerspectiveCount,
            format!(
                "perspective_count {perspective_count} must be between {} and {available}",
                config.min_perspective_count
            ),
        ));
    }

    let minimum_quorum = required_quorum(perspective_count);
    let quorum_count = requested.quorum_count.unwrap_or(minimum_quorum);
    if count_valid && (quorum_count > perspective_count || quorum_count < minimum_quorum) {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::InvalidQuorumCount,
            format!(
                "quorum_count {quorum_count} must be between {minimum_quorum} and {perspective_count}"
            ),
        ));
    }

    let max_attempts = match requested.max_attempts {
        Some(0) => {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::InvalidMaxAttempts,
                "max_attempts must be at least 1",
            ));
            0
        }
        Some(n) => n.min(config.global_max_attempts),
        None => config.global_max_attempts,
    };

    if issues.is_empty() {
        Ok(ResolvedParameters { perspective_count, quorum_count, max_attempts })
    } else {
        Err(ValidationIssues { validation_issues: issues })
    }
}
