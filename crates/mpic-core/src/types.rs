//! Core type definitions for MPIC requests, perspective checks and aggregate results.
//!
//! # Type Categories
//!
//! ## Inbound
//! - [`MpicRequest`], [`OrchestrationParameters`], [`CheckParameters`]: the already-parsed
//!   request handed over by the transport layer
//!
//! ## Perspective Wire Types
//! - [`CheckRequest`]: body POSTed to each remote perspective
//! - [`CheckResponse`]: tagged union of [`CaaCheckResponse`] and [`DcvCheckResponse`], either
//!   returned by a perspective or synthesized locally for a failed call
//!
//! ## Outbound
//! - [`AggregateResult`], [`EffectiveOrchestrationParameters`]: the coordinator's verdict
//!
//! All wire types use `check_type` (`"caa"` / `"dcv"`) as the discriminator, so the shape of
//! the check-specific payload is decided once at the deserialization boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of validation a perspective performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    /// Certificate Authority Authorization record lookup.
    Caa,
    /// Domain Control Validation challenge.
    Dcv,
}

impl CheckType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caa => "caa",
            Self::Dcv => "dcv",
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check-type-specific parameters. Opaque to the coordinator beyond being serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check_type", rename_all = "lowercase")]
pub enum CheckParameters {
    Caa {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caa_check_parameters: Option<serde_json::Value>,
    },
    Dcv { dcv_check_parameters: serde_json::Value },
}

impl CheckParameters {
    #[must_use]
    pub fn check_type(&self) -> CheckType {
        match self {
            Self::Caa { .. } => CheckType::Caa,
            Self::Dcv { .. } => CheckType::Dcv,
        }
    }
}

/// Orchestration knobs requested by the caller. Every field is optional; missing values are
/// filled from server-side defaults during validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// A parsed MPIC request as received from the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpicRequest {
    pub domain_or_ip_target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestration_parameters: Option<OrchestrationParameters>,
    #[serde(flatten)]
    pub check: CheckParameters,
}

impl MpicRequest {
    #[must_use]
    pub fn check_type(&self) -> CheckType {
        self.check.check_type()
    }

    /// Builds the body sent to every perspective for this request.
    #[must_use]
    pub fn to_check_request(&self) -> CheckRequest {
        CheckRequest {
            domain_or_ip_target: self.domain_or_ip_target.clone(),
            check: self.check.clone(),
        }
    }
}

/// Body of one outbound perspective call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub domain_or_ip_target: String,
    #[serde(flatten)]
    pub check: CheckParameters,
}

impl CheckRequest {
    #[must_use]
    pub fn check_type(&self) -> CheckType {
        self.check.check_type()
    }
}

/// Structured error attached to a check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckError {
    pub error_type: String,
    pub error_message: String,
}

/// Classification of a failed perspective call, used for locally synthesized responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckErrorKind {
    /// Connection refused/reset, DNS failure, client shut down.
    TransportError,
    /// Per-call timeout exceeded.
    Timeout,
    /// Non-success status, unparseable body, or a body of the wrong check type.
    InvalidResponse,
}

impl CheckErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TransportError => "transport-error",
            Self::Timeout => "timeout",
            Self::InvalidResponse => "invalid-response",
        }
    }

    #[must_use]
    pub fn from_error_type(error_type: &str) -> Option<Self> {
        match error_type {
            "transport-error" => Some(Self::TransportError),
            "timeout" => Some(Self::Timeout),
            "invalid-response" => Some(Self::InvalidResponse),
            _ => None,
        }
    }
}

impl fmt::Display for CheckErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details reported by a CAA perspective.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaCheckDetails {
    #[serde(default)]
    pub caa_record_present: Option<bool>,
    #[serde(default)]
    pub found_at: Option<String>,
    #[serde(default)]
    pub records: Option<Vec<String>>,
}

/// Details reported by a DCV perspective. Fields beyond the validation method vary by
/// method and are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DcvCheckDetails {
    #[serde(default)]
    pub validation_method: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Fields shared by every check response, parameterized over the check-specific details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCheckResult<D> {
    pub perspective_code: String,
    pub check_passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<CheckError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ns: Option<i64>,
    pub details: D,
}

pub type CaaCheckResponse = PerspectiveCheckResult<CaaCheckDetails>;
pub type DcvCheckResponse = PerspectiveCheckResult<DcvCheckDetails>;

/// Outcome of one perspective for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check_type", rename_all = "lowercase")]
pub enum CheckResponse {
    Caa(CaaCheckResponse),
    Dcv(DcvCheckResponse),
}

impl CheckResponse {
    /// Synthesizes a failed response for a perspective whose call did not produce a usable
    /// answer. Never reports a pass.
    #[must_use]
    pub fn failed(
        check_type: CheckType,
        perspective_code: &str,
        kind: CheckErrorKind,
        message: impl Into<String>,
    ) -> Self {
        let errors = Some(vec![CheckError {
            error_type: kind.as_str().to_string(),
            error_message: message.into(),
        }]);
        let perspective_code = perspective_code.to_string();
        let timestamp_ns = chrono::Utc::now().timestamp_nanos_opt();

        match check_type {
            CheckType::Caa => Self::Caa(PerspectiveCheckResult {
                perspective_code,
                check_passed: false,
                errors,
                timestamp_ns,
                details: CaaCheckDetails::default(),
            }),
            CheckType::Dcv => Self::Dcv(PerspectiveCheckResult {
                perspective_code,
                check_passed: false,
                errors,
                timestamp_ns,
                details: DcvCheckDetails::default(),
            }),
        }
    }

    #[must_use]
    pub fn check_type(&self) -> CheckType {
        match self {
            Self::Caa(_) => CheckType::Caa,
            Self::Dcv(_) => CheckType::Dcv,
        }
    }

    #[must_use]
    pub fn perspective_code(&self) -> &str {
        match self {
            Self::Caa(r) => &r.perspective_code,
            Self::Dcv(r) => &r.perspective_code,
        }
    }

    #[must_use]
    pub fn check_passed(&self) -> bool {
        match self {
            Self::Caa(r) => r.check_passed,
            Self::Dcv(r) => r.check_passed,
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[CheckError] {
        let errors = match self {
            Self::Caa(r) => r.errors.as_deref(),
            Self::Dcv(r) => r.errors.as_deref(),
        };
        errors.unwrap_or_default()
    }

    /// Returns the call-failure kind if this response was synthesized for a failed call.
    #[must_use]
    pub fn failure_kind(&self) -> Option<CheckErrorKind> {
        if self.check_passed() {
            return None;
        }
        self.errors().iter().find_map(|e| CheckErrorKind::from_error_type(&e.error_type))
    }
}

/// Parameters actually used for a request, after defaults and ceilings were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveOrchestrationParameters {
    pub perspective_count: usize,
    pub quorum_count: usize,
    pub attempt_count: u32,
}

/// Final verdict of one coordination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub mpic_completed: bool,
    pub domain_or_ip_target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_orchestration_parameters: Option<OrchestrationParameters>,
    pub actual_orchestration_parameters: EffectiveOrchestrationParameters,
    pub is_valid: bool,
    /// Responses of the final attempt, in dispatch order.
    pub perspectives: Vec<CheckResponse>,
    /// Responses of every earlier attempt, oldest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attempt_results: Option<Vec<Vec<CheckResponse>>>,
    #[serde(flatten)]
    pub check: CheckParameters,
}

impl AggregateResult {
    #[must_use]
    pub fn check_type(&self) -> CheckType {
        self.check.check_type()
    }
}
