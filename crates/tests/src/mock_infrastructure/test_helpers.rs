//! Test Helper Functions and Utilities
//!
//! Common helpers for building registries, configuration and requests.

use mpic_core::{
    config::AppConfig,
    perspective::{Perspective, PerspectiveEndpoint, PerspectiveEndpoints, PerspectiveRegistry},
    types::{CheckParameters, MpicRequest, OrchestrationParameters},
};
use serde_json::json;

/// Six perspectives over three RIRs, with the two `us-east` regions too close together.
#[must_use]
pub fn six_perspective_registry() -> PerspectiveRegistry {
    PerspectiveRegistry::new(vec![
        Perspective::new("us-east-1", "arin").with_too_close(&["us-east-2"]),
        Perspective::new("us-east-2", "arin"),
        Perspective::new("eu-west-1", "ripe"),
        Perspective::new("eu-central-1", "ripe"),
        Perspective::new("ap-south-1", "apnic"),
        Perspective::new("ap-northeast-1", "apnic"),
    ])
    .unwrap()
}

#[must_use]
pub fn six_perspective_codes() -> Vec<&'static str> {
    vec!["us-east-1", "us-east-2", "eu-west-1", "eu-central-1", "ap-south-1", "ap-northeast-1"]
}

/// Configuration pointing every code at `/{code}/{check_type}` on `base_url`.
#[must_use]
pub fn app_config_for(base_url: &str, codes: &[&str]) -> AppConfig {
    let mut config = AppConfig::default();
    config.orchestration.hash_secret = "integration-secret".to_string();
    config.orchestration.per_call_timeout_ms = 2_000;
    for code in codes {
        config.perspectives.insert(
            (*code).to_string(),
            PerspectiveEndpoints {
                caa_endpoint_info: PerspectiveEndpoint::new(format!("{base_url}/{code}/caa")),
                dcv_endpoint_info: PerspectiveEndpoint::new(format!("{base_url}/{code}/dcv")),
            },
        );
    }
    config
}

#[must_use]
pub fn caa_request(
    target: &str,
    perspective_count: Option<usize>,
    quorum_count: Option<usize>,
) -> MpicRequest {
    MpicRequest {
        domain_or_ip_target: target.to_string(),
        orchestration_parameters: Some(OrchestrationParameters {
            perspective_count,
            quorum_count,
            max_attempts: None,
        }),
        check: CheckParameters::Caa {
            caa_check_parameters: Some(json!({ "certificate_type": "tls-server" })),
        },
    }
}

#[must_use]
pub fn dcv_request(target: &str) -> MpicRequest {
    MpicRequest {
        domain_or_ip_target: target.to_string(),
        orchestration_parameters: None,
        check: CheckParameters::Dcv {
            dcv_check_parameters: json!({
                "validation_details": {
                    "validation_method": "dns-change",
                    "dns_name_prefix": "_acme-challenge",
                    "dns_record_type": "TXT",
                    "challenge_value": "abc123"
                }
            }),
        },
    }
}
