//! Integration tests for the HTTP perspective caller against mock perspectives.
//!
//! - Well-formed responses are returned as-is
//! - Non-2xx, malformed and wrong-check-type bodies become `invalid-response`
//! - Unreachable perspectives become `transport-error`
//! - Configured static headers are sent
//! - Connection permits are released under concurrent load

use crate::mock_infrastructure::PerspectiveMockBuilder;
use mpic_core::{
    perspective::{Perspective, PerspectiveEndpoint},
    remote::{HttpClient, HttpClientConfig, HttpPerspectiveCaller, PerspectiveCaller},
    types::{CheckErrorKind, CheckParameters, CheckRequest, CheckResponse, CheckType},
};
use serde_json::json;
use std::{sync::Arc, time::Duration};

const TIMEOUT: Duration = Duration::from_secs(2);

fn caller() -> HttpPerspectiveCaller {
    HttpPerspectiveCaller::new(Arc::new(HttpClient::new().unwrap()))
}

fn caa_request() -> CheckRequest {
    CheckRequest {
        domain_or_ip_target: "example.com".to_string(),
        check: CheckParameters::Caa { caa_check_parameters: None },
    }
}

fn endpoint(base: &str, code: &str, check_type: CheckType) -> PerspectiveEndpoint {
    PerspectiveEndpoint::new(format!("{base}{}", PerspectiveMockBuilder::path(code, check_type)))
}

#[tokio::test]
async fn test_successful_caa_response() {
    let mut mock = PerspectiveMockBuilder::new().await;
    mock.mock_check("us-east-1", CheckType::Caa, true).await;

    let response = caller()
        .call(
            &Perspective::new("us-east-1", "arin"),
            &endpoint(&mock.url(), "us-east-1", CheckType::Caa),
            &caa_request(),
            TIMEOUT,
        )
        .await;

    assert!(response.check_passed());
    assert!(response.errors().is_empty());
    match response {
        CheckResponse::Caa(caa) => {
            assert_eq!(caa.perspective_code, "us-east-1");
            assert_eq!(caa.details.caa_record_present, Some(false));
        }
        CheckResponse::Dcv(_) => panic!("expected a CAA response"),
    }
    mock.assert_all().await;
}

#[tokio::test]
async fn test_request_body_carries_target_and_parameters() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/eu-west-1/dcv")
        .match_body(mockito::Matcher::PartialJson(json!({
            "domain_or_ip_target": "example.org",
            "check_type": "dcv",
            "dcv_check_parameters": { "validation_method": "website-change" }
        })))
        .with_status(200)
        .with_body(
            crate::mock_infrastructure::perspective_mock::check_response_body(
                "eu-west-1",
                CheckType::Dcv,
                true,
            )
            .to_string(),
        )
        .create_async()
        .await;

    let request = CheckRequest {
        domain_or_ip_target: "example.org".to_string(),
        check: CheckParameters::Dcv {
            dcv_check_parameters: json!({ "validation_method": "website-change" }),
        },
    };
    let response = caller()
        .call(
            &Perspective::new("eu-west-1", "ripe"),
            &PerspectiveEndpoint::new(format!("{}/eu-west-1/dcv", server.url())),
            &request,
            TIMEOUT,
        )
        .await;

    assert!(response.check_passed());
    assert_eq!(response.check_type(), CheckType::Dcv);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_static_headers_are_sent() {
    let mut mock = PerspectiveMockBuilder::new().await;
    mock.mock_check_requiring_header("us-east-1", CheckType::Caa, "x-api-key", "s3cret").await;

    let mut endpoint = endpoint(&mock.url(), "us-east-1", CheckType::Caa);
    endpoint.headers.insert("x-api-key".to_string(), "s3cret".to_string());

    let response = caller()
        .call(&Perspective::new("us-east-1", "arin"), &endpoint, &caa_request(), TIMEOUT)
        .await;

    assert!(response.check_passed());
    mock.assert_all().await;
}

#[tokio::test]
async fn test_server_error_is_invalid_response() {
    let mut mock = PerspectiveMockBuilder::new().await;
    mock.mock_raw("us-east-1", CheckType::Caa, 503, r#"{"error":"overloaded"}"#).await;

    let response = caller()
        .call(
            &Perspective::new("us-east-1", "arin"),
            &endpoint(&mock.url(), "us-east-1", CheckType::Caa),
            &caa_request(),
            TIMEOUT,
        )
        .await;

    assert!(!response.check_passed());
    assert_eq!(response.failure_kind(), Some(CheckErrorKind::InvalidResponse));
    assert!(response.errors()[0].error_message.contains("503"));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut mock = PerspectiveMockBuilder::new().await;
    mock.mock_raw("us-east-1", CheckType::Caa, 200, r#"{"check_passed": "yes"}"#).await;

    let response = caller()
        .call(
            &Perspective::new("us-east-1", "arin"),
            &endpoint(&mock.url(), "us-east-1", CheckType::Caa),
            &caa_request(),
            TIMEOUT,
        )
        .await;

    assert!(!response.check_passed());
    assert_eq!(response.perspective_code(), "us-east-1");
    assert_eq!(response.failure_kind(), Some(CheckErrorKind::InvalidResponse));
}

#[tokio::test]
async fn test_wrong_check_type_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    let body = crate::mock_infrastructure::perspective_mock::check_response_body(
        "us-east-1",
        CheckType::Dcv,
        true,
    );
    let _mock = server
        .mock("POST", "/us-east-1/caa")
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let response = caller()
        .call(
            &Perspective::new("us-east-1", "arin"),
            &PerspectiveEndpoint::new(format!("{}/us-east-1/caa", server.url())),
            &caa_request(),
            TIMEOUT,
        )
        .await;

    assert!(!response.check_passed(), "a passing DCV body must not count for a CAA check");
    assert_eq!(response.check_type(), CheckType::Caa);
    assert_eq!(response.failure_kind(), Some(CheckErrorKind::InvalidResponse));
}

#[tokio::test]
async fn test_unreachable_perspective_is_transport_error() {
    let response = caller()
        .call(
            &Perspective::new("us-east-1", "arin"),
            &PerspectiveEndpoint::new("http://127.0.0.1:1/us-east-1/caa"),
            &caa_request(),
            TIMEOUT,
        )
        .await;

    assert!(!response.check_passed());
    assert_eq!(response.failure_kind(), Some(CheckErrorKind::TransportError));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_permits_released_under_concurrent_load() {
    let mut mock = PerspectiveMockBuilder::new().await;
    mock.mock_check("us-east-1", CheckType::Caa, true).await;

    let client = Arc::new(
        HttpClient::with_config(&HttpClientConfig {
            max_concurrent_requests: 4,
            ..HttpClientConfig::default()
        })
        .unwrap(),
    );
    let caller = Arc::new(HttpPerspectiveCaller::new(client.clone()));
    let endpoint = Arc::new(endpoint(&mock.url(), "us-east-1", CheckType::Caa));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let caller = caller.clone();
        let endpoint = endpoint.clone();
        handles.push(tokio::spawn(async move {
            caller
                .call(&Perspective::new("us-east-1", "arin"), &endpoint, &caa_request(), TIMEOUT)
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().check_passed());
    }
    assert_eq!(client.available_permits(), 4);
}
