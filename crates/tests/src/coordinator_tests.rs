//! End-to-end coordinator tests.
//!
//! These build the coordinator from configuration the way the CLI does and verify:
//! - Quorum with a failed perspective on the first attempt
//! - Rejection before dispatch when orchestration parameters are invalid
//! - Escalation to a fresh cohort and attempt-budget exhaustion
//! - Re-querying a small pool until the attempt budget is spent
//! - Silent exclusion of configured codes absent from the registry
//! - Concurrent coordinations sharing one coordinator

use crate::mock_infrastructure::{
    app_config_for, caa_request, dcv_request, six_perspective_codes, six_perspective_registry,
    Behavior, PerspectiveMockBuilder, ScriptedCaller,
};
use mpic_core::{
    coordinator::{CohortSelector, Coordinator, CoordinatorBuilder, ValidationIssueKind},
    perspective::{Perspective, PerspectiveRegistry},
    types::{CheckErrorKind, CheckResponse, CheckType},
};
use std::{collections::HashSet, sync::Arc, time::Duration};

const TARGET: &str = "example.com";

fn cohort_codes(coordinator: &Coordinator, size: usize) -> Vec<Vec<String>> {
    CohortSelector::new("integration-secret")
        .cohorts(TARGET, coordinator.target_perspectives(), size)
        .iter()
        .map(|c| c.iter().map(|p| p.code.clone()).collect())
        .collect()
}

fn scripted_coordinator(caller: &Arc<ScriptedCaller>) -> Coordinator {
    CoordinatorBuilder::new(app_config_for("http://unused.invalid", &six_perspective_codes()))
        .registry(six_perspective_registry())
        .caller(caller.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_two_pass_one_transport_error_is_valid() {
    let mut mock = PerspectiveMockBuilder::new().await;
    let codes = six_perspective_codes();
    let layout = CoordinatorBuilder::new(app_config_for(&mock.url(), &codes))
        .registry(six_perspective_registry())
        .build()
        .unwrap();
    let first = cohort_codes(&layout, 3).remove(0);

    mock.mock_check(&first[0], CheckType::Caa, true).await;
    mock.mock_check(&first[1], CheckType::Caa, true).await;

    let mut config = app_config_for(&mock.url(), &codes);
    config.perspectives.get_mut(&first[2]).unwrap().caa_endpoint_info.url =
        "http://127.0.0.1:1/caa".to_string();
    let coordinator = CoordinatorBuilder::new(config)
        .registry(six_perspective_registry())
        .build()
        .unwrap();

    let result = coordinator.coordinate(caa_request(TARGET, Some(3), Some(2))).await.unwrap();

    assert!(result.is_valid);
    assert!(result.mpic_completed);
    assert_eq!(result.actual_orchestration_parameters.attempt_count, 1);
    assert_eq!(result.actual_orchestration_parameters.perspective_count, 3);
    assert_eq!(result.actual_orchestration_parameters.quorum_count, 2);
    assert_eq!(result.perspectives.len(), 3);
    assert_eq!(result.perspectives.iter().filter(|r| r.check_passed()).count(), 2);
    assert_eq!(result.perspectives[2].perspective_code(), first[2]);
    assert_eq!(result.perspectives[2].failure_kind(), Some(CheckErrorKind::TransportError));
    assert!(result.previous_attempt_results.is_none());
    mock.assert_all().await;
}

#[tokio::test]
async fn test_quorum_above_count_rejected_without_calls() {
    let mut mock = PerspectiveMockBuilder::new().await;
    let codes = six_perspective_codes();
    for code in &codes {
        mock.expect_no_calls(code, CheckType::Caa).await;
    }
    let coordinator = CoordinatorBuilder::new(app_config_for(&mock.url(), &codes))
        .registry(six_perspective_registry())
        .build()
        .unwrap();

    let err = coordinator.coordinate(caa_request(TARGET, Some(3), Some(4))).await.unwrap_err();

    let issues = err.validation_issues().expect("validation error");
    assert!(issues.contains(ValidationIssueKind::InvalidQuorumCount));
    mock.assert_all().await;
}

#[tokio::test]
async fn test_perspective_count_above_available_rejected() {
    let caller = Arc::new(ScriptedCaller::new());
    let coordinator = scripted_coordinator(&caller);

    let err = coordinator.coordinate(caa_request(TARGET, Some(7), None)).await.unwrap_err();

    assert!(err.validation_issues().unwrap().contains(ValidationIssueKind::InvalidPerspectiveCount));
    assert_eq!(caller.call_count(), 0);
}

#[tokio::test]
async fn test_single_pass_escalates_to_second_cohort() {
    let caller = Arc::new(ScriptedCaller::new());
    let coordinator = scripted_coordinator(&caller);
    let cohorts = cohort_codes(&coordinator, 3);
    assert_eq!(cohorts.len(), 2);
    for code in &cohorts[0][1..] {
        caller.set(code, Behavior::Fail);
    }

    let result = coordinator.coordinate(caa_request(TARGET, Some(3), Some(2))).await.unwrap();

    assert!(result.is_valid);
    assert_eq!(result.actual_orchestration_parameters.attempt_count, 2);
    let previous = result.previous_attempt_results.as_ref().unwrap();
    assert_eq!(previous.len(), 1);
    let first: Vec<_> = previous[0].iter().map(CheckResponse::perspective_code).collect();
    let second: Vec<_> = result.perspectives.iter().map(CheckResponse::perspective_code).collect();
    assert_eq!(first, cohorts[0]);
    assert_eq!(second, cohorts[1]);
    assert_eq!(caller.calls().len(), 6);
}

#[tokio::test]
async fn test_exhaustion_reports_invalid_at_global_max() {
    let caller = Arc::new(ScriptedCaller::new());
    for code in six_perspective_codes() {
        caller.set(code, Behavior::Fail);
    }
    let coordinator = scripted_coordinator(&caller);

    let result = coordinator.coordinate(caa_request(TARGET, Some(2), Some(1))).await.unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.actual_orchestration_parameters.attempt_count, 2);
    assert_eq!(caller.call_count(), 4);
    let called: HashSet<_> = caller.calls().into_iter().collect();
    assert_eq!(called.len(), 4, "each attempt uses fresh perspectives");
}

#[tokio::test]
async fn test_small_pool_spends_full_attempt_budget() {
    let registry = PerspectiveRegistry::new(vec![
        Perspective::new("a", "arin"),
        Perspective::new("b", "ripe"),
        Perspective::new("c", "apnic"),
    ])
    .unwrap();
    let config = app_config_for("http://unused.invalid", &["a", "b", "c"]);
    let global_max = config.orchestration.global_max_attempts;
    assert_eq!(global_max, 2);

    let caller = Arc::new(ScriptedCaller::new());
    caller.set("a", Behavior::TransportError);
    caller.set("b", Behavior::TransportError);
    let coordinator = CoordinatorBuilder::new(config)
        .registry(registry)
        .caller(caller.clone())
        .build()
        .unwrap();

    let result = coordinator.coordinate(caa_request(TARGET, Some(3), Some(2))).await.unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.actual_orchestration_parameters.attempt_count, global_max);
    assert_eq!(result.previous_attempt_results.as_ref().map(Vec::len), Some(1));
    assert_eq!(caller.call_count(), 6);
}

#[tokio::test]
async fn test_unknown_configured_codes_are_excluded() {
    let mut codes = six_perspective_codes();
    codes.push("mars-north-1");
    codes.push("moon-base-1");
    let coordinator = CoordinatorBuilder::new(app_config_for("http://unused.invalid", &codes))
        .registry(six_perspective_registry())
        .caller(Arc::new(ScriptedCaller::new()))
        .build()
        .unwrap();

    assert_eq!(coordinator.target_perspectives().len(), 6);
    assert!(coordinator.target_perspectives().iter().all(|p| !p.code.contains("mars")));
}

#[tokio::test]
async fn test_dcv_request_with_defaults_and_a_timeout() {
    let caller = Arc::new(ScriptedCaller::new());
    let mut config = app_config_for("http://unused.invalid", &six_perspective_codes());
    config.orchestration.per_call_timeout_ms = 200;
    let coordinator = CoordinatorBuilder::new(config)
        .registry(six_perspective_registry())
        .caller(caller.clone())
        .build()
        .unwrap();
    let first = CohortSelector::new("integration-secret")
        .cohorts("example.net", coordinator.target_perspectives(), 3)
        .remove(0);
    caller.set(&first[0].code, Behavior::Delayed(Duration::from_secs(10), true));

    let result = coordinator.coordinate(dcv_request("example.net")).await.unwrap();

    assert!(result.is_valid);
    assert_eq!(result.check_type(), CheckType::Dcv);
    assert!(result.request_orchestration_parameters.is_none());
    assert_eq!(result.actual_orchestration_parameters.perspective_count, 3);
    assert_eq!(result.actual_orchestration_parameters.quorum_count, 2);
    assert_eq!(result.perspectives[0].failure_kind(), Some(CheckErrorKind::Timeout));
    assert!(result.perspectives.iter().all(|r| r.check_type() == CheckType::Dcv));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_coordinations_are_independent() {
    let caller = Arc::new(ScriptedCaller::new());
    let coordinator = Arc::new(scripted_coordinator(&caller));

    let mut handles = Vec::new();
    for i in 0..10 {
        let coordinator = coordinator.clone();
        handles.push(tokio::spawn(async move {
            coordinator.coordinate(caa_request(&format!("host{i}.example.com"), None, None)).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert!(result.is_valid);
        assert_eq!(result.actual_orchestration_parameters.attempt_count, 1);
    }
    assert_eq!(caller.call_count(), 30);
}

#[tokio::test]
async fn test_shutdown_reaches_the_caller() {
    let caller = Arc::new(ScriptedCaller::new());
    let coordinator = scripted_coordinator(&caller);

    coordinator.shutdown();

    assert!(caller.is_shut_down());
}

#[tokio::test]
async fn test_result_serializes_with_tagged_perspectives() {
    let caller = Arc::new(ScriptedCaller::new());
    let coordinator = scripted_coordinator(&caller);

    let result = coordinator.coordinate(caa_request(TARGET, Some(2), Some(1))).await.unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["check_type"], "caa");
    assert_eq!(json["is_valid"], true);
    assert_eq!(json["actual_orchestration_parameters"]["attempt_count"], 1);
    assert_eq!(json["request_orchestration_parameters"]["perspective_count"], 2);
    assert_eq!(json["perspectives"][0]["check_type"], "caa");
    assert!(json.get("previous_attempt_results").is_none());
}
