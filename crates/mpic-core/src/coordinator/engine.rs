use std::{fmt, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info};

use super::{
    selection::CohortSelector,
    validation::{validate_request, ValidationIssues},
};
use crate::{
    config::OrchestrationConfig,
    dispatch::Dispatcher,
    perspective::Perspective,
    quorum::{next_step, NextStep, QuorumEvaluator},
    types::{AggregateResult, EffectiveOrchestrationParameters, MpicRequest},
};

/// Request-level failures. Per-perspective failures never surface here.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The request broke one or more orchestration rules; no perspective was called.
    #[error("request validation failed: {0}")]
    Validation(ValidationIssues),

    /// Unexpected fault; reported by the boundary layer as a server-side error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoordinatorError {
    #[must_use]
    pub fn validation_issues(&self) -> Option<&ValidationIssues> {
        match self {
            Self::Validation(issues) => Some(issues),
            Self::Internal(_) => None,
        }
    }
}

/// Runs one MPIC request through validation, cohort dispatch and quorum evaluation.
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct Coordinator {
    dispatcher: Dispatcher,
    target_perspectives: Vec<Arc<Perspective>>,
    selector: CohortSelector,
    evaluator: QuorumEvaluator,
    orchestration: OrchestrationConfig,
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.target_perspectives.iter().map(|p| p.code.as_str()).collect();
        f.debug_struct("Coordinator")
            .field("target_perspectives", &codes)
            .field("global_max_attempts", &self.orchestration.global_max_attempts)
            .field("per_call_timeout", &self.per_call_timeout())
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    #[must_use]
    pub fn new(
        dispatcher: Dispatcher,
        target_perspectives: Vec<Arc<Perspective>>,
        orchestration: OrchestrationConfig,
    ) -> Self {
        Self {
            dispatcher,
            target_perspectives,
            selector: CohortSelector::new(orchestration.hash_secret.clone()),
            evaluator: QuorumEvaluator::new(orchestration.min_passing_rirs),
            orchestration,
        }
    }

    /// Resolved perspectives requests are dispatched to.
    #[must_use]
    pub fn target_perspectives(&self) -> &[Arc<Perspective>] {
        &self.target_perspectives
    }

    #[must_use]
    pub fn per_call_timeout(&self) -> Duration {
        self.orchestration.per_call_timeout()
    }

    /// Coordinates one request.
    ///
    /// Returns a result for every well-formed request, including ones that exhaust their
    /// attempts without reaching quorum (`is_valid == false`).
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::Validation`] if the request breaks an orchestration rule
    /// - [`CoordinatorError::Internal`] if no cohort could be formed for valid parameters
    pub async fn coordinate(&self, request: MpicRequest) -> Result<AggregateResult, CoordinatorError> {
        let params =
            validate_request(&request, &self.orchestration, self.target_perspectives.len())
                .map_err(CoordinatorError::Validation)?;

        let target = request.domain_or_ip_target.as_str();
        let check_type = request.check_type();
        let cohorts =
            self.selector.cohorts(target, &self.target_perspectives, params.perspective_count);
        if cohorts.is_empty() {
            return Err(CoordinatorError::Internal(format!(
                "no cohort of {} perspectives available",
                params.perspective_count
            )));
        }

        let check_request = request.to_check_request();
        let timeout = self.per_call_timeout();
        let mut previous_attempts = Vec::new();
        let mut attempt: u32 = 0;

        let budget = usize::try_from(params.max_attempts).unwrap_or(usize::MAX);
        for cohort in cohorts.iter().cycle().take(budget) {
            attempt += 1;
            let responses =
                self.dispatcher.call_all(cohort, check_type, &check_request, timeout).await;
            let verdict = self.evaluator.evaluate(cohort, &responses, params.quorum_count);
            let step = next_step(&verdict, attempt, params.max_attempts);

            debug!(
                target = %target,
                attempt,
                passed = verdict.passed_count,
                quorum = params.quorum_count,
                passing_rirs = verdict.passing_rirs,
                next = ?step,
                "attempt evaluated"
            );

            if step == NextStep::Retry {
                previous_attempts.push(responses);
                continue;
            }

            info!(
                target = %target,
                check_type = %check_type,
                is_valid = verdict.is_valid,
                attempts = attempt,
                outcome = ?step,
                "coordination completed"
            );

            return Ok(AggregateResult {
                mpic_completed: true,
                domain_or_ip_target: request.domain_or_ip_target.clone(),
                request_orchestration_parameters: request.orchestration_parameters,
                actual_orchestration_parameters: EffectiveOrchestrationParameters {
                    perspective_count: params.perspective_count,
                    quorum_count: params.quorum_count,
                    attempt_count: attempt,
                },
                is_valid: verdict.is_valid,
                perspectives: responses,
                previous_attempt_results: (!previous_attempts.is_empty())
                    .then_some(previous_attempts),
                check: request.check,
            });
        }

        Err(CoordinatorError::Internal("attempt loop ended without a verdict".to_string()))
    }

    /// Releases the shared connection pool. Calls made afterwards fail as transport errors.
    pub fn shutdown(self) {
        self.dispatcher.caller().shutdown();
        info!("coordinator shut down");
    }
}
