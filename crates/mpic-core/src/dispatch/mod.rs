//! Concurrent fan-out of one check request to a set of perspectives.

use futures_util::future::join_all;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    perspective::{EndpointTable, Perspective},
    remote::PerspectiveCaller,
    types::{CheckErrorKind, CheckRequest, CheckResponse, CheckType},
};

/// Issues one call per perspective concurrently and collects every outcome.
///
/// Each call is bounded by its own timeout, so a slow perspective delays the join by at most
/// `per_call_timeout`. The returned responses are in the same order as the input
/// perspectives regardless of completion order.
#[derive(Clone)]
pub struct Dispatcher {
    caller: Arc<dyn PerspectiveCaller>,
    endpoints: Arc<EndpointTable>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(caller: Arc<dyn PerspectiveCaller>, endpoints: Arc<EndpointTable>) -> Self {
        Self { caller, endpoints }
    }

    #[must_use]
    pub fn caller(&self) -> &Arc<dyn PerspectiveCaller> {
        &self.caller
    }

    /// Calls every perspective and returns exactly one response per perspective.
    pub async fn call_all(
        &self,
        perspectives: &[Arc<Perspective>],
        check_type: CheckType,
        request: &CheckRequest,
        per_call_timeout: Duration,
    ) -> Vec<CheckResponse> {
        debug!(
            check_type = %check_type,
            perspective_count = perspectives.len(),
            timeout_ms = per_call_timeout.as_millis(),
            "dispatching check to perspectives"
        );

        let calls = perspectives
            .iter()
            .map(|perspective| self.call_one(perspective, check_type, request, per_call_timeout));

        join_all(calls).await
    }

    async fn call_one(
        &self,
        perspective: &Perspective,
        check_type: CheckType,
        request: &CheckRequest,
        per_call_timeout: Duration,
    ) -> CheckResponse {
        let Some(endpoint) = self.endpoints.get(check_type, &perspective.code) else {
            warn!(perspective = %perspective.code, check_type = %check_type, "no endpoint configured");
            return CheckResponse::failed(
                check_type,
                &perspective.code,
                CheckErrorKind::TransportError,
                format!("no {check_type} endpoint configured for perspective"),
            );
        };

        let call = self.caller.call(perspective, endpoint, request, per_call_timeout);
        if let Ok(response) = tokio::time::timeout(per_call_timeout, call).await {
            response
        } else {
            warn!(
                perspective = %perspective.code,
                timeout_ms = per_call_timeout.as_millis(),
                "perspective call timed out"
            );
            CheckResponse::failed(
                check_type,
                &perspective.code,
                CheckErrorKind::Timeout,
                format!("no response within {}ms", per_call_timeout.as_millis()),
            )
        }
    }
}
