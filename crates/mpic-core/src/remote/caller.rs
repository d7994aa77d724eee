use async_trait::async_trait;
use bytes::Bytes;
use std::{sync::Arc, time::Duration};

use super::{errors::RemoteCallError, http_client::HttpClient};
use crate::{
    perspective::{Perspective, PerspectiveEndpoint},
    types::{CheckRequest, CheckResponse, CheckType},
};

/// Performs one check against one remote perspective.
///
/// Implementations never fail: every outcome, including transport errors and timeouts, is
/// returned as a [`CheckResponse`]. Failed calls are synthesized with
/// [`CheckResponse::failed`] so they can never count as a pass.
#[async_trait]
pub trait PerspectiveCaller: Send + Sync {
    async fn call(
        &self,
        perspective: &Perspective,
        endpoint: &PerspectiveEndpoint,
        request: &CheckRequest,
        timeout: Duration,
    ) -> CheckResponse;

    /// Releases any shared resources. Calls made afterwards fail as transport errors.
    fn shutdown(&self) {}
}

/// [`PerspectiveCaller`] that POSTs the check request as JSON over the shared [`HttpClient`].
#[derive(Clone)]
pub struct HttpPerspectiveCaller {
    client: Arc<HttpClient>,
}

impl HttpPerspectiveCaller {
    #[must_use]
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    async fn try_call(
        &self,
        endpoint: &PerspectiveEndpoint,
        request: &CheckRequest,
        timeout: Duration,
    ) -> Result<CheckResponse, RemoteCallError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| RemoteCallError::InvalidRequest(e.to_string()))?;

        let bytes =
            self.client.post_json(&endpoint.url, &endpoint.headers, Bytes::from(body), timeout).await?;

        parse_response(&bytes, request.check_type())
    }
}

/// Parses a perspective's response body and checks it answers the expected check type.
pub(crate) fn parse_response(
    bytes: &[u8],
    expected: CheckType,
) -> Result<CheckResponse, RemoteCallError> {
    let response: CheckResponse = serde_json::from_slice(bytes)
        .map_err(|e| RemoteCallError::InvalidResponse(format!("malformed body: {e}")))?;

    if response.check_type() != expected {
        return Err(RemoteCallError::InvalidResponse(format!(
            "expected {expected} response, got {}",
            response.check_type()
        )));
    }

    Ok(response)
}

#[async_trait]
impl PerspectiveCaller for HttpPerspectiveCaller {
    async fn call(
        &self,
        perspective: &Perspective,
        endpoint: &PerspectiveEndpoint,
        request: &CheckRequest,
        timeout: Duration,
    ) -> CheckResponse {
        match self.try_call(endpoint, request, timeout).await {
            Ok(response) => {
                if response.perspective_code() != perspective.code {
                    tracing::debug!(
                        perspective = %perspective.code,
                        reported = %response.perspective_code(),
                        "perspective reported a different code"
                    );
                }
                response
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(
                    perspective = %perspective.code,
                    check_type = %request.check_type(),
                    error_kind = %kind,
                    error = %e,
                    "perspective call failed"
                );
                CheckResponse::failed(request.check_type(), &perspective.code, kind, e.to_string())
            }
        }
    }

    fn shutdown(&self) {
        self.client.shutdown();
    }
}
