// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the challan server API.
//!
//! Provides [`IssueClient`] which handles request construction,
//! multipart bundling of form fields, proof files and the signature
//! image, idempotency headers, and transient/permanent error
//! classification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use challan_config::model::ServerConfig;
use challan_core::types::{DeliveryOutcome, SubmissionAttempt};
use challan_core::{ChallanError, DeliveryTransport};

/// Path of the issuance endpoint on the challan server.
const ISSUE_PATH: &str = "/api/challan/issue";

/// Path of the health endpoint used by the reachability probe.
pub(crate) const HEALTH_PATH: &str = "/api/health";

/// Idempotency header carried on every delivery attempt, replays included.
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Error body returned by the server on application-level rejections.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

/// HTTP client for challan server communication.
///
/// One delivery attempt per call; retry policy lives in the queue engine,
/// not here. A transport-level failure (connect, timeout, 5xx) comes back
/// as `Err` and is transient by contract; an application rejection comes
/// back as `Ok(DeliveryOutcome::Rejected)`.
#[derive(Debug, Clone)]
pub struct IssueClient {
    client: reqwest::Client,
    base_url: String,
}

impl IssueClient {
    /// Creates a new client from the server configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, ChallanError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ChallanError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Probe the server health endpoint once.
    ///
    /// Any 2xx means reachable; everything else (including transport
    /// failures) means not reachable.
    pub async fn probe_health(&self) -> bool {
        let url = format!("{}{HEALTH_PATH}", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health probe failed");
                false
            }
        }
    }

    /// Bundle an attempt into a multipart form: one text part per form
    /// field, one `attachment` part per proof file, and an optional
    /// `signature` PNG part.
    fn to_form(attempt: &SubmissionAttempt) -> Result<Form, ChallanError> {
        let mut form = Form::new().text("submission_id", attempt.id.to_string());

        for (name, value) in &attempt.fields {
            form = form.text(name.clone(), value.clone());
        }

        for attachment in &attempt.attachments {
            let part = Part::bytes(attachment.data.clone())
                .file_name(attachment.file_name.clone())
                .mime_str(&attachment.content_type)
                .map_err(|e| {
                    ChallanError::Encoding(format!(
                        "invalid content type `{}`: {e}",
                        attachment.content_type
                    ))
                })?;
            form = form.part("attachment", part);
        }

        if let Some(signature) = &attempt.signature {
            let part = Part::bytes(signature.png.clone())
                .file_name("signature.png")
                .mime_str("image/png")
                .map_err(|e| ChallanError::Encoding(format!("signature part: {e}")))?;
            form = form.part("signature", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl DeliveryTransport for IssueClient {
    async fn deliver(
        &self,
        attempt: &SubmissionAttempt,
    ) -> Result<DeliveryOutcome, ChallanError> {
        let url = format!("{}{ISSUE_PATH}", self.base_url);
        let form = Self::to_form(attempt)?;

        let response = self
            .client
            .post(&url)
            .header(IDEMPOTENCY_HEADER, attempt.id.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChallanError::Transport {
                message: format!("delivery request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(submission_id = %attempt.id, status = %status, "delivery response");

        if status.is_success() {
            return Ok(DeliveryOutcome::Accepted);
        }

        // The server saw this idempotency key before: the challan exists,
        // only our copy of the earlier reply was lost.
        if status == StatusCode::CONFLICT {
            return Ok(DeliveryOutcome::AlreadyAccepted);
        }

        if is_transient_status(status) {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "transient server error");
            return Err(ChallanError::Transport {
                message: format!("server returned {status}: {body}"),
                source: None,
            });
        }

        // Remaining 4xx: permanent application rejection, never retried.
        let body = response.text().await.unwrap_or_default();
        let reason = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => api_err.error,
            Err(_) if !body.is_empty() => body,
            Err(_) => format!("server rejected submission with {status}"),
        };
        Ok(DeliveryOutcome::Rejected { reason })
    }
}

/// Whether an HTTP status should be treated as transient.
fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use challan_core::types::{Attachment, SignatureImage};

    fn test_client(base_url: &str) -> IssueClient {
        IssueClient::new(&ServerConfig::default())
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn attempt_with_fields() -> SubmissionAttempt {
        let mut fields = BTreeMap::new();
        fields.insert("passenger_name".to_string(), "A. Kumar".to_string());
        fields.insert("fine_amount".to_string(), "500".to_string());
        SubmissionAttempt::new(fields)
    }

    #[tokio::test]
    async fn accepted_delivery_returns_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/challan/issue"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client.deliver(&attempt_with_fields()).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Accepted);
    }

    #[tokio::test]
    async fn idempotency_header_is_sent() {
        let server = MockServer::start().await;
        let attempt = attempt_with_fields();

        Mock::given(method("POST"))
            .and(path("/api/challan/issue"))
            .and(header("Idempotency-Key", attempt.id.as_str()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.deliver(&attempt).await.unwrap();
    }

    #[tokio::test]
    async fn conflict_means_already_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/challan/issue"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client.deliver(&attempt_with_fields()).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::AlreadyAccepted);
    }

    #[tokio::test]
    async fn validation_failure_is_permanent_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/challan/issue"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({"error": "fine_amount must be numeric"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let outcome = client.deliver(&attempt_with_fields()).await.unwrap();
        assert_eq!(
            outcome,
            DeliveryOutcome::Rejected {
                reason: "fine_amount must be numeric".to_string()
            }
        );
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/challan/issue"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.deliver(&attempt_with_fields()).await;
        assert!(matches!(result, Err(ChallanError::Transport { .. })));
    }

    #[tokio::test]
    async fn unreachable_server_is_transient() {
        // Nothing listens on this port.
        let client = test_client("http://127.0.0.1:9");
        let result = client.deliver(&attempt_with_fields()).await;
        assert!(matches!(result, Err(ChallanError::Transport { .. })));
    }

    #[tokio::test]
    async fn attachments_and_signature_are_bundled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/challan/issue"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut attempt = attempt_with_fields();
        attempt.attachments.push(Attachment {
            file_name: "ticket.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0xff, 0xd8, 0xff],
        });
        attempt.signature = Some(SignatureImage {
            width: 2,
            height: 2,
            png: vec![0x89, 0x50, 0x4e, 0x47],
        });

        let client = test_client(&server.uri());
        let outcome = client.deliver(&attempt).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Accepted);
    }

    #[tokio::test]
    async fn probe_health_reports_reachable_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.probe_health().await);
    }

    #[tokio::test]
    async fn probe_health_reports_unreachable_server() {
        let client = test_client("http://127.0.0.1:9");
        assert!(!client.probe_health().await);
    }
}
