// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-stack submission flow: issuance form through queue, storage, and
//! HTTP client against a mock challan server.

use std::sync::Arc;

use tempfile::tempdir;
use tokio::sync::watch;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use challan_client::IssueClient;
use challan_config::model::{QueueConfig, ServerConfig, StorageConfig};
use challan_core::types::{Attachment, Reachability, SubmitOutcome};
use challan_core::SubmissionStore;
use challan_form::IssuanceForm;
use challan_queue::SubmissionQueue;
use challan_storage::SqliteStore;

struct Fixture {
    queue: SubmissionQueue,
    store: Arc<SqliteStore>,
    reachability: watch::Sender<Reachability>,
    _dir: tempfile::TempDir,
}

async fn fixture(server: &MockServer, initial: Reachability) -> Fixture {
    let dir = tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(StorageConfig {
        database_path: dir.path().join("queue.db").to_str().unwrap().to_string(),
        wal_mode: true,
    }));
    store.initialize().await.unwrap();

    let client = IssueClient::new(&ServerConfig::default())
        .unwrap()
        .with_base_url(server.uri());

    let (tx, rx) = watch::channel(initial);
    let queue = SubmissionQueue::new(store.clone(), Arc::new(client), rx, &QueueConfig::default());
    Fixture {
        queue,
        store,
        reachability: tx,
        _dir: dir,
    }
}

fn filled_form() -> IssuanceForm {
    let mut form = IssuanceForm::new();
    form.set_field("passenger_name", "A. Kumar");
    form.set_field("train_number", "12301");
    form.set_field("offense_type", "ticketless-travel");
    form.set_field("fine_amount", "500");
    form
}

#[tokio::test]
async fn online_issuance_delivers_with_proof_and_idempotency_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/challan/issue"))
        .and(header_exists("Idempotency-Key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Reachability::Online).await;

    let mut form = filled_form();
    form.attachments_mut()
        .set_files(
            vec![Attachment {
                file_name: "ticket.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                data: vec![0xff, 0xd8, 0xff],
            }],
            Reachability::Online,
        )
        .unwrap();
    form.signature_mut()
        .append_stroke(vec![(20.0, 40.0), (120.0, 60.0), (200.0, 45.0)]);

    let attempt = form.build(Reachability::Online).unwrap();
    let outcome = fx.queue.submit(attempt).await;

    assert!(matches!(outcome, SubmitOutcome::Delivered { .. }));
    assert_eq!(fx.store.pending_count().await.unwrap(), 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn offline_issuance_queues_then_replays_after_reconnect() {
    let server = MockServer::start().await;
    let fx = fixture(&server, Reachability::Offline).await;

    // Offline: the form refuses attachments and the queue persists the
    // text-only attempt without touching the network.
    let mut form = filled_form();
    assert!(form
        .attachments_mut()
        .set_files(
            vec![Attachment {
                file_name: "ticket.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                data: vec![1],
            }],
            Reachability::Offline,
        )
        .is_err());

    let attempt = form.build(Reachability::Offline).unwrap();
    let submission_id = attempt.id.clone();
    let outcome = fx.queue.submit(attempt).await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Queued {
            attachments_dropped: false,
            ..
        }
    ));
    assert_eq!(fx.store.pending_count().await.unwrap(), 1);
    assert!(server.received_requests().await.unwrap().is_empty());

    // Server comes back; the queued entry replays with the same
    // submission id it was issued under.
    Mock::given(method("POST"))
        .and(path("/api/challan/issue"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    fx.reachability.send(Reachability::Online).unwrap();

    let report = fx.queue.replay().await;
    assert_eq!(report.delivered, 1);
    assert_eq!(fx.store.pending_count().await.unwrap(), 0);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let key = requests[0]
        .headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(key, submission_id.as_str());
}

#[tokio::test]
async fn replay_of_already_accepted_submission_creates_no_duplicate() {
    let server = MockServer::start().await;
    // The server remembers the idempotency key from a delivery whose
    // acknowledgment never reached us.
    Mock::given(method("POST"))
        .and(path("/api/challan/issue"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Reachability::Offline).await;
    let attempt = filled_form().build(Reachability::Offline).unwrap();
    fx.queue.submit(attempt).await;

    fx.reachability.send(Reachability::Online).unwrap();
    let report = fx.queue.replay().await;

    // Treated as success: the entry is drained, nothing lands in the
    // failure list, and no second issue request goes out.
    assert_eq!(report.delivered, 1);
    assert_eq!(report.rejected, 0);
    assert_eq!(fx.store.pending_count().await.unwrap(), 0);
    assert!(fx.store.list_failures().await.unwrap().is_empty());
}

#[tokio::test]
async fn server_rejection_records_durable_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/challan/issue"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(serde_json::json!({"error": "fine_amount must be numeric"})),
        )
        .mount(&server)
        .await;

    let fx = fixture(&server, Reachability::Offline).await;
    let mut form = filled_form();
    form.set_field("fine_amount", "five hundred");
    let attempt = form.build(Reachability::Offline).unwrap();
    fx.queue.submit(attempt).await;

    fx.reachability.send(Reachability::Online).unwrap();
    let report = fx.queue.replay().await;

    assert_eq!(report.rejected, 1);
    let failures = fx.store.list_failures().await.unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].detail, "fine_amount must be numeric");
}
