use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carscube_core::error::Error;
use carscube_core::model::FraudRisk;
use carscube_core::prelude::*;
use carscube_core::store::{KvStore, MemoryKv, REPORTS_KEY};

/// Key-value double that can be armed to reject writes to the report
/// collection while leaving session writes untouched.
struct FlakyReportKv {
    inner: MemoryKv,
    reject_report_writes: AtomicBool,
}

impl FlakyReportKv {
    fn new() -> Self {
        Self {
            inner: MemoryKv::new(),
            reject_report_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl KvStore for FlakyReportKv {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        if key == REPORTS_KEY && self.reject_report_writes.load(Ordering::SeqCst) {
            return Err(Error::persist("storage full"));
        }
        self.inner.set(key, value).await
    }
}

fn sample_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([140, 20, 20])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn assessment_response() -> serde_json::Value {
    let text = json!({
        "vehicleType": "Scooter",
        "fraudRisk": "Low",
        "damages": [{
            "id": "dmg-1",
            "type": "Scratch",
            "category": "Cosmetic",
            "severity": "Low",
            "description": "Light scratch on the side panel",
            "estimatedCost": 600.0,
            "repairCosts": { "labor": 600.0, "parts": [], "bestOptionTotal": 600.0 },
            "box_2d": [100.0, 100.0, 300.0, 500.0]
        }],
        "totalEstimatedCost": 600.0,
        "summary": "Minor cosmetic damage",
        "confidenceScore": 0.9
    })
    .to_string();
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

async fn mount_vision(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(assessment_response()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn signed_in_client(server: &MockServer, kv: Arc<dyn KvStore>) -> Carscube {
    let _ = pretty_env_logger::try_init();
    let client = Carscube::new_with_options(&server.uri(), "test-key", kv, ClientOptions::default());
    client.auth().sign_in("Asha", "asha@example.com").await.unwrap();
    client
}

#[tokio::test]
async fn scan_runs_to_done_and_spends_one_credit() {
    let server = MockServer::start().await;
    mount_vision(&server, 1).await;
    let client = signed_in_client(&server, Arc::new(MemoryKv::new())).await;
    let user_id = client.auth().current_user().unwrap().id;

    let scanner = client.scanner();
    let report_id = scanner.scan(sample_png()).await.unwrap();

    assert_eq!(scanner.state(), ScanState::Done(report_id.clone()));
    assert_eq!(client.auth().current_user().unwrap().credits, 4);

    // The new report leads the user's list and its detail is already cached
    let listed = client.cache().list(Some(&user_id)).await.unwrap();
    assert_eq!(listed[0].assessment.id, report_id);
    let detail = client.cache().detail(&report_id).await.unwrap();
    assert_eq!(detail.user_id, user_id);
    assert!(detail.image_url.starts_with("data:image/jpeg;base64,"));
    assert_eq!(detail.assessment.fraud_risk, FraudRisk::Low);
}

#[tokio::test]
async fn scan_refuses_at_zero_credits_without_calling_the_model() {
    let server = MockServer::start().await;
    mount_vision(&server, 0).await;
    let client = signed_in_client(&server, Arc::new(MemoryKv::new())).await;

    let mut broke = client.auth().current_user().unwrap();
    broke.credits = 0;
    client.auth().update_profile(broke).await.unwrap();

    let scanner = client.scanner();
    let err = scanner.scan(sample_png()).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientCredits));
    assert!(matches!(scanner.state(), ScanState::Failed(_)));
}

#[tokio::test]
async fn scan_rejects_non_image_uploads_before_preprocessing() {
    let server = MockServer::start().await;
    mount_vision(&server, 0).await;
    let client = signed_in_client(&server, Arc::new(MemoryKv::new())).await;

    let scanner = client.scanner();
    let err = scanner.scan(b"<html>not an image</html>".to_vec()).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(matches!(scanner.state(), ScanState::Failed(_)));
    assert_eq!(client.auth().current_user().unwrap().credits, 5);
}

#[tokio::test]
async fn scan_requires_an_active_session() {
    let server = MockServer::start().await;
    mount_vision(&server, 0).await;
    let client = Carscube::new_with_options(
        &server.uri(),
        "test-key",
        Arc::new(MemoryKv::new()),
        ClientOptions::default(),
    );

    let err = client.scanner().scan(sample_png()).await.unwrap_err();
    assert!(err.to_string().contains("no active session"));
}

#[tokio::test]
async fn failed_persist_keeps_the_debit() {
    let server = MockServer::start().await;
    mount_vision(&server, 1).await;
    let kv = Arc::new(FlakyReportKv::new());
    let client = signed_in_client(&server, kv.clone()).await;

    kv.reject_report_writes.store(true, Ordering::SeqCst);
    let scanner = client.scanner();
    let err = scanner.scan(sample_png()).await.unwrap_err();

    assert!(matches!(err, Error::Persist(_)));
    assert!(matches!(scanner.state(), ScanState::Failed(_)));
    // The credit was spent on the analysis and is not refunded
    assert_eq!(client.auth().current_user().unwrap().credits, 4);
}

#[tokio::test]
async fn a_second_scan_is_rejected_while_one_is_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(assessment_response())
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = signed_in_client(&server, Arc::new(MemoryKv::new())).await;

    let scanner = Arc::new(client.scanner());
    let first = {
        let scanner = scanner.clone();
        tokio::spawn(async move { scanner.scan(sample_png()).await })
    };

    // The first attempt is parked on the delayed model response
    tokio::time::sleep(Duration::from_millis(100)).await;
    let err = scanner.scan(sample_png()).await.unwrap_err();
    assert!(err.to_string().contains("already in flight"));

    // The rejection does not disturb the in-flight attempt
    let report_id = first.await.unwrap().unwrap();
    assert_eq!(scanner.state(), ScanState::Done(report_id));
    assert_eq!(client.auth().current_user().unwrap().credits, 4);
}

#[tokio::test]
async fn reset_returns_a_finished_attempt_to_idle() {
    let server = MockServer::start().await;
    mount_vision(&server, 1).await;
    let client = signed_in_client(&server, Arc::new(MemoryKv::new())).await;

    let scanner = client.scanner();
    scanner.scan(sample_png()).await.unwrap();
    assert!(matches!(scanner.state(), ScanState::Done(_)));

    scanner.reset();
    assert_eq!(scanner.state(), ScanState::Idle);
    assert_eq!(*scanner.subscribe_status().borrow(), "Initializing...");
}

#[tokio::test]
async fn session_survives_a_reload_through_the_store() {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKv::new());
    let server = MockServer::start().await;

    let first = signed_in_client(&server, kv.clone()).await;
    let user_id = first.auth().current_user().unwrap().id;
    drop(first);

    let second = Carscube::new_with_options(
        &server.uri(),
        "test-key",
        kv,
        ClientOptions::default(),
    );
    let restored = second.auth().load_session().await.unwrap().unwrap();
    assert_eq!(restored.id, user_id);
    assert_eq!(restored.credits, 5);
}
