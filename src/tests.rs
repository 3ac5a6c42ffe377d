//! Integration tests for the intake backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::Uri;
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};

use crate::geo::GeoClient;
use crate::notify::{MailError, MailTransport, NotificationDispatcher, OutboundMessage};
use crate::{create_router, AppState};

/// Mail transport double that records instead of sending.
struct RecordingMailer {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingMailer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Mail transport double that always fails.
struct FailingMailer;

#[async_trait]
impl MailTransport for FailingMailer {
    async fn send(&self, _message: &OutboundMessage) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

/// Stub geolocation provider: answers every path with a canned body and
/// records which paths were requested.
#[derive(Clone)]
struct GeoStub {
    body: Arc<Value>,
    paths: Arc<Mutex<Vec<String>>>,
}

async fn geo_stub_handler(State(stub): State<GeoStub>, uri: Uri) -> Json<Value> {
    stub.paths.lock().unwrap().push(uri.path().to_string());
    Json((*stub.body).clone())
}

async fn spawn_geo_stub(body: Value) -> (String, Arc<Mutex<Vec<String>>>) {
    let paths = Arc::new(Mutex::new(Vec::new()));
    let stub = GeoStub {
        body: Arc::new(body),
        paths: paths.clone(),
    };
    let app = Router::new().fallback(geo_stub_handler).with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind geo stub");
    let addr = listener.local_addr().expect("Failed to get stub addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), paths)
}

fn provider_success_body() -> Value {
    json!({
        "success": true,
        "ip": "203.0.113.9",
        "city": "San Francisco",
        "region": "California",
        "region_code": "CA",
        "country": "United States",
        "country_code": "US",
        "postal": "94105",
        "latitude": 37.78,
        "longitude": -122.39,
        "timezone": { "id": "America/Los_Angeles" }
    })
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    outbox: Arc<RecordingMailer>,
    geo_paths: Arc<Mutex<Vec<String>>>,
}

impl TestFixture {
    async fn new() -> Self {
        Self::build(
            TransportKind::Recording,
            Some("staff@example.org".to_string()),
            provider_success_body(),
        )
        .await
    }

    async fn build(transport: TransportKind, staff: Option<String>, geo_body: Value) -> Self {
        let (geo_url, geo_paths) = spawn_geo_stub(geo_body).await;

        let outbox = RecordingMailer::new();
        let mail_transport: Option<Arc<dyn MailTransport>> = match transport {
            TransportKind::Recording => Some(outbox.clone()),
            TransportKind::Failing => Some(Arc::new(FailingMailer)),
            TransportKind::None => None,
        };

        let state = AppState {
            geo: Arc::new(GeoClient::new(geo_url)),
            notifier: Arc::new(NotificationDispatcher::new(mail_transport, staff)),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            outbox,
            geo_paths,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

enum TransportKind {
    Recording,
    Failing,
    None,
}

fn sample_submission() -> Value {
    json!({
        "applicantInfo": {
            "referralSource": "friend",
            "assistanceSince2020": "no",
            "firstName": "Ana",
            "lastName": "Lee",
            "dateOfBirth": "1990-04-12",
            "phone": "4155550192",
            "email": "ana@example.com"
        },
        "eligibility": {
            "livesInSF": "yes",
            "householdSize": "2",
            "monthlyIncome": "2100",
            "assistanceType": "moving",
            "newApartmentStreet": "500 Hayes St",
            "newApartmentUnit": "2B",
            "newApartmentCity": "San Francisco",
            "newApartmentState": "CA",
            "newApartmentZip": "94102",
            "newApartmentAddressConfirmation": "yes"
        },
        "address": {
            "addressLine1": "201 Folsom St",
            "city": "San Francisco",
            "zipCode": "94105"
        },
        "household": {
            "livingSituation": "renting",
            "hasChanges": "no",
            "expectingChild": "no",
            "members": [
                { "name": "Sam Lee", "age": "9", "relationship": "child" }
            ],
            "adults": "1"
        },
        "employment": {
            "employed": "yes",
            "employmentType": "fullTime",
            "occupation": "Cook",
            "employerName": "Diner"
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_submit_application_success() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/application/submit"))
        .json(&sample_submission())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);

    let number = body["applicationNumber"].as_str().unwrap();
    assert_eq!(number.len(), 8);
    assert!(number.chars().all(|c| c.is_ascii_digit()));

    // Staff summary plus applicant confirmation.
    let messages = fixture.outbox.messages();
    assert_eq!(messages.len(), 2);
    let recipients: Vec<&str> = messages.iter().map(|m| m.to.as_str()).collect();
    assert!(recipients.contains(&"staff@example.org"));
    assert!(recipients.contains(&"ana@example.com"));

    let staff = messages
        .iter()
        .find(|m| m.to == "staff@example.org")
        .unwrap();
    assert!(staff.subject.contains(number));
    assert!(staff.html.contains("Ana Lee"));
    assert!(staff.text.contains("Occupation / role: Cook"));
}

#[tokio::test]
async fn test_submit_escapes_html_in_answers() {
    let fixture = TestFixture::new().await;

    let mut payload = sample_submission();
    payload["applicantInfo"]["firstName"] = json!("<script>alert(1)</script>");

    let resp = fixture
        .client
        .post(fixture.url("/api/application/submit"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let messages = fixture.outbox.messages();
    let staff = messages
        .iter()
        .find(|m| m.to == "staff@example.org")
        .unwrap();
    assert!(staff.html.contains("&lt;script&gt;"));
    assert!(!staff.html.contains("<script>"));
}

#[tokio::test]
async fn test_submit_missing_email_rejected() {
    let fixture = TestFixture::new().await;

    let mut payload = sample_submission();
    payload["applicantInfo"]
        .as_object_mut()
        .unwrap()
        .remove("email");

    let resp = fixture
        .client
        .post(fixture.url("/api/application/submit"))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Missing applicant contact details.");
    assert!(fixture.outbox.messages().is_empty());
}

#[tokio::test]
async fn test_submit_without_mail_config_still_succeeds() {
    let fixture = TestFixture::build(
        TransportKind::None,
        Some("staff@example.org".to_string()),
        provider_success_body(),
    )
    .await;

    let resp = fixture
        .client
        .post(fixture.url("/api/application/submit"))
        .json(&sample_submission())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert!(body["applicationNumber"].is_string());
    assert!(fixture.outbox.messages().is_empty());
}

#[tokio::test]
async fn test_submit_transport_failure_returns_500() {
    let fixture = TestFixture::build(
        TransportKind::Failing,
        Some("staff@example.org".to_string()),
        provider_success_body(),
    )
    .await;

    let resp = fixture
        .client
        .post(fixture.url("/api/application/submit"))
        .json(&sample_submission())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Unable to process application.");
}

#[tokio::test]
async fn test_submit_malformed_body_rejected() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/application/submit"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn test_contact_sends_staff_notification() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "name": "Bo Chen",
            "email": "bo@example.com",
            "subject": "Question about eligibility",
            "message": "Do I qualify if I just moved?"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);

    let messages = fixture.outbox.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].to, "staff@example.org");
    assert!(messages[0].subject.contains("Question about eligibility"));
    assert!(messages[0].text.contains("bo@example.com"));
}

#[tokio::test]
async fn test_contact_honeypot_is_silently_dropped() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "name": "Bot",
            "email": "bot@example.com",
            "subject": "spam",
            "message": "spam",
            "honeypot": "gotcha"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert!(fixture.outbox.messages().is_empty());
}

#[tokio::test]
async fn test_contact_rejects_non_string_fields() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "name": 42,
            "email": "bo@example.com",
            "subject": "hi",
            "message": "hello"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Invalid payload");

    // A missing field is rejected the same way.
    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "name": "Bo",
            "email": "bo@example.com",
            "subject": "hi"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_contact_without_staff_configured_still_succeeds() {
    let fixture =
        TestFixture::build(TransportKind::Recording, None, provider_success_body()).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/contact"))
        .json(&json!({
            "name": "Bo",
            "email": "bo@example.com",
            "subject": "hi",
            "message": "hello"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert!(fixture.outbox.messages().is_empty());
}

#[tokio::test]
async fn test_location_lookup_normalizes_provider_payload() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/location?ip=8.8.8.8"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "no-store, max-age=0"
    );

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["city"], "San Francisco");
    assert_eq!(body["region"], "California");
    assert_eq!(body["region_code"], "CA");
    assert_eq!(body["timezone"], "America/Los_Angeles");
    assert!(body.get("error").is_none());

    // The explicit override was forwarded to the provider.
    let paths = fixture.geo_paths.lock().unwrap().clone();
    assert_eq!(paths, vec!["/8.8.8.8".to_string()]);
}

#[tokio::test]
async fn test_location_private_address_is_not_forwarded() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/location"))
        .header("x-forwarded-for", "192.168.1.5")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["city"], "San Francisco");

    // The provider was queried without an explicit target.
    let paths = fixture.geo_paths.lock().unwrap().clone();
    assert_eq!(paths, vec!["/".to_string()]);
}

#[tokio::test]
async fn test_location_upstream_failure_degrades_to_nulls() {
    let fixture = TestFixture::build(
        TransportKind::Recording,
        Some("staff@example.org".to_string()),
        json!({ "success": false, "message": "Invalid IP address" }),
    )
    .await;

    let resp = fixture
        .client
        .get(fixture.url("/api/location?ip=8.8.8.8"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "no-store, max-age=0"
    );

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch geolocation");
    assert_eq!(body["ip"], "8.8.8.8");
    assert!(body["city"].is_null());
    assert!(body["latitude"].is_null());
}
