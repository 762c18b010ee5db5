use chrono::{DateTime, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carscube_core::config::ClientOptions;
use carscube_core::error::Error;
use carscube_core::model::{DamageType, FraudRisk, Severity};
use carscube_core::vision::VisionClient;

fn client_for(server: &MockServer) -> VisionClient {
    VisionClient::new(
        &server.uri(),
        "test-key",
        reqwest::Client::new(),
        &ClientOptions::default(),
    )
}

fn assessment_text() -> String {
    json!({
        "vehicleType": "Car",
        "fraudRisk": "Low",
        "damages": [{
            "id": "dmg-1",
            "type": "Dent",
            "category": "Cosmetic",
            "severity": "Medium",
            "description": "Shallow dent on the front bumper",
            "requiredPart": "Front Bumper",
            "estimatedCost": 2500.0,
            "repairCosts": {
                "labor": 500.0,
                "parts": [
                    { "type": "Genuine", "price": 2000.0, "availability": "Common" }
                ],
                "bestOptionTotal": 2500.0
            },
            "box_2d": [100.0, 150.0, 420.0, 760.0]
        }],
        "totalEstimatedCost": 2500.0,
        "summary": "Single dent on the front bumper",
        "confidenceScore": 0.93
    })
    .to_string()
}

fn generate_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": text }]
            }
        }]
    })
}

#[tokio::test]
async fn analyze_parses_the_structured_payload() {
    let server = MockServer::start().await;
    let started = Utc::now();

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(&assessment_text())))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).analyze("QUJD").await.unwrap();

    assert_eq!(result.vehicle_type, "Car");
    assert_eq!(result.fraud_risk, FraudRisk::Low);
    assert_eq!(result.damages.len(), 1);
    assert_eq!(result.damages[0].damage_type, DamageType::Dent);
    assert_eq!(result.damages[0].severity, Severity::Medium);
    assert_eq!(result.damages[0].box_2d.xmax, 760.0);
    assert_eq!(result.total_estimated_cost, 2500.0);

    // The id and timestamp are stamped at parse time, not taken from the model
    assert!(result.id.starts_with("RPT-"));
    assert_eq!(result.id.len(), 13);
    assert!(result.id[4..]
        .bytes()
        .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
    let parsed = DateTime::parse_from_rfc3339(&result.timestamp).unwrap();
    assert!(parsed.with_timezone(&Utc) >= started - chrono::Duration::seconds(1));
}

#[tokio::test]
async fn analyze_strips_the_data_uri_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("\"data\":\"QUJD\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(&assessment_text())))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .analyze("data:image/jpeg;base64,QUJD")
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_damage_types_coerce_to_other() {
    let server = MockServer::start().await;
    let text = assessment_text().replace("\"Dent\"", "\"Hailstorm Pitting\"");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(&text)))
        .mount(&server)
        .await;

    let result = client_for(&server).analyze("QUJD").await.unwrap();
    assert_eq!(result.damages[0].damage_type, DamageType::Other);
}

#[tokio::test]
async fn empty_candidates_surface_as_an_analysis_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server).analyze("QUJD").await.unwrap_err();
    assert!(matches!(err, Error::Analysis(_)));
    assert!(err.to_string().contains("No response from AI model"));
}

#[tokio::test]
async fn malformed_payload_text_surfaces_as_an_analysis_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(generate_response("{not an assessment")),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).analyze("QUJD").await.unwrap_err();
    assert!(matches!(err, Error::Analysis(_)));
    assert!(err.to_string().contains("Malformed assessment payload"));
}

#[tokio::test]
async fn server_errors_surface_as_an_analysis_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client_for(&server).analyze("QUJD").await.unwrap_err();
    assert!(matches!(err, Error::Analysis(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_response(&assessment_text())))
        .expect(0)
        .mount(&server)
        .await;

    let client = VisionClient::new(
        &server.uri(),
        "",
        reqwest::Client::new(),
        &ClientOptions::default(),
    );
    let err = client.analyze("QUJD").await.unwrap_err();
    assert!(err.to_string().contains("API key not found"));
}
