//! Assessment requester for the vision model boundary
//!
//! Wraps the single `generateContent` call: inline image + fixed adjuster
//! prompt + strict response schema at low temperature, then parses the
//! structured payload into an [`AssessmentResult`]. No internal retry and no
//! caching; analyzing the same image twice yields two distinct reports with
//! fresh ids and timestamps by design.

mod prompt;
mod schema;

use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::ids;
use crate::model::{AssessmentResult, DamageItem, FraudRisk};

/// Client for the damage assessment vision model
pub struct VisionClient {
    /// The base URL for the model API
    url: String,

    /// API key; checked before any network activity
    api_key: String,

    /// Model identifier, e.g. `gemini-2.5-flash`
    model: String,

    /// Sampling temperature, low for reproducible output
    temperature: f32,

    /// HTTP client used for requests
    client: Client,
}

/// The model's structured payload, before the requester stamps `id` and
/// `timestamp`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    vehicle_type: String,
    fraud_risk: FraudRisk,
    damages: Vec<DamageItem>,
    total_estimated_cost: f64,
    summary: String,
    confidence_score: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl VisionClient {
    /// Create a new VisionClient
    pub fn new(url: &str, api_key: &str, client: Client, options: &ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            model: options.model.clone(),
            temperature: options.temperature,
            client,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.url, self.model)
    }

    /// Analyze a preprocessed image and return the parsed assessment.
    ///
    /// `encoded_image` is the base64 JPEG produced by the preprocessor, with
    /// or without the `data:image/jpeg;base64,` prefix.
    pub async fn analyze(&self, encoded_image: &str) -> Result<AssessmentResult, Error> {
        if self.api_key.is_empty() {
            return Err(Error::analysis(
                "API key not found. Set the CARSCUBE_API_KEY environment variable.",
            ));
        }

        let payload = encoded_image
            .split_once(',')
            .map(|(_, data)| data)
            .unwrap_or(encoded_image);

        let body = json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "image/jpeg", "data": payload } },
                    { "text": prompt::analysis_prompt() }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema::response_schema(),
                "temperature": self.temperature
            }
        });

        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("vision request failed: {e}");
                Error::analysis(format!("Failed to reach the analysis service: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            log::error!("vision request rejected with status {status}: {text}");
            return Err(Error::analysis(format!(
                "Analysis service returned status {status}"
            )));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                log::error!("vision response body unreadable: {e}");
                Error::analysis(format!("Unreadable response from the analysis service: {e}"))
            })?;

        let text = parsed
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                log::error!("vision response carried no structured payload");
                Error::analysis("No response from AI model")
            })?;

        let raw: RawAssessment = serde_json::from_str(&text).map_err(|e| {
            log::error!("vision payload failed validation: {e}");
            Error::analysis(format!("Malformed assessment payload: {e}"))
        })?;

        Ok(AssessmentResult {
            id: ids::assessment_id(),
            vehicle_type: raw.vehicle_type,
            fraud_risk: raw.fraud_risk,
            damages: raw.damages,
            total_estimated_cost: raw.total_estimated_cost,
            summary: raw.summary,
            confidence_score: raw.confidence_score,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}
