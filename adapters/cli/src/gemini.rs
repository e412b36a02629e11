//! Message source backed by the Gemini `generateContent` endpoint.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use signal_intercept_system_transmission::{normalise, MessageSource, TransmissionError};

use crate::config::UplinkConfig;

const PROMPT: &str = "Generate a short, cryptic Cold War era spy radio message. \
It should be mysterious, urgent, and in all caps. No more than 10 words. Do not include quotes.";

const MAX_OUTPUT_TOKENS: u32 = 30;
const TEMPERATURE: f32 = 1.2;

/// Fetches transmissions from a hosted text model.
#[derive(Debug)]
pub(crate) struct GeminiSource {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl GeminiSource {
    /// Builds a source for the configured model.
    pub(crate) fn new(config: &UplinkConfig, api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout().max(Duration::from_millis(1)))
            .build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }
}

impl MessageSource for GeminiSource {
    fn fetch(&self) -> Result<String, TransmissionError> {
        if self.api_key.trim().is_empty() {
            return Err(TransmissionError::MissingCredential);
        }
        let response: GenerateResponse = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json)
            .map_err(|error| TransmissionError::Service(error.to_string()))?;
        normalise(&response.text())
    }
}

fn request_body() -> Value {
    json!({
        "contents": [{ "parts": [{ "text": PROMPT }] }],
        "generationConfig": {
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
            "temperature": TEMPERATURE,
            "thinkingConfig": { "thinkingBudget": 0 },
        },
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Part {
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_generation_limits() {
        let body = request_body();
        let config = &body["generationConfig"];

        assert_eq!(config["maxOutputTokens"], 30);
        assert_eq!(config["thinkingConfig"]["thinkingBudget"], 0);
        assert!((config["temperature"].as_f64().expect("number") - 1.2).abs() < 1e-6);
        assert_eq!(body["contents"][0]["parts"][0]["text"], PROMPT);
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "\"the raven " }, { "text": "flies at dawn\"\n" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .expect("decode");

        assert_eq!(
            normalise(&response.text()).expect("text"),
            "THE RAVEN FLIES AT DAWN"
        );
    }

    #[test]
    fn empty_candidates_are_rejected() {
        let response: GenerateResponse = serde_json::from_value(json!({})).expect("decode");
        assert!(matches!(
            normalise(&response.text()),
            Err(TransmissionError::EmptyResponse)
        ));
    }

    #[test]
    fn blank_key_fails_without_a_request() {
        let source = GeminiSource::new(&UplinkConfig::default(), "  ".to_owned()).expect("client");
        assert!(matches!(
            source.fetch(),
            Err(TransmissionError::MissingCredential)
        ));
        assert!(source.url.ends_with("/gemini-2.5-flash:generateContent"));
    }
}
