use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{Summarizer, endpoint, snippet};
use crate::error::{Error, Result};

/// Text generation through the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = endpoint(
            &self.base_url,
            &format!("/v1beta/models/{}:generateContent", self.model),
        );
        debug!("POST {url}");

        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| snippet(&text).to_string());
            return Err(Error::Api(format!("{status}: {message}")));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Parse(format!("Failed to parse generateContent response: {e}"))
        })?;

        let answer: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(Error::Api("Model returned no text".to_string()));
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(Client::new(), server.uri(), "g-key", "gemini-1.5-flash")
    }

    #[tokio::test]
    async fn generate_returns_concatenated_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "Summarise my plan" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Equity-heavy, " }, { "text": "suits a long horizon." }] },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let answer = client_for(&server)
            .generate("Summarise my plan")
            .await
            .expect("answer");
        assert_eq!(answer, "Equity-heavy, suits a long horizon.");
    }

    #[tokio::test]
    async fn upstream_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hi").await.expect_err("bad key");
        assert!(matches!(err, Error::Api(msg) if msg.contains("API key not valid.")));
    }

    #[tokio::test]
    async fn blocked_prompt_without_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("hi").await.expect_err("blocked");
        assert!(matches!(err, Error::Api(_)));
    }
}
