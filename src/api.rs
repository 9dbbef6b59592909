//! Gemini `generateContent` client and the bulletin fetch built on it.
//!
//! # Architecture
//!
//! - [`GenerateContent`]: the network boundary. Send a prompt, get free-form
//!   text plus grounding citations back.
//! - [`GeminiClient`]: the HTTP implementation, with Google Search grounding on.
//! - [`fetch_bulletin`]: builds the prompts for a date, calls the model, and
//!   hands the reply to the sanitizer.
//!
//! A single attempt is made per fetch. Transport and HTTP failures surface as
//! [`BulletinError::Fetch`] / [`BulletinError::Api`]; a reply that cannot be
//! parsed is still a successful (empty) bulletin.

use crate::config::AppConfig;
use crate::error::{BulletinError, Result};
use crate::models::{BulletinResult, Citation, ModelReply};
use crate::prompt::{daily_prompt, system_instruction};
use crate::sanitize::sanitize;
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};
use url::Url;

/// Trait for async calls to a generative model.
///
/// Implementors send a prompt with a system instruction and return the
/// model's text together with any grounding citations.
pub trait GenerateContent {
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<ModelReply>;
}

/// HTTP client for `POST /v1beta/models/{model}:generateContent`.
#[derive(Clone)]
pub struct GeminiClient {
    endpoint: Url,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_base: &str, model: &str, api_key: impl Into<String>) -> Result<Self> {
        let mut base = Url::parse(api_base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(&format!("v1beta/models/{model}:generateContent"))?;
        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            timeout: Duration::from_secs(90),
            client: Client::new(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(BulletinError::MissingApiKey)?;
        Ok(Self::new(&config.api_base, &config.model, key)?
            .with_timeout(Duration::from_secs(config.request_timeout_secs)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate plus its web citations. No text reads as `[]`.
    fn into_reply(self) -> ModelReply {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ModelReply {
                text: "[]".to_string(),
                citations: Vec::new(),
            };
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let citations = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .map(|web| Citation {
                url: web.uri,
                title: web.title,
            })
            .collect();

        ModelReply {
            text: if text.is_empty() { "[]".to_string() } else { text },
            citations,
        }
    }
}

impl GenerateContent for GeminiClient {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn generate(&self, prompt: &str, system_instruction: &str) -> Result<ModelReply> {
        let t0 = Instant::now();
        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                body = %truncate_for_log(&body, 300),
                "API call failed"
            );
            return Err(BulletinError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let reply = parsed.into_reply();
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = reply.text.len(),
            citations = reply.citations.len(),
            "model replied"
        );
        Ok(reply)
    }
}

/// Fetch and sanitize the bulletin for `date`.
///
/// # Errors
///
/// Only the network call can fail here; see [`BulletinError::is_fetch_failure`].
#[instrument(level = "info", skip(model))]
pub async fn fetch_bulletin<G: GenerateContent>(
    model: &G,
    brand: &str,
    date: NaiveDate,
) -> Result<BulletinResult> {
    let t0 = Instant::now();
    let res = model
        .generate(&daily_prompt(date), &system_instruction(brand))
        .await;

    match res {
        Ok(reply) => {
            let bulletin = sanitize(&reply.text, &reply.citations);
            info!(
                elapsed_ms_total = t0.elapsed().as_millis() as u64,
                items = bulletin.items.len(),
                sources = bulletin.sources.len(),
                status = %bulletin.status,
                "fetch_bulletin succeeded"
            );
            Ok(bulletin)
        }
        Err(e) => {
            error!(elapsed_ms_total = t0.elapsed().as_millis() as u64, error = %e, "fetch_bulletin failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParseStatus;
    use mockito::Matcher;

    const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 6).unwrap()
    }

    fn reply_body(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://a.example/1", "title": "a.example" } },
                        { "web": { "uri": "https://a.example/1", "title": "duplicate" } },
                        { "web": { "uri": "https://b.example/2", "title": "" } },
                        { "retrievedContext": {} }
                    ]
                }
            }]
        })
        .to_string()
    }

    #[test]
    fn test_endpoint_joins_model_path() {
        let client = GeminiClient::new("https://generativelanguage.googleapis.com", "gemini-2.5-flash", "k").unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = AppConfig::default();
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(BulletinError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_fetch_bulletin_with_mock() {
        let mut server = mockito::Server::new_async().await;
        let text = "```json\n[{\"titleEn\":\"A\",\"contentEn\":\"B\",\"titleTr\":\"C\",\"contentTr\":\"D\"}]\n```";
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "fake-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "tools": [{ "googleSearch": {} }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply_body(text))
            .create_async()
            .await;

        let client = GeminiClient::new(&server.url(), "gemini-2.5-flash", "fake-key").unwrap();
        let bulletin = fetch_bulletin(&client, "bahaAİ", date()).await.unwrap();

        assert_eq!(bulletin.status, ParseStatus::Parsed);
        assert_eq!(bulletin.items.len(), 1);
        assert_eq!(bulletin.items[0].title_tr, "C");
        assert_eq!(bulletin.sources.len(), 1);
        assert_eq!(bulletin.sources[0].title, "a.example");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_garbage_reply_is_empty_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(reply_body("I'm sorry, I can't help with that."))
            .create_async()
            .await;

        let client = GeminiClient::new(&server.url(), "gemini-2.5-flash", "k").unwrap();
        let bulletin = fetch_bulletin(&client, "x", date()).await.unwrap();
        assert!(bulletin.is_empty());
        assert_eq!(bulletin.status, ParseStatus::NoArray);
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = GeminiClient::new(&server.url(), "gemini-2.5-flash", "k").unwrap();
        let bulletin = fetch_bulletin(&client, "x", date()).await.unwrap();
        assert!(bulletin.is_empty());
        assert_eq!(bulletin.status, ParseStatus::Parsed);
        assert!(bulletin.sources.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let client = GeminiClient::new(&server.url(), "gemini-2.5-flash", "k").unwrap();
        let err = fetch_bulletin(&client, "x", date()).await.unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(matches!(err, BulletinError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_fetch_failure() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let client = GeminiClient::new("http://127.0.0.1:9", "gemini-2.5-flash", "k")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let err = fetch_bulletin(&client, "x", date()).await.unwrap_err();
        assert!(matches!(err, BulletinError::Fetch(_)));
    }
}
