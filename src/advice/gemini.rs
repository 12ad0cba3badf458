use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{AdviceError, ChatRole, ChatTurn, TextGenerator};

/// Gemini HTTP client for `generateContent`.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Build a client. Must be called outside an async context (blocking reqwest).
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, AdviceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AdviceError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Request body for `generateContent`
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: ChatRole,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response body from `generateContent`
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

fn build_request<'a>(history: &'a [ChatTurn], message: &'a str) -> GenerateRequest<'a> {
    let mut contents: Vec<Content<'a>> = history
        .iter()
        .map(|turn| Content {
            role: turn.role,
            parts: [Part { text: &turn.text }],
        })
        .collect();
    contents.push(Content {
        role: ChatRole::User,
        parts: [Part { text: message }],
    });
    GenerateRequest { contents }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String, AdviceError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AdviceError::EmptyResponse)?;
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    Ok(parts.into_iter().map(|p| p.text).collect::<Vec<_>>().join(""))
}

impl TextGenerator for GeminiClient {
    fn converse(&self, history: &[ChatTurn], message: &str) -> Result<String, AdviceError> {
        let body = build_request(history, message);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AdviceError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    AdviceError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AdviceError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AdviceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| AdviceError::ResponseParsing(e.to_string()))?;

        extract_text(parsed)
    }
}

/// Mock generator for testing: canned reply or canned failure, records prompts.
pub struct MockTextGenerator {
    reply: Option<String>,
    seen: Mutex<Vec<(usize, String)>>,
}

impl MockTextGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails with a connection error.
    pub fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// `(history length, message)` for every call so far.
    pub fn calls(&self) -> Vec<(usize, String)> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl TextGenerator for MockTextGenerator {
    fn converse(&self, history: &[ChatTurn], message: &str) -> Result<String, AdviceError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((history.len(), message.to_string()));
        }
        self.reply
            .clone()
            .ok_or_else(|| AdviceError::Connection("mock".into()))
    }
}
