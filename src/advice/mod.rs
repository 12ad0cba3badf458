//! Generative-text collaborators: the Gemini client, prompts, and the
//! treatment advisor with its canned fallback.

pub mod gemini;
pub mod prompt;
pub mod treatment;

pub use gemini::*;
pub use prompt::*;
pub use treatment::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("Gemini API is not reachable at {0}")]
    Connection(String),

    #[error("Gemini returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Gemini returned no candidates")]
    EmptyResponse,
}

/// Speaker of one chat turn, named the way Gemini names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, text: text.into() }
    }
}

/// String-in/string-out text generation.
pub trait TextGenerator: Send + Sync {
    /// Send `message` after the prior `history` and return the model's reply.
    fn converse(&self, history: &[ChatTurn], message: &str) -> Result<String, AdviceError>;

    /// Single-shot generation with no history.
    fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        self.converse(&[], prompt)
    }
}
