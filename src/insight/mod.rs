// Insight assistant: free-text questions about the loaded table.
//
// The table is reduced to a bounded digest, wrapped in a fixed instruction
// template and sent to a text-generation backend. The backend sits behind
// `TextGenerator` so it can be replaced in tests.

pub mod digest;
pub mod openai;

use thiserror::Error;

use crate::config::{InsightConfig, API_KEY_VAR, FALLBACK_API_KEY_VAR};
use crate::data::model::Table;

pub use digest::build_digest;
pub use openai::OpenAiClient;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InsightError {
    #[error(
        "No API key configured. Set {} (or {}) to enable the assistant.",
        API_KEY_VAR,
        FALLBACK_API_KEY_VAR
    )]
    MissingCredential,
    #[error("Assistant unavailable: {0}")]
    Unavailable(String),
    #[error("Please enter a question first.")]
    EmptyQuestion,
    #[error("Could not summarize the data: {0}")]
    Digest(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Narrow seam around the remote call: instructions + prompt in, text out.
pub trait TextGenerator {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, InsightError>;
}

pub const SYSTEM_PROMPT: &str = "You are a paid media analyst. You answer questions about \
advertising performance data using only the data summary you are given. Be concise and \
concrete, quote figures from the summary, and say so when the data cannot answer the question.";

/// Combine digest and question under the fixed instruction template.
pub fn build_prompt(digest: &str, question: &str) -> String {
    format!(
        "DATA SUMMARY:\n{digest}\n\
         QUESTION:\n{question}\n\n\
         Respond with three sections:\n\
         1. Direct answer: answer the question in one or two sentences.\n\
         2. Key insights: the most important patterns in the data related to the question.\n\
         3. Recommendations: specific, actionable next steps for the media plan.\n"
    )
}

/// Assistant front-end. Without a usable backend it keeps the reason, which
/// every `ask` reports.
pub struct InsightAssistant {
    backend: Result<Box<dyn TextGenerator>, InsightError>,
}

impl InsightAssistant {
    pub fn from_config(config: &InsightConfig) -> Self {
        let Some(key) = &config.api_key else {
            log::info!("Insight assistant disabled: no API key");
            return Self::disabled();
        };
        match OpenAiClient::new(&config.settings, key) {
            Ok(client) => {
                log::info!("Insight assistant using {}", client.endpoint());
                Self::with_backend(Box::new(client))
            }
            Err(e) => {
                log::error!("Insight assistant disabled: {e}");
                Self::unavailable(InsightError::Unavailable(e.to_string()))
            }
        }
    }

    pub fn with_backend(backend: Box<dyn TextGenerator>) -> Self {
        Self {
            backend: Ok(backend),
        }
    }

    /// No credential configured.
    pub fn disabled() -> Self {
        Self::unavailable(InsightError::MissingCredential)
    }

    pub fn unavailable(reason: InsightError) -> Self {
        Self {
            backend: Err(reason),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_ok()
    }

    /// Why the assistant cannot answer, if it cannot.
    pub fn unavailable_reason(&self) -> Option<&InsightError> {
        self.backend.as_ref().err()
    }

    /// Ask `question` about `table`; the backend's answer is returned as-is.
    pub fn ask(&self, question: &str, table: &Table) -> Result<String, InsightError> {
        let backend = self.backend.as_deref().map_err(InsightError::clone)?;
        let question = question.trim();
        if question.is_empty() {
            return Err(InsightError::EmptyQuestion);
        }

        let digest = build_digest(table).map_err(|e| InsightError::Digest(format!("{e:#}")))?;
        let prompt = build_prompt(&digest, question);
        log::info!(
            "Asking insight backend ({} char prompt): {question}",
            prompt.chars().count()
        );

        let answer = backend.generate(SYSTEM_PROMPT, &prompt);
        if let Err(e) = &answer {
            log::warn!("Insight request failed: {e}");
        }
        answer
    }
}
