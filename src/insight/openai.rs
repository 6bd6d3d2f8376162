// Blocking client for OpenAI-compatible chat completion endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{InsightError, TextGenerator};
use crate::config::InsightSettings;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(settings: &InsightSettings, api_key: &str) -> Result<Self, InsightError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| InsightError::Network(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for OpenAiClient {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, InsightError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| InsightError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| InsightError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(InsightError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| InsightError::InvalidResponse(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| InsightError::InvalidResponse("no choices in response".to_string()))?;

        if content.trim().is_empty() {
            return Err(InsightError::InvalidResponse("empty answer".to_string()));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn client(server: &mockito::Server) -> OpenAiClient {
        let settings = InsightSettings {
            base_url: format!("{}/", server.url()),
            timeout_secs: 5,
            ..InsightSettings::default()
        };
        OpenAiClient::new(&settings, "test-key").unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let settings = InsightSettings::default();
        let client = OpenAiClient::new(&settings, "k").unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_successful_completion() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Meta leads on cost."}}]}"#)
            .create();

        let answer = client(&server).generate("system", "prompt").unwrap();
        assert_eq!(answer, "Meta leads on cost.");
        mock.assert();
    }

    #[test]
    fn test_api_error_message_is_extracted() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#)
            .create();

        let err = client(&server).generate("system", "prompt").unwrap_err();
        assert_eq!(
            err,
            InsightError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_and_empty_responses() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create();
        assert!(matches!(
            client(&server).generate("s", "p"),
            Err(InsightError::InvalidResponse(_))
        ));

        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create();
        assert!(matches!(
            client(&server).generate("s", "p"),
            Err(InsightError::InvalidResponse(_))
        ));
    }
}
