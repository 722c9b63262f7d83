//! Gemini responder over the `generateContent` REST API.
//!
//! The conversation is sent as `contents` with `user`/`model` roles;
//! system-authored turns and the configured instruction travel in
//! `systemInstruction`. Failed turns are not sent.

use async_trait::async_trait;
use clinichat_application::{RemoteResponder, ResponderError};
use clinichat_domain::util::preview;
use clinichat_domain::{Author, Message, MessageStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Default API base URL
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Remote responder backed by Google Gemini
pub struct GeminiResponder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    system_instruction: Option<String>,
}

impl GeminiResponder {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ResponderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ResponderError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            system_instruction: None,
        })
    }

    /// Read the API key from the named environment variable
    pub fn from_env(api_key_env: &str, model: impl Into<String>) -> Result<Self, ResponderError> {
        let api_key = std::env::var(api_key_env).map_err(|_| {
            ResponderError::Configuration(format!("environment variable {} is not set", api_key_env))
        })?;
        Self::new(api_key, model)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

#[async_trait]
impl RemoteResponder for GeminiResponder {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn respond(&self, history: &[Message]) -> Result<String, ResponderError> {
        let request = build_request(history, self.system_instruction.as_deref());
        debug!(
            "Gemini request: model {}, {} turns",
            self.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "Error generating content with Gemini: {} {}",
                status.as_u16(),
                preview(&body, 200)
            );
            return Err(ResponderError::RequestFailed(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::RequestFailed(format!("Invalid response body: {}", e)))?;

        extract_text(&body).ok_or(ResponderError::EmptyResponse)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ResponderError {
    error!("Error generating content with Gemini: {}", err);
    if err.is_timeout() {
        ResponderError::Timeout
    } else if err.is_connect() {
        ResponderError::Connection(err.to_string())
    } else {
        ResponderError::RequestFailed(err.to_string())
    }
}

fn build_request(history: &[Message], system_instruction: Option<&str>) -> GenerateContentRequest {
    let mut system_parts: Vec<Part> = system_instruction
        .map(|text| Part {
            text: text.to_string(),
        })
        .into_iter()
        .collect();
    let mut contents: Vec<Content> = Vec::new();

    for message in history.iter().filter(|m| m.status == MessageStatus::Committed) {
        let role = match message.author {
            Author::System => {
                system_parts.push(Part {
                    text: message.text.clone(),
                });
                continue;
            }
            Author::User => "user",
            Author::Assistant => "model",
        };

        // The conversation has to open with a user turn; a seeded greeting cannot
        if contents.is_empty() && role == "model" {
            continue;
        }

        let part = Part {
            text: message.text.clone(),
        };
        match contents.last_mut() {
            Some(last) if last.role.as_deref() == Some(role) => last.parts.push(part),
            _ => contents.push(Content {
                role: Some(role.to_string()),
                parts: vec![part],
            }),
        }
    }

    GenerateContentRequest {
        contents,
        system_instruction: (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        }),
    }
}

fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinichat_domain::{MessageStore, NewMessage};

    fn history() -> Vec<Message> {
        let mut store = MessageStore::new();
        store.append(NewMessage::assistant("Hi! How can I help?"));
        store.append(NewMessage::user("Summarize this report"));
        store.append(NewMessage::assistant_failure("could not respond"));
        store.append(NewMessage::user("Please?"));
        store.append(NewMessage::system("Answer briefly."));
        store.snapshot()
    }

    #[test]
    fn test_build_request_maps_roles() {
        let request = build_request(&history(), Some("You assist clinicians."));

        // Greeting skipped, failed turn dropped, consecutive user turns merged
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        let texts: Vec<_> = request.contents[0]
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Summarize this report", "Please?"]);

        let system = request.system_instruction.unwrap();
        assert_eq!(system.parts.len(), 2);
        assert_eq!(system.parts[0].text, "You assist clinicians.");
        assert_eq!(system.parts[1].text, "Answer briefly.");
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let mut store = MessageStore::new();
        store.append(NewMessage::user("hello"));
        store.append(NewMessage::assistant("hi"));
        store.append(NewMessage::user("bye"));

        let request = build_request(store.messages(), Some("Be kind."));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "bye");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be kind.");
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_no_system_instruction_is_omitted() {
        let mut store = MessageStore::new();
        store.append(NewMessage::user("hello"));
        let json = serde_json::to_value(build_request(store.messages(), None)).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "I can help "}, {"text": "with that."}]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(&body).as_deref(), Some("I can help with that."));
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let body: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(extract_text(&body).is_none());

        let blocked: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }))
        .unwrap();
        assert!(extract_text(&blocked).is_none());
    }

    #[test]
    fn test_url_uses_endpoint_and_model() {
        let responder = GeminiResponder::new("key", "gemini-2.0-flash")
            .unwrap()
            .with_endpoint("http://localhost:8080/");
        assert_eq!(
            responder.url(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_from_env_missing_key() {
        let result = GeminiResponder::from_env("CLINICHAT_TEST_KEY_THAT_IS_NOT_SET", "m");
        assert!(matches!(result, Err(ResponderError::Configuration(_))));
    }
}
