use crate::error::ServiceError;
use crate::traits::ChatModel;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// OpenAI-compatible chat-completions client. The hosted deployment this
/// assistant was written against is Groq; any endpoint speaking the same
/// wire format works.
pub struct GroqChatModel {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: Client,
}

impl GroqChatModel {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatModel for GroqChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.temperature,
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::BackendResponse {
                backend: "chat".to_string(),
                details: response.status().to_string(),
            });
        }

        let payload: Value = response.json().await?;
        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if content.is_empty() {
            return Err(ServiceError::Request(
                "chat completion returned no content".to_string(),
            ));
        }

        Ok(content)
    }
}
