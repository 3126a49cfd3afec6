use std::fmt;

use ae_core::{Error, Result, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::Config;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct ChatCompletionModel {
    client: Client,
    name: String,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionModel {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("API key for {} is not set (OPENAI_API_KEY)", config.provider)))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            name: config.provider.to_string(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| config.provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            model: config
                .model_name
                .clone()
                .unwrap_or_else(|| config.provider.default_model().to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }
}

impl fmt::Debug for ChatCompletionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
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
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Synthesis(format!("{} request timed out", self.name))
                } else {
                    Error::Synthesis(format!("{} request failed: {}", self.name, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "{} API error: HTTP {} - {}",
                self.name,
                status.as_u16(),
                body.trim()
            )));
        }

        let response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| Error::Synthesis(format!("Malformed {} response: {}", self.name, e)))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default().trim().to_string())
            .ok_or_else(|| Error::Synthesis(format!("{} returned no choices", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn model(base_url: String) -> ChatCompletionModel {
        ChatCompletionModel::new(&Config {
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url),
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = ChatCompletionModel::new(&Config::default());
        assert!(matches!(result, Err(Error::Config(_))));

        let result = ChatCompletionModel::new(&Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_provider_defaults() {
        let model = ChatCompletionModel::new(&Config {
            provider: crate::Provider::DeepSeek,
            api_key: Some("k".to_string()),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(model.model_name(), "deepseek-chat");
        assert_eq!(model.base_url, "https://api.deepseek.com/v1");
        assert!(!format!("{:?}", model).contains("\"k\""));
    }

    #[tokio::test]
    async fn test_generate_sends_both_prompts() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let messages = body["messages"].as_array().cloned().unwrap_or_default();
                let echoed = format!(
                    "  {}|{}|{}  ",
                    messages[0]["role"].as_str().unwrap_or_default(),
                    messages[1]["content"].as_str().unwrap_or_default(),
                    body["max_tokens"],
                );
                Json(json!({ "choices": [{ "message": { "role": "assistant", "content": echoed } }] }))
            }),
        );
        let base_url = serve(router).await;

        let text = model(base_url).generate("be helpful", "rewrite this").await.unwrap();
        assert_eq!(text, "system|rewrite this|4000");
    }

    #[tokio::test]
    async fn test_generate_surfaces_http_errors() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let base_url = serve(router).await;

        let err = model(base_url).generate("s", "u").await.unwrap_err();
        match err {
            Error::Synthesis(message) => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid api key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_with_null_content_returns_empty() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({ "choices": [{ "message": { "content": null } }] })) }),
        );
        let base_url = serve(router).await;

        assert_eq!(model(base_url).generate("s", "u").await.unwrap(), "");
    }
}
