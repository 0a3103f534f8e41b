use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tripcrew_core::api::{LanguageModel, LlmConfig, ModelError, Prompt, ToolSpec, OBSERVATION_STOP};

use crate::http::{build_client, send_json};

const HOSTED_API_PREFIX: &str = "https://api.openai.com/";

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct OpenAiChatModel {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatModel {
    pub fn new(cfg: &LlmConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_client(cfg.timeout_secs)?,
            url: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &Prompt, tools: &[ToolSpec]) -> Result<String, ModelError> {
        // A key is optional only for self-hosted endpoints.
        if self.api_key.trim().is_empty() && self.url.starts_with(HOSTED_API_PREFIX) {
            return Err(ModelError::NotConfigured("OPENAI_API_KEY is not set".into()));
        }

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stop: (!tools.is_empty()).then(|| vec![OBSERVATION_STOP]),
        };

        tracing::debug!(
            url = %self.url,
            model = %self.model,
            tools = tools.len(),
            prompt_chars = prompt.system.len() + prompt.user.len(),
            "llm request"
        );

        let req = self.auth(self.http.post(&self.url).json(&body));
        let value = send_json(req, &self.url)
            .await
            .map_err(|e| e.into_model_error())?;

        let resp: ChatResponse = serde_json::from_value(value)
            .map_err(|e| ModelError::Malformed(format!("unexpected response shape: {e}")))?;
        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ModelError::Malformed("response has no choices[0].message.content".into()))?;

        tracing::debug!(model = %self.model, reply_chars = content.len(), "llm reply");
        Ok(content)
    }
}
