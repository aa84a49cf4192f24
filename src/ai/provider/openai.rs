//! OpenAI-Compatible Gateway
//!
//! Talks to any Chat Completions endpoint (vLLM, llama.cpp server, OpenAI).
//! The schema rides along in the system message; the reply is repaired into
//! JSON but its shape is left to the caller.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    GatewayConfig, GenerationGateway, GenerationProfile, LlmResponse, ResponseMetadata,
    ResponseTiming, TokenUsage,
};
use crate::ai::validation::extract_json_from_response;
use crate::constants::network as net_constants;
use crate::types::{ErrorClassifier, PlanError, Result};

const GATEWAY_NAME: &str = "openai-compatible";

/// Chat Completions client; the bearer key is optional for local servers
pub struct OpenAiCompatibleGateway {
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatibleGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleGateway")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiCompatibleGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.api_base.trim().is_empty() {
            return Err(PlanError::Config(
                "Generation endpoint not set. Set llm.api_base or VLLM_URL".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlanError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.map(SecretString::from),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    fn build_request(
        &self,
        prompt: &str,
        schema: &Value,
        profile: &GenerationProfile,
    ) -> ChatCompletionRequest {
        let system_content = if schema.is_null() {
            "You are a software documentation planner. Always respond with valid JSON.".to_string()
        } else {
            let schema_str =
                serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
            format!(
                "You are a software documentation planner. Always respond with valid JSON matching this schema:\n\n```json\n{}\n```\n\nRespond ONLY with valid JSON, no explanation.",
                schema_str
            )
        };

        ChatCompletionRequest {
            model: profile.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_content,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: profile.temperature,
            max_tokens: Some(profile.max_tokens),
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }

    /// Model ids served by the endpoint
    pub async fn available_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.api_base);
        let response = self
            .authorized(self.client.get(&url))
            .timeout(Duration::from_secs(net_constants::HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify(&e.to_string(), GATEWAY_NAME))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                ErrorClassifier::classify_http_status(status.as_u16(), &body, GATEWAY_NAME).into(),
            );
        }

        let models: ModelList = response
            .json()
            .await
            .map_err(|e| PlanError::LlmApi(format!("Failed to parse model list: {}", e)))?;
        Ok(models.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl GenerationGateway for OpenAiCompatibleGateway {
    async fn generate(
        &self,
        prompt: &str,
        schema: &Value,
        profile: &GenerationProfile,
    ) -> Result<LlmResponse> {
        let request = self.build_request(prompt, schema, profile);
        info!(
            "Generating with {} (model: {}, temperature: {}, max_tokens: {})",
            GATEWAY_NAME, request.model, profile.temperature, profile.max_tokens
        );

        let start_time = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .authorized(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify(&e.to_string(), GATEWAY_NAME))?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("API error ({}): {}", status, body),
                GATEWAY_NAME,
            )
            .into());
        }

        let response_body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| PlanError::LlmApi(format!("Failed to parse completion: {}", e)))?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage::from_openai(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let content_str = response_body
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| PlanError::LlmApi("No content in completion".to_string()))?;

        debug!("Received {} chars, parsing JSON", content_str.len());
        let content = extract_json_from_response(content_str)?;

        Ok(LlmResponse {
            content,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: request.model,
                provider: GATEWAY_NAME.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        GATEWAY_NAME
    }

    async fn health_check(&self) -> Result<bool> {
        match self.available_models().await {
            Ok(models) => {
                info!("Endpoint available ({} models)", models.len());
                if !models.iter().any(|m| m == &self.model) {
                    warn!("Configured model '{}' is not served by endpoint", self.model);
                }
                Ok(true)
            }
            Err(e) => {
                warn!("Endpoint check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gateway() -> OpenAiCompatibleGateway {
        OpenAiCompatibleGateway::new(GatewayConfig {
            api_base: "http://localhost:8000/v1/".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(gateway().api_base, "http://localhost:8000/v1");
    }

    #[test]
    fn test_empty_base_rejected() {
        let result = OpenAiCompatibleGateway::new(GatewayConfig {
            api_base: "  ".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(PlanError::Config(_))));
    }

    #[test]
    fn test_request_uses_profile() {
        let profile = GenerationProfile {
            temperature: 0.0,
            max_tokens: 500,
            model: None,
        };
        let request = gateway().build_request("pick files", &json!({"type": "object"}), &profile);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], net_constants::DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][1]["content"], "pick files");
        assert!(
            body["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("\"object\"")
        );
    }

    #[test]
    fn test_profile_model_override() {
        let profile = GenerationProfile {
            temperature: 0.0,
            max_tokens: 2000,
            model: Some("Qwen/Qwen3-8B".to_string()),
        };
        let request = gateway().build_request("plan", &Value::Null, &profile);
        assert_eq!(request.model, "Qwen/Qwen3-8B");
    }

    #[test]
    fn test_debug_redacts_key() {
        let gateway = OpenAiCompatibleGateway::new(GatewayConfig {
            api_key: Some("sk-live-123".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(!format!("{:?}", gateway).contains("sk-live-123"));
    }

    #[test]
    fn test_model_list_parse() {
        let list: ModelList =
            serde_json::from_value(json!({"object": "list", "data": [{"id": "a"}, {"id": "b"}]}))
                .unwrap();
        assert_eq!(list.data.len(), 2);
    }
}
