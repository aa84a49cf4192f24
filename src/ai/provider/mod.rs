//! Generation Gateway Abstraction
//!
//! Defines the `GenerationGateway` trait for structured LLM output.
//! Each call carries a `GenerationProfile` chosen by the calling stage, so one
//! gateway instance serves every stage of the planning pipeline.

mod openai;

pub use openai::OpenAiCompatibleGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::network as net_constants;
use crate::constants::pipeline::max_tokens;
use crate::types::{PlanningStage, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// Gateway response including structured content and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated content (structured JSON, not yet shape-checked)
    pub content: Value,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: Value) -> Self {
        Self {
            content,
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

/// Token usage reported by the endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// Create from OpenAI-style usage response
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTiming {
    /// Wall clock time in milliseconds
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared gateway type; read-only and safe to share across concurrent runs.
pub type SharedGateway = Arc<dyn GenerationGateway>;

// =============================================================================
// Generation Profiles
// =============================================================================

/// Per-call generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationProfile {
    /// 0.0 = deterministic
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Model override; the gateway's default model when `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl GenerationProfile {
    /// Built-in profile for a stage: deterministic, with terse output caps for
    /// selection and summary and a larger cap for section planning.
    pub fn for_stage(stage: PlanningStage) -> Self {
        let max_tokens = match stage {
            PlanningStage::SelectFiles => max_tokens::SELECT_FILES,
            PlanningStage::Summarize => max_tokens::SUMMARIZE,
            PlanningStage::PlanSections => max_tokens::PLAN_SECTIONS,
        };
        Self {
            temperature: 0.0,
            max_tokens,
            model: None,
        }
    }
}

/// Explicit map from stage to generation profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageProfiles(BTreeMap<PlanningStage, GenerationProfile>);

impl Default for StageProfiles {
    fn default() -> Self {
        Self(
            PlanningStage::ALL
                .into_iter()
                .map(|stage| (stage, GenerationProfile::for_stage(stage)))
                .collect(),
        )
    }
}

impl StageProfiles {
    /// Profile for `stage`, falling back to the built-in one when unset
    pub fn get(&self, stage: PlanningStage) -> GenerationProfile {
        self.0
            .get(&stage)
            .cloned()
            .unwrap_or_else(|| GenerationProfile::for_stage(stage))
    }

    pub fn with(mut self, stage: PlanningStage, profile: GenerationProfile) -> Self {
        self.0.insert(stage, profile);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlanningStage, &GenerationProfile)> {
        self.0.iter()
    }
}

// =============================================================================
// Gateway Configuration
// =============================================================================

/// Connection settings for the generation endpoint
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// OpenAI-compatible base URL (e.g. a vLLM server)
    pub api_base: String,
    /// Default model for profiles without an override
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: net_constants::DEFAULT_API_BASE.to_string(),
            model: net_constants::DEFAULT_MODEL.to_string(),
            timeout_secs: net_constants::DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

// =============================================================================
// Gateway Trait
// =============================================================================

/// Text-generation capability with a structured-output expectation
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Generate JSON output for `prompt`, guided by `schema`.
    ///
    /// The returned content is untrusted: callers validate its shape.
    async fn generate(
        &self,
        prompt: &str,
        schema: &Value,
        profile: &GenerationProfile,
    ) -> Result<LlmResponse>;

    /// Gateway name for logging
    fn name(&self) -> &str;

    /// Check if the endpoint is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared gateway from configuration
pub fn create_gateway(config: &GatewayConfig) -> Result<SharedGateway> {
    Ok(Arc::new(OpenAiCompatibleGateway::new(config.clone())?))
}
