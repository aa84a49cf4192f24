//! AI Integration Layer
//!
//! Budgeting, prompts and the generation gateway used by the planning pipeline.

pub mod budget;
pub mod metrics;
pub mod prompt;
pub mod provider;
pub mod validation;

pub use budget::ContentBudgeter;
pub use metrics::{PlanMetrics, StageMetrics, StageOutcome};
pub use prompt::{PromptBuilder, PromptResolver, PromptStore, PromptValue, PromptVars};
pub use provider::{
    GatewayConfig, GenerationGateway, GenerationProfile, LlmResponse, OpenAiCompatibleGateway,
    ResponseMetadata, ResponseTiming, SharedGateway, StageProfiles, TokenUsage, create_gateway,
};
pub use validation::extract_json_from_response;
