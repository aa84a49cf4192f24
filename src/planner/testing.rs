//! Scripted gateway double for stage tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::ai::provider::{
    GenerationGateway, GenerationProfile, LlmResponse, ResponseTiming, TokenUsage,
};
use crate::ai::prompt::PromptStore;
use crate::planner::PlanningPipeline;
use crate::types::{ErrorCategory, LlmError, PlanError, Result};

/// Pipeline over built-in prompts, keeping a handle on the gateway
pub(crate) fn pipeline_with(gateway: ScriptedGateway) -> (PlanningPipeline, Arc<ScriptedGateway>) {
    let gateway = Arc::new(gateway);
    let pipeline = PlanningPipeline::new(gateway.clone(), Arc::new(PromptStore::builtin()));
    (pipeline, gateway)
}

/// Replays scripted replies in order; an exhausted script fails every call.
pub(crate) struct ScriptedGateway {
    replies: Mutex<VecDeque<Option<Value>>>,
    calls: Mutex<Vec<(String, GenerationProfile)>>,
}

impl ScriptedGateway {
    pub fn replying<I: IntoIterator<Item = Value>>(replies: I) -> Self {
        Self::script(replies.into_iter().map(Some))
    }

    /// `None` entries simulate an unreachable endpoint for that call
    pub fn script<I: IntoIterator<Item = Option<Value>>>(replies: I) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::script([])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn profiles(&self) -> Vec<GenerationProfile> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate(
        &self,
        prompt: &str,
        _schema: &Value,
        profile: &GenerationProfile,
    ) -> Result<LlmResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), profile.clone()));

        match self.replies.lock().unwrap().pop_front().flatten() {
            Some(content) => Ok(LlmResponse {
                usage: TokenUsage::from_openai(100, 20),
                timing: ResponseTiming { total_ms: 10 },
                ..LlmResponse::content_only(content)
            }),
            None => Err(PlanError::Llm(LlmError::with_provider(
                ErrorCategory::Network,
                "connection refused",
                "scripted",
            ))),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
