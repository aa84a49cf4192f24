//! Planning Run Metrics
//!
//! One record per stage: whether the gateway's answer was used or a fallback
//! replaced it, the prompt size estimate, reported token usage and latency.
//!
//! ## Usage
//!
//! ```ignore
//! let mut metrics = PlanMetrics::new();
//! metrics.record(StageMetrics::generated(PlanningStage::SelectFiles, 812, &response));
//! tracing::info!("{}", metrics.display());
//! ```

use serde::Serialize;

use crate::ai::provider::{LlmResponse, TokenUsage};
use crate::types::PlanningStage;

/// How a stage produced its output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// The gateway's structured result was accepted
    Generated,
    /// A deterministic fallback replaced the gateway's result
    Fallback,
}

/// Metrics for a single stage
#[derive(Debug, Clone, Serialize)]
pub struct StageMetrics {
    pub stage: PlanningStage,
    pub outcome: StageOutcome,
    /// Heuristic estimate (characters / 4)
    pub estimated_prompt_tokens: usize,
    /// Token usage reported by the endpoint, zero when unknown
    pub usage: TokenUsage,
    pub latency_ms: u64,
}

impl StageMetrics {
    pub fn generated(
        stage: PlanningStage,
        estimated_prompt_tokens: usize,
        response: &LlmResponse,
    ) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Generated,
            estimated_prompt_tokens,
            usage: response.usage,
            latency_ms: response.timing.total_ms,
        }
    }

    pub fn fallback(
        stage: PlanningStage,
        estimated_prompt_tokens: usize,
        latency_ms: u64,
    ) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Fallback,
            estimated_prompt_tokens,
            usage: TokenUsage::default(),
            latency_ms,
        }
    }
}

/// Stage records for one pipeline run, in execution order
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanMetrics {
    stages: Vec<StageMetrics>,
}

impl PlanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, metrics: StageMetrics) {
        self.stages.push(metrics);
    }

    pub fn stages(&self) -> &[StageMetrics] {
        &self.stages
    }

    pub fn stage(&self, stage: PlanningStage) -> Option<&StageMetrics> {
        self.stages.iter().find(|m| m.stage == stage)
    }

    /// Stages whose output came from a fallback policy
    pub fn fallback_stages(&self) -> Vec<PlanningStage> {
        self.stages
            .iter()
            .filter(|m| m.outcome == StageOutcome::Fallback)
            .map(|m| m.stage)
            .collect()
    }

    pub fn total_tokens(&self) -> u64 {
        self.stages.iter().map(|m| m.usage.total() as u64).sum()
    }

    pub fn total_latency_ms(&self) -> u64 {
        self.stages.iter().map(|m| m.latency_ms).sum()
    }

    /// One line per stage plus totals
    pub fn display(&self) -> String {
        let mut lines: Vec<String> = self
            .stages
            .iter()
            .map(|m| {
                format!(
                    "{:<14} {:<9} ~{} prompt tokens, {} used, {}ms",
                    m.stage.as_str(),
                    match m.outcome {
                        StageOutcome::Generated => "generated",
                        StageOutcome::Fallback => "fallback",
                    },
                    m.estimated_prompt_tokens,
                    m.usage.total(),
                    m.latency_ms
                )
            })
            .collect();
        lines.push(format!(
            "Total: {} tokens, {:.1}s",
            self.total_tokens(),
            self.total_latency_ms() as f64 / 1000.0
        ));
        lines.join("\n")
    }
}
