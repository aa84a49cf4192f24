//! Tagged gateway outcomes.
//!
//! Stages never see a gateway error directly: every call becomes either a
//! parsed value or a `GatewayFailure`, and the stage branches on that.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ai::provider::{GenerationGateway, GenerationProfile, LlmResponse};

/// Why a gateway call produced no usable value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Unreachable, errored, or replied with something that is not JSON
    Invocation,
    /// Replied with JSON of the wrong shape
    Shape,
}

#[derive(Debug, Clone)]
pub struct GatewayFailure {
    pub kind: FailureKind,
    pub reason: String,
    pub latency_ms: u64,
}

impl std::fmt::Display for GatewayFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            FailureKind::Invocation => "invocation failed",
            FailureKind::Shape => "unexpected output shape",
        };
        write!(f, "{}: {}", kind, self.reason)
    }
}

#[derive(Debug)]
pub enum GatewayOutcome<T> {
    Success { value: T, response: LlmResponse },
    Failure(GatewayFailure),
}

impl<T> GatewayOutcome<T> {
    /// Apply a stage-specific check; a rejected value becomes a shape failure
    pub fn refine<U>(self, check: impl FnOnce(T) -> Result<U, String>) -> GatewayOutcome<U> {
        match self {
            Self::Success { value, response } => match check(value) {
                Ok(value) => GatewayOutcome::Success { value, response },
                Err(reason) => GatewayOutcome::Failure(GatewayFailure {
                    kind: FailureKind::Shape,
                    reason,
                    latency_ms: response.timing.total_ms,
                }),
            },
            Self::Failure(failure) => GatewayOutcome::Failure(failure),
        }
    }
}

/// Invoke the gateway and deserialize its content into `T`
pub async fn invoke_structured<T: DeserializeOwned>(
    gateway: &dyn GenerationGateway,
    prompt: &str,
    schema: &Value,
    profile: &GenerationProfile,
) -> GatewayOutcome<T> {
    let started = Instant::now();
    let response = match gateway.generate(prompt, schema, profile).await {
        Ok(response) => response,
        Err(e) => {
            return GatewayOutcome::Failure(GatewayFailure {
                kind: FailureKind::Invocation,
                reason: format!("[{}] {}", e.category(), e),
                latency_ms: started.elapsed().as_millis() as u64,
            });
        }
    };

    match serde_json::from_value::<T>(response.content.clone()) {
        Ok(value) => GatewayOutcome::Success { value, response },
        Err(e) => GatewayOutcome::Failure(GatewayFailure {
            kind: FailureKind::Shape,
            reason: e.to_string(),
            latency_ms: response.timing.total_ms,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::testing::ScriptedGateway;
    use crate::types::PlanningStage;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Files {
        files: Vec<String>,
    }

    fn profile() -> GenerationProfile {
        GenerationProfile::for_stage(PlanningStage::SelectFiles)
    }

    #[tokio::test]
    async fn test_success_parses_value() {
        let gateway = ScriptedGateway::replying([json!({"files": ["a.rs"]})]);
        let outcome: GatewayOutcome<Files> =
            invoke_structured(&gateway, "p", &Value::Null, &profile()).await;
        assert!(matches!(outcome, GatewayOutcome::Success { ref value, .. } if value.files == ["a.rs"]));
    }

    #[tokio::test]
    async fn test_error_is_invocation_failure() {
        let gateway = ScriptedGateway::failing();
        let outcome: GatewayOutcome<Files> =
            invoke_structured(&gateway, "p", &Value::Null, &profile()).await;
        assert!(matches!(
            outcome,
            GatewayOutcome::Failure(GatewayFailure { kind: FailureKind::Invocation, .. })
        ));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_shape_failure() {
        let gateway = ScriptedGateway::replying([json!({"paths": ["a.rs"]})]);
        let outcome: GatewayOutcome<Files> =
            invoke_structured(&gateway, "p", &Value::Null, &profile()).await;
        assert!(matches!(
            outcome,
            GatewayOutcome::Failure(GatewayFailure { kind: FailureKind::Shape, .. })
        ));
    }

    #[tokio::test]
    async fn test_refine_rejection_is_shape_failure() {
        let gateway = ScriptedGateway::replying([json!({"files": []})]);
        let outcome: GatewayOutcome<Files> =
            invoke_structured(&gateway, "p", &Value::Null, &profile()).await;
        let refined = outcome.refine(|f| {
            if f.files.is_empty() {
                Err("no files".to_string())
            } else {
                Ok(f.files)
            }
        });
        match refined {
            GatewayOutcome::Failure(failure) => {
                assert_eq!(failure.kind, FailureKind::Shape);
                assert_eq!(failure.to_string(), "unexpected output shape: no files");
            }
            GatewayOutcome::Success { .. } => panic!("expected failure"),
        }
    }
}
