//! Documentation Request Service
//!
//! Framework-agnostic handler for `POST /docs-gen`: bearer authorization,
//! body validation, then one planning run. Any HTTP server can wrap
//! [`DocsGenService::handle`] by passing the `Authorization` header and the
//! raw body and writing back the status and JSON body.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::planner::{PlanningPipeline, PlanningResult};
use crate::types::{RepositoryDescriptor, ValidationError, ValidationErrorKind};

pub const ROUTE: &str = "/docs-gen";
pub const ACCEPTED_MESSAGE: &str = "Documentation generation request received";

const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// Request
// =============================================================================

/// Request body; snake_case on the wire, camelCase accepted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsGenRequest {
    #[serde(alias = "repoId")]
    pub repo_id: String,
    #[serde(alias = "repoPath")]
    pub repo_path: String,
    #[serde(alias = "hierarchyTree")]
    pub hierarchy_tree: String,
    #[serde(alias = "flatTree")]
    pub flat_tree: String,
}

impl DocsGenRequest {
    /// Check every field before the pipeline is entered
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("repo_id", &self.repo_id),
            ("repo_path", &self.repo_path),
            ("hierarchy_tree", &self.hierarchy_tree),
            ("flat_tree", &self.flat_tree),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(
                ValidationError::new(ValidationErrorKind::MissingField, "must not be empty")
                    .with_field(*name),
            );
        }

        let is_v4 = Uuid::parse_str(self.repo_id.trim())
            .map(|id| id.get_version_num() == 4)
            .unwrap_or(false);
        if !is_v4 {
            return Err(
                ValidationError::new(ValidationErrorKind::Format, "must be a UUID v4")
                    .with_field("repo_id"),
            );
        }

        Ok(())
    }

    pub fn descriptor(&self) -> RepositoryDescriptor {
        RepositoryDescriptor::new(
            self.repo_path.as_str(),
            self.hierarchy_tree.as_str(),
            self.flat_tree.as_str(),
        )
    }
}

// =============================================================================
// Authorization
// =============================================================================

/// Rejected request, ready to send back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: u16,
    pub message: String,
}

impl Rejection {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Compare the bearer token against the configured service key
pub fn authorize(header: Option<&str>, key: Option<&SecretString>) -> Result<(), Rejection> {
    let Some(key) = key else {
        error!("Service API key is not configured");
        return Err(Rejection::new(500, "Service API key is not configured"));
    };
    let Some(header) = header else {
        return Err(Rejection::new(401, "Missing Authorization header"));
    };

    let token = header.strip_prefix(BEARER_PREFIX).unwrap_or(header);
    if !constant_time_eq(token.as_bytes(), key.expose_secret().as_bytes()) {
        return Err(Rejection::new(401, "Invalid API key"));
    }
    Ok(())
}

/// Byte comparison whose running time does not depend on where inputs differ
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =============================================================================
// Handler
// =============================================================================

/// Handler result: HTTP status, JSON body and the plan on success
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Value,
    /// Attached for the caller to persist
    pub plan: Option<PlanningResult>,
}

impl ServiceResponse {
    fn rejected(rejection: Rejection) -> Self {
        Self {
            status: rejection.status,
            body: json!({ "error": rejection.message }),
            plan: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct DocsGenService {
    pipeline: Arc<PlanningPipeline>,
    api_key: Option<SecretString>,
}

impl DocsGenService {
    pub fn new(pipeline: Arc<PlanningPipeline>, api_key: Option<String>) -> Self {
        Self {
            pipeline,
            api_key: api_key
                .filter(|key| !key.is_empty())
                .map(SecretString::from),
        }
    }

    pub async fn handle(&self, authorization: Option<&str>, body: &str) -> ServiceResponse {
        if let Err(rejection) = authorize(authorization, self.api_key.as_ref()) {
            warn!("Rejected {} request: {}", ROUTE, rejection.message);
            return ServiceResponse::rejected(rejection);
        }

        let request = match parse_request(body) {
            Ok(request) => request,
            Err(rejection) => {
                warn!("Rejected {} request: {}", ROUTE, rejection.message);
                return ServiceResponse::rejected(rejection);
            }
        };

        info!("Repo ID: {}, path: {}", request.repo_id, request.repo_path);
        debug!(
            "Tree sizes: flat {} chars, hierarchy {} chars",
            request.flat_tree.len(),
            request.hierarchy_tree.len()
        );

        match self.pipeline.run(&request.descriptor()).await {
            Ok(plan) => ServiceResponse {
                status: 200,
                body: json!({
                    "repo_id": request.repo_id,
                    "message": ACCEPTED_MESSAGE,
                }),
                plan: Some(plan),
            },
            Err(e) => {
                error!("Planning failed for {}: {}", request.repo_id, e);
                ServiceResponse::rejected(Rejection::new(500, e.to_string()))
            }
        }
    }
}

/// Syntax errors are 400; well-formed JSON with bad fields is 422
fn parse_request(body: &str) -> Result<DocsGenRequest, Rejection> {
    let request: DocsGenRequest = serde_json::from_str(body).map_err(|e| {
        let status = if e.is_data() { 422 } else { 400 };
        Rejection::new(status, format!("Invalid request body: {}", e))
    })?;
    request
        .validate()
        .map_err(|e| Rejection::new(422, e.to_string()))?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::testing::{ScriptedGateway, pipeline_with};

    const REPO_ID: &str = "6f1c2b7e-3d4a-4f5b-9c8d-1e2f3a4b5c6d";

    fn body() -> String {
        json!({
            "repo_id": REPO_ID,
            "repo_path": "/tmp/wikiplan-missing-checkout",
            "hierarchy_tree": "README.md",
            "flat_tree": "README.md",
        })
        .to_string()
    }

    fn service(gateway: ScriptedGateway, key: Option<&str>) -> DocsGenService {
        let (pipeline, _) = pipeline_with(gateway);
        DocsGenService::new(Arc::new(pipeline), key.map(String::from))
    }

    fn sections_reply() -> Value {
        json!({"sections": [{"title": "Overview", "keyFiles": ["README.md"], "tinySummary": "Intro"}]})
    }

    #[test]
    fn test_authorize() {
        let key = SecretString::from("secret".to_string());
        assert_eq!(authorize(None, Some(&key)).unwrap_err().status, 401);
        assert_eq!(
            authorize(Some("Bearer wrong"), Some(&key)).unwrap_err().message,
            "Invalid API key"
        );
        assert!(authorize(Some("Bearer secret"), Some(&key)).is_ok());
        assert!(authorize(Some("secret"), Some(&key)).is_ok());
        assert_eq!(authorize(Some("Bearer secret"), None).unwrap_err().status, 500);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_authorize_rejects_same_length_token() {
        let key = SecretString::from("secret".to_string());
        assert_eq!(
            authorize(Some("Bearer secreX"), Some(&key)).unwrap_err().status,
            401
        );
    }

    #[test]
    fn test_request_accepts_camel_case() {
        let request: DocsGenRequest = serde_json::from_value(json!({
            "repoId": REPO_ID, "repoPath": "/r", "hierarchyTree": "a", "flatTree": "a"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.repo_path, "/r");
    }

    #[test]
    fn test_validate_rejects_non_v4_uuid() {
        let request = DocsGenRequest {
            repo_id: "6f1c2b7e-3d4a-1f5b-9c8d-1e2f3a4b5c6d".to_string(),
            repo_path: "/r".to_string(),
            hierarchy_tree: "a".to_string(),
            flat_tree: "a".to_string(),
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Format);
    }

    #[test]
    fn test_validate_rejects_empty_field() {
        let request = DocsGenRequest {
            repo_id: REPO_ID.to_string(),
            repo_path: "/r".to_string(),
            hierarchy_tree: String::new(),
            flat_tree: "a".to_string(),
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.field.as_deref(), Some("hierarchy_tree"));
    }

    #[tokio::test]
    async fn test_missing_header_is_401() {
        let response = service(ScriptedGateway::failing(), Some("k"))
            .handle(None, &body())
            .await;
        assert_eq!(response.status, 401);
        assert_eq!(response.body["error"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn test_unconfigured_key_is_500() {
        let response = service(ScriptedGateway::failing(), None)
            .handle(Some("Bearer k"), &body())
            .await;
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn test_bad_bodies() {
        let svc = service(ScriptedGateway::failing(), Some("k"));
        assert_eq!(svc.handle(Some("Bearer k"), "{not json").await.status, 400);
        assert_eq!(
            svc.handle(Some("Bearer k"), r#"{"repo_id": 7}"#).await.status,
            422
        );
        assert_eq!(
            svc.handle(Some("Bearer k"), r#"{"repo_id": "nope"}"#).await.status,
            422
        );
    }

    #[tokio::test]
    async fn test_pipeline_not_entered_on_invalid_body() {
        let (pipeline, gateway) = pipeline_with(ScriptedGateway::failing());
        let svc = DocsGenService::new(Arc::new(pipeline), Some("k".to_string()));
        svc.handle(Some("Bearer k"), "{}").await;
        assert!(gateway.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_success_attaches_plan() {
        let gateway = ScriptedGateway::script([None, None, Some(sections_reply())]);
        let response = service(gateway, Some("k"))
            .handle(Some("Bearer k"), &body())
            .await;

        assert!(response.is_success());
        assert_eq!(response.body["repo_id"], REPO_ID);
        assert_eq!(response.body["message"], ACCEPTED_MESSAGE);
        let plan = response.plan.unwrap();
        assert_eq!(plan.sections[0].title, "Overview");
    }

    #[tokio::test]
    async fn test_terminal_pipeline_error_is_500() {
        let response = service(ScriptedGateway::failing(), Some("k"))
            .handle(Some("Bearer k"), &body())
            .await;
        assert_eq!(response.status, 500);
        assert!(response.plan.is_none());
    }
}
