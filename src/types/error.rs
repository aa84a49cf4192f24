//! Unified Error Type System
//!
//! Centralized error types for the planning pipeline and its boundaries.
//!
//! ## Error Categories
//!
//! Gateway failures are classified for logging only. Stages 1 and 2 recover
//! from every category the same way (fallback policy), stage 3 propagates.
//!
//! - **RateLimit**: API rate limiting
//! - **TokenLimit**: Context too large
//! - **Auth**: Authentication failures
//! - **Network**: Connectivity issues
//! - **Unavailable**: Endpoint unavailable
//! - **ParseError**: Response was not usable JSON

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for gateway failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    RateLimit,
    TokenLimit,
    Auth,
    Network,
    Unavailable,
    BadRequest,
    ParseError,
    Transient,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Gateway error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    pub category: ErrorCategory,
    pub message: String,
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw gateway failures onto categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from a transport failure
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit") || lower.contains("too many requests") {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("context length")
            || lower.contains("maximum context")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("unreachable")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("json") || lower.contains("parse") || lower.contains("syntax") {
            return LlmError::with_provider(ErrorCategory::ParseError, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify an HTTP status code directly
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            413 => ErrorCategory::TokenLimit,
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            404 => ErrorCategory::Unavailable,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Structured validation error for malformed request bodies
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub field: Option<String>,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Validation failed for '{}': {}", field, self.message)
        } else {
            write!(f, "Validation failed: {}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Validation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Body is not the expected JSON shape
    Schema,
    /// Required field missing or empty
    MissingField,
    /// Invalid format (e.g. not a UUID v4)
    Format,
    /// Value out of range
    Range,
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structured gateway error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("{0}")]
    Validation(ValidationError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    /// Terminal pipeline failure
    #[error("Pipeline error in stage {stage}: {message}")]
    Pipeline { stage: String, message: String },
}

impl From<LlmError> for PlanError {
    fn from(err: LlmError) -> Self {
        PlanError::Llm(err)
    }
}

impl From<ValidationError> for PlanError {
    fn from(err: ValidationError) -> Self {
        PlanError::Validation(err)
    }
}

impl PlanError {
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Classify this error for gateway failure logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Llm(e) => e.category,
            Self::LlmApi(msg) => ErrorClassifier::classify(msg, "gateway").category,
            Self::Json(_) => ErrorCategory::ParseError,
            Self::Io(_) => ErrorCategory::Network,
            Self::Config(_) => ErrorCategory::BadRequest,
            _ => ErrorCategory::Unknown,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::ParseError.to_string(), "PARSE_ERROR");
    }

    #[test]
    fn test_classify_network() {
        let err = ErrorClassifier::classify("Connection timed out after 30s", "vllm");
        assert_eq!(err.category, ErrorCategory::Network);
    }

    #[test]
    fn test_classify_unknown() {
        let err = ErrorClassifier::classify("Something weird happened", "test");
        assert_eq!(err.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_classify_http_status() {
        assert_eq!(
            ErrorClassifier::classify_http_status(429, "slow down", "t").category,
            ErrorCategory::RateLimit
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(401, "no", "t").category,
            ErrorCategory::Auth
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(503, "down", "t").category,
            ErrorCategory::Transient
        );
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "vllm");
        assert_eq!(err.to_string(), "[vllm:RATE_LIMIT] Too many requests");

        let err = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err.to_string(), "[NETWORK] Connection failed");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new(ValidationErrorKind::Format, "not a UUID v4")
            .with_field("repo_id");
        assert_eq!(
            err.to_string(),
            "Validation failed for 'repo_id': not a UUID v4"
        );
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PlanError::pipeline("plan_sections", "missing sections");
        assert_eq!(
            err.to_string(),
            "Pipeline error in stage plan_sections: missing sections"
        );
    }
}
