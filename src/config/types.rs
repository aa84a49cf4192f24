//! Configuration Types
//!
//! Every section carries `#[serde(default)]`, so a partial file only needs
//! the keys it changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::{GatewayConfig, StageProfiles};
use crate::planner::PlanSettings;
use crate::scanner::file_scanner::ScanConfig;
use crate::types::{PlanError, Result};

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration schema version
    pub version: String,

    /// Generation endpoint
    pub llm: GatewayConfig,

    /// Content and tree budgets
    pub budget: PlanSettings,

    /// Per-stage generation profiles
    pub profiles: StageProfiles,

    pub prompts: PromptsConfig,

    pub service: ServiceConfig,

    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: GatewayConfig::default(),
            budget: PlanSettings::default(),
            profiles: StageProfiles::default(),
            prompts: PromptsConfig::default(),
            service: ServiceConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.trim().is_empty() {
            return Err(PlanError::Config("llm.api_base must not be empty".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(PlanError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (stage, profile) in self.profiles.iter() {
            if !(0.0..=2.0).contains(&profile.temperature) {
                return Err(PlanError::Config(format!(
                    "profiles.{}.temperature must be between 0.0 and 2.0, got {}",
                    stage, profile.temperature
                )));
            }
            if profile.max_tokens == 0 {
                return Err(PlanError::Config(format!(
                    "profiles.{}.max_tokens must be greater than 0",
                    stage
                )));
            }
        }

        let budget = &self.budget;
        let limits = [
            ("max_chars_per_file", budget.budget.max_chars_per_file),
            ("max_total_chars", budget.budget.max_total_chars),
            ("max_files", budget.budget.max_files),
            ("tree_max_lines", budget.tree_max_lines),
            ("flat_tree_max_lines", budget.flat_tree_max_lines),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(PlanError::Config(format!(
                "budget.{} must be greater than 0",
                name
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Prompt Templates
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory of `.txt` templates overriding the built-in prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// =============================================================================
// Service Boundary
// =============================================================================

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bearer key expected from callers
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::GenerationProfile;
    use crate::types::PlanningStage;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.budget.budget.max_files, 10);
        assert_eq!(config.budget.tree_max_lines, 150);
    }

    #[test]
    fn test_temperature_out_of_range() {
        let mut config = Config::default();
        config.profiles = config.profiles.with(
            PlanningStage::Summarize,
            GenerationProfile {
                temperature: 2.5,
                max_tokens: 800,
                model: None,
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("profiles.summarize.temperature"));
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let mut config = Config::default();
        config.profiles = config.profiles.with(
            PlanningStage::SelectFiles,
            GenerationProfile {
                temperature: 0.0,
                max_tokens: 0,
                model: None,
            },
        );
        assert!(matches!(config.validate(), Err(PlanError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut config = Config::default();
        config.budget.budget.max_total_chars = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("budget.max_total_chars"));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-llm".to_string());
        config.service.api_key = Some("svc-key".to_string());

        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(!rendered.contains("sk-llm"));
        assert!(!rendered.contains("svc-key"));
        assert!(!format!("{:?}", config).contains("svc-key"));
    }

    #[test]
    fn test_budget_section_is_flat() {
        let config: Config = toml::from_str(
            r#"
[budget]
max_files = 4
tree_max_lines = 80
"#,
        )
        .unwrap();
        assert_eq!(config.budget.budget.max_files, 4);
        assert_eq!(config.budget.budget.max_total_chars, 50_000);
        assert_eq!(config.budget.tree_max_lines, 80);
    }
}
