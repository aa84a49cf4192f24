//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/wikiplan/config.toml)
//! 3. Project config (.wikiplan/config.toml)
//! 4. Deployment variables (`VLLM_URL`, `WIKI_SERVICE_API_KEY`)
//! 5. Environment variables (WIKIPLAN_* prefix, `__` between sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{PlanError, Result};

const APP_DIR: &str = "wikiplan";
const PROJECT_DIR: &str = ".wikiplan";
const CONFIG_FILE: &str = "config.toml";

/// Deployment variables mapped onto config keys
const DEPLOYMENT_VARS: [(&str, &str); 2] = [
    ("VLLM_URL", "llm.api_base"),
    ("WIKI_SERVICE_API_KEY", "service.api_key"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_with(Self::global_config_path(), &Self::project_config_path())
    }

    /// Resolve against explicit file locations; missing files are skipped
    pub fn load_with(global: Option<PathBuf>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        figment = figment
            .merge(Self::deployment_env())
            .merge(Env::prefixed("WIKIPLAN_").split("__").lowercase(true));

        Self::extract(figment)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| PlanError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn deployment_env() -> Env {
        Env::raw()
            .only(&DEPLOYMENT_VARS.map(|(var, _)| var))
            .map(|key| {
                DEPLOYMENT_VARS
                    .iter()
                    .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
                    .map(|(_, path)| (*path).into())
                    .unwrap_or_else(|| key.into())
            })
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/wikiplan/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join(APP_DIR))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(PROJECT_DIR)
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join(CONFIG_FILE)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render(&config, as_json)?);
        Ok(())
    }

    /// Render configuration as TOML or JSON; secrets are never included
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| PlanError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            PlanError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_default(&global_dir, force)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_default(&Self::project_dir(), force)
    }

    /// Write the default config into `dir`, keeping an existing file unless forced
    pub fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_config() -> &'static str {
        r#"# wikiplan configuration
# Project settings in .wikiplan/config.toml override the global file.

version = "1.0"

# OpenAI-compatible generation endpoint (VLLM_URL overrides api_base)
[llm]
api_base = "http://localhost:8000/v1"
model = "deepseek-ai/DeepSeek-R1-Distill-Qwen-7B"
timeout_secs = 300

# Content and tree budgets
[budget]
max_chars_per_file = 8000
max_total_chars = 50000
max_files = 10
tree_max_lines = 150
flat_tree_max_lines = 500

# Per-stage generation profiles
[profiles.select_files]
temperature = 0.0
max_tokens = 500

[profiles.summarize]
temperature = 0.0
max_tokens = 800

[profiles.plan_sections]
temperature = 0.0
max_tokens = 2000

# Template overrides
# [prompts]
# dir = "prompts"

[scan]
exclude = []
skip_hidden = false
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_with(None, &dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.budget.budget.max_files, 10);
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[llm]\nmodel = \"global-model\"\ntimeout_secs = 60\n").unwrap();
        fs::write(&project, "[llm]\nmodel = \"project-model\"\n").unwrap();

        let config = ConfigLoader::load_with(Some(global), &project).unwrap();
        assert_eq!(config.llm.model, "project-model");
        assert_eq!(config.llm.timeout_secs, 60);
    }

    #[test]
    fn test_partial_profile_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[profiles.plan_sections]\nmax_tokens = 4000\n").unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        let profile = config
            .profiles
            .get(crate::types::PlanningStage::PlanSections);
        assert_eq!(profile.max_tokens, 4000);
        assert_eq!(profile.temperature, 0.0);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[budget]\nmax_files = 0\n").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(PlanError::Config(_))
        ));
    }

    #[test]
    fn test_default_file_parses() {
        let dir = TempDir::new().unwrap();
        let path = ConfigLoader::write_default(dir.path(), false).unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.api_base, "http://localhost:8000/v1");
    }

    #[test]
    fn test_write_default_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::write_default(dir.path(), false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"custom\"\n");

        ConfigLoader::write_default(dir.path(), true).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("[llm]"));
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: these variables are only read by this test
        unsafe {
            env::set_var("WIKIPLAN_SCAN__SKIP_HIDDEN", "true");
            env::set_var("VLLM_URL", "http://vllm:8000/v1");
        }
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_with(None, &dir.path().join("none.toml")).unwrap();
        unsafe {
            env::remove_var("WIKIPLAN_SCAN__SKIP_HIDDEN");
            env::remove_var("VLLM_URL");
        }
        assert!(config.scan.skip_hidden);
        assert_eq!(config.llm.api_base, "http://vllm:8000/v1");
    }

    #[test]
    fn test_render_toml() {
        let rendered = ConfigLoader::render(&Config::default(), false).unwrap();
        assert!(rendered.contains("[llm]"));
        assert!(rendered.contains("max_files = 10"));
    }
}
