//! CLI Common Utilities
//!
//! Shared initialization for command handlers: configuration, gateway,
//! prompt store and pipeline wiring.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::ai::prompt::PromptStore;
use crate::ai::provider::{SharedGateway, create_gateway};
use crate::config::{Config, ConfigLoader};
use crate::planner::PlanningPipeline;
use crate::scanner::RepoScanner;
use crate::types::{PlanError, RepositoryDescriptor, Result};

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    /// Load the merged configuration
    pub fn load() -> Result<Self> {
        Ok(Self {
            config: ConfigLoader::load()?,
        })
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn gateway(&self) -> Result<SharedGateway> {
        create_gateway(&self.config.llm)
    }

    /// Built-in prompts, overridden by `prompts.dir` when configured
    pub fn prompts(&self) -> Result<PromptStore> {
        match &self.config.prompts.dir {
            Some(dir) => PromptStore::with_overrides(dir),
            None => Ok(PromptStore::builtin()),
        }
    }

    pub fn pipeline(&self) -> Result<PlanningPipeline> {
        self.pipeline_with(self.gateway()?)
    }

    /// Pipeline over an explicit gateway, configured from this context
    pub fn pipeline_with(&self, gateway: SharedGateway) -> Result<PlanningPipeline> {
        Ok(PlanningPipeline::new(gateway, Arc::new(self.prompts()?))
            .with_profiles(self.config.profiles.clone())
            .with_settings(self.config.budget))
    }

    pub fn scan(&self, path: &Path) -> Result<RepositoryDescriptor> {
        RepoScanner::new(path)
            .with_config(self.config.scan.clone())
            .describe()
    }
}

/// Runtime for the async parts of a synchronous command
pub fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(|e| PlanError::Config(format!("Failed to start runtime: {}", e)))
}
