//! Documentation Planning Pipeline
//!
//! Three strictly sequential stages, each consuming the previous one's output:
//!
//! 1. **Select files**: pick the files that best explain the repository
//! 2. **Summarize**: read and budget those files, produce a short summary
//! 3. **Plan sections**: propose wiki sections from the summary and trees
//!
//! Stages 1 and 2 fall back to deterministic policies whenever the gateway
//! fails or answers in the wrong shape. Stage 3 has no fallback and its
//! failure ends the run.
//!
//! The pipeline holds only read-only collaborators, so one instance can serve
//! any number of concurrent runs.

pub mod fallback;
pub mod files;
pub mod gateway;
pub mod schemas;
mod stages;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::budget::ContentBudgeter;
use crate::ai::metrics::PlanMetrics;
use crate::ai::prompt::{PromptResolver, PromptVars};
use crate::ai::provider::{SharedGateway, StageProfiles};
use crate::constants::tree as tree_constants;
use crate::types::{
    BudgetConfig, FileSelection, PlanningStage, RepositoryDescriptor, Result, SectionPlan, Summary,
};

/// Size limits applied across the stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSettings {
    #[serde(flatten)]
    pub budget: BudgetConfig,
    /// Line budget for the hierarchy tree in section planning
    pub tree_max_lines: usize,
    /// Line budget for the flat tree in section planning
    pub flat_tree_max_lines: usize,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            budget: BudgetConfig::default(),
            tree_max_lines: tree_constants::DEFAULT_MAX_LINES,
            flat_tree_max_lines: tree_constants::FLAT_TREE_MAX_LINES,
        }
    }
}

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct PlanningResult {
    pub selection: FileSelection,
    pub summary: Summary,
    pub sections: SectionPlan,
    pub metrics: PlanMetrics,
}

pub struct PlanningPipeline {
    gateway: SharedGateway,
    prompts: Arc<dyn PromptResolver>,
    profiles: StageProfiles,
    settings: PlanSettings,
}

impl PlanningPipeline {
    pub fn new(gateway: SharedGateway, prompts: Arc<dyn PromptResolver>) -> Self {
        Self {
            gateway,
            prompts,
            profiles: StageProfiles::default(),
            settings: PlanSettings::default(),
        }
    }

    pub fn with_profiles(mut self, profiles: StageProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_settings(mut self, settings: PlanSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &PlanSettings {
        &self.settings
    }

    /// Run all three stages against one repository
    pub async fn run(&self, repo: &RepositoryDescriptor) -> Result<PlanningResult> {
        info!(
            "Planning documentation for {} via {}",
            repo.repo_path,
            self.gateway.name()
        );
        let mut metrics = PlanMetrics::new();

        let selection = self.select_files(repo, &mut metrics).await?;
        let summary = self.summarize(repo, &selection, &mut metrics).await?;
        let sections = self.plan_sections(repo, &summary, &mut metrics).await?;

        info!(
            "Plan ready: {} files, {} sections, fallbacks: {:?}",
            selection.len(),
            sections.len(),
            metrics.fallback_stages()
        );
        debug!("Run metrics:\n{}", metrics.display());

        Ok(PlanningResult {
            selection,
            summary,
            sections,
            metrics,
        })
    }

    /// Resolve a stage prompt and log its size estimate
    fn render_prompt(&self, stage: PlanningStage, key: &str, vars: &PromptVars) -> Result<String> {
        let prompt = self.prompts.get(key, vars)?;
        debug!(
            "Stage {}: prompt '{}' ~{} tokens",
            stage,
            key,
            ContentBudgeter::estimate_tokens(&prompt)
        );
        Ok(prompt)
    }
}
