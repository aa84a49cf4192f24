//! Stage 1: pick the files worth reading.

use tracing::{info, warn};

use crate::ai::budget::ContentBudgeter;
use crate::ai::metrics::{PlanMetrics, StageMetrics};
use crate::ai::prompt::{PromptVars, SELECT_FILES_KEY};
use crate::planner::PlanningPipeline;
use crate::planner::fallback;
use crate::planner::gateway::{GatewayOutcome, invoke_structured};
use crate::planner::schemas::{FileListOutput, StageSchemas};
use crate::types::{FileSelection, PlanningStage, RepositoryDescriptor, Result};

impl PlanningPipeline {
    pub(crate) async fn select_files(
        &self,
        repo: &RepositoryDescriptor,
        metrics: &mut PlanMetrics,
    ) -> Result<FileSelection> {
        let stage = PlanningStage::SelectFiles;
        let max_files = self.settings.budget.max_files;

        let vars = PromptVars::new()
            .with("max_files", max_files)
            .with("hierarchy_tree", repo.hierarchy_tree.as_str())
            .with("flat_tree", repo.flat_tree.as_str());
        let prompt = self.render_prompt(stage, SELECT_FILES_KEY, &vars)?;
        let estimated = ContentBudgeter::estimate_tokens(&prompt);

        let outcome = invoke_structured::<FileListOutput>(
            self.gateway.as_ref(),
            &prompt,
            &StageSchemas::file_list(max_files),
            &self.profiles.get(stage),
        )
        .await
        .refine(|output| accept_file_list(output.files, max_files));

        match outcome {
            GatewayOutcome::Success { value, response } => {
                metrics.record(StageMetrics::generated(stage, estimated, &response));
                Ok(value)
            }
            GatewayOutcome::Failure(failure) => {
                let selection = fallback::select_files(repo.flat_entries(), max_files);
                warn!(
                    "Stage {}: {}; using fallback selection of {} files",
                    stage,
                    failure,
                    selection.len()
                );
                metrics.record(StageMetrics::fallback(stage, estimated, failure.latency_ms));
                Ok(selection)
            }
        }
    }
}

/// Dedup and cap the gateway's list; an empty result counts as a bad shape
fn accept_file_list(
    paths: Vec<String>,
    max_files: usize,
) -> std::result::Result<FileSelection, String> {
    let selection = FileSelection::from_paths(&paths, max_files);
    if selection.is_empty() {
        return Err("file list contained no usable paths".to_string());
    }

    let returned = paths.iter().filter(|p| !p.trim().is_empty()).count();
    if returned > max_files {
        info!(
            "Gateway returned {} paths, keeping {} (cap {})",
            returned,
            selection.len(),
            max_files
        );
    }
    Ok(selection)
}
