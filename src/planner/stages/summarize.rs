//! Stage 2: read the selected files and summarize the project.

use tracing::{debug, warn};

use crate::ai::budget::ContentBudgeter;
use crate::ai::metrics::{PlanMetrics, StageMetrics};
use crate::ai::prompt::{PromptVars, WRITE_SUMMARY_KEY};
use crate::planner::PlanningPipeline;
use crate::planner::gateway::{GatewayOutcome, invoke_structured};
use crate::planner::schemas::{StageSchemas, SummaryOutput};
use crate::planner::{fallback, files};
use crate::types::{FileSelection, PlanningStage, RepositoryDescriptor, Result, Summary};

impl PlanningPipeline {
    pub(crate) async fn summarize(
        &self,
        repo: &RepositoryDescriptor,
        selection: &FileSelection,
        metrics: &mut PlanMetrics,
    ) -> Result<Summary> {
        let stage = PlanningStage::Summarize;

        let sources = files::read_selected(&repo.repo_path, selection).await;
        let bundle = ContentBudgeter::limit_bundle(&sources, &self.settings.budget);
        debug!(
            "Stage {}: {} of {} selected files bundled ({} truncated)",
            stage,
            bundle.len(),
            selection.len(),
            bundle.iter().filter(|e| e.truncated).count()
        );

        let vars = PromptVars::new().with("files", files::render_bundle(&bundle));
        let prompt = self.render_prompt(stage, WRITE_SUMMARY_KEY, &vars)?;
        let estimated = ContentBudgeter::estimate_tokens(&prompt);

        let outcome = invoke_structured::<SummaryOutput>(
            self.gateway.as_ref(),
            &prompt,
            &StageSchemas::summary(),
            &self.profiles.get(stage),
        )
        .await
        .refine(|output| {
            Summary::from_generated(&output.summary).ok_or_else(|| "summary was empty".to_string())
        });

        match outcome {
            GatewayOutcome::Success { value, response } => {
                metrics.record(StageMetrics::generated(stage, estimated, &response));
                Ok(value)
            }
            GatewayOutcome::Failure(failure) => {
                warn!("Stage {}: {}; using fallback summary", stage, failure);
                metrics.record(StageMetrics::fallback(stage, estimated, failure.latency_ms));
                Ok(fallback::summarize(selection))
            }
        }
    }
}
