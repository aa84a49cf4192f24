//! Stage 3: propose the documentation sections.

use tracing::error;

use crate::ai::budget::ContentBudgeter;
use crate::ai::metrics::{PlanMetrics, StageMetrics};
use crate::ai::prompt::{PromptVars, WRITE_SECTIONS_KEY};
use crate::planner::PlanningPipeline;
use crate::planner::gateway::{GatewayOutcome, invoke_structured};
use crate::planner::schemas::{SectionsOutput, StageSchemas};
use crate::types::{
    PlanError, PlanningStage, RepositoryDescriptor, Result, Section, SectionPlan, Summary,
};

impl PlanningPipeline {
    pub(crate) async fn plan_sections(
        &self,
        repo: &RepositoryDescriptor,
        summary: &Summary,
        metrics: &mut PlanMetrics,
    ) -> Result<SectionPlan> {
        let stage = PlanningStage::PlanSections;

        let hierarchy =
            ContentBudgeter::simplify_tree(&repo.hierarchy_tree, self.settings.tree_max_lines);
        let flat =
            ContentBudgeter::limit_lines(&repo.flat_tree, self.settings.flat_tree_max_lines);

        let vars = PromptVars::new()
            .with("summary", summary.as_str())
            .with("hierarchy_tree", &*hierarchy)
            .with("flat_tree", &*flat);
        let prompt = self.render_prompt(stage, WRITE_SECTIONS_KEY, &vars)?;
        let estimated = ContentBudgeter::estimate_tokens(&prompt);

        let outcome = invoke_structured::<SectionsOutput>(
            self.gateway.as_ref(),
            &prompt,
            &StageSchemas::sections(),
            &self.profiles.get(stage),
        )
        .await
        .refine(|output| check_sections(output.sections));

        match outcome {
            GatewayOutcome::Success { value, response } => {
                metrics.record(StageMetrics::generated(stage, estimated, &response));
                Ok(value)
            }
            GatewayOutcome::Failure(failure) => {
                error!("Stage {}: {}; no fallback, aborting run", stage, failure);
                Err(PlanError::pipeline(stage.as_str(), failure.to_string()))
            }
        }
    }
}

/// Sections pass through verbatim once every one has a title and summary
fn check_sections(sections: Vec<Section>) -> std::result::Result<SectionPlan, String> {
    if sections.is_empty() {
        return Err("no sections returned".to_string());
    }
    if let Some(index) = sections
        .iter()
        .position(|s| s.title.trim().is_empty() || s.tiny_summary.trim().is_empty())
    {
        return Err(format!("section {} has an empty title or summary", index));
    }
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::testing::{ScriptedGateway, pipeline_with};
    use serde_json::json;

    fn summary() -> Summary {
        Summary::from_generated("A demo.").unwrap()
    }

    #[tokio::test]
    async fn test_sections_returned_verbatim() {
        let reply = json!({"sections": [
            {"title": "Setup", "keyFiles": ["b.md", "a.md", "b.md"], "tinySummary": "Install"}
        ]});
        let (pipeline, _) = pipeline_with(ScriptedGateway::replying([reply]));
        let repo = RepositoryDescriptor::new("/repo", "a.md\nb.md", "a.md\nb.md");

        let sections = pipeline
            .plan_sections(&repo, &summary(), &mut PlanMetrics::new())
            .await
            .unwrap();

        assert_eq!(sections[0].key_files, vec!["b.md", "a.md", "b.md"]);
    }

    #[tokio::test]
    async fn test_outage_is_terminal() {
        let (pipeline, _) = pipeline_with(ScriptedGateway::failing());
        let repo = RepositoryDescriptor::new("/repo", "", "");
        let err = pipeline
            .plan_sections(&repo, &summary(), &mut PlanMetrics::new())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Pipeline error in stage plan_sections"));
    }

    #[tokio::test]
    async fn test_blank_title_is_terminal() {
        let reply = json!({"sections": [{"title": " ", "keyFiles": [], "tinySummary": "x"}]});
        let (pipeline, _) = pipeline_with(ScriptedGateway::replying([reply]));
        let repo = RepositoryDescriptor::new("/repo", "", "");
        let result = pipeline
            .plan_sections(&repo, &summary(), &mut PlanMetrics::new())
            .await;
        assert!(matches!(result, Err(PlanError::Pipeline { .. })));
    }

    #[tokio::test]
    async fn test_prompt_uses_compressed_trees() {
        let flat: String = (0..600)
            .map(|i| format!("src/f{}.rs", i))
            .collect::<Vec<_>>()
            .join("\n");
        let hierarchy: String = (0..200)
            .map(|i| format!("  f{}.rs", i))
            .collect::<Vec<_>>()
            .join("\n");
        let repo = RepositoryDescriptor::new("/repo", hierarchy, flat);
        let reply = json!({"sections": [{"title": "All", "keyFiles": [], "tinySummary": "Everything"}]});
        let (pipeline, gateway) = pipeline_with(ScriptedGateway::replying([reply]));

        pipeline
            .plan_sections(&repo, &summary(), &mut PlanMetrics::new())
            .await
            .unwrap();

        let prompt = &gateway.prompts()[0];
        assert!(prompt.contains("src/f499.rs"));
        assert!(!prompt.contains("src/f500.rs"));
        assert!(prompt.contains("... [100 more lines truncated]"));
        assert!(prompt.contains("  f149.rs"));
        assert!(!prompt.contains("  f150.rs"));
        assert!(prompt.contains("... [tree truncated]"));
        assert!(prompt.contains("A demo."));
    }
}
