//! Plan Command
//!
//! Scan a checkout, run the three planning stages and print the result.
//!
//! Usage:
//!   wikiplan plan [PATH] [-f json] [-o FILE]

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::planner::PlanningResult;
use crate::types::Result;

pub fn run(path: &Path, format: &str, output: Option<PathBuf>) -> Result<()> {
    let ctx = CommandContext::load()?;
    let repo = ctx.scan(path)?;
    info!(
        "Scanned {} files under {}",
        repo.flat_entries().count(),
        repo.repo_path
    );

    let pipeline = ctx.pipeline()?;
    let result = runtime()?.block_on(pipeline.run(&repo))?;

    let rendered = if format == "json" {
        serde_json::to_string_pretty(&result)?
    } else {
        render_text(&result)
    };

    match output {
        Some(file) => {
            std::fs::write(&file, &rendered)?;
            Output::new().success(&format!("Plan written to {}", file.display()));
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Human readable plan
pub fn render_text(result: &PlanningResult) -> String {
    let mut out = String::new();

    out.push_str("Selected files:\n");
    for file in result.selection.iter() {
        out.push_str(&format!("  - {}\n", file));
    }

    out.push_str(&format!("\nSummary:\n  {}\n", result.summary));

    out.push_str("\nSections:\n");
    for (i, section) in result.sections.iter().enumerate() {
        out.push_str(&format!("  {}. {}: {}\n", i + 1, section.title, section.tiny_summary));
        if !section.key_files.is_empty() {
            out.push_str(&format!("     files: {}\n", section.key_files.join(", ")));
        }
    }

    let fallbacks = result.metrics.fallback_stages();
    if !fallbacks.is_empty() {
        let names: Vec<&str> = fallbacks.iter().map(|s| s.as_str()).collect();
        out.push_str(&format!("\nFallbacks used: {}\n", names.join(", ")));
    }

    out.push_str(&format!("\nMetrics:\n{}\n", result.metrics.display()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::metrics::{PlanMetrics, StageMetrics};
    use crate::types::{FileSelection, PlanningStage, Section, Summary};

    #[test]
    fn test_render_text() {
        let mut metrics = PlanMetrics::new();
        metrics.record(StageMetrics::fallback(PlanningStage::SelectFiles, 120, 3));
        let result = PlanningResult {
            selection: FileSelection::from_paths(["README.md", "src/lib.rs"], 10),
            summary: Summary::from_generated("A planning crate.").unwrap(),
            sections: vec![Section {
                title: "Overview".to_string(),
                key_files: vec!["README.md".to_string()],
                tiny_summary: "What it is".to_string(),
            }],
            metrics,
        };

        let text = render_text(&result);
        assert!(text.contains("  - src/lib.rs\n"));
        assert!(text.contains("  1. Overview: What it is\n     files: README.md"));
        assert!(text.contains("Fallbacks used: select_files"));
    }
}
