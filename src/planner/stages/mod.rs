//! Stage implementations, one `impl PlanningPipeline` block per stage.

mod sections;
mod select;
mod summarize;
