//! Check Command
//!
//! Verify that the generation endpoint answers and serves the configured model.

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::types::{PlanError, Result};

pub fn run() -> Result<()> {
    let ctx = CommandContext::load()?;
    let gateway = ctx.gateway()?;
    let output = Output::new();

    output.header("Gateway");
    output.kv("Endpoint", &ctx.config.llm.api_base);
    output.kv("Model", &ctx.config.llm.model);

    if runtime()?.block_on(gateway.health_check())? {
        output.success(&format!("{} is reachable", gateway.name()));
        Ok(())
    } else {
        output.error(&format!("{} is not reachable", gateway.name()));
        Err(PlanError::LlmApi(format!(
            "Health check failed for {}",
            ctx.config.llm.api_base
        )))
    }
}
