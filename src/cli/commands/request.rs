//! Request Command
//!
//! Feed a request body through the documentation service handler, the same
//! way an HTTP front end would.

use std::path::Path;
use std::sync::Arc;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::service::DocsGenService;
use crate::types::Result;

pub fn run(body: &Path, token: Option<&str>) -> Result<()> {
    let ctx = CommandContext::load()?;
    let body = std::fs::read_to_string(body)?;
    let service = DocsGenService::new(
        Arc::new(ctx.pipeline()?),
        ctx.config.service.api_key.clone(),
    );

    let authorization = token.map(|t| format!("Bearer {}", t));
    let response = runtime()?.block_on(service.handle(authorization.as_deref(), &body));

    let output = Output::new();
    if response.is_success() {
        output.success(&format!("HTTP {}", response.status));
    } else {
        output.error(&format!("HTTP {}", response.status));
    }
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    if let Some(plan) = &response.plan {
        output.section("Plan");
        println!("{}", super::plan::render_text(plan));
    }
    Ok(())
}
