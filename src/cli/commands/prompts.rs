//! Prompts Command
//!
//! List the prompt keys the pipeline can resolve.

use crate::ai::prompt::{SELECT_FILES_KEY, WRITE_SECTIONS_KEY, WRITE_SUMMARY_KEY};
use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::types::Result;

const REQUIRED: [&str; 3] = [SELECT_FILES_KEY, WRITE_SUMMARY_KEY, WRITE_SECTIONS_KEY];

pub fn run() -> Result<()> {
    let ctx = CommandContext::load()?;
    let store = ctx.prompts()?;
    let output = Output::new();

    output.header("Prompts");
    if let Some(dir) = &ctx.config.prompts.dir {
        output.kv("Overrides", &dir.display().to_string());
    }
    for key in store.available() {
        println!("  {}", key);
    }

    for key in REQUIRED {
        if !store.contains(key) {
            output.warning(&format!("Missing required prompt '{}'", key));
        }
    }
    Ok(())
}
