//! Tree Command
//!
//! Print the trees the pipeline would receive for a checkout.

use std::path::Path;

use crate::ai::budget::ContentBudgeter;
use crate::cli::util::CommandContext;
use crate::types::Result;

pub fn run(path: &Path, flat: bool, full: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let repo = ctx.scan(path)?;
    let settings = ctx.config.budget;

    let text = match (flat, full) {
        (true, true) => repo.flat_tree.clone(),
        (true, false) => {
            ContentBudgeter::limit_lines(&repo.flat_tree, settings.flat_tree_max_lines).into_owned()
        }
        (false, true) => repo.hierarchy_tree.clone(),
        (false, false) => {
            ContentBudgeter::simplify_tree(&repo.hierarchy_tree, settings.tree_max_lines)
                .into_owned()
        }
    };
    println!("{}", text);
    Ok(())
}
