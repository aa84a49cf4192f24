//! Built-in prompt templates for the three planning stages.
//!
//! Placeholders use `{{name}}` and are filled by the prompt store.

use super::PromptBuilder;

pub const SELECT_FILES_KEY: &str = "select-summary-files";
pub const WRITE_SUMMARY_KEY: &str = "write-summary";
pub const WRITE_SECTIONS_KEY: &str = "write-sections";

/// Stage 1: `{{max_files}}`, `{{hierarchy_tree}}`, `{{flat_tree}}`
pub(super) fn select_summary_files() -> String {
    PromptBuilder::new()
        .role(
            "software architect",
            "identifying the files that best explain a repository",
        )
        .objectives(&[
            "Read the repository layout below",
            "Pick at most {{max_files}} files that reveal what the project does",
            "Prefer READMEs, package manifests, entry points and top-level modules",
        ])
        .section("Directory Structure", "")
        .code("text", "{{hierarchy_tree}}")
        .section("All Files", "")
        .code("text", "{{flat_tree}}")
        .rules(&[
            "Only use paths that appear verbatim in All Files",
            "Respond with JSON: {\"files\": [\"path\", ...]}",
        ])
        .build()
}

/// Stage 2: `{{files}}`
pub(super) fn write_summary() -> String {
    PromptBuilder::new()
        .role("technical writer", "concise project overviews")
        .objectives(&[
            "Read the file excerpts below",
            "Describe what the project is, who uses it and its main technologies",
        ])
        .section("Files", "{{files}}")
        .rules(&[
            "Two to four sentences, plain prose, no markdown",
            "Respond with JSON: {\"summary\": \"...\"}",
        ])
        .build()
}

/// Stage 3: `{{summary}}`, `{{hierarchy_tree}}`, `{{flat_tree}}`
pub(super) fn write_sections() -> String {
    PromptBuilder::new()
        .role(
            "documentation architect",
            "structuring wikis for software repositories",
        )
        .objectives(&[
            "Propose the sections of a documentation wiki for this repository",
            "Order sections from overview to details",
            "List the key files each section should be written from",
        ])
        .section("Project Summary", "{{summary}}")
        .section("Directory Structure", "")
        .code("text", "{{hierarchy_tree}}")
        .section("All Files", "")
        .code("text", "{{flat_tree}}")
        .rules(&[
            "Only reference paths that appear in All Files",
            "Respond with JSON: {\"sections\": [{\"title\": \"...\", \"keyFiles\": [\"...\"], \"tinySummary\": \"...\"}]}",
        ])
        .build()
}

/// Key/template pairs compiled into the binary
pub(super) fn builtin() -> [(&'static str, String); 3] {
    [
        (SELECT_FILES_KEY, select_summary_files()),
        (WRITE_SUMMARY_KEY, write_summary()),
        (WRITE_SECTIONS_KEY, write_sections()),
    ]
}
