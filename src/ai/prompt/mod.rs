//! Prompt Construction and Lookup
//!
//! `PromptBuilder` composes structured prompts section by section.
//! `PromptStore` maps template keys to text and fills `{{name}}` placeholders;
//! stages only see it through the `PromptResolver` trait.

mod store;
mod templates;

pub use store::{PromptResolver, PromptStore, PromptValue, PromptVars};
pub use templates::{SELECT_FILES_KEY, WRITE_SECTIONS_KEY, WRITE_SUMMARY_KEY};

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Fenced block, e.g. a tree listing
    Code { language: String, content: String },
    /// Hard output rules
    Rules(Vec<String>),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|o| o.to_string()).collect(),
        ));
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn rules(mut self, rules: &[&str]) -> Self {
        self.sections.push(PromptSection::Rules(
            rules.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!(
                        "<ROLE>\nYou are an expert {} specializing in {}.\n</ROLE>\n\n",
                        expertise, task
                    ));
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    if !content.is_empty() {
                        prompt.push_str(&content);
                        prompt.push_str("\n\n");
                    }
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n{}\n```\n\n", language, content));
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("<RULES>\n");
                    for rule in rules {
                        prompt.push_str(&format!("- {}\n", rule));
                    }
                    prompt.push_str("</RULES>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("software architect", "repository triage")
            .objectives(&["Pick files", "Explain why"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("software architect"));
        assert!(prompt.contains("1. Pick files"));
        assert!(prompt.contains("2. Explain why"));
    }

    #[test]
    fn test_code_and_rules() {
        let prompt = PromptBuilder::new()
            .section("Files", "listing below")
            .code("text", "src/\n  main.rs")
            .rules(&["Return JSON only"])
            .build();

        assert!(prompt.contains("# Files"));
        assert!(prompt.contains("```text\nsrc/\n  main.rs\n```"));
        assert!(prompt.contains("<RULES>\n- Return JSON only\n</RULES>"));
    }

    #[test]
    fn test_build_trims_trailing_whitespace() {
        let prompt = PromptBuilder::new().text("done").build();
        assert_eq!(prompt, "done");
    }
}
