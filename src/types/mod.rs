pub mod error;

pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, PlanError, Result, ValidationError,
    ValidationErrorKind,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::budget as budget_constants;
use crate::constants::pipeline as pipeline_constants;

// =============================================================================
// Pipeline Input
// =============================================================================

/// Immutable pipeline input describing one repository checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Absolute or working-directory relative checkout root
    pub repo_path: String,
    /// Indented listing, two spaces per nesting level
    pub hierarchy_tree: String,
    /// Newline-delimited repository-relative file paths
    pub flat_tree: String,
}

impl RepositoryDescriptor {
    pub fn new(
        repo_path: impl Into<String>,
        hierarchy_tree: impl Into<String>,
        flat_tree: impl Into<String>,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            hierarchy_tree: hierarchy_tree.into(),
            flat_tree: flat_tree.into(),
        }
    }

    /// Non-blank flat tree entries in original order
    pub fn flat_entries(&self) -> impl Iterator<Item = &str> {
        self.flat_tree
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

// =============================================================================
// Budget
// =============================================================================

/// Size ceilings applied to the file content bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    pub max_chars_per_file: usize,
    pub max_total_chars: usize,
    pub max_files: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_chars_per_file: budget_constants::MAX_CHARS_PER_FILE,
            max_total_chars: budget_constants::MAX_TOTAL_CHARS,
            max_files: budget_constants::MAX_FILES,
        }
    }
}

// =============================================================================
// File Selection
// =============================================================================

/// Ordered, duplicate-free set of repository-relative paths.
///
/// Construction enforces first-seen order and the length cap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileSelection(Vec<String>);

impl FileSelection {
    /// Deduplicate by value keeping first-seen order, then cap to `max_files`.
    /// Blank entries are dropped and surrounding whitespace trimmed.
    pub fn from_paths<I, S>(paths: I, max_files: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let files = paths
            .into_iter()
            .filter_map(|p| {
                let trimmed = p.as_ref().trim();
                (!trimmed.is_empty() && seen.insert(trimmed.to_string()))
                    .then(|| trimmed.to_string())
            })
            .take(max_files)
            .collect();
        Self(files)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.iter().any(|p| p == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

// =============================================================================
// File Content Bundle
// =============================================================================

/// Raw file content read from the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// One bundle entry after budgeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleEntry {
    pub path: String,
    pub content: String,
    /// True iff `content` differs from the file's raw content
    pub truncated: bool,
}

impl BundleEntry {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Short, non-empty project summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Summary(String);

impl Summary {
    /// Accept generated text as-is: `None` when blank, clipped with an
    /// ellipsis when longer than the summary limit.
    pub fn from_generated(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }

        let limit = pipeline_constants::MAX_SUMMARY_CHARS;
        if text.chars().count() <= limit {
            return Some(Self(text.to_string()));
        }

        let mut clipped: String = text.chars().take(limit).collect();
        clipped.push_str(pipeline_constants::ELLIPSIS);
        Some(Self(clipped))
    }

    /// Wrap fallback text that is known to be non-empty
    pub(crate) fn composed(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Section Plan
// =============================================================================

/// One planned documentation section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    #[serde(alias = "key_files")]
    pub key_files: Vec<String>,
    #[serde(alias = "tiny_summary")]
    pub tiny_summary: String,
}

/// Ordered sections produced once per pipeline run
pub type SectionPlan = Vec<Section>;

// =============================================================================
// Stages
// =============================================================================

/// Planning pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningStage {
    SelectFiles,
    Summarize,
    PlanSections,
}

impl PlanningStage {
    pub const ALL: [PlanningStage; 3] = [
        PlanningStage::SelectFiles,
        PlanningStage::Summarize,
        PlanningStage::PlanSections,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanningStage::SelectFiles => "select_files",
            PlanningStage::Summarize => "summarize",
            PlanningStage::PlanSections => "plan_sections",
        }
    }
}

impl fmt::Display for PlanningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
