//! Prompt Template Store
//!
//! Templates are plain `.txt` files. A file's key is its name without the
//! extension and without a leading `NN.` ordering prefix, so
//! `planner/01.select-summary-files.txt` is `select-summary-files`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use ignore::WalkBuilder;
use regex::Regex;
use tracing::{debug, warn};

use super::templates;
use crate::types::{PlanError, Result};

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").ok());
static ORDER_PREFIX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d+\.").ok());

// =============================================================================
// Variables
// =============================================================================

/// Primitive value substituted into a template
#[derive(Debug, Clone, PartialEq)]
pub enum PromptValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for PromptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for PromptValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for PromptValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<usize> for PromptValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for PromptValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PromptValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Named template variables
#[derive(Debug, Clone, Default)]
pub struct PromptVars(HashMap<String, PromptValue>);

impl PromptVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<PromptValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&PromptValue> {
        self.0.get(name)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Looks up a template by key and fills its placeholders
pub trait PromptResolver: Send + Sync {
    fn get(&self, key: &str, vars: &PromptVars) -> Result<String>;
}

/// In-memory key → template map, read-only after construction
#[derive(Debug, Clone, Default)]
pub struct PromptStore {
    templates: BTreeMap<String, String>,
}

impl PromptStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the compiled-in templates
    pub fn builtin() -> Self {
        let templates = templates::builtin()
            .into_iter()
            .map(|(key, text)| (key.to_string(), text))
            .collect();
        Self { templates }
    }

    /// Built-ins, overridden by any templates found under `dir`
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut store = Self::builtin();
        store.load_dir(dir)?;
        Ok(store)
    }

    /// Load every `.txt` file under `dir`, replacing same-key templates
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(PlanError::Config(format!(
                "Prompt directory not found: {}",
                dir.display()
            )));
        }

        let walker = WalkBuilder::new(dir)
            .standard_filters(false)
            .follow_links(false)
            .build();

        let mut loaded = 0;
        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "txt") {
                continue;
            }
            let Some(key) = path.file_name().and_then(|n| n.to_str()).map(template_key) else {
                warn!("Skipping prompt with non UTF-8 name: {}", path.display());
                continue;
            };

            let text = std::fs::read_to_string(path)?;
            debug!("Loaded prompt '{}' from {}", key, path.display());
            self.insert(key, text);
            loaded += 1;
        }

        Ok(loaded)
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(key.into(), template.into());
    }

    /// Sorted list of known keys
    pub fn available(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }
}

impl PromptResolver for PromptStore {
    fn get(&self, key: &str, vars: &PromptVars) -> Result<String> {
        let template = self
            .templates
            .get(key)
            .ok_or_else(|| PlanError::PromptNotFound(key.to_string()))?;
        Ok(interpolate(template, vars))
    }
}

/// `01.select-summary-files.txt` → `select-summary-files`
fn template_key(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    match ORDER_PREFIX.as_ref() {
        Some(re) => re.replace(stem, "").into_owned(),
        None => stem.to_string(),
    }
}

/// Replace `{{name}}` with its value; unknown names stay as written
fn interpolate(template: &str, vars: &PromptVars) -> String {
    let Some(re) = PLACEHOLDER.as_ref() else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &regex::Captures| match vars.get(&caps[1]) {
        Some(value) => value.to_string(),
        None => caps[0].to_string(),
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_key() {
        assert_eq!(template_key("01.select-summary-files.txt"), "select-summary-files");
        assert_eq!(template_key("prompt.txt"), "prompt");
        assert_eq!(template_key("2024.v2.notes.txt"), "v2.notes");
    }

    #[test]
    fn test_interpolate_known_and_unknown() {
        let vars = PromptVars::new().with("name", "wikiplan").with("count", 3usize);
        let out = interpolate("{{name}} has {{count}} stages, {{missing}} stays", &vars);
        assert_eq!(out, "wikiplan has 3 stages, {{missing}} stays");
    }

    #[test]
    fn test_unknown_key_errors() {
        let store = PromptStore::new();
        let err = store.get("nope", &PromptVars::new()).unwrap_err();
        assert!(matches!(err, PlanError::PromptNotFound(k) if k == "nope"));
    }

    #[test]
    fn test_builtin_keys() {
        let store = PromptStore::builtin();
        assert_eq!(
            store.available(),
            vec!["select-summary-files", "write-sections", "write-summary"]
        );
    }

    #[test]
    fn test_builtin_placeholders_filled() {
        let store = PromptStore::builtin();
        let prompt = store
            .get(
                "write-sections",
                &PromptVars::new()
                    .with("summary", "A CLI")
                    .with("hierarchy_tree", "src/")
                    .with("flat_tree", "src/main.rs"),
            )
            .unwrap();
        assert!(prompt.contains("A CLI"));
        assert!(prompt.contains("src/main.rs"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_load_dir_recursive_and_override() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("planner")).unwrap();
        std::fs::write(
            dir.path().join("planner/01.select-summary-files.txt"),
            "Pick from {{flat_tree}}",
        )
        .unwrap();
        std::fs::write(dir.path().join("extra.txt"), "Hello {{who}}").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let store = PromptStore::with_overrides(dir.path()).unwrap();
        assert!(store.contains("extra"));
        assert!(!store.contains("notes"));

        let prompt = store
            .get(
                "select-summary-files",
                &PromptVars::new().with("flat_tree", "a.rs"),
            )
            .unwrap();
        assert_eq!(prompt, "Pick from a.rs");
    }

    #[test]
    fn test_missing_dir_is_config_error() {
        let result = PromptStore::with_overrides(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(PlanError::Config(_))));
    }
}
