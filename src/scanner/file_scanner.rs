use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::tree::hierarchy_tree;
use crate::types::{PlanError, RepositoryDescriptor, Result};

/// Directory never listed, even when not ignored
const VCS_DIR: &str = ".git";

/// Scanner options from the `[scan]` config section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extra glob patterns to leave out (gitignore syntax)
    pub exclude: Vec<String>,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
}

pub struct RepoScanner {
    root: PathBuf,
    config: ScanConfig,
}

impl RepoScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted repository-relative file paths using `/` separators.
    ///
    /// Honors `.gitignore`, includes hidden files unless configured otherwise,
    /// never descends into `.git`.
    pub fn paths(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(PlanError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Repository not found: {}", self.root.display()),
            )));
        }

        let mut overrides = OverrideBuilder::new(&self.root);
        for pattern in &self.config.exclude {
            overrides
                .add(&format!("!{}", pattern))
                .map_err(|e| PlanError::Config(format!("Invalid exclude '{}': {}", pattern, e)))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| PlanError::Config(format!("Invalid exclude patterns: {}", e)))?;

        let walker = WalkBuilder::new(&self.root)
            .hidden(self.config.skip_hidden)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .overrides(overrides)
            .filter_entry(|entry| entry.file_name() != VCS_DIR)
            .build();

        let mut paths: Vec<String> = walker
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .filter_map(|entry| {
                entry.path().strip_prefix(&self.root).ok().map(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
            })
            .filter(|rel| !rel.is_empty())
            .collect();

        paths.sort();
        debug!("Scanned {} files under {}", paths.len(), self.root.display());
        Ok(paths)
    }

    /// Build both trees for the checkout
    pub fn describe(&self) -> Result<RepositoryDescriptor> {
        let paths = self.paths()?;
        Ok(RepositoryDescriptor::new(
            self.root.to_string_lossy(),
            hierarchy_tree(&paths),
            paths.join("\n"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "x").unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "src/main.rs");
        touch(dir.path(), "src/cli/mod.rs");
        touch(dir.path(), ".github/workflows/ci.yml");
        touch(dir.path(), ".git/HEAD");
        dir
    }

    #[test]
    fn test_paths_sorted_with_hidden_without_git() {
        let dir = fixture();
        let paths = RepoScanner::new(dir.path()).paths().unwrap();
        assert_eq!(
            paths,
            vec![
                ".github/workflows/ci.yml",
                "README.md",
                "src/cli/mod.rs",
                "src/main.rs"
            ]
        );
    }

    #[test]
    fn test_exclude_and_skip_hidden() {
        let dir = fixture();
        let paths = RepoScanner::new(dir.path())
            .with_config(ScanConfig {
                exclude: vec!["src/cli/**".to_string()],
                skip_hidden: true,
            })
            .paths()
            .unwrap();
        assert_eq!(paths, vec!["README.md", "src/main.rs"]);
    }

    #[test]
    fn test_describe_builds_trees() {
        let dir = fixture();
        let repo = RepoScanner::new(dir.path()).describe().unwrap();
        assert!(repo.flat_tree.starts_with(".github/workflows/ci.yml\nREADME.md"));
        assert!(repo.hierarchy_tree.contains("src/\n  cli/\n    mod.rs\n  main.rs"));
    }

    #[test]
    fn test_missing_root() {
        let result = RepoScanner::new("/no/such/checkout").paths();
        assert!(matches!(result, Err(PlanError::Io(_))));
    }
}
