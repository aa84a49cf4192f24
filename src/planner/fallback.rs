//! Deterministic fallbacks used when the gateway gives nothing usable.
//!
//! Both policies work from file names alone: no I/O, no errors.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::pipeline as pipeline_constants;
use crate::types::{FileSelection, Summary};

/// Significance patterns, matched against a path's file name, in priority order
const SIGNIFICANCE_PATTERNS: &[&str] = &[
    r"(?i)^readme(\..+)?$",
    r"^(package\.json|Cargo\.toml|pyproject\.toml|setup\.py|requirements\.txt|go\.mod|pom\.xml|build\.gradle|composer\.json|Gemfile)$",
    r"^main\..+$",
    r"^index\..+$",
    r"^app\..+$",
];

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SIGNIFICANCE_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Pick files by name significance, padding from the listing when few match.
///
/// Matches are collected pattern by pattern (README first, then manifests,
/// then `main.*`, `index.*`, `app.*`) and capped at `max_files`. Fewer than
/// five matches are topped up with the listing's own lines in order.
pub fn select_files<'a, I>(entries: I, max_files: usize) -> FileSelection
where
    I: IntoIterator<Item = &'a str>,
{
    let entries: Vec<&str> = entries
        .into_iter()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();

    let mut seen = HashSet::new();
    let mut picked: Vec<&str> = Vec::with_capacity(max_files);

    'patterns: for pattern in PATTERNS.iter() {
        for entry in &entries {
            if picked.len() >= max_files {
                break 'patterns;
            }
            if pattern.is_match(file_name(entry)) && seen.insert(*entry) {
                picked.push(*entry);
            }
        }
    }

    if picked.len() < pipeline_constants::FALLBACK_MIN_MATCHES {
        for entry in &entries {
            if picked.len() >= max_files {
                break;
            }
            if seen.insert(*entry) {
                picked.push(*entry);
            }
        }
    }

    FileSelection::from_paths(picked, max_files)
}

/// Ecosystem guess from manifests and extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Python,
    JavaScript,
    Rust,
    Unspecified,
}

impl Ecosystem {
    fn label(self) -> &'static str {
        match self {
            Self::Python => "a Python",
            Self::JavaScript => "a JavaScript/TypeScript",
            Self::Rust => "a Rust",
            Self::Unspecified => "a software",
        }
    }

    /// First match wins: Python, then JS/TS, then Rust
    pub fn detect<S: AsRef<str>>(paths: &[S]) -> Self {
        let has = |names: &[&str], exts: &[&str]| {
            paths.iter().any(|p| {
                let name = file_name(p.as_ref());
                names.contains(&name) || extension(name).is_some_and(|e| exts.contains(&e.as_str()))
            })
        };

        if has(&["pyproject.toml", "setup.py", "requirements.txt"], &["py"]) {
            Self::Python
        } else if has(&["package.json"], &["js", "jsx", "ts", "tsx", "mjs", "cjs"]) {
            Self::JavaScript
        } else if has(&["Cargo.toml"], &["rs"]) {
            Self::Rust
        } else {
            Self::Unspecified
        }
    }
}

fn is_readme(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    stem.eq_ignore_ascii_case("readme")
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// One-sentence summary composed from the selected paths
pub fn summarize(selection: &FileSelection) -> Summary {
    let ecosystem = Ecosystem::detect(selection.as_slice());
    let has_readme = selection.iter().any(|p| is_readme(file_name(p)));
    let extensions: BTreeSet<String> = selection
        .iter()
        .filter_map(|p| extension(file_name(p)))
        .collect();

    let docs = if has_readme {
        "with README documentation"
    } else {
        "without README documentation"
    };
    let files = if extensions.is_empty() {
        "no recognizable file extensions".to_string()
    } else {
        let list: Vec<String> = extensions.iter().map(|e| format!(".{}", e)).collect();
        format!("file types {}", list.join(", "))
    };

    Summary::composed(format!(
        "This repository appears to be {} project {}, containing {}.",
        ecosystem.label(),
        docs,
        files
    ))
}
