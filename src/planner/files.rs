//! Reading selected files and rendering the content bundle.

use std::path::{Component, Path};
use std::sync::LazyLock;

use futures::future::join_all;
use regex::Regex;
use tracing::{debug, warn};

use crate::types::{BundleEntry, FileSelection, SourceFile};

static REPEATED_SEPARATORS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/{2,}").ok());

/// Join `repo_path` and `relative`, collapsing `//`, dropping `/./` segments
/// and trailing separators.
pub fn resolve_path(repo_path: &str, relative: &str) -> String {
    let joined = format!("{}/{}", repo_path, relative);
    let mut path = match REPEATED_SEPARATORS.as_ref() {
        Some(re) => re.replace_all(&joined, "/").into_owned(),
        None => joined,
    };
    while path.contains("/./") {
        path = path.replace("/./", "/");
    }
    if path.ends_with("/.") {
        path.truncate(path.len() - 1);
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// True when `relative` names a location inside the checkout: no root,
/// drive prefix or `..` component
pub fn stays_inside(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Read every selected path concurrently, keeping selection order.
///
/// Paths escaping the checkout, missing, non-regular and non-UTF-8 files are
/// logged and left out.
pub async fn read_selected(repo_path: &str, selection: &FileSelection) -> Vec<SourceFile> {
    let reads = selection.iter().map(|relative| async move {
        if !stays_inside(relative) {
            warn!("Skipping {}: outside the repository", relative);
            return None;
        }
        let full = resolve_path(repo_path, relative);

        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                warn!("Skipping {}: not a regular file", relative);
                return None;
            }
            Err(e) => {
                warn!("Skipping {}: {}", relative, e);
                return None;
            }
        }

        match tokio::fs::read_to_string(&full).await {
            Ok(content) => {
                debug!("Read {} ({} bytes)", relative, content.len());
                Some(SourceFile::new(relative, content))
            }
            Err(e) => {
                warn!("Skipping {}: {}", relative, e);
                None
            }
        }
    });

    join_all(reads).await.into_iter().flatten().collect()
}

/// One block per entry: header line, content, separator
pub fn render_bundle(bundle: &[BundleEntry]) -> String {
    bundle
        .iter()
        .map(|entry| {
            format!(
                "### File: {}{}\n\n{}\n\n---\n",
                entry.path,
                if entry.truncated { " (truncated)" } else { "" },
                entry.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
